/// エンドツーエンドテスト
///
/// describe 応答の取得からスキーマ構築、DDL生成までをセッション経由で通しで検証します。

#[cfg(test)]
mod end_to_end_tests {
    use indexmap::IndexMap;
    use sf2sql::adapters::metadata_source::DescribeFileSource;
    use sf2sql::core::config::{ConnectionSettings, Dialect};
    use sf2sql::core::preferences::PreferenceSet;
    use sf2sql::core::schema::{ObjectDescribe, PicklistEntry, RemoteFieldDescriptor};
    use sf2sql::services::session::Session;
    use std::sync::Arc;

    const ORG: &str = "00D000000000001";

    fn object(name: &str, fields: Vec<RemoteFieldDescriptor>) -> ObjectDescribe {
        ObjectDescribe {
            name: name.to_string(),
            label: name.to_string(),
            createable: true,
            custom: true,
            fields,
        }
    }

    fn describes() -> IndexMap<String, ObjectDescribe> {
        let mut id = RemoteFieldDescriptor::new("Id", "id", 18);
        id.updateable = false;
        id.createable = false;

        let mut price = RemoteFieldDescriptor::new("Price__c", "currency", 0);
        price.precision = Some(10);
        price.scale = Some(2);

        let mut stage = RemoteFieldDescriptor::new("Stage__c", "picklist", 255);
        stage.restricted_picklist = true;
        stage.picklist_values = ["A", "A", "B"]
            .iter()
            .map(|value| PicklistEntry {
                value: value.to_string(),
                label: None,
                active: true,
                default_value: false,
            })
            .collect();

        let mut widget_ref = RemoteFieldDescriptor::new("Widget__c", "reference", 18);
        widget_ref.reference_to = vec!["Widget__c".to_string()];

        let mut objects = IndexMap::new();
        objects.insert(
            "Widget__c".to_string(),
            object(
                "Widget__c",
                vec![
                    id.clone(),
                    RemoteFieldDescriptor::new("Name", "string", 80),
                    RemoteFieldDescriptor::new("Count__c", "int", 0),
                    RemoteFieldDescriptor::new("Active__c", "boolean", 0),
                    price,
                    stage,
                ],
            ),
        );
        objects.insert(
            "Gadget__c".to_string(),
            object(
                "Gadget__c",
                vec![
                    id,
                    widget_ref,
                    RemoteFieldDescriptor::new("Notes__c", "textarea", 32000),
                    RemoteFieldDescriptor::new("Launched__c", "date", 0),
                ],
            ),
        );
        objects
    }

    async fn session_with_schema() -> Session {
        let mut session = Session::new(PreferenceSet::default());
        let login = session.login(ORG, Arc::new(DescribeFileSource::new(describes())));
        assert!(login.is_success());

        let objects = vec!["Widget__c".to_string(), "Gadget__c".to_string()];
        let built = session.build_schema(ORG, &objects).await;
        assert!(built.is_success());
        assert_eq!(built.message, "Processed Objects");
        session
    }

    fn export(session: &Session, dialect: Dialect) -> String {
        let mut settings = ConnectionSettings::new(dialect);
        settings.database = "crm".to_string();
        let mut buffer = Vec::new();
        session.export_ddl(&settings, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[tokio::test]
    async fn test_mysql_ddl_for_two_objects() {
        let session = session_with_schema().await;
        let ddl = export(&session, Dialect::MySQL);
        let lines: Vec<&str> = ddl.lines().collect();

        assert_eq!(
            lines,
            vec![
                "CREATE TABLE `Widget__c` (`Id` VARCHAR(18), `Name` VARCHAR(80), `Count__c` INT, \
                 `Active__c` BOOLEAN DEFAULT 0, `Price__c` DECIMAL(10, 2), \
                 `Stage__c` ENUM('A', 'B', ''));",
                "CREATE INDEX `Widget__c_Stage__c` ON `Widget__c` (`Stage__c`);",
                "CREATE TABLE `Gadget__c` (`Id` VARCHAR(18), \
                 `Widget__c` CHAR(18) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin, \
                 `Notes__c` TEXT, `Launched__c` DATE);",
                "CREATE INDEX `Gadget__c_Widget__c` ON `Gadget__c` (`Widget__c`);",
            ]
        );
    }

    #[tokio::test]
    async fn test_postgres_ddl_uses_check_constraint() {
        let session = session_with_schema().await;
        let ddl = export(&session, Dialect::PostgreSQL);

        assert!(ddl.contains(r#""Stage__c" TEXT CHECK ("Stage__c" IN ('A', 'B', ''))"#));
        assert!(ddl.contains(r#""Active__c" BOOLEAN DEFAULT FALSE"#));
        assert!(ddl.contains(r#""Widget__c" CHAR(18) COLLATE "C""#));
    }

    #[tokio::test]
    async fn test_list_objects_reports_recommendations() {
        let mut session = Session::new(PreferenceSet::default());
        session.login(ORG, Arc::new(DescribeFileSource::new(describes())));

        let listed = session.list_objects(ORG).await;
        assert!(listed.is_success());
        assert_eq!(listed.response["features"], serde_json::json!(["sales"]));
        assert_eq!(
            listed.response["recommended"],
            serde_json::json!(["Gadget__c", "Widget__c"])
        );
    }

    #[tokio::test]
    async fn test_unknown_object_is_skipped() {
        let mut session = Session::new(PreferenceSet::default());
        session.login(ORG, Arc::new(DescribeFileSource::new(describes())));

        let objects = vec!["Widget__c".to_string(), "Missing__c".to_string()];
        let built = session.build_schema(ORG, &objects).await;

        assert!(built.is_success());
        assert_eq!(built.response["skipped"], serde_json::json!(["Missing__c"]));
        assert_eq!(session.schema().unwrap().table_names(), vec!["Widget__c"]);
    }

    #[tokio::test]
    async fn test_logged_out_org_fails() {
        let mut session = Session::new(PreferenceSet::default());
        session.login(ORG, Arc::new(DescribeFileSource::new(describes())));
        assert!(session.logout(ORG).is_success());

        let listed = session.list_objects(ORG).await;
        assert!(!listed.is_success());
        assert_eq!(listed.message, "Describe Global Failed");
    }

    fn path_describes() -> IndexMap<String, ObjectDescribe> {
        let mut path = RemoteFieldDescriptor::new("Path__c", "picklist", 255);
        path.restricted_picklist = true;
        path.picklist_values = [r"C:\", "Other", "It's", r"It\'s"]
            .iter()
            .map(|value| PicklistEntry {
                value: value.to_string(),
                label: None,
                active: true,
                default_value: false,
            })
            .collect();

        let mut objects = IndexMap::new();
        objects.insert("Thing__c".to_string(), object("Thing__c", vec![path]));
        objects
    }

    #[tokio::test]
    async fn test_backslash_picklist_values_render_closed_literals() {
        let mut session = Session::new(PreferenceSet::default());
        session.login(ORG, Arc::new(DescribeFileSource::new(path_describes())));
        let built = session
            .build_schema(ORG, &["Thing__c".to_string()])
            .await;
        assert!(built.is_success());

        let mysql = export(&session, Dialect::MySQL);
        assert_eq!(
            mysql.lines().next().unwrap(),
            r"CREATE TABLE `Thing__c` (`Path__c` ENUM('C:\\', 'Other', 'It\'s', 'It\\\'s', ''));"
        );

        let postgres = export(&session, Dialect::PostgreSQL);
        assert!(postgres.contains(
            r#""Path__c" TEXT CHECK ("Path__c" IN ('C:\', 'Other', 'It''s', 'It\''s', ''))"#
        ));
    }
}
