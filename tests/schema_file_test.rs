/// スキーマファイルの統合テスト
///
/// 構築したスキーマの保存・読み込みと、読み込み時の検証を確認します。

#[cfg(test)]
mod schema_file_tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use sf2sql::core::field_type::SemanticType;
    use sf2sql::core::preferences::PreferenceSet;
    use sf2sql::core::schema::{
        NormalizedField, NormalizedSchema, ObjectDescribe, PicklistEntry, RemoteFieldDescriptor,
        TableFields,
    };
    use sf2sql::services::schema_builder::build_schema;
    use sf2sql::services::schema_serializer::SchemaSerializerService;
    use sf2sql::services::session::Session;
    use tempfile::TempDir;

    fn fixture_schema() -> NormalizedSchema {
        let describes: IndexMap<String, ObjectDescribe> =
            serde_json::from_str(include_str!("fixtures/describes.json")).unwrap();
        build_schema(&describes, &PreferenceSet::default())
    }

    #[test]
    fn test_round_trip_preserves_schema() {
        let service = SchemaSerializerService::new();
        let schema = fixture_schema();

        let json = service.serialize_to_string(&schema).unwrap();
        let restored = service.parse(&json, "memory").unwrap();

        assert_eq!(restored, schema);
        assert_eq!(restored.table_names(), schema.table_names());
    }

    #[test]
    fn test_round_trip_with_inaccessible_reference_target() {
        let mut id = RemoteFieldDescriptor::new("Id", "id", 18);
        id.updateable = false;
        id.createable = false;
        // 参照先オブジェクトにアクセスできない場合、referenceTo は空になる
        let related = RemoteFieldDescriptor::new("RelatedRecordId", "reference", 18);
        let mut kind = RemoteFieldDescriptor::new("Kind__c", "picklist", 255);
        kind.restricted_picklist = true;
        kind.picklist_values = [r"C:\", "It's"]
            .iter()
            .map(|value| PicklistEntry {
                value: value.to_string(),
                label: None,
                active: true,
                default_value: false,
            })
            .collect();

        let mut describes = IndexMap::new();
        describes.insert(
            "Thing__c".to_string(),
            ObjectDescribe {
                name: "Thing__c".to_string(),
                label: "Thing".to_string(),
                createable: true,
                custom: true,
                fields: vec![id, related, kind],
            },
        );
        let schema = build_schema(&describes, &PreferenceSet::default());
        let fields = schema.table("Thing__c").unwrap();
        assert_eq!(fields["RelatedRecordId"].field_type, SemanticType::Reference);
        assert!(fields["RelatedRecordId"].target.is_empty());

        let service = SchemaSerializerService::new();
        let json = service.serialize_to_string(&schema).unwrap();
        let restored = service.parse(&json, "memory").unwrap();
        assert_eq!(restored, schema);
    }

    #[test]
    fn test_save_appends_extension_and_loads_back() {
        let dir = TempDir::new().unwrap();
        let service = SchemaSerializerService::new();
        let schema = fixture_schema();

        let written = service.save(&schema, &dir.path().join("org-schema")).unwrap();
        assert_eq!(written, dir.path().join("org-schema.json"));

        let loaded = service.load(&written).unwrap();
        assert_eq!(loaded, schema);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = SchemaSerializerService::new()
            .load(&dir.path().join("missing.json"))
            .unwrap_err();
        assert!(err.to_string().contains("missing.json"));
        assert!(!err.is_parse());
    }

    #[test]
    fn test_invalid_schema_rejected_on_load() {
        let service = SchemaSerializerService::new();
        let json = r#"{ "Account": { "Stage": { "name": "Stage", "type": "enum", "values": ["A", "A"] } } }"#;

        let err = service.parse(json, "inline").unwrap_err();
        assert!(err.is_invalid());
    }

    #[test]
    fn test_failed_load_keeps_current_schema() {
        let dir = TempDir::new().unwrap();
        let mut fields = TableFields::new();
        fields.insert(
            "Name".to_string(),
            NormalizedField::with_size("Name", SemanticType::String, 80),
        );
        let mut schema = NormalizedSchema::new();
        schema.insert_table("Account".to_string(), fields);
        let path = SchemaSerializerService::new()
            .save(&schema, &dir.path().join("good"))
            .unwrap();

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();

        let mut session = Session::new(PreferenceSet::default());
        assert!(session.load_schema(&path).is_success());
        let response = session.load_schema(&bad);

        assert!(!response.is_success());
        assert_eq!(response.message, "Schema Load Failed");
        assert_eq!(session.schema(), Some(&schema));
    }
}
