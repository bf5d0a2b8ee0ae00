/// 設定ファイル管理機能のテスト
///
/// このテストは、設定ファイルの読み込み、検証、環境別接続設定の取得と
/// コマンドライン引数による上書きが正しく動作することを確認します。

#[cfg(test)]
mod config_tests {
    use sf2sql::cli::command_context::CommandContext;
    use sf2sql::cli::ConnectionArgs;
    use sf2sql::core::config::{Config, Dialect};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const CONFIG_YAML: &str = r#"
version: "1.0"
preferences: prefs.json

environments:
  warehouse:
    dialect: postgresql
    host: db.internal
    port: 5433
    database: crm
    user: loader
    password: secret
    pool_max: 4
  local:
    dialect: sqlite
    filename: org.db
"#;

    /// Config構造体が正しくデシリアライズできることを確認
    #[test]
    fn test_config_deserialization() {
        let config: Config = CONFIG_YAML.parse().unwrap();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.preferences, Some(PathBuf::from("prefs.json")));
        assert_eq!(config.environments.len(), 2);
    }

    /// 環境別の接続設定を取得できることを確認
    #[test]
    fn test_get_connection_settings_for_environment() {
        let config: Config = CONFIG_YAML.parse().unwrap();

        let warehouse = config.get_connection_settings("warehouse").unwrap();
        assert_eq!(warehouse.dialect, Dialect::PostgreSQL);
        assert_eq!(warehouse.host, "db.internal");
        assert_eq!(warehouse.effective_port(), 5433);
        assert_eq!(warehouse.pool_max, Some(4));

        let local = config.get_connection_settings("local").unwrap();
        assert_eq!(local.dialect, Dialect::SQLite);
        assert_eq!(local.filename, Some(PathBuf::from("org.db")));
        assert_eq!(local.host, "localhost");
    }

    /// 存在しない環境はエラーになることを確認
    #[test]
    fn test_unknown_environment() {
        let config: Config = CONFIG_YAML.parse().unwrap();
        let err = config.get_connection_settings("production").unwrap_err();
        assert!(err.to_string().contains("production"));
    }

    /// データベース名のないネットワーク接続は検証エラーになることを確認
    #[test]
    fn test_validation_requires_database_name() {
        let yaml = r#"
version: "1.0"
environments:
  broken:
    dialect: mysql
    host: localhost
"#;
        let config: Config = yaml.parse().unwrap();
        assert!(config.validate().is_err());
    }

    /// 存在しない設定ファイルの読み込みはエラーになることを確認
    #[test]
    fn test_missing_config_file() {
        assert!(Config::from_file(Path::new("/nonexistent/sf2sql.yaml")).is_err());
    }

    /// コマンドライン引数が設定ファイルの値を上書きすることを確認
    #[test]
    fn test_connection_args_override_environment() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(Config::DEFAULT_CONFIG_PATH), CONFIG_YAML).unwrap();
        let context = CommandContext::new(dir.path().to_path_buf(), None, None);

        let settings = context
            .connection_settings(&ConnectionArgs {
                env: Some("warehouse".to_string()),
                database: Some("crm_copy".to_string()),
                overwrite: true,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(settings.dialect, Dialect::PostgreSQL);
        assert_eq!(settings.database, "crm_copy");
        assert_eq!(settings.user.as_deref(), Some("loader"));
        assert!(settings.overwrite);
        assert_eq!(context.preferences_path(), dir.path().join("prefs.json"));
    }
}
