// コマンド共通コンテキスト
//
// 設定ファイル・プリファレンスの読み込みと接続設定の解決をCLI層で集約する。

use crate::cli::ConnectionArgs;
use crate::core::config::{Config, ConnectionSettings, Dialect};
use crate::core::preferences::PreferenceSet;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// プリファレンスファイルの既定名
pub const DEFAULT_PREFERENCES_FILE: &str = "preferences.json";

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    preferences_path: Option<PathBuf>,
}

impl CommandContext {
    /// カスタムパスを指定してコンテキストを作成
    ///
    /// 相対パスはプロジェクトルートからの相対として解決します。
    pub fn new(
        project_path: PathBuf,
        config_path: Option<PathBuf>,
        preferences_path: Option<PathBuf>,
    ) -> Self {
        let resolve = |path: PathBuf| {
            if path.is_absolute() {
                path
            } else {
                project_path.join(path)
            }
        };

        let config_path =
            resolve(config_path.unwrap_or_else(|| PathBuf::from(Config::DEFAULT_CONFIG_PATH)));
        let preferences_path = preferences_path.map(resolve);

        Self {
            project_path,
            config_path,
            preferences_path,
        }
    }

    /// プロジェクトルートからの相対パスを解決
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_path.join(path)
        }
    }

    /// プリファレンスファイルのパス
    ///
    /// `--preferences` の指定、設定ファイルの `preferences`、既定のファイル名の順に解決します。
    pub fn preferences_path(&self) -> PathBuf {
        if let Some(path) = &self.preferences_path {
            return path.clone();
        }

        let from_config = self
            .config_path
            .exists()
            .then(|| Config::from_file(&self.config_path).ok())
            .flatten()
            .and_then(|config| config.preferences);

        self.resolve_path(
            &from_config.unwrap_or_else(|| PathBuf::from(DEFAULT_PREFERENCES_FILE)),
        )
    }

    /// プリファレンスを読み込む（ファイルがなければ既定値）
    pub fn load_preferences(&self) -> PreferenceSet {
        PreferenceSet::load(&self.preferences_path())
    }

    /// 設定ファイルを読み込む
    pub fn load_config(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Err(anyhow!("Config file not found: {:?}", self.config_path));
        }
        Config::from_file(&self.config_path)
    }

    /// 接続設定を解決
    ///
    /// 環境名が指定されていれば設定ファイルの値を起点とし、個別のフラグで上書きします。
    pub fn connection_settings(&self, args: &ConnectionArgs) -> Result<ConnectionSettings> {
        let mut settings = match (&args.env, &args.dialect) {
            (Some(env), _) => self
                .load_config()?
                .get_connection_settings(env)
                .with_context(|| format!("Config for environment '{}' not found", env))?,
            (None, Some(dialect)) => ConnectionSettings::new(dialect.parse::<Dialect>()?),
            (None, None) => {
                return Err(anyhow!(
                    "Specify either --env or --dialect to select a database"
                ))
            }
        };

        if let Some(dialect) = &args.dialect {
            settings.dialect = dialect.parse()?;
        }
        if let Some(host) = &args.host {
            settings.host = host.clone();
        }
        if args.port.is_some() {
            settings.port = args.port;
        }
        if let Some(database) = &args.database {
            settings.database = database.clone();
        }
        if let Some(filename) = &args.filename {
            settings.filename = Some(self.resolve_path(filename));
        }
        if args.user.is_some() {
            settings.user = args.user.clone();
        }
        if args.password.is_some() {
            settings.password = args.password.clone();
        }
        if args.overwrite {
            settings.overwrite = true;
        }

        debug!(settings = ?settings.scrubbed(), "Resolved connection settings");
        settings.validate()?;
        Ok(settings)
    }
}
