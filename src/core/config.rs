// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の読み込み、検証、
// 環境別のデータベース接続設定の管理を行います。

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// データベース方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(rename = "postgresql")]
    PostgreSQL,
    #[serde(rename = "mysql")]
    MySQL,
    #[serde(rename = "sqlite")]
    SQLite,
}

impl Dialect {
    /// ファイルベースの組み込みエンジンかどうか
    pub fn is_embedded(&self) -> bool {
        matches!(self, Dialect::SQLite)
    }

    /// 既定のポート番号
    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::PostgreSQL => 5432,
            Dialect::MySQL => 3306,
            Dialect::SQLite => 0,
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
            Dialect::SQLite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSQL),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "sqlite" | "sqlite3" => Ok(Dialect::SQLite),
            other => Err(anyhow!(
                "Unsupported database dialect: {}. Please specify one of: postgresql, mysql, sqlite.",
                other
            )),
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// 設定（プリファレンス）ファイルのパス
    #[serde(default)]
    pub preferences: Option<PathBuf>,

    /// 環境別のデータベース設定
    #[serde(default)]
    pub environments: HashMap<String, ConnectionSettings>,
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = "sf2sql.yaml";

    /// 設定ファイルを読み込む
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    /// 指定された環境のデータベース設定を取得
    pub fn get_connection_settings(&self, environment: &str) -> Result<ConnectionSettings> {
        self.environments.get(environment).cloned().ok_or_else(|| {
            anyhow!(
                "Environment '{}' not found. Available environments: {:?}",
                environment,
                self.environments.keys().collect::<Vec<_>>()
            )
        })
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        for (env_name, settings) in &self.environments {
            settings
                .validate()
                .with_context(|| format!("Invalid config for environment '{}'", env_name))?;
        }

        Ok(())
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}

/// データベース接続設定
///
/// 1回のマテリアライズ呼び出しに対する接続先と動作方針。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// データベース方言
    pub dialect: Dialect,

    /// ホスト名（SQLiteの場合は不要）
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号（未指定なら方言の既定値）
    #[serde(default)]
    pub port: Option<u16>,

    /// データベース名
    #[serde(default)]
    pub database: String,

    /// データベースファイル（SQLite）
    #[serde(default)]
    pub filename: Option<PathBuf>,

    /// ユーザー名
    #[serde(default)]
    pub user: Option<String>,

    /// パスワード
    #[serde(default)]
    pub password: Option<String>,

    /// 接続タイムアウト（秒）
    #[serde(default)]
    pub timeout: Option<u64>,

    /// 接続プールの上限
    #[serde(default)]
    pub pool_max: Option<u32>,

    /// 既存テーブルを削除してから作成する
    #[serde(default)]
    pub overwrite: bool,
}

fn default_host() -> String {
    "localhost".to_string()
}

impl ConnectionSettings {
    /// 方言だけを指定した設定を作成
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            host: default_host(),
            port: None,
            database: String::new(),
            filename: None,
            user: None,
            password: None,
            timeout: None,
            pool_max: None,
            overwrite: false,
        }
    }

    /// SQLiteファイル用の設定を作成
    pub fn sqlite(filename: impl Into<PathBuf>) -> Self {
        let mut settings = Self::new(Dialect::SQLite);
        settings.filename = Some(filename.into());
        settings
    }

    /// 実効ポート番号
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.dialect.default_port())
    }

    /// 認証情報を取り除いた複製（応答への echo 用）
    pub fn scrubbed(&self) -> Self {
        let mut copy = self.clone();
        if copy.password.is_some() {
            copy.password = Some(String::new());
        }
        copy
    }

    /// Validate connection settings
    pub fn validate(&self) -> Result<()> {
        if self.dialect.is_embedded() {
            if self.filename.is_none() && self.database.is_empty() {
                return Err(anyhow!("SQLite requires a database file name"));
            }
        } else if self.database.is_empty() {
            return Err(anyhow!("Database name is not specified"));
        }

        Ok(())
    }
}
