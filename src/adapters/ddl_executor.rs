// DDL実行アダプター
//
// DDL文を1文ずつ実行するインターフェースと、SQLxプールによる実装。
// エンジンのエラーは番号・SQLSTATE・メッセージから失敗クラスへ分類されます。

use crate::core::error::DatabaseError;
use async_trait::async_trait;
use sqlx::AnyPool;
use std::fmt;
use tracing::trace;

// エンジン固有のエラー番号・SQLSTATE
const MYSQL_ROW_SIZE_TOO_LARGE: &str = "1118";
const MYSQL_TOO_MANY_KEYS: &str = "1069";
const POSTGRES_PROGRAM_LIMIT_EXCEEDED: &str = "54000";

/// 文の実行失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFailure {
    /// エンジン固有のエラーコード（MySQLはエラー番号、その他はSQLSTATE）
    pub code: Option<String>,
    /// エンジンのエラーメッセージ
    pub message: String,
}

impl StatementFailure {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// 失敗クラスを判定
    pub fn classify(&self) -> FailureClass {
        let message = self.message.to_lowercase();
        let code = self.code.as_deref();

        if matches!(code, Some(MYSQL_ROW_SIZE_TOO_LARGE) | Some(POSTGRES_PROGRAM_LIMIT_EXCEEDED))
            || message.contains("row size too large")
            || message.contains("row is too big")
        {
            FailureClass::RowTooWide
        } else if code == Some(MYSQL_TOO_MANY_KEYS) || message.contains("too many keys") {
            FailureClass::TooManyKeys
        } else {
            FailureClass::Other
        }
    }

    /// 失敗したSQLを添えてDatabaseErrorに変換
    pub fn into_database_error(self, sql: &str) -> DatabaseError {
        DatabaseError::Statement {
            message: self.message,
            code: self.code,
            sql: sql.to_string(),
        }
    }
}

impl fmt::Display for StatementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl From<sqlx::Error> for StatementFailure {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_error) => {
                let code = db_error
                    .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                    .map(|mysql| mysql.number().to_string())
                    .or_else(|| db_error.code().map(|code| code.to_string()));
                Self {
                    code,
                    message: db_error.message().to_string(),
                }
            }
            other => Self {
                code: None,
                message: other.to_string(),
            },
        }
    }
}

/// 失敗クラス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 行サイズ超過（文字列カラムをTEXTへ縮退して1回だけ再試行）
    RowTooWide,
    /// キー数超過（テーブルは作成済み、インデックスの一部が欠落）
    TooManyKeys,
    /// その他（恒久的な失敗）
    Other,
}

/// DDL実行トレイト
#[async_trait]
pub trait DdlExecutor: Send + Sync {
    /// 1文を実行
    async fn execute(&self, sql: &str) -> Result<(), StatementFailure>;

    /// 疎通確認
    async fn probe(&self) -> Result<(), StatementFailure> {
        self.execute("SELECT 1").await
    }
}

/// SQLxプールによるDDL実行
#[derive(Debug, Clone)]
pub struct PoolExecutor {
    pool: AnyPool,
}

impl PoolExecutor {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DdlExecutor for PoolExecutor {
    async fn execute(&self, sql: &str) -> Result<(), StatementFailure> {
        trace!(sql = %sql, "Executing statement");
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(StatementFailure::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_mysql_row_size() {
        let failure = StatementFailure::new(
            Some("1118"),
            "Row size too large. The maximum row size for the used table type is 65535",
        );
        assert_eq!(failure.classify(), FailureClass::RowTooWide);
    }

    #[test]
    fn test_classify_by_message_only() {
        let failure = StatementFailure::new(None, "row is too big: size 9000, maximum size 8160");
        assert_eq!(failure.classify(), FailureClass::RowTooWide);

        let failure = StatementFailure::new(None, "Too many keys specified; max 64 keys allowed");
        assert_eq!(failure.classify(), FailureClass::TooManyKeys);
    }

    #[test]
    fn test_classify_too_many_keys_by_number() {
        assert_eq!(
            StatementFailure::new(Some("1069"), "").classify(),
            FailureClass::TooManyKeys
        );
    }

    #[test]
    fn test_classify_other() {
        let failure = StatementFailure::new(Some("42S01"), "Table 'Account' already exists");
        assert_eq!(failure.classify(), FailureClass::Other);
    }

    #[test]
    fn test_into_database_error_keeps_sql() {
        let err = StatementFailure::new(Some("42601"), "syntax error")
            .into_database_error("CREATE TABLE x (");
        match err {
            DatabaseError::Statement { code, sql, .. } => {
                assert_eq!(code.as_deref(), Some("42601"));
                assert_eq!(sql, "CREATE TABLE x (");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            StatementFailure::new(Some("1118"), "Row size too large").to_string(),
            "[1118] Row size too large"
        );
    }
}
