// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、DatabaseError, IoError, SchemaFileError, RemoteError を定義します。

use thiserror::Error;

/// データベースエラー
///
/// データベース操作時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Statement execution error
    #[error("Statement execution error: {message}{}", format_code_opt(.code))]
    Statement {
        /// エラーメッセージ
        message: String,
        /// エンジン固有のエラーコード
        code: Option<String>,
        /// 失敗したSQL
        sql: String,
    },

    /// Invalid connection settings
    #[error("Invalid connection settings: {message}")]
    Settings {
        /// エラーメッセージ
        message: String,
    },
}

impl DatabaseError {
    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// ステートメント実行エラーかどうか
    pub fn is_statement(&self) -> bool {
        matches!(self, DatabaseError::Statement { .. })
    }

    /// 設定エラーかどうか
    pub fn is_settings(&self) -> bool {
        matches!(self, DatabaseError::Settings { .. })
    }
}

fn format_code_opt(code: &Option<String>) -> String {
    code.as_ref()
        .map_or(String::new(), |code| format!(" (code: {})", code))
}

/// I/Oエラー
///
/// ファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },
}

impl IoError {
    /// ファイルが見つからないエラーかどうか
    pub fn is_file_not_found(&self) -> bool {
        matches!(self, IoError::FileNotFound { .. })
    }

    /// ファイル読み込みエラーかどうか
    pub fn is_file_read(&self) -> bool {
        matches!(self, IoError::FileRead { .. })
    }

    /// ファイル書き込みエラーかどうか
    pub fn is_file_write(&self) -> bool {
        matches!(self, IoError::FileWrite { .. })
    }
}

/// スキーマファイルエラー
///
/// 保存済みスキーマの読み込みと検証で発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum SchemaFileError {
    /// I/O error
    #[error(transparent)]
    Io(#[from] IoError),

    /// JSON parse error
    #[error("Failed to parse schema file {path}: {cause}")]
    Parse {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Invariant violation
    #[error("Invalid schema ({}): {reason}", format_location(.table, .field))]
    Invalid {
        /// テーブル名
        table: String,
        /// フィールド名
        field: Option<String>,
        /// 不正な理由
        reason: String,
    },
}

impl SchemaFileError {
    /// 解析エラーかどうか
    pub fn is_parse(&self) -> bool {
        matches!(self, SchemaFileError::Parse { .. })
    }

    /// 不変条件違反かどうか
    pub fn is_invalid(&self) -> bool {
        matches!(self, SchemaFileError::Invalid { .. })
    }
}

fn format_location(table: &str, field: &Option<String>) -> String {
    match field {
        Some(field) => format!("table: {}, field: {}", table, field),
        None => format!("table: {}", table),
    }
}

/// リモートメタデータエラー
///
/// describe 呼び出しや接続ハンドルの管理で発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    /// Not connected
    #[error("No active connection for org '{org}'")]
    NotConnected {
        /// 組織ID
        org: String,
    },

    /// Global describe failure
    #[error("Describe global failed: {cause}")]
    DescribeGlobal {
        /// エラー原因
        cause: String,
    },

    /// Object describe failure
    #[error("Describe of '{object}' failed: {cause}")]
    Describe {
        /// オブジェクト名
        object: String,
        /// エラー原因
        cause: String,
    },
}

impl RemoteError {
    /// 未接続エラーかどうか
    pub fn is_not_connected(&self) -> bool {
        matches!(self, RemoteError::NotConnected { .. })
    }

    /// オブジェクト単位の describe エラーかどうか
    pub fn is_describe(&self) -> bool {
        matches!(self, RemoteError::Describe { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_variants() {
        let conn_error = DatabaseError::Connection {
            message: "Connection failed".to_string(),
            cause: "Timeout".to_string(),
        };
        assert!(conn_error.is_connection());
        assert!(conn_error.to_string().contains("Timeout"));

        let stmt_error = DatabaseError::Statement {
            message: "Row size too large".to_string(),
            code: Some("1118".to_string()),
            sql: "CREATE TABLE t (a INT)".to_string(),
        };
        assert!(stmt_error.is_statement());
        assert!(stmt_error.to_string().contains("(code: 1118)"));

        let settings_error = DatabaseError::Settings {
            message: "missing filename".to_string(),
        };
        assert!(settings_error.is_settings());
    }

    #[test]
    fn test_io_error_variants() {
        let not_found = IoError::FileNotFound {
            path: "/path/to/file".to_string(),
        };
        assert!(not_found.is_file_not_found());

        let read_error = IoError::FileRead {
            path: "/path/to/file".to_string(),
            cause: "Permission denied".to_string(),
        };
        assert!(read_error.is_file_read());

        let write_error = IoError::FileWrite {
            path: "/path/to/file".to_string(),
            cause: "Disk full".to_string(),
        };
        assert!(write_error.is_file_write());
    }

    #[test]
    fn test_schema_file_error_format() {
        let error = SchemaFileError::Invalid {
            table: "Account".to_string(),
            field: Some("Name".to_string()),
            reason: "string field without size".to_string(),
        };
        assert!(error.is_invalid());
        assert_eq!(
            error.to_string(),
            "Invalid schema (table: Account, field: Name): string field without size"
        );

        let error = SchemaFileError::Parse {
            path: "schema.json".to_string(),
            cause: "EOF".to_string(),
        };
        assert!(error.is_parse());
    }

    #[test]
    fn test_remote_error_variants() {
        let error = RemoteError::NotConnected {
            org: "00D000000000001".to_string(),
        };
        assert!(error.is_not_connected());

        let error = RemoteError::Describe {
            object: "Account".to_string(),
            cause: "INVALID_TYPE".to_string(),
        };
        assert!(error.is_describe());
        assert!(error.to_string().contains("Account"));
    }
}
