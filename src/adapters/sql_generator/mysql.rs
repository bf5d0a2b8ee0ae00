// MySQL用SQLジェネレーター
//
// テーブル定義からMySQL（MariaDB互換）用のDDL文を生成します。

use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::sql_quote::{quote_identifier_mysql, quote_literal_list, quote_literal_mysql};
use crate::core::config::Dialect;
use crate::core::ddl::{ColumnDefinition, ColumnKind};

// DECIMAL/FLOATの精度・スケールの上限
const MAX_DECIMAL_PRECISION: u32 = 65;
const MAX_SCALE: u32 = 30;

/// MySQL用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct MysqlSqlGenerator {}

impl MysqlSqlGenerator {
    /// 新しいMysqlSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for MysqlSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for MysqlSqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier_mysql(name)
    }

    fn quote_literal(&self, value: &str) -> String {
        quote_literal_mysql(value)
    }

    fn map_column_type(&self, column: &ColumnDefinition) -> String {
        match &column.kind {
            ColumnKind::VarChar { length } => format!("VARCHAR({})", length),
            ColumnKind::Text => "TEXT".to_string(),
            ColumnKind::Boolean => "BOOLEAN".to_string(),
            ColumnKind::Integer => "INT".to_string(),
            ColumnKind::BigInteger => "BIGINT".to_string(),
            ColumnKind::Decimal { precision, scale } => {
                let precision = (*precision).min(MAX_DECIMAL_PRECISION);
                format!("DECIMAL({}, {})", precision, (*scale).min(MAX_SCALE).min(precision))
            }
            ColumnKind::Float { precision, scale } => {
                format!("FLOAT({}, {})", precision, (*scale).min(MAX_SCALE).min(*precision))
            }
            ColumnKind::Date => "DATE".to_string(),
            ColumnKind::DateTime => "DATETIME".to_string(),
            ColumnKind::Time => "TIME".to_string(),
            ColumnKind::Binary { .. } => "BLOB".to_string(),
            ColumnKind::Enum { values } => {
                format!("ENUM({})", quote_literal_list(Dialect::MySQL, values))
            }
            // 大文字小文字を区別する照合順序
            ColumnKind::Reference { length } => format!(
                "CHAR({}) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin",
                length
            ),
        }
    }

    fn boolean_literal(&self, value: bool) -> String {
        if value { "1" } else { "0" }.to_string()
    }

    // TEXT/BLOBにはDEFAULTを指定できない
    fn supports_default(&self, kind: &ColumnKind) -> bool {
        !kind.is_large_object()
    }
}
