// PostgreSQL用SQLジェネレーター
//
// テーブル定義からPostgreSQL用のDDL文を生成します。

use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::sql_quote::{quote_identifier_ansi, quote_literal_ansi, quote_literal_list};
use crate::core::config::Dialect;
use crate::core::ddl::{ColumnDefinition, ColumnKind};

/// PostgreSQL用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct PostgresSqlGenerator {}

impl PostgresSqlGenerator {
    /// 新しいPostgresSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for PostgresSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for PostgresSqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_identifier_ansi(name)
    }

    fn quote_literal(&self, value: &str) -> String {
        quote_literal_ansi(value)
    }

    fn map_column_type(&self, column: &ColumnDefinition) -> String {
        match &column.kind {
            ColumnKind::VarChar { length } => format!("VARCHAR({})", length),
            ColumnKind::Text => "TEXT".to_string(),
            ColumnKind::Boolean => "BOOLEAN".to_string(),
            ColumnKind::Integer => "INTEGER".to_string(),
            ColumnKind::BigInteger => "BIGINT".to_string(),
            ColumnKind::Decimal { precision, scale } => {
                format!("NUMERIC({}, {})", precision, scale)
            }
            ColumnKind::Float { .. } => "DOUBLE PRECISION".to_string(),
            ColumnKind::Date => "DATE".to_string(),
            ColumnKind::DateTime => "TIMESTAMP".to_string(),
            ColumnKind::Time => "TIME".to_string(),
            ColumnKind::Binary { .. } => "BYTEA".to_string(),
            ColumnKind::Enum { values } => format!(
                "TEXT CHECK ({} IN ({}))",
                quote_identifier_ansi(&column.name),
                quote_literal_list(Dialect::PostgreSQL, values)
            ),
            ColumnKind::Reference { length } => format!("CHAR({}) COLLATE \"C\"", length),
        }
    }
}
