// SQLite用SQLジェネレーター
//
// テーブル定義からSQLite用のDDL文を生成します。
// SQLiteは照合順序を細かく指定できないため、参照IDは通常の固定長文字列になります。

use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::sql_quote::{quote_identifier_ansi, quote_literal_ansi, quote_literal_list};
use crate::core::config::Dialect;
use crate::core::ddl::{ColumnDefinition, ColumnKind};

/// SQLite用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct SqliteSqlGenerator {}

impl SqliteSqlGenerator {
    /// 新しいSqliteSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for SqliteSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlGenerator for SqliteSqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
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
            ColumnKind::Decimal { .. } => "NUMERIC".to_string(),
            ColumnKind::Float { .. } => "REAL".to_string(),
            ColumnKind::Date => "DATE".to_string(),
            ColumnKind::DateTime => "DATETIME".to_string(),
            ColumnKind::Time => "TIME".to_string(),
            ColumnKind::Binary { .. } => "BLOB".to_string(),
            ColumnKind::Enum { values } => format!(
                "TEXT CHECK ({} IN ({}))",
                quote_identifier_ansi(&column.name),
                quote_literal_list(Dialect::SQLite, values)
            ),
            ColumnKind::Reference { length } => format!("CHAR({})", length),
        }
    }

    fn boolean_literal(&self, value: bool) -> String {
        if value { "1" } else { "0" }.to_string()
    }
}
