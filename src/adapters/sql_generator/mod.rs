// SQL生成アダプター
//
// テーブル定義から各データベース方言用のDDL文を生成するアダプター層。
// 文は全て1行で生成し、インデックスはCREATE TABLEの後に個別の文として作成します。

pub mod mysql;
pub mod postgres;
pub mod sqlite;

use crate::core::config::Dialect;
use crate::core::ddl::{ColumnDefinition, ColumnKind, DefaultValue, IndexDefinition, TableDefinition};
use std::sync::Arc;

pub use mysql::MysqlSqlGenerator;
pub use postgres::PostgresSqlGenerator;
pub use sqlite::SqliteSqlGenerator;

/// SQLジェネレータートレイト
///
/// 各データベース方言用のSQLジェネレーターが実装すべきインターフェース。
/// 型マッピングとクォートだけを方言ごとに実装し、文の組み立ては共通の既定実装を使います。
pub trait SqlGenerator: Send + Sync {
    /// 対象の方言
    fn dialect(&self) -> Dialect;

    /// 識別子をクォート
    fn quote_identifier(&self, name: &str) -> String;

    /// 文字列リテラルをクォート
    fn quote_literal(&self, value: &str) -> String;

    /// カラム種別を方言の型文字列にマッピング
    ///
    /// # Arguments
    ///
    /// * `column` - カラム定義（列挙型のCHECK制約でカラム名を参照するため）
    fn map_column_type(&self, column: &ColumnDefinition) -> String;

    /// 真偽値リテラル
    fn boolean_literal(&self, value: bool) -> String {
        if value { "TRUE" } else { "FALSE" }.to_string()
    }

    /// DEFAULT句を付与できるカラムかどうか
    fn supports_default(&self, _kind: &ColumnKind) -> bool {
        true
    }

    /// デフォルト値をリテラル化
    fn render_default(&self, kind: &ColumnKind, default: &DefaultValue) -> String {
        let textual = matches!(
            kind,
            ColumnKind::VarChar { .. }
                | ColumnKind::Text
                | ColumnKind::Enum { .. }
                | ColumnKind::Reference { .. }
        );

        match default {
            DefaultValue::Text(value) => self.quote_literal(value),
            DefaultValue::Boolean(value) if textual => self.quote_literal(&value.to_string()),
            DefaultValue::Boolean(value) => self.boolean_literal(*value),
            DefaultValue::Number(value) if textual => self.quote_literal(value),
            DefaultValue::Number(value) => value.clone(),
        }
    }

    /// カラム定義のSQL文字列を生成
    fn generate_column_definition(&self, column: &ColumnDefinition) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.map_column_type(column),
        ];

        if let Some(default) = &column.default {
            if self.supports_default(&column.kind) {
                parts.push(format!("DEFAULT {}", self.render_default(&column.kind, default)));
            }
        }

        parts.join(" ")
    }

    /// CREATE TABLE文を生成
    ///
    /// # Arguments
    ///
    /// * `table` - テーブル定義
    ///
    /// # Returns
    ///
    /// CREATE TABLE文のSQL文字列（末尾のセミコロンなし）
    fn generate_create_table(&self, table: &TableDefinition) -> String {
        let columns = table
            .columns
            .iter()
            .map(|column| self.generate_column_definition(column))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "CREATE TABLE {} ({})",
            self.quote_identifier(&table.name),
            columns
        )
    }

    /// CREATE INDEX文を生成
    fn generate_create_index(&self, table: &TableDefinition, index: &IndexDefinition) -> String {
        format!(
            "CREATE INDEX {} ON {} ({})",
            self.quote_identifier(&index.name),
            self.quote_identifier(&table.name),
            self.quote_identifier(&index.column)
        )
    }

    /// DROP TABLE IF EXISTS文を生成
    fn generate_drop_table_if_exists(&self, table: &TableDefinition) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote_identifier(&table.name))
    }

    /// テーブル1つ分の文を実行順に生成
    ///
    /// # Arguments
    ///
    /// * `table` - テーブル定義
    /// * `overwrite` - 既存テーブルを削除してから作成するかどうか
    fn generate_table_statements(&self, table: &TableDefinition, overwrite: bool) -> Vec<String> {
        let mut statements = Vec::with_capacity(table.indexes.len() + 2);
        if overwrite {
            statements.push(self.generate_drop_table_if_exists(table));
        }
        statements.push(self.generate_create_table(table));
        statements.extend(
            table
                .indexes
                .iter()
                .map(|index| self.generate_create_index(table, index)),
        );
        statements
    }
}

/// 方言に対応するSQLジェネレーターを取得
pub fn generator_for(dialect: Dialect) -> Arc<dyn SqlGenerator> {
    match dialect {
        Dialect::PostgreSQL => Arc::new(PostgresSqlGenerator::new()),
        Dialect::MySQL => Arc::new(MysqlSqlGenerator::new()),
        Dialect::SQLite => Arc::new(SqliteSqlGenerator::new()),
    }
}
