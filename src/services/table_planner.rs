// テーブルプランナーサービス
//
// 正規化フィールドを設定に従って物理カラムへ変換し、テーブル定義を組み立てます。
// 実行モード（ライブ接続）とエクスポートモード（DDLテキスト）の双方が同じ定義を使います。

use crate::core::ddl::{ColumnDefinition, ColumnKind, DefaultValue, IndexDefinition, TableDefinition};
use crate::core::field_type::{apply_preferences, SemanticType};
use crate::core::preferences::{LookupType, PreferenceSet};
use crate::core::schema::{NormalizedField, NormalizedSchema, TableFields};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, warn};

/// インデックス名の最大長（主要エンジンの識別子長制限内）
pub const MAX_INDEX_NAME_LENGTH: usize = 60;

/// 自由形式として扱う選択リストの長さ
pub const FREE_FORM_PICKLIST_LENGTH: u32 = 255;

const DEFAULT_VARCHAR_LENGTH: u32 = 255;
const RANDOM_INDEX_SUFFIX_LENGTH: usize = 24;

/// インデックス名を生成
///
/// `{table}_{field}` が長すぎる場合はランダムな短い名前にフォールバックします。
pub fn index_name(table: &str, field: &str) -> String {
    let composed = format!("{}_{}", table, field);
    if composed.len() <= MAX_INDEX_NAME_LENGTH {
        return composed;
    }

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_INDEX_SUFFIX_LENGTH)
        .map(char::from)
        .collect();
    format!("ix_{}", suffix.to_lowercase())
}

/// テーブルプランナー
#[derive(Debug, Clone)]
pub struct TablePlanner<'a> {
    preferences: &'a PreferenceSet,
}

impl<'a> TablePlanner<'a> {
    /// 新しいTablePlannerを作成
    pub fn new(preferences: &'a PreferenceSet) -> Self {
        Self { preferences }
    }

    /// スキーマ全体のテーブル定義を挿入順に生成
    pub fn plan_schema(&self, schema: &NormalizedSchema) -> Vec<TableDefinition> {
        schema
            .tables()
            .map(|(name, fields)| self.plan_table(name, fields))
            .collect()
    }

    /// 1テーブル分の定義を生成
    pub fn plan_table(&self, table_name: &str, fields: &TableFields) -> TableDefinition {
        let mut table = TableDefinition::new(table_name);

        for field in fields.values() {
            let kind = self.column_kind(field);
            let indexed = self.is_indexed(field) && !kind.is_large_object();
            if self.is_indexed(field) && !indexed {
                warn!(table = %table_name, field = %field.name, "Skipping index on large object column");
            }

            let mut column = ColumnDefinition::new(&field.name, kind);
            column.default = self.default_value(field, &column.kind);

            if indexed {
                table.add_index(IndexDefinition {
                    name: index_name(table_name, &field.name),
                    column: field.name.clone(),
                });
            }
            table.add_column(column);
        }

        debug!(
            table = %table_name,
            columns = table.columns.len(),
            indexes = table.indexes.len(),
            "Planned table"
        );
        table
    }

    /// インデックスを作成するかどうか
    pub fn is_indexed(&self, field: &NormalizedField) -> bool {
        let policy = &self.preferences.indexes;
        (policy.lookups && field.field_type == SemanticType::Reference)
            || (policy.picklists && field.field_type == SemanticType::Enum)
            || (policy.external_ids && field.external_id)
    }

    /// 実効カラム種別を決定
    pub fn column_kind(&self, field: &NormalizedField) -> ColumnKind {
        let size = field.size.unwrap_or(DEFAULT_VARCHAR_LENGTH);

        match apply_preferences(field.field_type, self.preferences) {
            SemanticType::String => ColumnKind::VarChar { length: size },
            SemanticType::Text => ColumnKind::Text,
            SemanticType::Boolean => ColumnKind::Boolean,
            SemanticType::Integer => ColumnKind::Integer,
            SemanticType::BigInteger => ColumnKind::BigInteger,
            SemanticType::Decimal => {
                let (precision, scale) = precision_and_scale(field);
                ColumnKind::Decimal { precision, scale }
            }
            SemanticType::Float => {
                let (precision, scale) = precision_and_scale(field);
                ColumnKind::Float { precision, scale }
            }
            SemanticType::Date => ColumnKind::Date,
            SemanticType::DateTime => ColumnKind::DateTime,
            SemanticType::Time => ColumnKind::Time,
            SemanticType::Binary => ColumnKind::Binary { length: size },
            SemanticType::Enum => self.enum_kind(field),
            SemanticType::Reference => ColumnKind::Reference {
                length: LookupType::FIXED_ID_LENGTH,
            },
        }
    }

    fn enum_kind(&self, field: &NormalizedField) -> ColumnKind {
        let policy = &self.preferences.picklists;
        if !field.restricted && policy.unrestricted {
            return ColumnKind::VarChar {
                length: FREE_FORM_PICKLIST_LENGTH,
            };
        }

        let mut values = field.values.clone();
        if policy.ensure_blanks && !values.iter().any(|v| v.is_empty()) {
            values.push(String::new());
        }

        if values.is_empty() {
            debug!(field = %field.name, "Picklist without values, using free-form string");
            return ColumnKind::VarChar {
                length: FREE_FORM_PICKLIST_LENGTH,
            };
        }

        ColumnKind::Enum { values }
    }

    /// デフォルト値を決定
    pub fn default_value(&self, field: &NormalizedField, kind: &ColumnKind) -> Option<DefaultValue> {
        let policy = &self.preferences.defaults;

        let remote = if policy.attempt_remote_values {
            field.default.as_ref().and_then(|value| convert_default(value, kind))
        } else {
            None
        };

        let default = remote.or_else(|| match kind {
            ColumnKind::Boolean if policy.checkbox_default_false => Some(DefaultValue::Boolean(false)),
            ColumnKind::VarChar { .. } | ColumnKind::Text
                if policy.text_empty_string && field.field_type.is_textual() =>
            {
                Some(DefaultValue::Text(String::new()))
            }
            _ => None,
        });

        match (&default, kind) {
            (Some(DefaultValue::Text(value)), ColumnKind::Enum { values }) if !values.contains(value) => {
                debug!(field = %field.name, default = %value, "Default is not an enum member, dropping");
                None
            }
            _ => default,
        }
    }
}

fn precision_and_scale(field: &NormalizedField) -> (u32, u32) {
    let precision = field.precision.unwrap_or(18).max(1);
    let scale = field.scale.unwrap_or(0).min(precision);
    (precision, scale)
}

/// リモートのデフォルト値をカラム種別に合わせて変換
fn convert_default(value: &Value, kind: &ColumnKind) -> Option<DefaultValue> {
    match (value, kind) {
        (Value::Bool(flag), _) => Some(DefaultValue::Boolean(*flag)),
        (Value::String(text), ColumnKind::Boolean) => match text.to_ascii_lowercase().as_str() {
            "true" => Some(DefaultValue::Boolean(true)),
            "false" => Some(DefaultValue::Boolean(false)),
            _ => None,
        },
        (Value::Number(number), _) => Some(DefaultValue::Number(number.to_string())),
        (Value::String(text), _) => Some(DefaultValue::Text(text.clone())),
        _ => None,
    }
}

/// 行幅超過時の縮退
///
/// 元の定義は変更せず、全ての可変長文字列カラムをTEXTに置き換えた複製を返します。
/// 置き換え対象が1つもなければ `None` を返します。
pub fn degrade_wide_strings(table: &TableDefinition) -> Option<(TableDefinition, Vec<String>)> {
    let mut degraded = table.clone();
    let mut converted = Vec::new();

    for column in degraded.columns.iter_mut() {
        if column.kind.is_plain_string() {
            column.kind = ColumnKind::Text;
            converted.push(column.name.clone());
        }
    }

    if converted.is_empty() {
        return None;
    }

    degraded.indexes.retain(|index| !converted.contains(&index.column));
    Some((degraded, converted))
}
