// スキーマビルダーサービス
//
// describe 応答のフィールド一覧を正規化フィールドへ変換し、
// オブジェクト単位で NormalizedSchema を組み立てます。
// 取捨方針（読み取り専用・監査フィールド）と長い文字列のTEXT昇格、
// 選択リスト値の重複除去とエスケープをここで適用します。

use crate::adapters::sql_quote::escape_literal_value;
use crate::core::field_type::{RemoteFieldType, SemanticType};
use crate::core::preferences::PreferenceSet;
use crate::core::schema::{
    NormalizedField, NormalizedSchema, ObjectDescribe, PicklistEntry, RemoteFieldDescriptor,
    TableFields,
};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::{debug, warn};

/// 監査フィールド名
pub const AUDIT_FIELDS: &[&str] = &[
    "CreatedDate",
    "CreatedById",
    "LastModifiedDate",
    "LastModifiedById",
    "SystemModstamp",
    "LastActivityDate",
    "LastViewedDate",
    "LastReferencedDate",
];

/// VARCHARとして扱う最大長
pub const MAX_STRING_LENGTH: u32 = 255;

const DEFAULT_PRECISION: u32 = 18;
const DEFAULT_SCALE: u32 = 2;

/// 読み取り専用フィールドかどうか
///
/// 数式フィールド、または更新も作成もできないフィールドが該当します。
pub fn is_read_only(field: &RemoteFieldDescriptor) -> bool {
    field.calculated || (!field.updateable && !field.createable)
}

/// 監査フィールドかどうか
pub fn is_audit_field(name: &str) -> bool {
    AUDIT_FIELDS.contains(&name)
}

/// 選択リストの値を抽出
///
/// 値のバックスラッシュとシングルクォートをエスケープし、初出順を保って重複を除去します。
/// 結果に重複除去を再適用しても変化しません。
pub fn extract_picklist_values(entries: &[PicklistEntry]) -> Vec<String> {
    dedupe_values(entries.iter().map(|entry| escape_literal_value(&entry.value)))
}

/// 初出順を保って重複を除去
pub fn dedupe_values<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    values
        .into_iter()
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// スキーマビルダー
#[derive(Debug, Clone)]
pub struct SchemaBuilder<'a> {
    preferences: &'a PreferenceSet,
    all_text: bool,
}

impl<'a> SchemaBuilder<'a> {
    /// 新しいSchemaBuilderを作成
    pub fn new(preferences: &'a PreferenceSet) -> Self {
        Self {
            preferences,
            all_text: false,
        }
    }

    /// 全ての文字列フィールドをTEXTへ昇格させる
    pub fn with_all_text(mut self, all_text: bool) -> Self {
        self.all_text = all_text;
        self
    }

    /// フィールドを取り込むかどうかを判定
    fn should_include(&self, field: &RemoteFieldDescriptor, raw_type: &RemoteFieldType) -> bool {
        if raw_type.is_primary_id() {
            return true;
        }

        let policy = &self.preferences.defaults;
        if policy.suppress_read_only && is_read_only(field) {
            return false;
        }
        if policy.suppress_audit && is_audit_field(&field.name) {
            return false;
        }

        true
    }

    /// フィールド一覧を正規化
    ///
    /// # Arguments
    ///
    /// * `fields` - describe 応答のフィールド一覧
    ///
    /// # Returns
    ///
    /// フィールド名をキーとする正規化フィールドのマップ（describe の順序を保持）
    pub fn build_fields(&self, fields: &[RemoteFieldDescriptor]) -> TableFields {
        let mut result = TableFields::new();

        for field in fields {
            let raw_type = RemoteFieldType::parse(&field.raw_type);
            if !self.should_include(field, &raw_type) {
                debug!(field = %field.name, "Field suppressed by preferences");
                continue;
            }

            let normalized = self.normalize_field(field, &raw_type);
            if result.contains_key(&normalized.name) {
                warn!(field = %normalized.name, "Duplicate field name in describe, keeping the first");
                continue;
            }
            result.insert(normalized.name.clone(), normalized);
        }

        result
    }

    fn normalize_field(
        &self,
        field: &RemoteFieldDescriptor,
        raw_type: &RemoteFieldType,
    ) -> NormalizedField {
        if raw_type.is_unrecognized() {
            debug!(field = %field.name, raw_type = %field.raw_type, "Unrecognized field type, mapping to text");
        }

        let mut normalized = NormalizedField::new(&field.name, raw_type.base_type());
        normalized.label = field.label.clone();
        normalized.size = (field.length > 0).then_some(field.length);
        normalized.default = field.default_value.clone().filter(|v| !v.is_null());
        normalized.external_id = field.external_id;

        if *raw_type == RemoteFieldType::String
            && (field.length > MAX_STRING_LENGTH || self.all_text)
        {
            normalized.field_type = SemanticType::Text;
        }

        if normalized.field_type.requires_size() && normalized.size.is_none() {
            normalized.size = Some(MAX_STRING_LENGTH);
        }

        match raw_type {
            RemoteFieldType::Reference => {
                normalized.target = field.reference_to.clone();
            }
            RemoteFieldType::Picklist => {
                normalized.values = extract_picklist_values(&field.picklist_values);
                normalized.restricted = field.restricted_picklist;
                if normalized.default.is_none() {
                    normalized.default = field
                        .picklist_values
                        .iter()
                        .find(|entry| entry.default_value && entry.active)
                        .map(|entry| Value::String(entry.value.clone()));
                }
            }
            RemoteFieldType::Double
            | RemoteFieldType::Currency
            | RemoteFieldType::Percent => {
                normalized.scale = Some(field.scale.unwrap_or(DEFAULT_SCALE));
                normalized.precision = Some(field.precision.unwrap_or(DEFAULT_PRECISION));
            }
            _ => {}
        }

        // 文字列のデフォルト値も選択リストの値と同じ保存形式にする
        if let Some(Value::String(default)) = &normalized.default {
            normalized.default = Some(Value::String(escape_literal_value(default)));
        }

        normalized
    }

    /// 全オブジェクトのスキーマを構築
    ///
    /// オブジェクトAPI名をテーブル名とし、入力の順序を保持します。
    pub fn build_schema(&self, objects: &IndexMap<String, ObjectDescribe>) -> NormalizedSchema {
        let mut schema = NormalizedSchema::new();
        for (name, describe) in objects {
            let fields = self.build_fields(&describe.fields);
            debug!(table = %name, fields = fields.len(), "Built table fields");
            schema.insert_table(name.clone(), fields);
        }
        schema
    }
}

/// フィールド一覧を正規化（既定オプション）
pub fn build_fields(fields: &[RemoteFieldDescriptor], preferences: &PreferenceSet) -> TableFields {
    SchemaBuilder::new(preferences).build_fields(fields)
}

/// スキーマを構築（既定オプション）
pub fn build_schema(
    objects: &IndexMap<String, ObjectDescribe>,
    preferences: &PreferenceSet,
) -> NormalizedSchema {
    SchemaBuilder::new(preferences).build_schema(objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: &str) -> PicklistEntry {
        PicklistEntry {
            value: value.to_string(),
            label: Some(value.to_string()),
            active: true,
            default_value: false,
        }
    }

    #[test]
    fn test_extract_picklist_values_dedupes_and_escapes() {
        let entries = vec![
            entry("Prospect"),
            entry("Test's"),
            entry("Duplicate"),
            entry("Duplicate"),
        ];

        let values = extract_picklist_values(&entries);
        assert_eq!(values, vec!["Prospect", "Test\\'s", "Duplicate"]);
    }

    #[test]
    fn test_extract_picklist_values_is_idempotent() {
        let entries = vec![entry("A"), entry("It's"), entry("A"), entry("B")];
        let once = extract_picklist_values(&entries);
        assert_eq!(extract_picklist_values(&entries), once);
        assert_eq!(dedupe_values(once.clone()), once);
        assert_eq!(dedupe_values(dedupe_values(once.clone())), once);
    }

    #[test]
    fn test_extract_picklist_values_keeps_backslashes_distinct() {
        let entries = vec![entry("It's"), entry(r"It\'s"), entry(r"C:\")];
        let values = extract_picklist_values(&entries);
        assert_eq!(values, vec![r"It\'s", r"It\\\'s", r"C:\\"]);
    }

    #[test]
    fn test_read_only_and_audit_detection() {
        let mut field = RemoteFieldDescriptor::new("Total__c", "currency", 0);
        assert!(!is_read_only(&field));
        field.calculated = true;
        assert!(is_read_only(&field));

        let mut locked = RemoteFieldDescriptor::new("Locked__c", "string", 10);
        locked.updateable = false;
        locked.createable = false;
        assert!(is_read_only(&locked));

        assert!(is_audit_field("SystemModstamp"));
        assert!(!is_audit_field("Name"));
    }

    #[test]
    fn test_numeric_fields_carry_scale_and_precision() {
        let mut amount = RemoteFieldDescriptor::new("Amount", "currency", 0);
        amount.precision = Some(16);
        amount.scale = Some(2);
        let prefs = PreferenceSet::default();

        let fields = build_fields(&[amount], &prefs);
        let field = &fields["Amount"];
        assert_eq!(field.field_type, SemanticType::Decimal);
        assert_eq!(field.precision, Some(16));
        assert_eq!(field.scale, Some(2));
        assert_eq!(field.size, None);
    }

    #[test]
    fn test_all_text_override() {
        let prefs = PreferenceSet::default();
        let fields = SchemaBuilder::new(&prefs)
            .with_all_text(true)
            .build_fields(&[RemoteFieldDescriptor::new("Name", "string", 80)]);
        assert_eq!(fields["Name"].field_type, SemanticType::Text);
    }

    #[test]
    fn test_null_default_is_dropped() {
        let mut field = RemoteFieldDescriptor::new("Flag__c", "boolean", 0);
        field.default_value = Some(Value::Null);
        let fields = build_fields(&[field], &PreferenceSet::default());
        assert!(fields["Flag__c"].default.is_none());
    }
}
