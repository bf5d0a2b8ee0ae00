// フィールド型リゾルバー
//
// リモートのフィールド型タグ（"picklist", "reference" など）を
// リレーショナルなカラム種別（SemanticType）へ変換する純粋関数を提供します。

use crate::core::preferences::{LookupType, PicklistType, PreferenceSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// カラムの意味的な型
///
/// 正規化スキーマ内の全フィールドはこの閉じた集合のいずれかに解決されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    String,
    Text,
    Boolean,
    Integer,
    BigInteger,
    Decimal,
    Float,
    Date,
    DateTime,
    Time,
    Binary,
    Enum,
    Reference,
}

impl SemanticType {
    /// サイズ指定が必須の型かどうか
    pub fn requires_size(&self) -> bool {
        matches!(self, SemanticType::String | SemanticType::Binary)
    }

    /// 精度・スケール指定を持つ数値型かどうか
    pub fn is_numeric_with_scale(&self) -> bool {
        matches!(self, SemanticType::Decimal | SemanticType::Float)
    }

    /// 文字列系の型かどうか（デフォルト値の空文字列補完の対象）
    pub fn is_textual(&self) -> bool {
        matches!(self, SemanticType::String | SemanticType::Text)
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::String => "string",
            SemanticType::Text => "text",
            SemanticType::Boolean => "boolean",
            SemanticType::Integer => "integer",
            SemanticType::BigInteger => "biginteger",
            SemanticType::Decimal => "decimal",
            SemanticType::Float => "float",
            SemanticType::Date => "date",
            SemanticType::DateTime => "datetime",
            SemanticType::Time => "time",
            SemanticType::Binary => "binary",
            SemanticType::Enum => "enum",
            SemanticType::Reference => "reference",
        };
        write!(f, "{}", name)
    }
}

/// リモートのフィールド型タグ
///
/// 未知のタグは `Unrecognized` として保持し、解決時に Text へ落とします。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteFieldType {
    Base64,
    Boolean,
    Byte,
    Calculated,
    ComboBox,
    Currency,
    Date,
    DateTime,
    Double,
    Email,
    EncryptedString,
    Id,
    Int,
    Long,
    MasterRecord,
    MultiPicklist,
    Percent,
    Phone,
    Picklist,
    Reference,
    String,
    TextArea,
    Time,
    Url,
    Unrecognized(String),
}

/// 基本マッピング表（タグ, 意味型）
pub const BASE_TYPE_TABLE: &[(&str, SemanticType)] = &[
    ("base64", SemanticType::Binary),
    ("boolean", SemanticType::Boolean),
    ("byte", SemanticType::Binary),
    ("calculated", SemanticType::String),
    ("comboBox", SemanticType::String),
    ("currency", SemanticType::Decimal),
    ("date", SemanticType::Date),
    ("datetime", SemanticType::DateTime),
    ("double", SemanticType::Float),
    ("email", SemanticType::String),
    ("encryptedstring", SemanticType::String),
    ("id", SemanticType::String),
    ("int", SemanticType::Integer),
    ("long", SemanticType::BigInteger),
    ("masterrecord", SemanticType::String),
    ("multipicklist", SemanticType::String),
    ("percent", SemanticType::Decimal),
    ("phone", SemanticType::String),
    ("picklist", SemanticType::Enum),
    ("reference", SemanticType::Reference),
    ("string", SemanticType::String),
    ("textarea", SemanticType::Text),
    ("time", SemanticType::Time),
    ("url", SemanticType::String),
];

impl RemoteFieldType {
    /// タグ文字列から型を判定
    pub fn parse(tag: &str) -> Self {
        match tag {
            "base64" => RemoteFieldType::Base64,
            "boolean" => RemoteFieldType::Boolean,
            "byte" => RemoteFieldType::Byte,
            "calculated" => RemoteFieldType::Calculated,
            "comboBox" => RemoteFieldType::ComboBox,
            "currency" => RemoteFieldType::Currency,
            "date" => RemoteFieldType::Date,
            "datetime" => RemoteFieldType::DateTime,
            "double" => RemoteFieldType::Double,
            "email" => RemoteFieldType::Email,
            "encryptedstring" => RemoteFieldType::EncryptedString,
            "id" => RemoteFieldType::Id,
            "int" => RemoteFieldType::Int,
            "long" => RemoteFieldType::Long,
            "masterrecord" => RemoteFieldType::MasterRecord,
            "multipicklist" => RemoteFieldType::MultiPicklist,
            "percent" => RemoteFieldType::Percent,
            "phone" => RemoteFieldType::Phone,
            "picklist" => RemoteFieldType::Picklist,
            "reference" => RemoteFieldType::Reference,
            "string" => RemoteFieldType::String,
            "textarea" => RemoteFieldType::TextArea,
            "time" => RemoteFieldType::Time,
            "url" => RemoteFieldType::Url,
            other => RemoteFieldType::Unrecognized(other.to_string()),
        }
    }

    /// 設定に依存しない基本の意味型
    ///
    /// `BASE_TYPE_TABLE` から引き、表にない型は Text とします。
    pub fn base_type(&self) -> SemanticType {
        BASE_TYPE_TABLE
            .iter()
            .find(|(tag, _)| RemoteFieldType::parse(tag) == *self)
            .map(|(_, semantic)| *semantic)
            .unwrap_or(SemanticType::Text)
    }

    /// 主キー（レコードID）型かどうか
    pub fn is_primary_id(&self) -> bool {
        matches!(self, RemoteFieldType::Id)
    }

    /// 未知のタグかどうか
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, RemoteFieldType::Unrecognized(_))
    }
}

/// 意味型に設定による上書きを適用
///
/// 選択リストが enum 指定でなければ string へ、
/// 参照が固定長ID指定でなければ string へ縮退します。
pub fn apply_preferences(base: SemanticType, preferences: &PreferenceSet) -> SemanticType {
    match base {
        SemanticType::Enum if preferences.picklists.picklist_type != PicklistType::Enum => {
            SemanticType::String
        }
        SemanticType::Reference if preferences.lookups.lookup_type != LookupType::FixedId => {
            SemanticType::String
        }
        other => other,
    }
}

/// リモート型タグを意味型へ解決
///
/// 状態を持たない全域関数なので、同期なしで並行に呼び出せます。
pub fn resolve(raw_type: &str, preferences: &PreferenceSet) -> SemanticType {
    apply_preferences(RemoteFieldType::parse(raw_type).base_type(), preferences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_matches_base_table_with_defaults() {
        let prefs = PreferenceSet::default();
        for (tag, expected) in BASE_TYPE_TABLE {
            assert_eq!(resolve(tag, &prefs), *expected, "tag: {}", tag);
        }
    }

    #[test]
    fn test_every_known_variant_has_table_entry() {
        for (tag, expected) in BASE_TYPE_TABLE {
            let parsed = RemoteFieldType::parse(tag);
            assert!(!parsed.is_unrecognized(), "tag: {}", tag);
            assert_eq!(parsed.base_type(), *expected, "tag: {}", tag);
        }
        assert_eq!(
            RemoteFieldType::Unrecognized("address".to_string()).base_type(),
            SemanticType::Text
        );
    }

    #[test]
    fn test_unknown_type_falls_back_to_text() {
        let prefs = PreferenceSet::default();
        assert_eq!(resolve("address", &prefs), SemanticType::Text);
        assert_eq!(resolve("", &prefs), SemanticType::Text);
        assert!(RemoteFieldType::parse("anyType").is_unrecognized());
    }

    #[test]
    fn test_overrides_only_touch_picklist_and_reference() {
        let defaults = PreferenceSet::default();
        let mut prefs = PreferenceSet::default();
        prefs.picklists.picklist_type = PicklistType::String;
        prefs.lookups.lookup_type = LookupType::VarChar;

        for (tag, _) in BASE_TYPE_TABLE {
            let before = resolve(tag, &defaults);
            let after = resolve(tag, &prefs);
            match *tag {
                "picklist" | "reference" => assert_eq!(after, SemanticType::String),
                _ => assert_eq!(before, after, "tag: {}", tag),
            }
        }
    }

    #[test]
    fn test_semantic_type_serde_names() {
        let json = serde_json::to_string(&SemanticType::BigInteger).unwrap();
        assert_eq!(json, "\"biginteger\"");
        let parsed: SemanticType = serde_json::from_str("\"datetime\"").unwrap();
        assert_eq!(parsed, SemanticType::DateTime);
        assert_eq!(SemanticType::Reference.to_string(), "reference");
    }
}
