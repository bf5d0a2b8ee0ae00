// スキーマドメインモデル
//
// リモートの describe 応答（入力）と、そこから導出される正規化スキーマ（出力）を表現する型システム。
// NormalizedSchema はテーブル・フィールドとも挿入順を保持し、DDL出力の順序を決定的にします。

use crate::core::field_type::SemanticType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 選択リストの値エントリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PicklistEntry {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub default_value: bool,
}

fn default_true() -> bool {
    true
}

/// リモートフィールド記述子
///
/// describe 応答のフィールド1件分。読み込み後は不変として扱います。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFieldDescriptor {
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// リモート型タグ
    #[serde(rename = "type")]
    pub raw_type: String,
    /// 宣言長
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub scale: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub default_value: Option<Value>,
    /// 参照先オブジェクト名（参照型のみ）
    #[serde(default)]
    pub reference_to: Vec<String>,
    /// 選択リストの値（列挙型のみ）
    #[serde(default)]
    pub picklist_values: Vec<PicklistEntry>,
    #[serde(default)]
    pub calculated: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub external_id: bool,
    #[serde(default)]
    pub restricted_picklist: bool,
}

impl RemoteFieldDescriptor {
    /// 最小限の属性で記述子を作成（書き込み可能なフィールドとして扱う）
    pub fn new(name: &str, raw_type: &str, length: u32) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            raw_type: raw_type.to_string(),
            length,
            scale: None,
            precision: None,
            default_value: None,
            reference_to: Vec::new(),
            picklist_values: Vec::new(),
            calculated: false,
            updateable: true,
            createable: true,
            external_id: false,
            restricted_picklist: false,
        }
    }
}

/// オブジェクトの describe 応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescribe {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_true")]
    pub createable: bool,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub fields: Vec<RemoteFieldDescriptor>,
}

impl ObjectDescribe {
    /// describe_global 用の概要を取得
    pub fn summary(&self) -> ObjectSummary {
        ObjectSummary {
            name: self.name.clone(),
            label: self.label.clone(),
            createable: self.createable,
            custom: self.custom,
        }
    }
}

/// describe_global の1エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub custom: bool,
}

/// 正規化フィールド
///
/// 1カラム分の定義。インデックス有無は設定に依存するため保持せず、実体化時に算出します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedField {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: SemanticType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// 列挙値（重複なし・初出順）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// 参照先オブジェクト名
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub external_id: bool,
    /// 制限付き選択リストかどうか
    #[serde(default)]
    pub restricted: bool,
}

impl NormalizedField {
    /// 新しいフィールドを作成
    pub fn new(name: &str, field_type: SemanticType) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            field_type,
            size: None,
            scale: None,
            precision: None,
            values: Vec::new(),
            target: Vec::new(),
            default: None,
            external_id: false,
            restricted: false,
        }
    }

    /// サイズ付きのフィールドを作成
    pub fn with_size(name: &str, field_type: SemanticType, size: u32) -> Self {
        let mut field = Self::new(name, field_type);
        field.size = Some(size);
        field
    }

    /// 列挙型のフィールドを作成
    pub fn enumeration(name: &str, values: &[&str]) -> Self {
        let mut field = Self::new(name, SemanticType::Enum);
        field.values = values.iter().map(|v| v.to_string()).collect();
        field
    }
}

/// テーブル1つ分のフィールド集合（フィールド名 -> NormalizedField）
pub type TableFields = IndexMap<String, NormalizedField>;

/// 正規化スキーマ
///
/// テーブル名（オブジェクトAPI名）からフィールド集合へのマップ。
/// セッションが明示的な値として所有し、マテリアライザーへ引き渡します。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedSchema {
    tables: IndexMap<String, TableFields>,
}

impl NormalizedSchema {
    /// 空のスキーマを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// テーブルを追加（同名テーブルは置き換え）
    pub fn insert_table(&mut self, name: String, fields: TableFields) {
        self.tables.insert(name, fields);
    }

    /// 指定されたテーブルを取得
    pub fn table(&self, name: &str) -> Option<&TableFields> {
        self.tables.get(name)
    }

    /// 指定されたテーブルが存在するか確認
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// テーブルを挿入順に走査
    pub fn tables(&self) -> impl Iterator<Item = (&String, &TableFields)> {
        self.tables.iter()
    }

    /// テーブル名を挿入順に取得
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// テーブル数を取得
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// テーブルが1つもないか
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
