// DDLモデル
//
// 正規化スキーマから導出される、方言非依存の物理テーブル定義。
// SQLジェネレーターはこの定義だけを見てCREATE文を組み立てます。

use serde::{Deserialize, Serialize};

/// 物理カラム種別
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    /// 可変長文字列
    VarChar { length: u32 },
    /// 長文テキスト
    Text,
    Boolean,
    Integer,
    BigInteger,
    /// 固定小数点数
    Decimal { precision: u32, scale: u32 },
    /// 浮動小数点数
    Float { precision: u32, scale: u32 },
    Date,
    DateTime,
    Time,
    /// バイナリ
    Binary { length: u32 },
    /// 列挙値（値はバックスラッシュエスケープ済み）
    Enum { values: Vec<String> },
    /// 大文字小文字を区別する固定長ID
    Reference { length: u32 },
}

impl ColumnKind {
    /// 可変長文字列かどうか（行幅超過時の縮退対象）
    pub fn is_plain_string(&self) -> bool {
        matches!(self, ColumnKind::VarChar { .. })
    }

    /// 大きなオブジェクト型かどうか（TEXT/BLOB系）
    pub fn is_large_object(&self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Binary { .. })
    }
}

/// カラムのデフォルト値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// 文字列リテラル（バックスラッシュエスケープ済みの場合あり）
    Text(String),
    Boolean(bool),
    /// 数値リテラル
    Number(String),
}

/// カラム定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub kind: ColumnKind,
    pub default: Option<DefaultValue>,
}

impl ColumnDefinition {
    /// 新しいカラム定義を作成
    pub fn new(name: &str, kind: ColumnKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            default: None,
        }
    }

    /// デフォルト値を設定
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// インデックス定義（単一カラム）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub column: String,
}

/// テーブル定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    /// 新しいテーブル定義を作成
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// カラムを追加
    pub fn add_column(&mut self, column: ColumnDefinition) {
        self.columns.push(column);
    }

    /// インデックスを追加
    pub fn add_index(&mut self, index: IndexDefinition) {
        self.indexes.push(index);
    }
}
