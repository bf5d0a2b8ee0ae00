// 設定（プリファレンス）管理
//
// スキーマ構築とDDL生成の方針を決める設定セットを表現します。
// JSONファイルとして保存され、既知のトップレベルキーだけがデフォルト値に上書きマージされます。

use crate::core::error::IoError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// 選択リストの表現方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PicklistType {
    /// ENUM（またはCHECK制約付きTEXT）カラム
    Enum,
    /// 自由形式の文字列カラム
    String,
}

impl From<String> for PicklistType {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("enum") {
            PicklistType::Enum
        } else {
            PicklistType::String
        }
    }
}

impl From<PicklistType> for String {
    fn from(value: PicklistType) -> Self {
        match value {
            PicklistType::Enum => "enum".to_string(),
            PicklistType::String => "string".to_string(),
        }
    }
}

/// 参照（ルックアップ）カラムの表現方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LookupType {
    /// 固定長ID（char(18)）
    FixedId,
    /// 可変長文字列（varchar(255)）
    VarChar,
}

impl LookupType {
    /// 固定長IDの桁数
    pub const FIXED_ID_LENGTH: u32 = 18;
}

impl From<String> for LookupType {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("char(18)") {
            LookupType::FixedId
        } else {
            LookupType::VarChar
        }
    }
}

impl From<LookupType> for String {
    fn from(value: LookupType) -> Self {
        match value {
            LookupType::FixedId => "char(18)".to_string(),
            LookupType::VarChar => "varchar(255)".to_string(),
        }
    }
}

/// インデックス作成方針
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexPreferences {
    /// 参照カラムにインデックスを作成
    pub lookups: bool,
    /// 選択リストカラムにインデックスを作成
    pub picklists: bool,
    /// 外部IDカラムにインデックスを作成
    pub external_ids: bool,
}

impl Default for IndexPreferences {
    fn default() -> Self {
        Self {
            lookups: true,
            picklists: true,
            external_ids: true,
        }
    }
}

/// 選択リストの表現方針
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PicklistPreferences {
    #[serde(rename = "type")]
    pub picklist_type: PicklistType,
    /// 制限なし選択リストを自由形式の string(255) として扱う
    pub unrestricted: bool,
    /// ENUMの値集合に空文字列を必ず含める
    pub ensure_blanks: bool,
}

impl Default for PicklistPreferences {
    fn default() -> Self {
        Self {
            picklist_type: PicklistType::Enum,
            unrestricted: true,
            ensure_blanks: true,
        }
    }
}

/// 参照カラムの表現方針
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupPreferences {
    #[serde(rename = "type")]
    pub lookup_type: LookupType,
}

impl Default for LookupPreferences {
    fn default() -> Self {
        Self {
            lookup_type: LookupType::FixedId,
        }
    }
}

/// デフォルト値とフィールド取捨の方針
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DefaultPreferences {
    /// リモートのデフォルト値をDDLへ反映する
    #[serde(rename = "attemptSFValues")]
    pub attempt_remote_values: bool,
    /// NULLの文字列デフォルトを空文字列にする
    pub text_empty_string: bool,
    /// NULLの真偽値デフォルトをfalseにする
    pub checkbox_default_false: bool,
    /// 読み取り専用フィールドを除外する
    pub suppress_read_only: bool,
    /// 監査フィールドを除外する
    pub suppress_audit: bool,
}

impl Default for DefaultPreferences {
    fn default() -> Self {
        Self {
            attempt_remote_values: false,
            text_empty_string: false,
            checkbox_default_false: true,
            suppress_read_only: false,
            suppress_audit: false,
        }
    }
}

/// 設定セット
///
/// 1回のビルド呼び出しの間は不変として扱います。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSet {
    pub theme: String,
    pub indexes: IndexPreferences,
    pub picklists: PicklistPreferences,
    pub lookups: LookupPreferences,
    pub defaults: DefaultPreferences,
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            theme: "Cyborg".to_string(),
            indexes: IndexPreferences::default(),
            picklists: PicklistPreferences::default(),
            lookups: LookupPreferences::default(),
            defaults: DefaultPreferences::default(),
        }
    }
}

impl PreferenceSet {
    /// 設定ファイルを読み込む
    ///
    /// ファイルが存在しない、または解析できない場合はデフォルト値を返します。
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Preferences file unavailable, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<PreferenceSet>(&content) {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Preferences file is malformed, using defaults");
                Self::default()
            }
        }
    }

    /// 設定ファイルへ保存
    pub fn save(&self, path: &Path) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| IoError::FileWrite {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        fs::write(path, json).map_err(|e| IoError::FileWrite {
            path: path.display().to_string(),
            cause: e.to_string(),
        })
    }
}
