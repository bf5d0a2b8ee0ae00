// スキーマシリアライザーサービス
//
// NormalizedSchema をJSONファイルへ保存・読み込みするサービス。
// 読み込み時は正規化スキーマの不変条件を検証し、違反があれば採用しません。

use crate::core::error::{IoError, SchemaFileError};
use crate::core::field_type::SemanticType;
use crate::core::schema::{NormalizedField, NormalizedSchema};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 識別子として妥当な名前かどうか
fn is_identifier(name: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// スキーマシリアライザーサービス
#[derive(Debug, Clone, Default)]
pub struct SchemaSerializerService;

impl SchemaSerializerService {
    /// 新しいSchemaSerializerServiceを作成
    pub fn new() -> Self {
        Self
    }

    /// 保存先のパスを正規化（拡張子 .json を補う）
    pub fn normalize_path(&self, path: &Path) -> PathBuf {
        let has_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if has_json {
            path.to_path_buf()
        } else {
            let mut file_name = path.as_os_str().to_owned();
            file_name.push(".json");
            PathBuf::from(file_name)
        }
    }

    /// スキーマをJSON文字列にシリアライズ
    pub fn serialize_to_string(&self, schema: &NormalizedSchema) -> Result<String, SchemaFileError> {
        serde_json::to_string_pretty(schema).map_err(|e| SchemaFileError::Parse {
            path: "<memory>".to_string(),
            cause: e.to_string(),
        })
    }

    /// スキーマをJSONファイルへ保存
    ///
    /// # Returns
    ///
    /// 実際に書き込んだファイルパス
    pub fn save(&self, schema: &NormalizedSchema, path: &Path) -> Result<PathBuf, SchemaFileError> {
        let path = self.normalize_path(path);
        let json = self.serialize_to_string(schema)?;
        fs::write(&path, json).map_err(|e| IoError::FileWrite {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;
        Ok(path)
    }

    /// JSON文字列からスキーマを復元して検証
    pub fn parse(&self, json: &str, origin: &str) -> Result<NormalizedSchema, SchemaFileError> {
        let schema: NormalizedSchema =
            serde_json::from_str(json).map_err(|e| SchemaFileError::Parse {
                path: origin.to_string(),
                cause: e.to_string(),
            })?;
        self.validate(&schema)?;
        Ok(schema)
    }

    /// JSONファイルからスキーマを読み込む
    pub fn load(&self, path: &Path) -> Result<NormalizedSchema, SchemaFileError> {
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let json = fs::read_to_string(path).map_err(|e| IoError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        self.parse(&json, &path.display().to_string())
    }

    /// 正規化スキーマの不変条件を検証
    pub fn validate(&self, schema: &NormalizedSchema) -> Result<(), SchemaFileError> {
        for (table, fields) in schema.tables() {
            if !is_identifier(table) {
                return Err(invalid(table, None, "table name is not a valid identifier"));
            }

            for (key, field) in fields {
                validate_field(table, key, field)?;
            }
        }
        Ok(())
    }
}

fn invalid(table: &str, field: Option<&str>, reason: &str) -> SchemaFileError {
    SchemaFileError::Invalid {
        table: table.to_string(),
        field: field.map(str::to_string),
        reason: reason.to_string(),
    }
}

fn validate_field(table: &str, key: &str, field: &NormalizedField) -> Result<(), SchemaFileError> {
    if key != field.name {
        return Err(invalid(table, Some(key), "map key does not match field name"));
    }
    if !is_identifier(&field.name) {
        return Err(invalid(table, Some(key), "field name is not a valid identifier"));
    }
    if field.field_type.requires_size() && field.size.unwrap_or(0) == 0 {
        return Err(invalid(table, Some(key), "sized field without size"));
    }
    if field.field_type.is_numeric_with_scale()
        && (field.precision.is_none() || field.scale.is_none())
    {
        return Err(invalid(table, Some(key), "numeric field without precision/scale"));
    }
    if field.field_type == SemanticType::Enum {
        let mut seen = HashSet::new();
        if !field.values.iter().all(|value| seen.insert(value)) {
            return Err(invalid(table, Some(key), "duplicate enum values"));
        }
    }
    // 参照先はカラム定義に影響しないため、空（参照先オブジェクトにアクセス権がない場合）も許容する
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_appends_extension() {
        let service = SchemaSerializerService::new();
        assert_eq!(
            service.normalize_path(Path::new("/tmp/schema")),
            PathBuf::from("/tmp/schema.json")
        );
        assert_eq!(
            service.normalize_path(Path::new("/tmp/schema.JSON")),
            PathBuf::from("/tmp/schema.JSON")
        );
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let service = SchemaSerializerService::new();
        let result = service.parse("{\"Account\": [", "inline");
        assert!(result.unwrap_err().is_parse());
    }

    #[test]
    fn test_validate_rejects_key_mismatch() {
        let json = r#"{"Account": {"Name": {"name": "Other", "type": "text"}}}"#;
        let result = SchemaSerializerService::new().parse(json, "inline");
        assert!(result.unwrap_err().is_invalid());
    }

    #[test]
    fn test_validate_rejects_string_without_size() {
        let json = r#"{"Account": {"Name": {"name": "Name", "type": "string"}}}"#;
        let err = SchemaSerializerService::new()
            .parse(json, "inline")
            .unwrap_err();
        assert!(err.to_string().contains("sized field without size"));
    }

    #[test]
    fn test_validate_rejects_duplicate_enum_values() {
        let json = r#"{"Lead": {"Status": {"name": "Status", "type": "enum", "values": ["A", "A"]}}}"#;
        assert!(SchemaSerializerService::new().parse(json, "inline").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SchemaSerializerService::new()
            .load(Path::new("/definitely/not/here.json"))
            .unwrap_err();
        assert!(matches!(err, SchemaFileError::Io(IoError::FileNotFound { .. })));
    }
}
