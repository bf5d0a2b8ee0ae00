// メタデータソースアダプター
//
// リモートのオブジェクト一覧（describe_global）とオブジェクト定義（describe）を提供する
// インターフェースと、describe 応答をまとめたJSONファイルによる実装。

use crate::core::error::{IoError, RemoteError, SchemaFileError};
use crate::core::schema::{ObjectDescribe, ObjectSummary};
use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// メタデータソーストレイト
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// オブジェクト一覧を取得
    async fn describe_global(&self) -> Result<Vec<ObjectSummary>, RemoteError>;

    /// オブジェクトの定義を取得
    async fn describe(&self, object: &str) -> Result<ObjectDescribe, RemoteError>;
}

/// describe 応答ファイルによるメタデータソース
///
/// ファイルはオブジェクトAPI名をキーとし、describe 応答をそのまま値とするJSONオブジェクトです。
#[derive(Debug, Clone, Default)]
pub struct DescribeFileSource {
    describes: IndexMap<String, ObjectDescribe>,
}

impl DescribeFileSource {
    /// describe の集合から作成
    pub fn new(describes: IndexMap<String, ObjectDescribe>) -> Self {
        Self { describes }
    }

    /// JSON文字列から作成
    pub fn from_json(json: &str, origin: &str) -> Result<Self, SchemaFileError> {
        let describes = serde_json::from_str(json).map_err(|e| SchemaFileError::Parse {
            path: origin.to_string(),
            cause: e.to_string(),
        })?;
        Ok(Self::new(describes))
    }

    /// JSONファイルから読み込む
    pub fn from_file(path: &Path) -> Result<Self, SchemaFileError> {
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
        let source = Self::from_json(&json, &path.display().to_string())?;
        debug!(path = %path.display(), objects = source.len(), "Loaded describe file");
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.describes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.describes.is_empty()
    }
}

#[async_trait]
impl MetadataSource for DescribeFileSource {
    async fn describe_global(&self) -> Result<Vec<ObjectSummary>, RemoteError> {
        Ok(self.describes.values().map(ObjectDescribe::summary).collect())
    }

    async fn describe(&self, object: &str) -> Result<ObjectDescribe, RemoteError> {
        self.describes
            .get(object)
            .cloned()
            .ok_or_else(|| RemoteError::Describe {
                object: object.to_string(),
                cause: "object not found in describe file".to_string(),
            })
    }
}

/// 複数オブジェクトの describe を並行して取得
///
/// 失敗したオブジェクトはログに残して読み飛ばし、残りの取得を続けます。
/// 結果は要求された順序（重複は除去）を保持します。
pub async fn fetch_describes(
    source: Arc<dyn MetadataSource>,
    objects: &[String],
) -> IndexMap<String, ObjectDescribe> {
    let requested: IndexSet<String> = objects.iter().cloned().collect();

    let mut join_set = JoinSet::new();
    for object in requested.iter().cloned() {
        let source = Arc::clone(&source);
        join_set.spawn(async move {
            let result = source.describe(&object).await;
            (object, result)
        });
    }

    let mut fetched = HashMap::with_capacity(requested.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((object, Ok(describe))) => {
                fetched.insert(object, describe);
            }
            Ok((object, Err(e))) => {
                warn!(object = %object, error = %e, "Skipping object whose describe failed");
            }
            Err(e) => warn!(error = %e, "Describe task aborted"),
        }
    }

    requested
        .into_iter()
        .filter_map(|object| fetched.remove(&object).map(|describe| (object, describe)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::RemoteFieldDescriptor;

    fn describe(name: &str) -> ObjectDescribe {
        ObjectDescribe {
            name: name.to_string(),
            label: name.to_string(),
            createable: true,
            custom: name.ends_with("__c"),
            fields: vec![RemoteFieldDescriptor::new("Id", "id", 18)],
        }
    }

    fn source(names: &[&str]) -> Arc<dyn MetadataSource> {
        Arc::new(DescribeFileSource::new(
            names.iter().map(|n| (n.to_string(), describe(n))).collect(),
        ))
    }

    #[tokio::test]
    async fn test_describe_global_lists_summaries() {
        let summaries = source(&["Account", "Thing__c"]).describe_global().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[1].custom);
    }

    #[tokio::test]
    async fn test_describe_unknown_object() {
        let err = source(&["Account"]).describe("Nope").await.unwrap_err();
        assert!(err.is_describe());
    }

    #[tokio::test]
    async fn test_fetch_describes_skips_failures_and_keeps_order() {
        let requested = vec![
            "Contact".to_string(),
            "Missing".to_string(),
            "Account".to_string(),
            "Contact".to_string(),
        ];
        let fetched = fetch_describes(source(&["Account", "Contact"]), &requested).await;
        assert_eq!(fetched.keys().collect::<Vec<_>>(), vec!["Contact", "Account"]);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = DescribeFileSource::from_json("[1, 2", "inline").unwrap_err();
        assert!(err.is_parse());
    }
}
