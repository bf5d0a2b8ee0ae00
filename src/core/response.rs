// 応答エンベロープ
//
// 全操作が返す {status, message, response, request} 形式の構造体。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 操作結果の応答
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// 成功したかどうか
    pub status: bool,
    /// 人間向けのメッセージ
    pub message: String,
    /// 操作固有の結果
    pub response: Value,
    /// 入力の echo（認証情報は除去済み）
    pub request: Value,
}

impl Response {
    /// 成功応答を作成
    pub fn success(message: impl Into<String>, response: Value, request: Value) -> Self {
        Self {
            status: true,
            message: message.into(),
            response,
            request,
        }
    }

    /// 失敗応答を作成
    pub fn failure(message: impl Into<String>, response: Value, request: Value) -> Self {
        Self {
            status: false,
            message: message.into(),
            response,
            request,
        }
    }

    /// 成功したかどうか
    pub fn is_success(&self) -> bool {
        self.status
    }
}
