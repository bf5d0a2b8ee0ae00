// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod build;
pub mod ddl;
pub mod objects;
pub mod preferences;
pub mod schema;

use crate::cli::OutputFormat;
use crate::core::response::Response;
use anyhow::{anyhow, Context, Result};

/// 応答エンベロープを出力形式に合わせて文字列化
///
/// JSON形式ではエンベロープをそのまま出力します。
/// テキスト形式では失敗をエラーとして返し、成功時のみ `text` で整形します。
pub(crate) fn render_response<F>(response: &Response, format: &OutputFormat, text: F) -> Result<String>
where
    F: FnOnce(&Response) -> String,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(response).with_context(|| "Failed to serialize response")
        }
        OutputFormat::Text if response.is_success() => Ok(text(response)),
        OutputFormat::Text => Err(match response.response.as_str() {
            Some(detail) => anyhow!("{}: {}", response.message, detail),
            None => anyhow!("{}", response.message),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json_keeps_envelope() {
        let response = Response::failure("Logout Failed", json!("not connected"), json!({"org": "x"}));
        let output = render_response(&response, &OutputFormat::Json, |_| String::new()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["status"], false);
        assert_eq!(parsed["request"]["org"], "x");
    }

    #[test]
    fn test_render_text_failure_is_error() {
        let response = Response::failure("Schema Load Failed", json!("bad json"), json!({}));
        let err = render_response(&response, &OutputFormat::Text, |_| String::new()).unwrap_err();
        assert_eq!(err.to_string(), "Schema Load Failed: bad json");
    }
}
