// objectsコマンドハンドラー
//
// describe ファイルから作成可能なオブジェクトを一覧表示し、
// 検出した組織機能にもとづく推奨オブジェクトを示します。

use crate::adapters::metadata_source::DescribeFileSource;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::render_response;
use crate::cli::OutputFormat;
use crate::core::response::Response;
use crate::services::session::Session;
use anyhow::Result;
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// 内部で使う組織ID
pub(crate) const LOCAL_ORG: &str = "local";

/// objectsコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ObjectsCommand {
    pub context: CommandContext,
    /// describe ファイル
    pub describes: PathBuf,
    /// 推奨オブジェクトのみを表示
    pub recommended_only: bool,
    pub format: OutputFormat,
}

/// objectsコマンドハンドラー
#[derive(Debug, Default)]
pub struct ObjectsCommandHandler {}

impl ObjectsCommandHandler {
    /// 新しいObjectsCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// objectsコマンドを実行
    pub async fn execute(&self, command: &ObjectsCommand) -> Result<String> {
        let source = DescribeFileSource::from_file(&command.context.resolve_path(&command.describes))?;
        let mut session = Session::new(command.context.load_preferences());
        session.login(LOCAL_ORG, Arc::new(source));

        let response = session.list_objects(LOCAL_ORG).await;
        render_response(&response, &command.format, |r| {
            self.format_objects(r, command.recommended_only)
        })
    }

    fn format_objects(&self, response: &Response, recommended_only: bool) -> String {
        let recommended: Vec<&str> = response.response["recommended"]
            .as_array()
            .map(|values| values.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let mut output = String::new();
        if let Some(features) = response.response["features"].as_array() {
            let features: Vec<&str> = features.iter().filter_map(|v| v.as_str()).collect();
            let _ = writeln!(output, "{} {}", "Detected features:".bold(), features.join(", "));
        }

        let objects = response.response["sobjects"].as_array().cloned().unwrap_or_default();
        let mut listed = 0;
        for object in &objects {
            let name = object["name"].as_str().unwrap_or_default();
            let label = object["label"].as_str().unwrap_or_default();
            let is_recommended = recommended.contains(&name);
            if recommended_only && !is_recommended {
                continue;
            }

            listed += 1;
            if is_recommended {
                let _ = writeln!(output, "  {} {} ({})", "*".green(), name.green(), label);
            } else {
                let _ = writeln!(output, "    {} ({})", name, label);
            }
        }

        let _ = write!(
            output,
            "{} object(s) listed, {} recommended",
            listed,
            recommended.len()
        );
        output
    }
}
