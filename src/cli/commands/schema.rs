// schemaコマンドハンドラー
//
// describe ファイルから正規化スキーマを構築し、JSONファイルとして保存します。
// 対象オブジェクトが指定されない場合は推奨オブジェクトを使います。

use crate::adapters::metadata_source::DescribeFileSource;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::objects::LOCAL_ORG;
use crate::cli::commands::render_response;
use crate::cli::OutputFormat;
use crate::core::response::Response;
use crate::services::session::Session;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// schemaコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct SchemaCommand {
    pub context: CommandContext,
    /// describe ファイル
    pub describes: PathBuf,
    /// 対象オブジェクト（空なら推奨オブジェクト）
    pub objects: Vec<String>,
    /// 保存先
    pub output: PathBuf,
    /// 全ての文字列をTEXTとして扱う
    pub all_text: bool,
    pub format: OutputFormat,
}

/// schemaコマンドハンドラー
#[derive(Debug, Default)]
pub struct SchemaCommandHandler {}

impl SchemaCommandHandler {
    /// 新しいSchemaCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// schemaコマンドを実行
    pub async fn execute(&self, command: &SchemaCommand) -> Result<String> {
        let context = &command.context;
        let source = DescribeFileSource::from_file(&context.resolve_path(&command.describes))?;
        let mut session = Session::new(context.load_preferences()).with_all_text(command.all_text);
        session.login(LOCAL_ORG, Arc::new(source));

        let objects = if command.objects.is_empty() {
            self.recommended_objects(&session).await?
        } else {
            command.objects.clone()
        };
        info!(objects = objects.len(), "Building schema");

        let built = session.build_schema(LOCAL_ORG, &objects).await;
        if !built.is_success() {
            return render_response(&built, &command.format, |_| String::new());
        }

        let saved = session.save_schema(&context.resolve_path(&command.output));
        match command.format {
            // 構築結果と保存結果をまとめて1つのエンベロープにする
            OutputFormat::Json if saved.is_success() => {
                let mut combined = built.clone();
                combined.message = saved.message.clone();
                combined.response["path"] = saved.response["path"].clone();
                render_response(&combined, &command.format, |_| String::new())
            }
            _ => render_response(&saved, &command.format, |r| self.format_summary(&built, r)),
        }
    }

    async fn recommended_objects(&self, session: &Session) -> Result<Vec<String>> {
        let listed = session.list_objects(LOCAL_ORG).await;
        if !listed.is_success() {
            return Err(anyhow!("{}", listed.message));
        }

        let recommended: Vec<String> = listed.response["recommended"]
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        if recommended.is_empty() {
            return Err(anyhow!("No recommended objects found; pass --objects explicitly"));
        }
        Ok(recommended)
    }

    fn format_summary(&self, built: &Response, saved: &Response) -> String {
        let tables = built.response["objects"].as_array().map_or(0, Vec::len);
        let skipped: Vec<&str> = built.response["skipped"]
            .as_array()
            .map(|values| values.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();

        let mut output = format!(
            "{} {} table(s) written to {}",
            "✓".green(),
            tables,
            saved.response["path"].as_str().unwrap_or_default()
        );
        if !skipped.is_empty() {
            output.push_str(&format!(
                "\n{} skipped: {}",
                "!".yellow(),
                skipped.join(", ")
            ));
        }
        output
    }
}
