// ddlコマンドハンドラー
//
// 保存済みスキーマを読み込み、指定方言のDDL文をファイルまたは標準出力へ書き出します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::render_response;
use crate::cli::{ConnectionArgs, OutputFormat};
use crate::services::session::Session;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

/// ddlコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct DdlCommand {
    pub context: CommandContext,
    /// 保存済みスキーマ
    pub schema: PathBuf,
    /// 出力ファイル（Noneなら標準出力）
    pub output: Option<PathBuf>,
    pub connection: ConnectionArgs,
    pub format: OutputFormat,
}

/// ddlコマンドハンドラー
#[derive(Debug, Default)]
pub struct DdlCommandHandler {}

impl DdlCommandHandler {
    /// 新しいDdlCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// ddlコマンドを実行
    ///
    /// # Returns
    ///
    /// 出力先がファイルなら結果のサマリー、標準出力ならDDLテキスト
    pub fn execute(&self, command: &DdlCommand) -> Result<String> {
        let context = &command.context;
        let settings = context.connection_settings(&command.connection)?;
        let mut session = Session::new(context.load_preferences());

        let loaded = session.load_schema(&context.resolve_path(&command.schema));
        if !loaded.is_success() {
            return render_response(&loaded, &command.format, |_| String::new());
        }

        match &command.output {
            Some(output) => {
                let saved = session.save_ddl(&context.resolve_path(output), &settings);
                render_response(&saved, &command.format, |r| {
                    format!(
                        "{} {} statement(s) written to {}",
                        "✓".green(),
                        r.response["statements"].as_u64().unwrap_or_default(),
                        r.response["path"].as_str().unwrap_or_default()
                    )
                })
            }
            None => {
                let mut buffer = Vec::new();
                session
                    .export_ddl(&settings, &mut buffer)
                    .with_context(|| "Failed to render DDL")?;
                let ddl = String::from_utf8(buffer).with_context(|| "DDL is not valid UTF-8")?;
                Ok(ddl.trim_end().to_string())
            }
        }
    }
}
