// buildコマンドハンドラー
//
// 保存済みスキーマを読み込み、ライブデータベースにテーブルを作成します。
// - 接続確認に失敗した場合はテーブルを1つも作成しない
// - テーブルごとの完了をプログレスバーで表示
// - 最後にテーブルごとの結果を一覧表示

use crate::adapters::materializer::{BuildEvent, BuildReport, TableStatus};
use crate::cli::command_context::CommandContext;
use crate::cli::commands::render_response;
use crate::cli::{ConnectionArgs, OutputFormat};
use crate::core::response::Response;
use crate::services::session::Session;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

/// buildコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct BuildCommand {
    pub context: CommandContext,
    /// 保存済みスキーマ
    pub schema: PathBuf,
    pub connection: ConnectionArgs,
    pub format: OutputFormat,
}

/// buildコマンドハンドラー
#[derive(Debug, Default)]
pub struct BuildCommandHandler {}

impl BuildCommandHandler {
    /// 新しいBuildCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// buildコマンドを実行
    ///
    /// # Arguments
    ///
    /// * `command` - buildコマンドのパラメータ
    ///
    /// # Returns
    ///
    /// 成功時はテーブルごとの結果、失敗時はエラーメッセージ
    pub async fn execute(&self, command: &BuildCommand) -> Result<String> {
        let context = &command.context;
        let settings = context.connection_settings(&command.connection)?;
        let mut session = Session::new(context.load_preferences());

        let loaded = session.load_schema(&context.resolve_path(&command.schema));
        if !loaded.is_success() {
            return render_response(&loaded, &command.format, |_| String::new());
        }

        let progress = match command.format {
            OutputFormat::Text => ProgressBar::new(0),
            OutputFormat::Json => ProgressBar::hidden(),
        };
        progress.set_style(progress_style());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let build = session.build_database(&settings, Some(tx));
        let watch = async {
            while let Some(event) = rx.recv().await {
                debug!(event = %event.message(), "Build progress");
                match event {
                    BuildEvent::Progress {
                        completed,
                        total,
                        table,
                        ..
                    } => {
                        progress.set_length(total as u64);
                        progress.set_position(completed as u64);
                        progress.set_message(table);
                    }
                    BuildEvent::Completed(_) => progress.finish_and_clear(),
                }
            }
        };
        let (response, ()) = tokio::join!(build, watch);
        progress.finish_and_clear();

        // 一部のテーブルが失敗した場合もテキストでは結果一覧を表示する
        if command.format == OutputFormat::Text && response.response.get("tables").is_some() {
            let report: BuildReport = serde_json::from_value(response.response.clone())?;
            let summary = self.format_report(&report);
            if response.is_success() {
                return Ok(summary);
            }
            return Err(anyhow::anyhow!("{}\n{}", summary, response.message));
        }

        render_response(&response, &command.format, |r: &Response| r.message.clone())
    }

    fn format_report(&self, report: &BuildReport) -> String {
        let mut output = String::new();
        for (table, status) in &report.tables {
            let line = match status {
                TableStatus::Succeeded => format!("  {} {}", "✓".green(), table),
                TableStatus::Degraded {
                    converted_columns, ..
                } => format!(
                    "  {} {} (converted to text: {})",
                    "✓".yellow(),
                    table,
                    converted_columns.join(", ")
                ),
                TableStatus::PartialIndexes { missing_indexes } => format!(
                    "  {} {} (missing indexes: {})",
                    "✓".yellow(),
                    table,
                    missing_indexes.join(", ")
                ),
                TableStatus::Failed { code, message, .. } => format!(
                    "  {} {} [{}] {}",
                    "✗".red(),
                    table,
                    code.as_deref().unwrap_or("-"),
                    message
                ),
            };
            let _ = writeln!(output, "{}", line);
        }

        let elapsed = report.finished_at - report.started_at;
        let _ = write!(
            output,
            "{} of {} table(s) created in {} ms",
            report.succeeded_count(),
            report.total(),
            elapsed.num_milliseconds()
        );
        output
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} tables {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
