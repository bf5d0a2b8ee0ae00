// preferencesコマンドハンドラー
//
// 実効プリファレンスの表示と、プリファレンスファイルの書き出しを行います。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::render_response;
use crate::cli::OutputFormat;
use crate::core::response::Response;
use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;

/// preferencesコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct PreferencesCommand {
    pub context: CommandContext,
    /// プリファレンスファイルを書き出す
    pub init: bool,
    pub format: OutputFormat,
}

/// preferencesコマンドハンドラー
#[derive(Debug, Default)]
pub struct PreferencesCommandHandler {}

impl PreferencesCommandHandler {
    /// 新しいPreferencesCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// preferencesコマンドを実行
    pub fn execute(&self, command: &PreferencesCommand) -> Result<String> {
        let path = command.context.preferences_path();
        let preferences = command.context.load_preferences();
        let request = json!({ "path": path.display().to_string(), "init": command.init });

        let response = if command.init {
            match preferences.save(&path) {
                Ok(()) => Response::success("Preferences Saved", json!(preferences), request),
                Err(e) => Response::failure("Preferences Save Failed", json!(e.to_string()), request),
            }
        } else {
            Response::success("Preferences Loaded", json!(preferences), request)
        };

        let pretty = serde_json::to_string_pretty(&preferences)
            .with_context(|| "Failed to serialize preferences")?;
        render_response(&response, &command.format, |r| {
            if command.init {
                format!("{} {} written to {}", "✓".green(), r.message, path.display())
            } else {
                pretty
            }
        })
    }
}
