use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::control as color_control;
use sf2sql::cli::command_context::CommandContext;
use sf2sql::cli::commands::build::{BuildCommand, BuildCommandHandler};
use sf2sql::cli::commands::ddl::{DdlCommand, DdlCommandHandler};
use sf2sql::cli::commands::objects::{ObjectsCommand, ObjectsCommandHandler};
use sf2sql::cli::commands::preferences::{PreferencesCommand, PreferencesCommandHandler};
use sf2sql::cli::commands::schema::{SchemaCommand, SchemaCommandHandler};
use sf2sql::cli::{Cli, Commands};
use std::env;
use std::process;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    // CLIをパースして実行
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` が設定されていればそれを優先し、なければ `--verbose` に応じたレベルを使います。
fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "sf2sql=debug" } else { "sf2sql=warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("Invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    let project_path = env::current_dir()?;
    let context = CommandContext::new(project_path, cli.config, cli.preferences);
    let format = cli.format;

    match cli.command {
        Commands::Objects {
            describes,
            recommended,
        } => {
            let handler = ObjectsCommandHandler::new();
            let command = ObjectsCommand {
                context,
                describes,
                recommended_only: recommended,
                format,
            };
            handler.execute(&command).await
        }

        Commands::Schema {
            describes,
            objects,
            output,
            all_text,
        } => {
            let handler = SchemaCommandHandler::new();
            let command = SchemaCommand {
                context,
                describes,
                objects,
                output,
                all_text,
                format,
            };
            handler.execute(&command).await
        }

        Commands::Ddl {
            schema,
            output,
            connection,
        } => {
            let handler = DdlCommandHandler::new();
            let command = DdlCommand {
                context,
                schema,
                output,
                connection,
                format,
            };
            handler.execute(&command)
        }

        Commands::Build { schema, connection } => {
            let handler = BuildCommandHandler::new();
            let command = BuildCommand {
                context,
                schema,
                connection,
                format,
            };
            handler.execute(&command).await
        }

        Commands::Preferences { init } => {
            let handler = PreferencesCommandHandler::new();
            let command = PreferencesCommand {
                context,
                init,
                format,
            };
            handler.execute(&command)
        }
    }
}
