// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Response envelope as JSON
    Json,
}

/// sf2sql - CRM metadata to relational schema
///
/// Reads object metadata (describe responses), builds a normalized schema
/// and materializes it as tables in a relational database.
#[derive(Parser, Debug)]
#[command(name = "sf2sql")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build relational database schemas from CRM object metadata")]
#[command(long_about = "sf2sql - CRM metadata to relational schema

Reads object metadata (describe responses) from a describe file,
recommends objects based on detected org features, builds a normalized
schema and either exports DDL or creates the tables in a live database.

Supported databases: PostgreSQL, MySQL, SQLite")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. List objects:          sf2sql objects --describes describes.json
  2. Build a schema file:   sf2sql schema --describes describes.json --output schema
  3. Export DDL:            sf2sql ddl --schema schema.json --dialect mysql
  4. Create tables:         sf2sql build --schema schema.json --env local")]
pub struct Cli {
    /// Path to preferences file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub preferences: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// 接続設定の上書きフラグ
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Named environment from the configuration file
    #[arg(short, long, value_name = "ENV")]
    pub env: Option<String>,

    /// Database dialect (postgresql, mysql, sqlite)
    #[arg(short, long, value_name = "DIALECT")]
    pub dialect: Option<String>,

    /// Database host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Database port
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Database name
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Database file (SQLite)
    #[arg(long, value_name = "FILE")]
    pub filename: Option<PathBuf>,

    /// Database user
    #[arg(long, value_name = "USER")]
    pub user: Option<String>,

    /// Database password
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Drop existing tables before creating them
    #[arg(long)]
    pub overwrite: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List createable objects and mark the recommended ones
    ///
    /// EXAMPLES:
    ///   sf2sql objects --describes describes.json
    ///   sf2sql objects --describes describes.json --recommended
    Objects {
        /// Describe file (JSON map of object name to describe response)
        #[arg(long, value_name = "FILE")]
        describes: PathBuf,

        /// Only print recommended objects
        #[arg(long)]
        recommended: bool,
    },

    /// Build a schema from object describes and save it as JSON
    ///
    /// When no objects are given, the recommended objects are used.
    ///
    /// EXAMPLES:
    ///   sf2sql schema --describes describes.json --output schema
    ///   sf2sql schema --describes describes.json --objects Account,Contact --output crm.json
    Schema {
        /// Describe file (JSON map of object name to describe response)
        #[arg(long, value_name = "FILE")]
        describes: PathBuf,

        /// Objects to include (comma separated)
        #[arg(long, value_name = "OBJECTS", value_delimiter = ',')]
        objects: Vec<String>,

        /// Output schema file (.json is appended when missing)
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Map every string field to text
        #[arg(long)]
        all_text: bool,
    },

    /// Export DDL statements for a saved schema
    ///
    /// EXAMPLES:
    ///   sf2sql ddl --schema schema.json --dialect postgresql
    ///   sf2sql ddl --schema schema.json --env local --output schema.sql
    Ddl {
        /// Saved schema file
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Create the tables of a saved schema in a live database
    ///
    /// EXAMPLES:
    ///   sf2sql build --schema schema.json --env local
    ///   sf2sql build --schema schema.json --dialect sqlite --filename org.db --overwrite
    Build {
        /// Saved schema file
        #[arg(short, long, value_name = "FILE")]
        schema: PathBuf,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Show effective preferences or write a defaults file
    ///
    /// EXAMPLES:
    ///   sf2sql preferences
    ///   sf2sql --preferences prefs.json preferences --init
    Preferences {
        /// Write the effective preferences to the --preferences file
        #[arg(long)]
        init: bool,
    },
}
