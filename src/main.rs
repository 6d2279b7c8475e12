//! dbrecord CLI - save, fetch and delete record graphs from the command line

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use dbrecord::config;
use dbrecord::SqliteConnector;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "dbrecord")]
#[command(version)]
#[command(about = "Save and fetch graphs of database rows addressed by column paths")]
#[command(long_about = r#"
dbrecord resolves column paths into a graph of rows joined by foreign keys:
  • `title`                          a column of the record itself
  • `table1.title`                   table1 joined on table1_id = table1.id
  • `table2[table1.table2_id].title` table2 joined through table1

Example usage:
  dbrecord save --table table0 title=Title table1.title="Title 1"
  dbrecord fetch --table table0 --id 1 title table1.title
  dbrecord delete --table table0 --id 1 table1
"#)]
struct Cli {
    /// Enable verbose logging (prints every SQL statement)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct TargetArgs {
    /// Table of the root record
    #[arg(short, long)]
    table: String,

    /// Primary key column (defaults to the config value, then `id`)
    #[arg(long)]
    pk: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file
    Init {
        /// Primary key column stored in the config
        #[arg(long)]
        primary_key: Option<String>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Assign values by path and save the record graph
    Save {
        #[command(flatten)]
        target: TargetArgs,

        /// Primary key of an existing row (omit to insert)
        #[arg(short, long)]
        id: Option<String>,

        /// Assignments of the form PATH=VALUE
        #[arg(required = true)]
        assignments: Vec<String>,
    },

    /// Read values by path
    Fetch {
        #[command(flatten)]
        target: TargetArgs,

        /// Primary key of the row
        #[arg(short, long)]
        id: String,

        /// Column paths to read
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Delete a row and every row joined to it
    Delete {
        #[command(flatten)]
        target: TargetArgs,

        /// Primary key of the row
        #[arg(short, long)]
        id: String,

        /// Extra table paths to join (and delete) before deleting
        tables: Vec<String>,
    },
}

/// How command results are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// Print a machine-readable success envelope
pub fn emit_success(
    output_mode: OutputMode,
    command: &str,
    data: serde_json::Value,
) -> anyhow::Result<()> {
    if output_mode.is_human() {
        return Ok(());
    }
    let envelope = serde_json::json!({
        "ok": true,
        "command": command,
        "data": data,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        dbrecord::ui::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let settings = config::load_config(Some(&config_path))?.unwrap_or_default();

    let database = cli
        .database
        .clone()
        .or_else(|| settings.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| config::default_database_path_in(std::path::Path::new(".")));

    if let Commands::Init { primary_key, force } = &cli.command {
        return commands::run_init(output_mode, &config_path, &database, primary_key.clone(), *force);
    }

    config::ensure_db_dir(&database)?;
    tracing::debug!("Opening {}", database.display());
    let db = SqliteConnector::open(&database)?;

    let target = |args: TargetArgs, id: Option<String>| commands::Target {
        pk: args
            .pk
            .unwrap_or_else(|| settings.primary_key_or_default().to_string()),
        table: args.table,
        id,
    };

    match cli.command {
        Commands::Save { target: args, id, assignments } => {
            commands::run_save(output_mode, &db, &target(args, id), &assignments)
        }
        Commands::Fetch { target: args, id, paths } => {
            commands::run_fetch(output_mode, &db, &target(args, Some(id)), &paths)
        }
        Commands::Delete { target: args, id, tables } => {
            commands::run_delete(output_mode, &db, &target(args, Some(id)), &tables)
        }
        Commands::Init { .. } => Ok(()),
    }
}
