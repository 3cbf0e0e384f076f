//! songplays-dwh CLI - stage song/event logs into Redshift and load the star schema

mod commands;

use clap::{Parser, Subcommand};
use songplays_dwh::output::OutputMode;
use songplays_dwh::pipeline;
use songplays_dwh::{Phase, Table};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "songplays-dwh")]
#[command(version)]
#[command(about = "Stage song/event logs into Redshift and load a star-schema analytics model")]
#[command(long_about = r#"
songplays-dwh renders and runs the warehouse SQL for the songplays model:
  • staging_events / staging_songs loaded by COPY from S3
  • songplays fact plus users, songs, artists, time dimensions

Example usage:
  songplays-dwh plan
  songplays-dwh create-tables
  songplays-dwh etl
  songplays-dwh render --phase copy
  songplays-dwh render --table songplays
"#)]
struct Cli {
    /// Path to the INI config file
    #[arg(short, long, global = true, default_value = "dwh.cfg")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rendered SQL
    Render {
        /// Only this phase (drop, create, copy, insert)
        #[arg(short, long)]
        phase: Option<Phase>,

        /// Only statements touching this table, e.g. songplays or public.time
        #[arg(short, long)]
        table: Option<Table>,
    },

    /// Show every statement in execution order
    Plan,

    /// Drop and recreate all tables
    CreateTables {
        /// Record statements without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// Copy staging data from S3, then load the star schema
    Etl {
        /// Record statements without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// Drop, create, copy and insert in one go
    Run {
        /// Record statements without connecting
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the config file
    CheckConfig,

    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = OutputMode::from_flag(cli.json);

    match cli.command {
        Commands::Render { phase, table } => commands::run_render(&cli.config, phase, table, output_mode),
        Commands::Plan => commands::run_plan(&cli.config, output_mode),
        Commands::CreateTables { dry_run } => {
            commands::run_phases("create-tables", &cli.config, pipeline::CREATE_TABLES, dry_run, output_mode).await
        }
        Commands::Etl { dry_run } => {
            commands::run_phases("etl", &cli.config, pipeline::ETL, dry_run, output_mode).await
        }
        Commands::Run { dry_run } => {
            commands::run_phases("run", &cli.config, pipeline::ALL, dry_run, output_mode).await
        }
        Commands::CheckConfig => commands::run_check_config(&cli.config, output_mode),
        Commands::Version => commands::run_version(output_mode),
    }
}
