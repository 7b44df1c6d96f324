use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use daily_tracker::app::{self, RunOptions};
use daily_tracker::config::{self, InitSettings, Settings};
use daily_tracker::date;

#[derive(Parser)]
#[command(name = "daily-tracker")]
#[command(about = "Record your daily GitHub contributions in an Excel tracker")]
struct Cli {
    /// Day to record: YYYY-MM-DD, DD/MM/YYYY or DD/MM/YY (default: today, local time)
    date: Option<String>,

    /// Environment file holding the tracker configuration
    #[arg(long, global = true, default_value = ".env", env = "TRACKER_ENV_FILE")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new tracker workbook with the header row and Config sheet
    Init {
        /// Overwrite an existing workbook
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init { force }) => {
            config::load_env_file(&cli.env_file);
            let settings = InitSettings::from_env()?;
            app::init(&settings, force)
        }
        None => {
            let day = date::resolve_target_date(cli.date.as_deref())?;
            config::load_env_file(&cli.env_file);
            let settings = Settings::from_env()?;

            let outcome = app::update(&settings, day, RunOptions::default()).await?;
            let name = settings
                .workbook
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!(
                "DONE. Updated {} for {} (row {}): {:?}",
                name,
                outcome.day,
                outcome.row,
                outcome.metrics
            );
            Ok(())
        }
    }
}
