//! LeafWise CLI - plant leaf disease diagnosis from the terminal.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod exit_codes;
mod utils;

#[derive(Parser)]
#[command(name = "leafwise")]
#[command(author, version, about = "Plant leaf disease diagnosis", long_about = None)]
#[command(after_help = "Exit codes:\n  \
    0   success\n  \
    66  unreadable or invalid input file\n  \
    69  diagnosis service unavailable\n  \
    74  history storage error")]
struct Cli {
    /// Directory holding the persisted history (defaults to
    /// LEAFWISE_DATA_DIR or the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a leaf image file
    Diagnose {
        /// Path to the image file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Use the in-tree mock services instead of configured endpoints
        #[arg(long)]
        mock: bool,

        /// Do not record the result in history
        #[arg(long)]
        no_history: bool,
    },

    /// Inspect or clear past diagnoses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recorded diagnoses, newest first
    List,

    /// Show one recorded diagnosis in full
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Delete all recorded diagnoses
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = leafwise_core::Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Diagnose {
            file,
            mock,
            no_history,
        } => commands::diagnose::execute(&config, file, mock, no_history).await,
        Commands::History { action } => match action {
            HistoryAction::List => commands::history::list(&config).await,
            HistoryAction::Show { id } => commands::history::show(&config, &id).await,
            HistoryAction::Clear { yes } => commands::history::clear(&config, yes).await,
        },
    }
}
