#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{CommandStrategy, InitStrategy, SyncInput, SyncStrategy, VersionStrategy};

#[derive(Parser)]
#[command(name = "ani")]
#[command(about = "Ani conversational prototype with durable memory", long_about = None)]
struct Cli {
    /// Run the Ani prototype in sync mode
    #[arg(long)]
    sync: bool,

    /// Config file (defaults to ~/ani/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Init) => InitStrategy.execute(cli.config).await,
        Some(Commands::Version) => VersionStrategy.execute(()).await,
        None if cli.sync => {
            SyncStrategy
                .execute(SyncInput { config: cli.config })
                .await
        }
        None => {
            println!("Use --sync to run the prototype");
            Ok(())
        }
    }
}
