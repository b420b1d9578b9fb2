use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qx_quota_ledger::{ClientContext, LedgerConfig, Reservation};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "qx", about = "Daily question quota for this device")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show today's usage and sync status
    Status,
    /// Count one successfully answered question
    Record,
    /// Send a feature suggestion
    Feedback {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Print this device's id
    Device,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = LedgerConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config);

    let context = ClientContext::from_config(&config).context("failed to set up client")?;
    let ledger = &context.ledger;

    match cli.command {
        Command::Status => {
            let snapshot = ledger.initialize().await;
            println!("Device: {}…", context.identity.get_or_create().short());
            println!("{snapshot}");
            print_status(&ledger.status_message());
        }
        Command::Record => {
            ledger.initialize().await;
            if ledger.check_and_reserve() == Reservation::LimitReached {
                println!(
                    "Daily free limit of {} questions is over for today.",
                    ledger.daily_limit()
                );
                return Ok(ExitCode::FAILURE);
            }

            let outcome = ledger.commit().await;
            debug!(remote = ?outcome.remote, local_saved = outcome.local_saved, "commit finished");
            println!("{}", outcome.snapshot);
            print_status(&ledger.status_message());
        }
        Command::Feedback { message } => {
            let status = context.feedback.submit(&message.join(" ")).await;
            println!("{status}");
        }
        Command::Device => {
            println!("{}", context.identity.get_or_create());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_status(status: &str) {
    if !status.is_empty() {
        println!("{status}");
    }
}

fn init_tracing(config: &LedgerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
