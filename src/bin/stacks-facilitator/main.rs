//! stacks-facilitator CLI entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use stacks_facilitator::chain::HiroClient;
use stacks_facilitator::payment::Facilitator;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<ExitCode> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Build configuration
    let config = cli.to_config()?;

    // Initialize tracing; stdout is reserved for the outcome
    let filter = match cli.log_level {
        Some(_) => EnvFilter::new(&config.log_level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    };

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    info!("stacks-facilitator v{}", env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(&cancel, cli.timeout_secs);

    let facilitator = Facilitator::new(HiroClient::new(&config.chain)?, &config);

    let (report, accepted) = match cli.command {
        Command::Verify(args) => {
            let outcome = facilitator.verify(args.into(), &cancel).await?;
            (serde_json::to_string_pretty(&outcome)?, outcome.valid)
        }
        Command::Settle(args) => {
            let outcome = facilitator.settle(args.into(), &cancel).await?;
            (serde_json::to_string_pretty(&outcome)?, outcome.success)
        }
    };

    println!("{report}");

    Ok(if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Cancel on Ctrl-C, and after `timeout_secs` if given.
fn spawn_cancel_triggers(cancel: &CancellationToken, timeout_secs: Option<u64>) {
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    if let Some(secs) = timeout_secs {
        let on_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!("Deadline of {secs}s reached, cancelling");
            on_deadline.cancel();
        });
    }
}
