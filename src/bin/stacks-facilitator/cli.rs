//! Command-line interface definition.

use clap::{Args, Parser, Subcommand};
use stacks_facilitator::config::{default_config_path, FacilitatorConfig};
use stacks_facilitator::payment::{SettleCommand, VerifyCommand};
use std::path::PathBuf;

/// Verify and settle Stacks payments against the Hiro chain API.
#[derive(Parser, Debug)]
#[command(name = "stacks-facilitator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file.
    #[arg(long, short, global = true, env = "STACKS_FACILITATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level, overriding `RUST_LOG` and the config file.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "STACKS_FACILITATOR_JSON_LOGS")]
    pub json_logs: bool,

    /// Give up after this many seconds.
    #[arg(long, global = true, env = "STACKS_FACILITATOR_TIMEOUT")]
    pub timeout_secs: Option<u64>,

    /// Override the mainnet Hiro API URL.
    #[arg(long, global = true, env = "STACKS_MAINNET_API_URL")]
    pub mainnet_api_url: Option<String>,

    /// Override the testnet Hiro API URL.
    #[arg(long, global = true, env = "STACKS_TESTNET_API_URL")]
    pub testnet_api_url: Option<String>,
}

/// Facilitator operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify an already broadcast payment.
    Verify(VerifyArgs),
    /// Broadcast a signed payment and wait for it to settle.
    Settle(SettleArgs),
}

/// Criteria shared by both operations.
#[derive(Args, Debug)]
pub struct PaymentArgs {
    /// Principal that must receive the payment.
    #[arg(long)]
    pub recipient: String,

    /// Minimum amount in base units (microSTX for STX).
    #[arg(long)]
    pub min_amount: u64,

    /// Token the payment is made in (STX, SBTC, USDCX).
    #[arg(long)]
    pub token: Option<String>,

    /// Principal that must have sent the payment.
    #[arg(long)]
    pub sender: Option<String>,

    /// Network to query.
    #[arg(long, default_value = "testnet", env = "STACKS_NETWORK")]
    pub network: String,
}

/// Arguments for `verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Transaction id, with or without `0x`.
    #[arg(long)]
    pub tx_id: String,

    /// Memo the payment must carry.
    #[arg(long)]
    pub memo: Option<String>,

    #[command(flatten)]
    pub payment: PaymentArgs,
}

/// Arguments for `settle`.
#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Hex-encoded signed transaction.
    #[arg(long)]
    pub signed_tx: String,

    #[command(flatten)]
    pub payment: PaymentArgs,
}

impl Cli {
    /// Build the configuration: file (explicit, or the platform default if
    /// present), then CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is specified but cannot be loaded.
    pub fn to_config(&self) -> color_eyre::Result<FacilitatorConfig> {
        let path = self
            .config
            .clone()
            .or_else(|| default_config_path().filter(|p| p.exists()));

        let mut config = match path {
            Some(path) => FacilitatorConfig::from_file(&path)?,
            None => FacilitatorConfig::default(),
        };

        if let Some(url) = &self.mainnet_api_url {
            config.chain.mainnet_api_url.clone_from(url);
        }
        if let Some(url) = &self.testnet_api_url {
            config.chain.testnet_api_url.clone_from(url);
        }
        if let Some(level) = &self.log_level {
            config.log_level.clone_from(level);
        }

        Ok(config)
    }
}

impl From<VerifyArgs> for VerifyCommand {
    fn from(args: VerifyArgs) -> Self {
        Self {
            tx_id: args.tx_id,
            token_type: args.payment.token,
            expected_recipient: args.payment.recipient,
            min_amount: args.payment.min_amount,
            expected_sender: args.payment.sender,
            expected_memo: args.memo,
            network: args.payment.network,
        }
    }
}

impl From<SettleArgs> for SettleCommand {
    fn from(args: SettleArgs) -> Self {
        Self {
            signed_transaction: args.signed_tx,
            token_type: args.payment.token,
            expected_recipient: args.payment.recipient,
            min_amount: args.payment.min_amount,
            expected_sender: args.payment.sender,
            network: args.payment.network,
        }
    }
}
