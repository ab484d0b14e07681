//! Configuration for stacks-facilitator.

use crate::payment::PollPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Hiro API endpoint for mainnet.
pub const MAINNET_API_URL: &str = "https://api.mainnet.hiro.so";

/// Default Hiro API endpoint for testnet.
pub const TESTNET_API_URL: &str = "https://api.testnet.hiro.so";

/// Facilitator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilitatorConfig {
    /// Chain API configuration.
    #[serde(default)]
    pub chain: ChainConfig,

    /// Poll budget when verifying an existing transaction.
    #[serde(default = "PollConfig::verify_default")]
    pub verify: PollConfig,

    /// Poll budget when waiting for a broadcast transaction to settle.
    #[serde(default = "PollConfig::settle_default")]
    pub settle: PollConfig,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Chain API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Hiro API base URL for mainnet.
    #[serde(default = "default_mainnet_url")]
    pub mainnet_api_url: String,

    /// Hiro API base URL for testnet.
    #[serde(default = "default_testnet_url")]
    pub testnet_api_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Retry budget for one poll loop.
///
/// A table that omits `max_attempts` gets the verify default of 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Attempts before the final fetch.
    #[serde(default = "default_verify_attempts")]
    pub max_attempts: u32,

    /// Wait between attempts in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            verify: PollConfig::verify_default(),
            settle: PollConfig::settle_default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            mainnet_api_url: default_mainnet_url(),
            testnet_api_url: default_testnet_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl PollConfig {
    /// Budget for verifying: 10 attempts, 2 seconds apart.
    #[must_use]
    pub fn verify_default() -> Self {
        Self {
            max_attempts: default_verify_attempts(),
            interval_ms: default_interval_ms(),
        }
    }

    /// Budget for settling: 15 attempts, 2 seconds apart.
    #[must_use]
    pub fn settle_default() -> Self {
        Self {
            max_attempts: 15,
            interval_ms: default_interval_ms(),
        }
    }

    /// The poller policy for this budget.
    #[must_use]
    pub fn policy(&self) -> PollPolicy {
        PollPolicy::new(self.max_attempts, Duration::from_millis(self.interval_ms))
    }
}

fn default_mainnet_url() -> String {
    MAINNET_API_URL.to_string()
}

fn default_testnet_url() -> String {
    TESTNET_API_URL.to_string()
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_verify_attempts() -> u32 {
    10
}

const fn default_interval_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default location of the configuration file, if the platform has one.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "stacks-facilitator")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

impl FacilitatorConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
