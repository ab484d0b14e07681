//! Validated value types shared by the payment pipeline.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw chain statuses that denote a transaction which will never succeed.
pub const FAILED_STATUSES: [&str; 3] = ["failed", "abort_by_response", "abort_by_post_condition"];

/// Raw chain status of a successfully executed transaction.
pub const SUCCESS_STATUS: &str = "success";

/// Base units per STX (1 STX = 1,000,000 microSTX).
pub const MICRO_STX_PER_STX: u64 = 1_000_000;

/// Length of a canonical transaction id: `0x` + 64 hex characters.
const TX_ID_LEN: usize = 66;

/// Address length bounds accepted for Stacks principals.
const ADDRESS_MIN_LEN: usize = 30;
const ADDRESS_MAX_LEN: usize = 50;

/// Standard and multisig prefixes for mainnet (`SP`, `SM`) and testnet (`ST`, `SN`).
const ADDRESS_PREFIXES: [&str; 4] = ["ST", "SP", "SM", "SN"];

/// Format errors for caller-supplied or chain-supplied values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Transaction id was empty.
    #[error("transaction ID cannot be empty")]
    EmptyTransactionId,

    /// Transaction id had the wrong length.
    #[error("invalid transaction ID length: expected 66 characters, got {0}")]
    TransactionIdLength(usize),

    /// Transaction id contained non-hex characters.
    #[error("invalid hex characters in transaction ID")]
    TransactionIdHex,

    /// Address was empty.
    #[error("address cannot be empty")]
    EmptyAddress,

    /// Address did not start with a known Stacks prefix.
    #[error("invalid Stacks address prefix: must start with ST, SP, SM, or SN (got {0})")]
    AddressPrefix(String),

    /// Address length was out of bounds.
    #[error("invalid Stacks address length: {0}")]
    AddressLength(usize),

    /// Token type was empty.
    #[error("token type cannot be empty")]
    EmptyTokenType,

    /// Token type is not supported.
    #[error("unsupported token type: {0}")]
    UnsupportedTokenType(String),

    /// Network was empty.
    #[error("network cannot be empty")]
    EmptyNetwork,

    /// Network is not supported.
    #[error("unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// Lifecycle label is not one of `pending`, `confirmed`, `failed`.
    #[error("invalid payment status: {0}")]
    InvalidLifecycle(String),

    /// Signed transaction was not valid hex.
    #[error("invalid transaction hex: {0}")]
    SignedTransactionHex(String),

    /// Signed transaction was empty.
    #[error("signed transaction cannot be empty")]
    EmptySignedTransaction,
}

/// A Stacks transaction id in canonical `0x`-prefixed lowercase-preserving form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    /// Parse a transaction id, adding the `0x` prefix when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, not 64 hex digits, or not hex.
    pub fn parse(id: &str) -> Result<Self, ValidationError> {
        if id.is_empty() {
            return Err(ValidationError::EmptyTransactionId);
        }

        let normalized = if id.starts_with("0x") {
            id.to_string()
        } else {
            format!("0x{id}")
        };

        if normalized.len() != TX_ID_LEN {
            return Err(ValidationError::TransactionIdLength(normalized.len()));
        }

        hex::decode(&normalized[2..]).map_err(|_| ValidationError::TransactionIdHex)?;

        Ok(Self(normalized))
    }

    /// The canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TransactionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A structurally valid Stacks address (never empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Parse and validate an address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty, has an unknown prefix, or
    /// has an implausible length.
    pub fn parse(addr: &str) -> Result<Self, ValidationError> {
        if addr.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }

        if !ADDRESS_PREFIXES.iter().any(|p| addr.starts_with(p)) {
            return Err(ValidationError::AddressPrefix(addr.to_string()));
        }

        if !(ADDRESS_MIN_LEN..=ADDRESS_MAX_LEN).contains(&addr.len()) {
            return Err(ValidationError::AddressLength(addr.len()));
        }

        Ok(Self(addr.to_string()))
    }

    /// The address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for testnet principals (`ST`, `SN`).
    #[must_use]
    pub fn is_testnet(&self) -> bool {
        self.0.starts_with("ST") || self.0.starts_with("SN")
    }

    /// Returns true for mainnet principals (`SP`, `SM`).
    #[must_use]
    pub fn is_mainnet(&self) -> bool {
        self.0.starts_with("SP") || self.0.starts_with("SM")
    }
}

impl FromStr for Address {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The asset a caller expects a payment to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Native STX, moved by `token_transfer` transactions.
    Stx,
    /// sBTC SIP-010 token.
    Sbtc,
    /// USDCx SIP-010 token.
    Usdcx,
}

impl TokenKind {
    /// The native chain asset.
    pub const NATIVE: Self = Self::Stx;

    /// Returns true for the native STX asset.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == Self::Stx
    }

    /// Returns true for SIP-010 fungible tokens.
    #[must_use]
    pub fn is_sip010(self) -> bool {
        matches!(self, Self::Sbtc | Self::Usdcx)
    }

    /// Upper-case ticker.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stx => "STX",
            Self::Sbtc => "SBTC",
            Self::Usdcx => "USDCX",
        }
    }
}

impl FromStr for TokenKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::EmptyTokenType);
        }
        match s.to_ascii_uppercase().as_str() {
            "STX" => Ok(Self::Stx),
            "SBTC" => Ok(Self::Sbtc),
            "USDCX" => Ok(Self::Usdcx),
            _ => Err(ValidationError::UnsupportedTokenType(s.to_string())),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stacks network a transaction lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// Stacks mainnet.
    Mainnet,
    /// Stacks testnet.
    Testnet,
}

impl Network {
    /// Lower-case network name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// Returns true for mainnet.
    #[must_use]
    pub fn is_mainnet(self) -> bool {
        self == Self::Mainnet
    }
}

impl FromStr for Network {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::EmptyNetwork);
        }
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            _ => Err(ValidationError::UnsupportedNetwork(s.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a transaction derived from its raw chain status.
///
/// This is the single classification used by the poller, the verification
/// engine and the outcome labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Not yet in a block, or in a state the chain may still change.
    Pending,
    /// Executed successfully and included in a block.
    Confirmed,
    /// Terminally failed or aborted.
    Failed,
}

impl Lifecycle {
    /// Classify a raw chain status.
    #[must_use]
    pub fn classify(raw_status: &str, block_height: u64) -> Self {
        if is_failed_status(raw_status) {
            Self::Failed
        } else if raw_status == SUCCESS_STATUS && block_height > 0 {
            Self::Confirmed
        } else {
            Self::Pending
        }
    }

    /// Returns true for confirmed or failed, after which polling is pointless.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Display label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for Lifecycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            _ => Err(ValidationError::InvalidLifecycle(s.to_string())),
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if the raw status is one of [`FAILED_STATUSES`].
#[must_use]
pub fn is_failed_status(raw_status: &str) -> bool {
    FAILED_STATUSES.contains(&raw_status)
}

/// Decode a hex-encoded signed transaction, with or without `0x`.
///
/// # Errors
///
/// Returns an error if the input is empty or not valid hex.
pub fn decode_signed_transaction(signed_tx: &str) -> Result<Vec<u8>, ValidationError> {
    let hex_part = signed_tx.strip_prefix("0x").unwrap_or(signed_tx);
    if hex_part.is_empty() {
        return Err(ValidationError::EmptySignedTransaction);
    }
    hex::decode(hex_part).map_err(|e| ValidationError::SignedTransactionHex(e.to_string()))
}

/// Convert microSTX to STX for display.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn micro_to_stx(micro: u64) -> f64 {
    micro as f64 / MICRO_STX_PER_STX as f64
}
