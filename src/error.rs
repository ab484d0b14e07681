//! Error types for stacks-facilitator.

use crate::payment::{NormalizeError, ValidationError};
use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while verifying or settling a payment.
///
/// A transaction that fails its payment criteria is *not* an error: it is a
/// successful computation with `valid == false`. Only malformed input,
/// unusable chain payloads, transport failures and cancellation end up here.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller input failed validation before any chain interaction.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The chain returned a transaction that cannot be normalized.
    #[error("unusable transaction: {0}")]
    Normalize(#[from] NormalizeError),

    /// The chain API does not know the transaction.
    #[error("transaction not found: {0}")]
    NotFound(String),

    /// Chain API transport or protocol failure.
    #[error("network error: {0}")]
    Network(String),

    /// The chain API rejected a broadcast.
    #[error("broadcast failed: {0}")]
    Broadcast(String),

    /// The caller cancelled the operation or its deadline passed.
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if the caller gave up, as opposed to the chain saying no.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
