//! Canonical transaction model.

use super::types::{Address, Lifecycle, TokenKind, TransactionId};

/// A chain transaction normalized into the one shape the rest of the
/// pipeline understands.
///
/// Instances are built fresh from every chain query and never mutated; a
/// poll loop discards the previous snapshot each time it re-fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTransaction {
    /// Transaction id.
    pub id: TransactionId,
    /// Asset the caller asserted this transaction moves.
    pub token: TokenKind,
    /// Sending principal.
    pub sender: Address,
    /// Receiving principal.
    pub recipient: Address,
    /// Transferred amount in the asset's base unit.
    pub amount: u64,
    /// Fee paid, in microSTX. Zero when the chain reported an unparseable fee.
    pub fee: u64,
    /// Sender nonce.
    pub nonce: u64,
    /// Height of the including block, 0 while unconfirmed.
    pub block_height: u64,
    /// Attached memo, empty when absent.
    pub memo: String,
    /// Chain status string, verbatim.
    pub raw_status: String,
}

impl CanonicalTransaction {
    /// Lifecycle classification of `raw_status`.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::classify(&self.raw_status, self.block_height)
    }

    /// True iff the chain reports success and the transaction is in a block.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.lifecycle() == Lifecycle::Confirmed
    }

    /// True iff the raw status is a terminal failure.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.lifecycle() == Lifecycle::Failed
    }
}
