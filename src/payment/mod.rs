//! Payment verification and settlement for Stacks transfers.
//!
//! A payment is checked by fetching its transaction from the chain,
//! normalizing whichever transfer encoding it uses into one canonical shape,
//! and running every payment criterion against that shape.
//!
//! # Architecture
//!
//! ```text
//!  verify(tx_id)            settle(signed_tx)
//!        │                        │
//!        │                   broadcast
//!        │                        │
//!        ▼                        ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │ fetch_with_retry │   │  await_terminal  │   poller
//! └────────┬─────────┘   └────────┬─────────┘
//!          └──────────┬───────────┘
//!                     ▼
//!          ┌─────────────────────┐
//!          │ RawTransaction      │
//!          │  token_transfer  ───┼──┐
//!          │  contract_call   ───┼──┤  normalizer
//!          └─────────────────────┘  │
//!                     ┌─────────────┘
//!                     ▼
//!          CanonicalTransaction ──▶ verifier ──▶ outcome { valid, errors }
//! ```

mod facilitator;
mod normalizer;
mod poller;
mod transaction;
mod types;
mod verifier;

pub use facilitator::{Facilitator, SettleCommand, SettleOutcome, VerifyCommand, VerifyOutcome};
pub use normalizer::{normalize, NormalizeError};
pub use poller::{
    await_terminal, fetch_with_retry, retry_on_error, retry_until, retry_until_terminal,
    until_cancelled, PollPolicy,
};
pub use transaction::CanonicalTransaction;
pub use types::{
    decode_signed_transaction, is_failed_status, micro_to_stx, Address, Lifecycle, Network,
    TokenKind, TransactionId, ValidationError, FAILED_STATUSES, MICRO_STX_PER_STX, SUCCESS_STATUS,
};
pub use verifier::{verify, VerificationCriteria, VerificationResult, Violation};
