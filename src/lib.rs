//! # stacks-facilitator
//!
//! Verification and settlement of Stacks payments.
//!
//! Given a transaction id (or a signed, not yet broadcast transaction), the
//! facilitator fetches the transfer from the Hiro chain API, normalizes it
//! into a [`payment::CanonicalTransaction`], optionally polls until the chain
//! reports a terminal status, and checks it against caller-supplied
//! [`payment::VerificationCriteria`].
//!
//! Two transfer encodings are understood:
//!
//! - **Native STX transfers** (`token_transfer`): recipient, amount and memo
//!   are scalar fields of the payload.
//! - **SIP-010 token transfers** (`contract_call` to `transfer`): recipient,
//!   amount and memo are named Clarity function arguments.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stacks_facilitator::chain::HiroClient;
//! use stacks_facilitator::payment::{Facilitator, VerifyCommand};
//! use stacks_facilitator::FacilitatorConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = FacilitatorConfig::default();
//! let facilitator = Facilitator::new(HiroClient::new(&config.chain)?, &config);
//! let outcome = facilitator
//!     .verify(
//!         VerifyCommand {
//!             tx_id: "0x1234…".into(),
//!             token_type: Some("STX".into()),
//!             expected_recipient: "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".into(),
//!             min_amount: 500_000,
//!             expected_sender: None,
//!             expected_memo: None,
//!             network: "testnet".into(),
//!         },
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//! println!("valid: {} errors: {:?}", outcome.valid, outcome.errors);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chain;
pub mod config;
pub mod error;
pub mod payment;

pub use config::FacilitatorConfig;
pub use error::{Error, Result};
