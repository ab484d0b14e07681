//! Conversion of raw chain payloads into [`CanonicalTransaction`]s.
//!
//! Native STX transfers carry recipient, amount and memo as scalar fields.
//! SIP-010 transfers carry them as named Clarity arguments of a `transfer`
//! contract call:
//!
//! ```text
//! (transfer (amount uint) (sender principal) (recipient principal) (memo (optional (buff 34))))
//! ```
//!
//! The asserted [`TokenKind`] is recorded as given. Whether the payload
//! actually moved that asset is not checked here.

use super::transaction::CanonicalTransaction;
use super::types::{Address, TokenKind, TransactionId, ValidationError};
use crate::chain::{ContractCallPayload, RawTransaction, TokenTransferPayload, TransferEncoding};
use std::num::ParseIntError;
use thiserror::Error;
use tracing::debug;

/// SIP-010 transfer function name.
const TRANSFER_FUNCTION: &str = "transfer";

/// Prefix of Clarity `uint` literals (`u1000`).
const UINT_PREFIX: char = 'u';

/// Prefix of Clarity principal literals (`'ST…`).
const PRINCIPAL_PREFIX: char = '\'';

/// Reasons a raw payload cannot become a canonical transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The payload is not a transfer encoding this crate understands.
    #[error("unsupported transaction type: {tx_type}")]
    UnsupportedTransactionShape {
        /// The reported transaction kind.
        tx_type: String,
    },

    /// A contract call to something other than `transfer`.
    #[error("not a transfer function: {function}")]
    NotATransfer {
        /// The called function.
        function: String,
    },

    /// A contract-call transfer with no `recipient` or `to` argument.
    #[error("recipient not found in contract call")]
    MissingRecipient,

    /// A contract-call transfer with no `amount` argument.
    #[error("amount not found in contract call")]
    MissingAmount,

    /// The transfer amount is not a non-negative integer.
    #[error("invalid amount {value:?}: {source}")]
    InvalidAmount {
        /// The unparsed amount.
        value: String,
        /// Parse failure.
        source: ParseIntError,
    },

    /// An id or address field failed validation.
    #[error("invalid {field}: {source}")]
    InvalidField {
        /// Which field.
        field: &'static str,
        /// Validation failure.
        source: ValidationError,
    },
}

/// Transfer fields extracted from either encoding.
struct Transfer {
    recipient: Address,
    amount: u64,
    memo: String,
}

/// Normalize a raw chain transaction, reporting it under `token`.
///
/// # Errors
///
/// Returns an error if the payload is not a recognised transfer, if the
/// recipient cannot be established, or if the amount, id or addresses are
/// malformed. An unparseable fee is not an error; it becomes zero.
pub fn normalize(
    raw: &RawTransaction,
    token: TokenKind,
) -> Result<CanonicalTransaction, NormalizeError> {
    let id = TransactionId::parse(&raw.tx_id).map_err(|source| NormalizeError::InvalidField {
        field: "transaction id",
        source,
    })?;
    let sender = parse_address("sender address", &raw.sender_address)?;

    let transfer = match raw.encoding() {
        TransferEncoding::Direct(payload) => direct_transfer(payload)?,
        TransferEncoding::Programmatic(call) => programmatic_transfer(call)?,
        TransferEncoding::Unsupported { tx_type } => {
            return Err(NormalizeError::UnsupportedTransactionShape {
                tx_type: tx_type.to_string(),
            });
        }
    };

    let fee = raw.fee.parse::<u64>().unwrap_or_else(|_| {
        debug!("Unparseable fee {:?} on {}, using 0", raw.fee, raw.tx_id);
        0
    });

    Ok(CanonicalTransaction {
        id,
        token,
        sender,
        recipient: transfer.recipient,
        amount: transfer.amount,
        fee,
        nonce: raw.nonce,
        block_height: raw.block_height,
        memo: transfer.memo,
        raw_status: raw.tx_status.clone(),
    })
}

fn direct_transfer(payload: &TokenTransferPayload) -> Result<Transfer, NormalizeError> {
    Ok(Transfer {
        recipient: parse_address("recipient address", &payload.recipient_address)?,
        amount: parse_amount(&payload.amount)?,
        memo: payload.memo.clone(),
    })
}

fn programmatic_transfer(call: &ContractCallPayload) -> Result<Transfer, NormalizeError> {
    if call.function_name != TRANSFER_FUNCTION {
        return Err(NormalizeError::NotATransfer {
            function: call.function_name.clone(),
        });
    }

    let mut recipient = None;
    let mut amount = None;
    let mut memo = String::new();

    for arg in &call.function_args {
        match arg.name.as_str() {
            "amount" => {
                let digits = arg.repr.strip_prefix(UINT_PREFIX).unwrap_or(&arg.repr);
                amount = Some(parse_amount(digits)?);
            }
            "recipient" | "to" => {
                let principal = arg.repr.strip_prefix(PRINCIPAL_PREFIX).unwrap_or(&arg.repr);
                recipient = Some(parse_address("recipient", principal)?);
            }
            "memo" => memo.clone_from(&arg.repr),
            _ => {}
        }
    }

    let recipient = recipient.ok_or(NormalizeError::MissingRecipient)?;
    let amount = amount.ok_or(NormalizeError::MissingAmount)?;

    Ok(Transfer {
        recipient,
        amount,
        memo,
    })
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, NormalizeError> {
    Address::parse(value).map_err(|source| NormalizeError::InvalidField { field, source })
}

fn parse_amount(value: &str) -> Result<u64, NormalizeError> {
    value
        .parse::<u64>()
        .map_err(|source| NormalizeError::InvalidAmount {
            value: value.to_string(),
            source,
        })
}
