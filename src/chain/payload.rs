//! Raw transaction payloads as returned by the Hiro `/extended/v1/tx` API.

use serde::{Deserialize, Serialize};

/// A transaction as reported by the chain API, before normalization.
///
/// Only the fields the facilitator reads are modelled; everything else in
/// the API response is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Transaction id.
    pub tx_id: String,
    /// Chain status (`success`, `pending`, `abort_by_response`, ...).
    pub tx_status: String,
    /// Transaction kind (`token_transfer`, `contract_call`, ...).
    pub tx_type: String,
    /// Including block height, 0 or absent while in the mempool.
    #[serde(default)]
    pub block_height: u64,
    /// Fee as a decimal string.
    #[serde(default, rename = "fee_rate")]
    pub fee: String,
    /// Sender nonce.
    #[serde(default)]
    pub nonce: u64,
    /// Sending principal.
    pub sender_address: String,
    /// Native STX transfer body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_transfer: Option<TokenTransferPayload>,
    /// Smart-contract call body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_call: Option<ContractCallPayload>,
}

/// Scalar fields of a native STX transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransferPayload {
    /// Receiving principal.
    pub recipient_address: String,
    /// Amount in microSTX as a decimal string.
    pub amount: String,
    /// Memo, possibly empty.
    #[serde(default)]
    pub memo: String,
}

/// A contract call with its decoded Clarity arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallPayload {
    /// Fully qualified contract id (`SP….token-name`).
    pub contract_id: String,
    /// Called function.
    pub function_name: String,
    /// Ordered function arguments.
    #[serde(default)]
    pub function_args: Vec<FunctionArg>,
}

/// One decoded Clarity function argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionArg {
    /// Serialized Clarity value.
    #[serde(default)]
    pub hex: String,
    /// Clarity literal representation (`u1000`, `'ST…`, `(some 0x…)`).
    #[serde(default)]
    pub repr: String,
    /// Clarity type name.
    #[serde(default, rename = "type")]
    pub arg_type: String,
    /// Parameter name.
    #[serde(default)]
    pub name: String,
}

impl FunctionArg {
    /// Build an argument from its name and Clarity repr.
    #[must_use]
    pub fn named(name: &str, repr: &str) -> Self {
        Self {
            name: name.to_string(),
            repr: repr.to_string(),
            ..Self::default()
        }
    }
}

/// The transfer encodings a raw transaction can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding<'a> {
    /// First-class STX transfer with scalar fields.
    Direct(&'a TokenTransferPayload),
    /// Transfer performed through a contract function call.
    Programmatic(&'a ContractCallPayload),
    /// Anything else, including a known `tx_type` with its body missing.
    Unsupported {
        /// The reported transaction kind.
        tx_type: &'a str,
    },
}

impl RawTransaction {
    /// Classify the payload by transfer encoding.
    #[must_use]
    pub fn encoding(&self) -> TransferEncoding<'_> {
        match (
            self.tx_type.as_str(),
            &self.token_transfer,
            &self.contract_call,
        ) {
            ("token_transfer", Some(transfer), _) => TransferEncoding::Direct(transfer),
            ("contract_call", _, Some(call)) => TransferEncoding::Programmatic(call),
            (tx_type, _, _) => TransferEncoding::Unsupported { tx_type },
        }
    }
}
