//! Access to the Stacks chain through the Hiro HTTP API.
//!
//! The facilitator only needs two capabilities from the chain, captured by
//! [`ChainClient`]: look a transaction up, and broadcast a signed one.
//! [`HiroClient`] implements them over HTTP; tests substitute their own.

mod hiro;
mod payload;

pub use hiro::HiroClient;
pub use payload::{
    ContractCallPayload, FunctionArg, RawTransaction, TokenTransferPayload, TransferEncoding,
};

use crate::error::Result;
use crate::payment::{Network, TransactionId};
use async_trait::async_trait;
use bytes::Bytes;

/// Chain capabilities consumed by the facilitator.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Look up a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] if the chain does not know the
    /// transaction, or [`crate::Error::Network`] on transport failure.
    async fn fetch_transaction(&self, id: &TransactionId, network: Network)
        -> Result<RawTransaction>;

    /// Broadcast a serialized signed transaction and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Broadcast`] if the node rejects the
    /// transaction, or [`crate::Error::Network`] on transport failure.
    async fn broadcast(&self, signed_tx: Bytes, network: Network) -> Result<TransactionId>;
}
