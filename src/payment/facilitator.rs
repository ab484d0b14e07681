//! Verify and settle use cases.
//!
//! Both flows validate every caller input before touching the chain, poll
//! through [`super::poller`], normalize each fetched payload and hand the
//! final snapshot to the verification engine. Rule violations travel in the
//! outcome; only input, transport and cancellation failures are errors.

use super::normalizer::normalize;
use super::poller::{await_terminal, fetch_with_retry, until_cancelled, PollPolicy};
use super::transaction::CanonicalTransaction;
use super::types::{decode_signed_transaction, Address, Network, TokenKind, TransactionId};
use super::verifier::{verify, VerificationCriteria};
use crate::chain::ChainClient;
use crate::config::FacilitatorConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Request to verify an already broadcast payment.
#[derive(Debug, Clone, Default)]
pub struct VerifyCommand {
    /// Transaction id, with or without `0x`.
    pub tx_id: String,
    /// Asserted token; unparseable or absent means native STX.
    pub token_type: Option<String>,
    /// Principal that must receive the payment.
    pub expected_recipient: String,
    /// Minimum amount in base units.
    pub min_amount: u64,
    /// Principal that must have sent the payment.
    pub expected_sender: Option<String>,
    /// Memo the payment must carry.
    pub expected_memo: Option<String>,
    /// `mainnet` or `testnet`.
    pub network: String,
}

/// Request to broadcast and settle a signed payment.
#[derive(Debug, Clone, Default)]
pub struct SettleCommand {
    /// Hex-encoded signed transaction, with or without `0x`.
    pub signed_transaction: String,
    /// Asserted token; unparseable or absent means native STX.
    pub token_type: Option<String>,
    /// Principal that must receive the payment.
    pub expected_recipient: String,
    /// Minimum amount in base units.
    pub min_amount: u64,
    /// Principal that must have sent the payment.
    pub expected_sender: Option<String>,
    /// `mainnet` or `testnet`.
    pub network: String,
}

/// Flattened result of [`Facilitator::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyOutcome {
    /// True iff no criterion was violated.
    pub valid: bool,
    /// Transaction id.
    pub tx_id: String,
    /// Sending principal.
    pub sender_address: String,
    /// Receiving principal.
    pub recipient_address: String,
    /// Transferred amount in base units.
    pub amount: u64,
    /// Fee in microSTX.
    pub fee: u64,
    /// Sender nonce.
    pub nonce: u64,
    /// Lifecycle label: `pending`, `confirmed` or `failed`.
    pub status: String,
    /// Including block height, 0 while unconfirmed.
    pub block_height: u64,
    /// Token the payment was checked as.
    pub token_type: String,
    /// Attached memo.
    pub memo: String,
    /// Network queried.
    pub network: String,
    /// Violation messages in check order; empty iff `valid`.
    pub errors: Vec<String>,
}

/// Flattened result of [`Facilitator::settle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettleOutcome {
    /// True iff the settled transaction met every criterion.
    pub success: bool,
    /// Transaction id.
    pub tx_id: String,
    /// Sending principal.
    pub sender_address: String,
    /// Receiving principal.
    pub recipient_address: String,
    /// Transferred amount in base units.
    pub amount: u64,
    /// Fee in microSTX.
    pub fee: u64,
    /// Lifecycle label: `pending`, `confirmed` or `failed`.
    pub status: String,
    /// Including block height, 0 while unconfirmed.
    pub block_height: u64,
    /// Token the payment was checked as.
    pub token_type: String,
    /// Network queried.
    pub network: String,
    /// Violation messages in check order; empty iff `success`.
    pub errors: Vec<String>,
}

/// Orchestrates chain access, polling and verification.
pub struct Facilitator<C> {
    client: C,
    verify_policy: PollPolicy,
    settle_policy: PollPolicy,
}

impl<C: ChainClient> Facilitator<C> {
    /// Create a facilitator with the poll budgets from `config`.
    #[must_use]
    pub fn new(client: C, config: &FacilitatorConfig) -> Self {
        Self::with_policies(client, config.verify.policy(), config.settle.policy())
    }

    /// Create a facilitator with explicit poll budgets.
    #[must_use]
    pub fn with_policies(client: C, verify_policy: PollPolicy, settle_policy: PollPolicy) -> Self {
        Self {
            client,
            verify_policy,
            settle_policy,
        }
    }

    /// The underlying chain client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch a transaction and check it against the command's criteria.
    ///
    /// Transport and normalization failures are retried within the verify
    /// budget. A pending transaction ends polling and is reported as not
    /// confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed input, the last fetch
    /// error once the budget is spent, or [`Error::Cancelled`].
    pub async fn verify(
        &self,
        cmd: VerifyCommand,
        cancel: &CancellationToken,
    ) -> Result<VerifyOutcome> {
        let tx_id = TransactionId::parse(&cmd.tx_id)?;
        let token = token_or_native(cmd.token_type.as_deref());
        let network: Network = cmd.network.parse()?;
        let mut criteria =
            VerificationCriteria::new(Address::parse(&cmd.expected_recipient)?, cmd.min_amount);
        if let Some(sender) = cmd.expected_sender.as_deref() {
            criteria = criteria.with_sender(Address::parse(sender)?);
        }
        if let Some(memo) = cmd.expected_memo {
            criteria = criteria.with_memo(memo);
        }

        info!(
            "Verifying {token} payment {tx_id} on {network} (polling for up to {:?})",
            self.verify_policy.max_wait()
        );

        let tx = fetch_with_retry(
            self.verify_policy,
            cancel,
            self.fetcher(&tx_id, token, network),
        )
        .await?;

        let result = verify(&tx, &criteria);
        if result.is_valid() {
            info!("Payment {tx_id} verified");
        } else {
            info!(
                "Payment {tx_id} rejected with {} violation(s)",
                result.violations.len()
            );
        }

        Ok(VerifyOutcome {
            valid: result.is_valid(),
            tx_id: tx.id.to_string(),
            sender_address: tx.sender.to_string(),
            recipient_address: tx.recipient.to_string(),
            amount: tx.amount,
            fee: tx.fee,
            nonce: tx.nonce,
            status: tx.lifecycle().to_string(),
            block_height: tx.block_height,
            token_type: tx.token.to_string(),
            memo: tx.memo.clone(),
            network: network.to_string(),
            errors: result.messages(),
        })
    }

    /// Broadcast a signed transaction, wait for a terminal state and check
    /// it against the command's criteria. Settlement always requires
    /// confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed input,
    /// [`Error::Broadcast`] if the node rejects the transaction, the last
    /// fetch error once the budget is spent, or [`Error::Cancelled`].
    pub async fn settle(
        &self,
        cmd: SettleCommand,
        cancel: &CancellationToken,
    ) -> Result<SettleOutcome> {
        let token = token_or_native(cmd.token_type.as_deref());
        let network: Network = cmd.network.parse()?;
        let mut criteria =
            VerificationCriteria::new(Address::parse(&cmd.expected_recipient)?, cmd.min_amount);
        if let Some(sender) = cmd.expected_sender.as_deref() {
            criteria = criteria.with_sender(Address::parse(sender)?);
        }
        let signed = decode_signed_transaction(&cmd.signed_transaction)?;

        info!("Settling {token} payment on {network}");
        let tx_id =
            until_cancelled(cancel, self.client.broadcast(Bytes::from(signed), network)).await?;
        debug!(
            "Awaiting confirmation of {tx_id} for up to {:?}",
            self.settle_policy.max_wait()
        );

        let tx = await_terminal(
            self.settle_policy,
            cancel,
            self.fetcher(&tx_id, token, network),
        )
        .await?;

        let result = verify(&tx, &criteria);
        info!(
            "Settlement of {tx_id} finished as {} (success={})",
            tx.lifecycle(),
            result.is_valid()
        );

        Ok(SettleOutcome {
            success: result.is_valid(),
            tx_id: tx.id.to_string(),
            sender_address: tx.sender.to_string(),
            recipient_address: tx.recipient.to_string(),
            amount: tx.amount,
            fee: tx.fee,
            status: tx.lifecycle().to_string(),
            block_height: tx.block_height,
            token_type: tx.token.to_string(),
            network: network.to_string(),
            errors: result.messages(),
        })
    }

    /// One fetch-and-normalize attempt per call.
    fn fetcher<'a>(
        &'a self,
        tx_id: &'a TransactionId,
        token: TokenKind,
        network: Network,
    ) -> impl FnMut() -> BoxFuture<'a, Result<CanonicalTransaction>> + 'a {
        let client = &self.client;
        move || {
            async move {
                let raw = client.fetch_transaction(tx_id, network).await?;
                normalize(&raw, token).map_err(Error::from)
            }
            .boxed()
        }
    }
}

/// Parse the asserted token, falling back to native STX.
fn token_or_native(requested: Option<&str>) -> TokenKind {
    match requested.map(str::parse::<TokenKind>) {
        Some(Ok(token)) => token,
        Some(Err(e)) => {
            warn!("{e}; treating payment as {}", TokenKind::NATIVE);
            TokenKind::NATIVE
        }
        None => TokenKind::NATIVE,
    }
}
