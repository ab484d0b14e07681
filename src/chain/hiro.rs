//! [`ChainClient`] backed by the Hiro Stacks API.

use super::payload::RawTransaction;
use super::ChainClient;
use crate::config::ChainConfig;
use crate::error::{Error, Result};
use crate::payment::{Network, TransactionId};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP client for the Hiro Stacks API, one base URL per network.
#[derive(Debug, Clone)]
pub struct HiroClient {
    http: reqwest::Client,
    mainnet_url: String,
    testnet_url: String,
}

impl HiroClient {
    /// Create a client from chain configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("stacks-facilitator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        debug!(
            "Hiro client created (mainnet={}, testnet={})",
            config.mainnet_api_url, config.testnet_api_url
        );

        Ok(Self {
            http,
            mainnet_url: trim_base(&config.mainnet_api_url),
            testnet_url: trim_base(&config.testnet_api_url),
        })
    }

    /// Base URL used for `network`.
    #[must_use]
    pub fn base_url(&self, network: Network) -> &str {
        match network {
            Network::Mainnet => &self.mainnet_url,
            Network::Testnet => &self.testnet_url,
        }
    }
}

#[async_trait]
impl ChainClient for HiroClient {
    async fn fetch_transaction(
        &self,
        id: &TransactionId,
        network: Network,
    ) -> Result<RawTransaction> {
        let url = format!("{}/extended/v1/tx/{id}", self.base_url(network));
        debug!("Fetching transaction {id} from {url}");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("Transaction {id} not found on {network}");
            return Err(Error::NotFound(id.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Hiro API error {status} for {id}: {body}");
            return Err(Error::Network(format!("API error {status}: {body}")));
        }

        response
            .json::<RawTransaction>()
            .await
            .map_err(|e| Error::Network(format!("Failed to decode transaction {id}: {e}")))
    }

    async fn broadcast(&self, signed_tx: Bytes, network: Network) -> Result<TransactionId> {
        let url = format!("{}/v2/transactions", self.base_url(network));
        debug!("Broadcasting {} byte transaction to {url}", signed_tx.len());

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(signed_tx)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Broadcast rejected with {status}: {body}");
            return Err(Error::Broadcast(body));
        }

        let id = broadcast_id(&body)?;
        info!("Broadcast accepted on {network}: {id}");
        Ok(id)
    }
}

/// The node answers with the id as a JSON string; tolerate bare text too.
fn parse_broadcast_response(body: &str) -> String {
    serde_json::from_str::<String>(body).unwrap_or_else(|_| body.trim().trim_matches('"').to_string())
}

/// An accepted broadcast whose id does not parse is a node fault.
fn broadcast_id(body: &str) -> Result<TransactionId> {
    let tx_id = parse_broadcast_response(body);
    TransactionId::parse(&tx_id)
        .map_err(|e| Error::Broadcast(format!("unexpected transaction id {tx_id:?}: {e}")))
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
