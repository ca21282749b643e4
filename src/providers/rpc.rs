use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use num_bigint::BigUint;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::abi::{self, Selector};
use crate::core::cache::Cache;
use crate::core::config::{ChainConfig, ConfirmationConfig};
use crate::core::{
    CampaignField, CampaignState, CampaignSummary, ContractReader, FieldValue, RoundData,
    SubmissionOutcome, TransactionRequest, TransactionSubmitter,
};
use crate::providers::util::{poll_until, with_retry};

const READ_RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 300;

pub type ReadCache = Cache<(String, CampaignField), FieldValue>;

/// An error object returned by the node itself.
#[derive(Debug, Clone, Deserialize, Error)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct TransactionReceipt {
    status: Option<String>,
}

fn field_selector(field: CampaignField) -> Selector {
    match field {
        CampaignField::Name => abi::NAME,
        CampaignField::Description => abi::DESCRIPTION,
        CampaignField::Deadline => abi::DEADLINE,
        CampaignField::Goal => abi::GOAL,
        CampaignField::Balance => abi::BALANCE,
        CampaignField::Tiers => abi::TIERS,
        CampaignField::Owner => abi::OWNER,
        CampaignField::State => abi::STATE,
    }
}

fn decode_field(field: CampaignField, data: &[u8]) -> Result<FieldValue> {
    Ok(match field {
        CampaignField::Name | CampaignField::Description => {
            FieldValue::Text(abi::decode_string(data)?)
        }
        CampaignField::Deadline | CampaignField::Goal | CampaignField::Balance => {
            FieldValue::Uint(abi::decode_uint(data)?)
        }
        CampaignField::Tiers => FieldValue::Tiers(abi::decode_tiers(data)?),
        CampaignField::Owner => FieldValue::Address(abi::decode_address(data)?),
        CampaignField::State => FieldValue::State(CampaignState::from(&abi::decode_uint(data)?)),
    })
}

fn quantity(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

/// Ethereum JSON-RPC client for campaign, factory and price feed contracts.
///
/// Reads go through `eth_call`. Writes use `eth_sendTransaction`, so the
/// configured account has to be managed by the node.
pub struct RpcClient {
    chain: ChainConfig,
    client: reqwest::Client,
    cache: Arc<ReadCache>,
    account: Option<String>,
    confirmation: ConfirmationConfig,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(chain: &ChainConfig, cache: Arc<ReadCache>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("cfund/0.1").build()?;
        Ok(RpcClient {
            chain: chain.clone(),
            client,
            cache,
            account: None,
            confirmation: ConfirmationConfig::default(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn with_sender(mut self, account: Option<String>, confirmation: ConfirmationConfig) -> Self {
        self.account = account;
        self.confirmation = confirmation;
        self
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        retries: usize,
    ) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        debug!(%body, "Sending JSON-RPC request");

        let response = with_retry(
            || self.client.post(&self.chain.rpc_url).json(&body).send(),
            retries,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for {} URL: {}", e, method, self.chain.rpc_url))?;

        if !response.status().is_success() {
            bail!("HTTP error: {} for {}", response.status(), method);
        }

        let text = response.text().await?;
        let envelope: RpcResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON-RPC response for {method}: '{text}'"))?;

        if let Some(error) = envelope.error {
            return Err(error.into());
        }
        serde_json::from_value(envelope.result)
            .with_context(|| format!("Unexpected result for {method}"))
    }

    async fn call(&self, to: &str, selector: Selector) -> Result<Vec<u8>> {
        let params = json!([{ "to": to, "data": abi::to_hex(&selector) }, "latest"]);
        let result: String = self.request("eth_call", params, READ_RETRIES).await?;
        abi::from_hex(&result)
    }

    pub async fn chain_id(&self) -> Result<u64> {
        let result: String = self.request("eth_chainId", json!([]), READ_RETRIES).await?;
        u64::from_str_radix(result.trim_start_matches("0x"), 16)
            .with_context(|| format!("Invalid chain id: '{result}'"))
    }

    async fn receipt(&self, tx_hash: &str) -> Result<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", json!([tx_hash]), READ_RETRIES)
            .await
    }
}

#[async_trait]
impl ContractReader for RpcClient {
    #[instrument(name = "ContractRead", skip(self), fields(contract = %contract, field = %field))]
    async fn read(&self, contract: &str, field: CampaignField) -> Result<FieldValue> {
        let key = (contract.to_lowercase(), field);
        if field.is_immutable() {
            if let Some(cached) = self.cache.get(&key).await {
                return Ok(cached);
            }
        }

        let data = self.call(contract, field_selector(field)).await?;
        let value = decode_field(field, &data)
            .with_context(|| format!("Failed to decode {field} of {contract}"))?;

        if field.is_immutable() {
            self.cache.put(key, value.clone()).await;
        }
        Ok(value)
    }

    #[instrument(name = "PriceFeedRead", skip(self), fields(feed = %feed))]
    async fn latest_round(&self, feed: &str) -> Result<RoundData> {
        let data = self.call(feed, abi::LATEST_ROUND_DATA).await?;
        abi::decode_round(&data).with_context(|| format!("Failed to decode round data of {feed}"))
    }

    #[instrument(name = "FactoryRead", skip(self), fields(factory = %factory))]
    async fn campaigns(&self, factory: &str) -> Result<Vec<CampaignSummary>> {
        let data = self.call(factory, abi::ALL_CAMPAIGNS).await?;
        abi::decode_campaigns(&data)
            .with_context(|| format!("Failed to decode campaigns of {factory}"))
    }
}

#[async_trait]
impl TransactionSubmitter for RpcClient {
    #[instrument(name = "Submit", skip(self, request), fields(contract = %contract, method = %request.method))]
    async fn submit(
        &self,
        contract: &str,
        request: &TransactionRequest,
    ) -> Result<SubmissionOutcome> {
        let from = self
            .account
            .as_deref()
            .context("No sender account configured")?;

        let chain_id = self.chain_id().await?;
        if chain_id != self.chain.chain_id {
            bail!(
                "RPC endpoint is on chain {}, expected {}",
                chain_id,
                self.chain.chain_id
            );
        }

        let tx = json!({
            "from": from,
            "to": contract,
            "data": abi::to_hex(&request.calldata()?),
            "value": quantity(&request.value),
        });

        // Sending is never retried; a resend could duplicate the transaction.
        let tx_hash: String = match self.request("eth_sendTransaction", json!([tx]), 0).await {
            Ok(hash) => hash,
            Err(e) => {
                return match e.downcast_ref::<RpcError>() {
                    Some(rejection) => {
                        warn!(error = %rejection, "Node rejected transaction");
                        Ok(SubmissionOutcome::Rejected {
                            tx_hash: None,
                            reason: rejection.message.clone(),
                        })
                    }
                    None => Err(e),
                };
            }
        };
        info!(%tx_hash, "Transaction sent, waiting for receipt");

        let receipt = poll_until(
            || self.receipt(&tx_hash),
            self.confirmation.max_polls,
            self.confirmation.poll_interval_ms,
        )
        .await?;

        match receipt {
            Some(receipt) if receipt.status.as_deref() == Some("0x1") => {
                Ok(SubmissionOutcome::Confirmed { tx_hash })
            }
            Some(receipt) => Ok(SubmissionOutcome::Rejected {
                reason: format!(
                    "Transaction reverted (status {})",
                    receipt.status.as_deref().unwrap_or("unknown")
                ),
                tx_hash: Some(tx_hash),
            }),
            None => bail!(
                "Transaction {} not confirmed after {} polls",
                tx_hash,
                self.confirmation.max_polls
            ),
        }
    }
}
