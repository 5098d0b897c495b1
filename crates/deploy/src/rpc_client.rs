//! [`ChainClient`] backed by an Ethereum JSON-RPC endpoint.
//!
//! Transactions are sent with `eth_sendTransaction` from accounts managed by the
//! node, so no key material ever passes through this crate.

use std::time::Duration;

use alloy_core::primitives::{Address, B256, Bytes, U64, U256};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::{
    rpc,
    traits::ChainClient,
    types::{DeployedContractHandle, DeploymentTransaction, ReadCall, Signer, TransactionRequest},
};

/// Default local node endpoint.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Connection and confirmation policy of an [`RpcChainClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcClientConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Number of blocks, including the inclusion block, before a deployment counts as final.
    pub confirmations: u64,
    /// Maximum time to wait for a deployment to be confirmed.
    pub confirmation_timeout_secs: u64,
    /// Delay between receipt polls.
    pub poll_interval_ms: u64,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            confirmations: 1,
            confirmation_timeout_secs: 120,
            poll_interval_ms: 1000,
        }
    }
}

/// Subset of a transaction receipt needed to confirm a deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
    transaction_hash: B256,
    block_number: Option<U64>,
    contract_address: Option<Address>,
    status: Option<U64>,
}

/// JSON-RPC chain client.
#[derive(Debug, Clone)]
pub struct RpcChainClient {
    client: reqwest::Client,
    url: Url,
    confirmations: u64,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl RpcChainClient {
    pub fn new(config: RpcClientConfig) -> Result<Self> {
        let url = Url::parse(&config.rpc_url)
            .with_context(|| format!("Invalid RPC URL: {}", config.rpc_url))?;

        Ok(Self {
            client: rpc::create_client()?,
            url,
            confirmations: config.confirmations.max(1),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T> {
        rpc::json_rpc_call(&self.client, self.url.as_str(), method, params).await
    }

    async fn block_number(&self) -> Result<u64> {
        let number: U64 = self.call("eth_blockNumber", vec![]).await?;
        Ok(number.to())
    }

    /// Fetch the receipt of `hash` once it is buried `confirmations` deep.
    async fn confirmed_receipt(&self, hash: B256) -> Result<Option<Receipt>> {
        let receipt: Option<Receipt> = self
            .call("eth_getTransactionReceipt", vec![json!(hash)])
            .await?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };
        let Some(included_in) = receipt.block_number else {
            return Ok(None);
        };

        // A revert is final, no point waiting for depth.
        if receipt.status == Some(U64::ZERO) {
            return Ok(Some(receipt));
        }

        let latest = self.block_number().await?;
        let depth = latest.saturating_sub(included_in.to()) + 1;
        if depth < self.confirmations {
            tracing::debug!(
                tx_hash = %hash,
                depth,
                required = self.confirmations,
                "Waiting for confirmations"
            );
            return Ok(None);
        }

        Ok(Some(receipt))
    }
}

impl ChainClient for RpcChainClient {
    async fn signers(&self) -> Result<Vec<Signer>> {
        let accounts: Vec<Address> = self
            .call("eth_accounts", vec![])
            .await
            .context("Failed to list accounts")?;
        Ok(accounts.into_iter().map(Signer::from).collect())
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.call("eth_getBalance", vec![json!(address), json!("latest")])
            .await
            .context("Failed to get balance")
    }

    async fn gas_price(&self) -> Result<u128> {
        let price: U256 = self
            .call("eth_gasPrice", vec![])
            .await
            .context("Failed to get gas price")?;
        u128::try_from(price)
            .ok()
            .context("Gas price does not fit in 128 bits")
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<B256> {
        self.call("eth_sendTransaction", vec![json!(request)])
            .await
            .context("Failed to send transaction")
    }

    async fn wait_for_confirmation(
        &self,
        transaction: &DeploymentTransaction,
    ) -> Result<DeployedContractHandle> {
        let hash = transaction.hash;
        tracing::info!(
            tx_hash = %hash,
            confirmations = self.confirmations,
            timeout = ?self.confirmation_timeout,
            "Waiting for deployment to be confirmed..."
        );

        let receipt = rpc::wait_for(
            &format!("confirmation of {}", hash),
            self.confirmation_timeout,
            self.poll_interval,
            || self.confirmed_receipt(hash),
        )
        .await?;

        handle_from_receipt(receipt)
    }

    async fn call_uint(&self, contract: Address, call: &ReadCall) -> Result<U256> {
        let output: Bytes = self
            .call(
                "eth_call",
                vec![
                    json!({ "to": contract, "data": call.calldata() }),
                    json!("latest"),
                ],
            )
            .await
            .with_context(|| format!("Failed to call {}", call.signature))?;

        decode_uint(&output)
    }
}

/// Turn a confirmed receipt into a handle, rejecting reverts and non-creations.
fn handle_from_receipt(receipt: Receipt) -> Result<DeployedContractHandle> {
    if receipt.status == Some(U64::ZERO) {
        anyhow::bail!("Transaction {} reverted", receipt.transaction_hash);
    }

    let address = receipt.contract_address.with_context(|| {
        format!(
            "Receipt of {} has no contract address",
            receipt.transaction_hash
        )
    })?;

    Ok(DeployedContractHandle {
        address,
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number.map(|n| n.to()).unwrap_or_default(),
    })
}

/// Decode the first ABI word of a call result as an unsigned integer.
fn decode_uint(output: &[u8]) -> Result<U256> {
    if output.is_empty() {
        anyhow::bail!("Call returned no data (no code at address?)");
    }
    if output.len() < 32 {
        anyhow::bail!(
            "Call returned {} bytes, expected at least 32 (ABI mismatch?)",
            output.len()
        );
    }
    Ok(U256::from_be_slice(&output[..32]))
}
