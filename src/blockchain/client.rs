//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to a network's JSON-RPC endpoint (primary + failovers)
//! - Query chain state (block number, balances, fees, receipts)
//! - Sign and broadcast sweep transfers
//! - Handle timeouts and network errors gracefully

use alloy::primitives::{keccak256, Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::{TransportError, TransportResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::accounts::Account;
use crate::blockchain::rpc::{NetworkConnector, NetworkRpc};
use crate::blockchain::transaction::build_transfer;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, FeeParameters, ReceiptSummary, TransferRequest,
};
use crate::blockchain::wallet::Wallet;
use crate::registry::NetworkProfile;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Network this client talks to.
    profile: NetworkProfile,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a client for `profile` without touching the network.
    pub fn new(profile: &NetworkProfile, rpc_timeout: Duration) -> BlockchainResult<Self> {
        let primary = profile.resolve_rpc_url()?;
        let primary_url: url::Url = primary
            .parse()
            .map_err(|e| BlockchainError::InvalidEndpoint(format!("'{}': {}", primary, e)))?;

        let mut providers = vec![Arc::new(ProviderBuilder::new().connect_http(primary_url)) as DynProvider];

        for url_str in profile.resolve_failover_urls() {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(Arc::new(ProviderBuilder::new().connect_http(url))),
                Err(_) => tracing::warn!(network = %profile.name, url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        Ok(Self {
            providers,
            profile: profile.clone(),
            timeout_duration: rpc_timeout,
        })
    }

    /// Create a client and verify the endpoint serves the expected chain.
    pub async fn connect(profile: &NetworkProfile, rpc_timeout: Duration) -> BlockchainResult<Self> {
        let client = Self::new(profile, rpc_timeout)?;
        client.verify_chain_id().await?;
        let block = client.get_block_number().await?;
        tracing::info!(
            network = %profile.name,
            chain_id = profile.chain_id,
            latest_block = block,
            "Connected"
        );
        Ok(client)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id != self.profile.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.profile.chain_id,
                actual: chain_id,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<u64> {
        self.call("get_chain_id", |p| async move { p.get_chain_id().await }).await
    }

    /// Run `op` against each provider in turn.
    ///
    /// Transport failures and timeouts move on to the next provider; an error
    /// answered by the node itself is returned immediately.
    async fn call<T, F, Fut>(&self, op: &'static str, f: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut last_error = None;
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, f(provider.clone())).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    let err = BlockchainError::from_transport(e);
                    if !err.kind().is_transient() {
                        return Err(err);
                    }
                    tracing::warn!(network = %self.profile.name, provider_idx = i, op, error = %err, "RPC error, trying next provider");
                    last_error = Some(err);
                }
                Err(_) => {
                    tracing::warn!(network = %self.profile.name, provider_idx = i, op, "RPC timeout, trying next provider");
                    last_error = Some(BlockchainError::Timeout(self.timeout_duration.as_secs()));
                }
            }
        }
        Err(last_error.unwrap_or_else(|| BlockchainError::Transport(format!("no providers for {}", op))))
    }

    /// Get the network profile.
    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }
}

#[async_trait]
impl NetworkRpc for BlockchainClient {
    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.call("get_block_number", |p| async move { p.get_block_number().await }).await
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.call("get_balance", |p| async move { p.get_balance(address).await }).await
    }

    async fn get_fee_parameters(&self) -> BlockchainResult<FeeParameters> {
        let gas_price = self
            .call("get_gas_price", |p| async move { p.get_gas_price().await })
            .await?;
        if gas_price > 0 {
            return Ok(FeeParameters {
                gas_price: Some(gas_price),
                max_fee_per_gas: None,
            });
        }

        // Some nodes answer 0 for eth_gasPrice; fall back to the 1559 estimate.
        let max_fee_per_gas = match self
            .call("estimate_eip1559_fees", |p| async move { p.estimate_eip1559_fees().await })
            .await
        {
            Ok(estimate) if estimate.max_fee_per_gas > 0 => Some(estimate.max_fee_per_gas),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(network = %self.profile.name, error = %e, "No EIP-1559 fee data");
                None
            }
        };
        Ok(FeeParameters {
            gas_price: None,
            max_fee_per_gas,
        })
    }

    async fn submit_transfer(&self, from: &Account, request: &TransferRequest) -> BlockchainResult<TxHash> {
        let wallet = Wallet::for_account(from, self.profile.chain_id)?;
        let sender = wallet.address();
        let nonce = self
            .call("get_transaction_count", |p| async move {
                p.get_transaction_count(sender).pending().await
            })
            .await?;

        let tx = build_transfer(&wallet, nonce, request);
        let raw = wallet.sign_transaction(tx).await?;
        let local_hash = keccak256(&raw);

        let sent = self
            .call("send_raw_transaction", |p| {
                let raw = raw.clone();
                async move {
                    let pending = p.send_raw_transaction(&raw).await?;
                    Ok::<_, TransportError>(*pending.tx_hash())
                }
            })
            .await;
        let tx_hash = settle_broadcast(&self.profile.name, local_hash, sent)?;

        tracing::info!(
            network = %self.profile.name,
            from = %sender,
            to = %request.to,
            nonce,
            tx_hash = %tx_hash,
            "Transfer broadcast"
        );
        Ok(tx_hash)
    }

    async fn get_transaction_receipt(&self, tx_hash: TxHash) -> BlockchainResult<Option<ReceiptSummary>> {
        let receipt = self
            .call("get_transaction_receipt", |p| async move { p.get_transaction_receipt(tx_hash).await })
            .await?;
        Ok(receipt.map(|r| ReceiptSummary {
            success: r.status(),
            block_number: r.block_number,
            gas_used: r.gas_used,
        }))
    }
}

/// Resolve a broadcast against the hash computed from the signed bytes.
///
/// When a provider accepts the transaction but times out, failover resends
/// it and the next node answers "already known"; the transfer is in flight
/// under `local_hash` either way.
fn settle_broadcast(network: &str, local_hash: TxHash, sent: BlockchainResult<TxHash>) -> BlockchainResult<TxHash> {
    match sent {
        Ok(node_hash) => {
            if node_hash != local_hash {
                tracing::warn!(network, %node_hash, %local_hash, "Node returned an unexpected transaction hash");
            }
            Ok(local_hash)
        }
        Err(e) if e.is_already_known() => {
            tracing::info!(network, tx_hash = %local_hash, "Transaction already known to node");
            Ok(local_hash)
        }
        Err(e) => Err(e),
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("network", &self.profile.name)
            .field("chain_id", &self.profile.chain_id)
            .field("providers", &self.providers.len())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}

/// Connector producing alloy-backed clients.
#[derive(Debug, Clone)]
pub struct AlloyConnector {
    rpc_timeout: Duration,
}

impl AlloyConnector {
    pub fn new(rpc_timeout: Duration) -> Self {
        Self { rpc_timeout }
    }
}

#[async_trait]
impl NetworkConnector for AlloyConnector {
    async fn connect(&self, profile: &NetworkProfile) -> BlockchainResult<Arc<dyn NetworkRpc>> {
        let client = BlockchainClient::connect(profile, self.rpc_timeout).await?;
        Ok(Arc::new(client))
    }
}
