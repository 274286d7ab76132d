//! Blockchain RPC client with failover, timeouts and a signing provider.
//!
//! # Responsibilities
//! - Connect to the primary and failover JSON-RPC endpoints
//! - Execute read-only `eth_call`s, falling over on transport failures
//! - Broadcast signed transactions through the primary endpoint
//! - Verify the endpoint serves the configured chain

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::TransportError;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::blockchain::wallet::Wallet;
use crate::config::NetworkConfig;
use crate::observability::metrics;

type DynProvider = Arc<dyn Provider + Send + Sync>;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// Read providers (primary + failovers).
    providers: Vec<DynProvider>,
    /// Primary endpoint with the wallet attached, when a key is configured.
    signer: Option<DynProvider>,
    sender: Option<Address>,
    config: NetworkConfig,
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client. Does not touch the network.
    pub fn new(config: &NetworkConfig, wallet: Option<&Wallet>) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let mut providers: Vec<DynProvider> =
            vec![Arc::new(ProviderBuilder::new().connect_http(primary_url.clone()))];
        for url_str in &config.failover_urls {
            match url_str.parse::<url::Url>() {
                Ok(url) => providers.push(Arc::new(ProviderBuilder::new().connect_http(url))),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let signer = wallet.map(|w| {
            Arc::new(
                ProviderBuilder::new()
                    .wallet(w.ethereum_wallet())
                    .connect_http(primary_url.clone()),
            ) as DynProvider
        });

        tracing::info!(
            rpc_url = %config.rpc_url,
            failovers = providers.len() - 1,
            chain_id = config.chain_id,
            can_sign = signer.is_some(),
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            signer,
            sender: wallet.map(Wallet::address),
            config: config.clone(),
            timeout_duration,
        })
    }

    /// Run `op` against each provider in turn until one answers.
    ///
    /// A JSON-RPC error object is the node's verdict and is returned without failover;
    /// only transport failures and timeouts move on to the next endpoint.
    async fn with_failover<T, F, Fut>(&self, method: &'static str, op: F) -> BlockchainResult<T>
    where
        F: Fn(DynProvider) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, op(provider.clone())).await {
                Ok(Ok(result)) => {
                    metrics::record_endpoint_health(i, true);
                    return Ok(result);
                }
                Ok(Err(e)) => {
                    if let Some(err) = node_error(&e) {
                        metrics::record_endpoint_health(i, true);
                        return Err(err);
                    }
                    metrics::record_endpoint_health(i, false);
                    tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    metrics::record_endpoint_health(i, false);
                    tracing::warn!(provider_idx = i, method, "RPC timeout, trying next provider");
                }
            }
        }
        Err(BlockchainError::Rpc(format!("All RPC providers failed ({method})")))
    }

    /// Read-only contract call.
    pub async fn call(&self, to: Address, data: Bytes) -> BlockchainResult<Bytes> {
        let request = TransactionRequest::default().with_to(to).with_input(data);
        self.with_failover("eth_call", |provider| {
            let request = request.clone();
            async move { provider.call(request).into_future().await }
        })
        .await
    }

    /// Sign and broadcast a contract call. Returns once the endpoint accepted it.
    pub async fn send(&self, to: Address, data: Bytes) -> BlockchainResult<TxHash> {
        let (signer, from) = match (&self.signer, self.sender) {
            (Some(signer), Some(from)) => (signer, from),
            _ => return Err(BlockchainError::NoSigner),
        };

        self.check_gas_price().await?;

        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(data);

        let pending = match timeout(self.timeout_duration, signer.send_transaction(request)).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => {
                return Err(node_error(&e).unwrap_or_else(|| BlockchainError::Rpc(e.to_string())))
            }
            Err(_) => return Err(BlockchainError::Timeout(self.config.rpc_timeout_secs)),
        };

        let tx_hash = *pending.tx_hash();
        tracing::info!(tx_hash = %tx_hash, to = %to, "Transaction broadcast");
        Ok(tx_hash)
    }

    async fn check_gas_price(&self) -> BlockchainResult<()> {
        let gas_price_gwei = self.get_gas_price().await? / 1_000_000_000;
        if gas_price_gwei > u128::from(self.config.max_gas_price_gwei) {
            return Err(BlockchainError::GasPriceTooHigh {
                current_gwei: u64::try_from(gas_price_gwei).unwrap_or(u64::MAX),
                max_gwei: self.config.max_gas_price_gwei,
            });
        }
        Ok(())
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("eth_chainId", |provider| async move {
            provider.get_chain_id().await
        })
        .await
        .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("eth_blockNumber", |provider| async move {
            provider.get_block_number().await
        })
        .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.with_failover("eth_getTransactionReceipt", |provider| async move {
            provider.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        self.with_failover("eth_gasPrice", |provider| async move {
            provider.get_gas_price().await
        })
        .await
    }

    /// Address writes are signed with, if any.
    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

/// Classify a JSON-RPC error object returned by the node.
fn node_error(error: &TransportError) -> Option<BlockchainError> {
    let payload = error.as_error_resp()?;
    let message = payload.message.to_string();
    if message.to_ascii_lowercase().contains("revert") {
        Some(BlockchainError::Reverted(message))
    } else {
        Some(BlockchainError::Rpc(message))
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("failovers", &(self.providers.len() - 1))
            .field("chain_id", &self.config.chain_id)
            .field("sender", &self.sender)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> NetworkConfig {
        NetworkConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 2,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn test_client_creation_is_offline() {
        let client = BlockchainClient::new(&test_config(), None).unwrap();
        assert!(client.sender().is_none());
        assert_eq!(client.config().chain_id, 31337);
    }

    #[test]
    fn test_invalid_primary_url() {
        let config = NetworkConfig {
            rpc_url: "not a url".to_string(),
            ..test_config()
        };
        assert!(matches!(
            BlockchainClient::new(&config, None),
            Err(BlockchainError::Rpc(_))
        ));
    }

    #[tokio::test]
    async fn test_rpc_failover_exhausted() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        config.failover_urls.push("::invalid::".to_string());

        let client = BlockchainClient::new(&config, None).unwrap();
        let result = client.get_chain_id().await;
        assert!(result.unwrap_err().to_string().contains("All RPC providers failed"));
    }

    #[tokio::test]
    async fn test_verify_chain_id_unreachable() {
        let client = BlockchainClient::new(&test_config(), None).unwrap();
        assert!(matches!(
            client.verify_chain_id().await,
            Err(BlockchainError::Rpc(_))
        ));
    }

    #[tokio::test]
    async fn test_send_without_signer() {
        let client = BlockchainClient::new(&test_config(), None).unwrap();
        let result = client.send(Address::ZERO, Bytes::new()).await;
        assert_eq!(result, Err(BlockchainError::NoSigner));
    }
}
