//! Ledger RPC provider with multi-endpoint support and automatic failover

use super::LedgerRpc;
use crate::config::NetworkConfig;
use crate::error::RpcError;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Multi-endpoint wrapper with automatic failover
pub struct RpcProvider {
    /// One client per configured endpoint
    clients: Vec<RpcClient>,
    /// Current active client index
    current: AtomicUsize,
}

impl RpcProvider {
    /// Create a new provider for the configured endpoints
    pub fn new(config: &NetworkConfig) -> Result<Self, RpcError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let commitment = config.commitment.to_config();

        let clients: Vec<RpcClient> = config
            .rpc_urls
            .iter()
            .map(|url| {
                debug!("Added RPC endpoint: {}", url);
                RpcClient::new_with_timeout_and_commitment(url.clone(), timeout, commitment)
            })
            .collect();

        if clients.is_empty() {
            return Err(RpcError::AllEndpointsFailed(0));
        }

        Ok(Self {
            clients,
            current: AtomicUsize::new(0),
        })
    }

    /// Get the active client
    fn client(&self) -> &RpcClient {
        let idx = self.current.load(Ordering::Relaxed);
        &self.clients[idx % self.clients.len()]
    }

    /// Switch to next endpoint
    fn failover(&self, method: &str) {
        let current = self.current.load(Ordering::Relaxed);
        let next = (current + 1) % self.clients.len();
        self.current.store(next, Ordering::Relaxed);
        crate::metrics::record_rpc_failover(method);
        warn!("RPC failover to endpoint {} after {} failed", next, method);
    }

    /// URL of the active endpoint
    pub fn endpoint(&self) -> String {
        self.client().url()
    }

    pub fn endpoint_count(&self) -> usize {
        self.clients.len()
    }
}

#[async_trait]
impl LedgerRpc for RpcProvider {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        for _ in 0..self.clients.len() {
            match self.client().get_balance(address).await {
                Ok(lamports) => return Ok(lamports),
                Err(e) => {
                    warn!(
                        "Failed to get balance for {} from {}: {}",
                        address,
                        self.endpoint(),
                        e
                    );
                    self.failover("getBalance");
                }
            }
        }

        Err(RpcError::AllEndpointsFailed(self.clients.len()))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        for _ in 0..self.clients.len() {
            match self.client().get_latest_blockhash().await {
                Ok(hash) => return Ok(hash),
                Err(e) => {
                    warn!(
                        "Failed to get latest blockhash from {}: {}",
                        self.endpoint(),
                        e
                    );
                    self.failover("getLatestBlockhash");
                }
            }
        }

        Err(RpcError::AllEndpointsFailed(self.clients.len()))
    }

    async fn health_check(&self) -> bool {
        match self.client().get_health().await {
            Ok(()) => true,
            Err(e) => {
                error!("Health check failed for {}: {}", self.endpoint(), e);
                false
            }
        }
    }
}
