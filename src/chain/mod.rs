//! Chain module - ledger RPC access and balance tracking
//!
//! This module provides:
//! - The [`LedgerRpc`] seam used by everything that talks to the ledger
//! - Multi-endpoint RPC provider with automatic failover
//! - Session-scoped balance fetching with stale result rejection

pub mod balance;
pub mod provider;

pub use balance::{display_balance, Balance, BalanceFetcher};
pub use provider::RpcProvider;

use crate::error::RpcError;

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;

/// Ledger queries needed by the widget
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Spendable balance of `address` in lamports
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError>;

    /// Most recent blockhash, never cached
    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;

    async fn health_check(&self) -> bool;
}
