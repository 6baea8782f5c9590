//! Wallet module - the injected wallet capability and session tracking
//!
//! The browser wallet is reached only through the [`WalletProvider`] trait so
//! that embedders can bridge a real extension and tests can supply a double.

pub mod session;

pub use session::{SessionManager, Subscription, WalletSession};

use crate::error::WalletError;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;

/// Lifecycle signals a wallet can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletEventKind {
    Connect,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    Connected { public_key: Pubkey },
    Disconnected,
}

impl WalletEvent {
    pub fn kind(&self) -> WalletEventKind {
        match self {
            WalletEvent::Connected { .. } => WalletEventKind::Connect,
            WalletEvent::Disconnected => WalletEventKind::Disconnect,
        }
    }
}

pub type WalletEventHandler = Arc<dyn Fn(&WalletEvent) + Send + Sync>;

/// Handle returned by [`WalletProvider::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Wallet capability injected by the hosting environment
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Register `handler` for events of `kind`
    fn subscribe(&self, kind: WalletEventKind, handler: WalletEventHandler) -> SubscriptionId;

    /// Release a handler registered with [`WalletProvider::subscribe`]
    fn unsubscribe(&self, id: SubscriptionId);

    fn is_connected(&self) -> bool;

    fn public_key(&self) -> Option<Pubkey>;

    /// Ask the user to approve `transaction`, then submit it.
    ///
    /// Resolves only once the wallet answers; there is no timeout.
    async fn sign_and_send_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Signature, WalletError>;
}
