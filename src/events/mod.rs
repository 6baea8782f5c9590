//! Host frame events
//!
//! Messages posted to the page embedding the widget. Delivery is best effort:
//! no acknowledgement, no retry, and a missing host is a silent no-op.

use crate::config::HostConfig;
use crate::error::SwapError;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Outcome carried by a `transactionStatus` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransactionStatus {
    Success {
        signature: String,
        #[serde(rename = "tokenAmount")]
        token_amount: String,
    },
    Error {
        error: String,
    },
}

/// Messages sent to the hosting frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostEvent {
    #[serde(rename_all = "camelCase")]
    WalletConnected { public_key: String },
    WalletDisconnected,
    TransactionStatus(TransactionStatus),
}

impl HostEvent {
    pub fn wallet_connected(public_key: &Pubkey) -> Self {
        HostEvent::WalletConnected {
            public_key: public_key.to_string(),
        }
    }

    pub fn transaction_failed(error: &SwapError) -> Self {
        HostEvent::TransactionStatus(TransactionStatus::Error {
            error: error.to_string(),
        })
    }

    pub fn transaction_succeeded(signature: &Signature, token_amount: Decimal) -> Self {
        HostEvent::TransactionStatus(TransactionStatus::Success {
            signature: signature.to_string(),
            token_amount: token_amount.to_string(),
        })
    }

    /// Event name for metrics
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::WalletConnected { .. } => "wallet_connected",
            HostEvent::WalletDisconnected => "wallet_disconnected",
            HostEvent::TransactionStatus(TransactionStatus::Success { .. }) => "transaction_success",
            HostEvent::TransactionStatus(TransactionStatus::Error { .. }) => "transaction_error",
        }
    }

    /// JSON payload as posted to the parent frame
    pub fn to_message(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Outbound channel to the hosting frame
pub trait HostChannel: Send + Sync {
    fn notify(&self, event: &HostEvent);
}

/// Host channel backed by a broadcast sender, for embedders that forward messages themselves
pub struct BroadcastHostChannel {
    tx: broadcast::Sender<HostEvent>,
}

impl BroadcastHostChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.tx.subscribe()
    }
}

impl HostChannel for BroadcastHostChannel {
    fn notify(&self, event: &HostEvent) {
        // No receivers, that's okay
        let _ = self.tx.send(event.clone());
    }
}

/// Decides which transitions reach the host and forwards them
#[derive(Clone)]
pub struct HostNotifier {
    channel: Option<Arc<dyn HostChannel>>,
    config: HostConfig,
}

impl HostNotifier {
    pub fn new(channel: Option<Arc<dyn HostChannel>>, config: HostConfig) -> Self {
        Self { channel, config }
    }

    pub fn session_connected(&self, public_key: &Pubkey) {
        self.post(HostEvent::wallet_connected(public_key));
    }

    pub fn session_disconnected(&self) {
        self.post(HostEvent::WalletDisconnected);
    }

    pub fn transaction_failed(&self, error: &SwapError) {
        if self.config.notify_failure && error.is_host_reportable() {
            self.post(HostEvent::transaction_failed(error));
        }
    }

    pub fn transaction_succeeded(&self, signature: &Signature, token_amount: Decimal) {
        if self.config.notify_success {
            self.post(HostEvent::transaction_succeeded(signature, token_amount));
        }
    }

    fn post(&self, event: HostEvent) {
        let Some(channel) = &self.channel else {
            return;
        };
        debug!("Posting {} to host frame", event.name());
        crate::metrics::record_host_event(event.name());
        channel.notify(&event);
    }
}
