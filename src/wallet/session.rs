//! Wallet session tracking driven by connect/disconnect events

use super::{SubscriptionId, WalletEvent, WalletEventKind, WalletProvider};

use solana_sdk::pubkey::Pubkey;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Snapshot of the wallet connection.
///
/// `generation` increases on every transition so async results can be matched
/// against the session that requested them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalletSession {
    address: Option<Pubkey>,
    generation: u64,
}

impl WalletSession {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub fn address(&self) -> Option<Pubkey> {
        self.address
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn connected(&self, address: Pubkey) -> Self {
        Self {
            address: Some(address),
            generation: self.generation + 1,
        }
    }

    fn disconnected(&self) -> Self {
        Self {
            address: None,
            generation: self.generation + 1,
        }
    }
}

/// Shared between the manager and the handlers it registers
struct SessionState {
    session: watch::Sender<WalletSession>,
    changes: broadcast::Sender<WalletSession>,
}

impl SessionState {
    fn apply(&self, event: &WalletEvent) {
        let changed = self.session.send_if_modified(|session| {
            let next = match event {
                WalletEvent::Connected { public_key } => {
                    if session.address == Some(*public_key) {
                        debug!("Ignoring duplicate connect for {}", public_key);
                        return false;
                    }
                    session.connected(*public_key)
                }
                WalletEvent::Disconnected => {
                    if !session.is_connected() {
                        return false;
                    }
                    session.disconnected()
                }
            };
            *session = next;
            true
        });

        if !changed {
            return;
        }

        let current = self.session.borrow().clone();
        match current.address() {
            Some(address) => info!("Wallet connected: {}", address),
            None => info!("Wallet disconnected"),
        }
        crate::metrics::record_session_transition(current.is_connected());

        // No receivers is fine
        let _ = self.changes.send(current);
    }
}

/// Releases wallet handlers when dropped
pub struct Subscription {
    provider: Arc<dyn WalletProvider>,
    ids: Vec<SubscriptionId>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.provider.unsubscribe(id);
        }
        debug!("Wallet handlers released");
    }
}

/// Tracks connect/disconnect lifecycle of the wallet capability
pub struct SessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    state: Arc<SessionState>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionManager {
    /// Create a manager; no handlers are registered until [`SessionManager::attach`]
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (session, _) = watch::channel(WalletSession::default());
        let (changes, _) = broadcast::channel(64);

        Self {
            provider,
            state: Arc::new(SessionState { session, changes }),
            subscription: Mutex::new(None),
        }
    }

    /// Register connect/disconnect handlers, replacing any earlier registration.
    ///
    /// A wallet that is already connected is treated as an immediate connect.
    pub fn attach(&self) {
        let Some(provider) = self.provider.clone() else {
            warn!("No wallet provider available, swaps require a connected wallet");
            return;
        };

        let mut slot = match self.subscription.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Release the previous handlers before registering new ones
        slot.take();

        let ids = [WalletEventKind::Connect, WalletEventKind::Disconnect]
            .into_iter()
            .map(|kind| {
                let state = self.state.clone();
                provider.subscribe(kind, Arc::new(move |event: &WalletEvent| state.apply(event)))
            })
            .collect();

        *slot = Some(Subscription {
            provider: provider.clone(),
            ids,
        });
        drop(slot);

        if provider.is_connected() {
            if let Some(public_key) = provider.public_key() {
                self.state.apply(&WalletEvent::Connected { public_key });
            }
        }
    }

    /// Release the wallet handlers
    pub fn detach(&self) {
        let mut slot = match self.subscription.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.take();
    }

    pub fn is_attached(&self) -> bool {
        match self.subscription.lock() {
            Ok(slot) => slot.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }

    /// Latest session snapshot
    pub fn current(&self) -> WalletSession {
        self.state.session.borrow().clone()
    }

    /// Observe the latest session without being notified of every transition
    pub fn watch(&self) -> watch::Receiver<WalletSession> {
        self.state.session.subscribe()
    }

    /// Receive every session transition
    pub fn subscribe_changes(&self) -> broadcast::Receiver<WalletSession> {
        self.state.changes.subscribe()
    }

    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }
}
