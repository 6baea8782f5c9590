//! Top-level wiring of the swap widget
//!
//! The rendering layer owns a [`SwapWidget`], spawns [`SwapWidget::run`] and
//! forwards user intents (`swap`, amount edits for `quote`).

use crate::chain::{display_balance, Balance, BalanceFetcher, LedgerRpc, RpcProvider};
use crate::config::Settings;
use crate::coordination::{SwapOrchestrator, SwapReceipt, SwapStatus};
use crate::error::{SwapError, SwapResult};
use crate::events::{HostChannel, HostNotifier};
use crate::tx::{format_quote, TransactionBuilder};
use crate::wallet::{SessionManager, WalletProvider, WalletSession};

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Swap widget core
pub struct SwapWidget {
    settings: Settings,
    rpc: Arc<dyn LedgerRpc>,
    sessions: SessionManager,
    balance: BalanceFetcher,
    notifier: HostNotifier,
    orchestrator: SwapOrchestrator,
    shutdown: watch::Sender<bool>,
}

impl SwapWidget {
    /// Wire the widget from explicit collaborators
    pub fn new(
        settings: Settings,
        wallet: Option<Arc<dyn WalletProvider>>,
        rpc: Arc<dyn LedgerRpc>,
        host: Option<Arc<dyn HostChannel>>,
    ) -> SwapResult<Self> {
        settings
            .validate()
            .map_err(|e| SwapError::Config(format!("{:#}", e)))?;
        let receiver = settings
            .receiver()
            .map_err(|e| SwapError::Config(format!("{:#}", e)))?;

        let sessions = SessionManager::new(wallet.clone());
        let balance = BalanceFetcher::new(rpc.clone(), sessions.watch());
        let notifier = HostNotifier::new(host, settings.host.clone());
        let orchestrator = SwapOrchestrator::new(
            wallet,
            sessions.watch(),
            balance.clone(),
            TransactionBuilder::new(rpc.clone(), receiver),
            notifier.clone(),
            settings.swap.exchange_rate,
        );
        let (shutdown, _) = watch::channel(false);

        info!(
            "Swap widget ready: 1 {} = {} {}, receiver {}",
            settings.swap.native_symbol,
            settings.swap.exchange_rate,
            settings.swap.token_symbol,
            receiver
        );

        Ok(Self {
            settings,
            rpc,
            sessions,
            balance,
            notifier,
            orchestrator,
            shutdown,
        })
    }

    /// Wire the widget against the configured RPC endpoints
    pub fn with_rpc_provider(
        settings: Settings,
        wallet: Option<Arc<dyn WalletProvider>>,
        host: Option<Arc<dyn HostChannel>>,
    ) -> SwapResult<Self> {
        let rpc = RpcProvider::new(&settings.network)
            .map_err(|e| SwapError::Config(e.to_string()))?;
        Self::new(settings, wallet, Arc::new(rpc), host)
    }

    /// Event loop: tracks the wallet session until [`SwapWidget::stop`].
    ///
    /// Wallet handlers are registered on entry and released on every exit,
    /// including when this future is dropped.
    pub async fn run(&self) {
        let mut changes = self.sessions.subscribe_changes();
        let mut shutdown = self.shutdown.subscribe();
        let _attached = Attached::new(&self.sessions);

        info!("Swap widget started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                change = changes.recv() => match change {
                    Ok(session) => {
                        self.handle_session_change(&session);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} session changes, resyncing", skipped);
                        let session = self.sessions.current();
                        self.handle_session_change(&session);
                    }
                    Err(RecvError::Closed) => break,
                },

                _ = shutdown.changed() => {}
            }
        }

        info!("Swap widget stopped");
    }

    /// Forward a session transition to the balance fetcher and the host
    fn handle_session_change(&self, session: &WalletSession) {
        debug!("Session change: generation {}", session.generation());
        match session.address() {
            Some(address) => self.notifier.session_connected(&address),
            None => self.notifier.session_disconnected(),
        }
        // The fetch runs detached; stale results are dropped by the fetcher
        self.balance.on_session_changed(session);
    }

    /// Stop the event loop
    pub fn stop(&self) {
        self.shutdown.send_replace(true);
        info!("Swap widget shutdown initiated");
    }

    /// User clicked swap
    pub async fn swap(&self, amount_text: &str) -> SwapResult<SwapReceipt> {
        self.orchestrator.swap(amount_text).await
    }

    /// Output field text for the typed amount
    pub fn quote(&self, amount_text: &str) -> String {
        format_quote(amount_text, self.settings.swap.exchange_rate)
    }

    pub fn balance(&self) -> Option<Balance> {
        self.balance.current()
    }

    pub fn balance_display(&self) -> String {
        display_balance(self.balance.current())
    }

    /// Query the balance again for the live session
    pub async fn refresh_balance(&self) -> Option<Balance> {
        self.balance.refresh().await
    }

    pub fn session(&self) -> WalletSession {
        self.sessions.current()
    }

    pub fn status(&self) -> SwapStatus {
        self.orchestrator.status()
    }

    pub fn watch_status(&self) -> watch::Receiver<SwapStatus> {
        self.orchestrator.watch_status()
    }

    pub async fn health_check(&self) -> bool {
        self.rpc.health_check().await
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Keeps wallet handlers registered for its lifetime
struct Attached<'a> {
    sessions: &'a SessionManager,
}

impl<'a> Attached<'a> {
    fn new(sessions: &'a SessionManager) -> Self {
        sessions.attach();
        Self { sessions }
    }
}

impl Drop for Attached<'_> {
    fn drop(&mut self) {
        self.sessions.detach();
    }
}
