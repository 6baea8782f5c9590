#![allow(dead_code)]

use async_trait::async_trait;
use cheese_swap::chain::{Balance, BalanceFetcher, LedgerRpc};
use cheese_swap::config::Settings;
use cheese_swap::coordination::SwapOrchestrator;
use cheese_swap::error::{RpcError, WalletError};
use cheese_swap::events::{HostChannel, HostEvent, HostNotifier};
use cheese_swap::tx::TransactionBuilder;
use cheese_swap::wallet::{
    SessionManager, SubscriptionId, WalletEvent, WalletEventHandler, WalletEventKind,
    WalletProvider,
};
use mockall::mock;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const SOL: u64 = 1_000_000_000;

mock! {
    pub Ledger {}

    #[async_trait]
    impl LedgerRpc for Ledger {
        async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError>;
        async fn get_latest_blockhash(&self) -> Result<Hash, RpcError>;
        async fn health_check(&self) -> bool;
    }
}

/// Wallet double with a handler registry and scripted signing results
#[derive(Default)]
pub struct FakeWallet {
    handlers: Mutex<HashMap<SubscriptionId, (WalletEventKind, WalletEventHandler)>>,
    next_id: AtomicU64,
    public_key: Mutex<Option<Pubkey>>,
    responses: Mutex<VecDeque<Result<Signature, WalletError>>>,
    signed: Mutex<Vec<Transaction>>,
}

impl FakeWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Wallet that reports an active connection before anyone subscribes
    pub fn already_connected(public_key: Pubkey) -> Arc<Self> {
        let wallet = Self::default();
        *wallet.public_key.lock().unwrap() = Some(public_key);
        Arc::new(wallet)
    }

    pub fn connect(&self, public_key: Pubkey) {
        *self.public_key.lock().unwrap() = Some(public_key);
        self.emit(WalletEvent::Connected { public_key });
    }

    pub fn disconnect(&self) {
        *self.public_key.lock().unwrap() = None;
        self.emit(WalletEvent::Disconnected);
    }

    pub fn respond_with(&self, response: Result<Signature, WalletError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn signed(&self) -> Vec<Transaction> {
        self.signed.lock().unwrap().clone()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }

    fn emit(&self, event: WalletEvent) {
        let handlers: Vec<WalletEventHandler> = self
            .handlers
            .lock()
            .unwrap()
            .values()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(&event);
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    fn subscribe(&self, kind: WalletEventKind, handler: WalletEventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().unwrap().insert(id, (kind, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.handlers.lock().unwrap().remove(&id);
    }

    fn is_connected(&self) -> bool {
        self.public_key.lock().unwrap().is_some()
    }

    fn public_key(&self) -> Option<Pubkey> {
        *self.public_key.lock().unwrap()
    }

    async fn sign_and_send_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Signature, WalletError> {
        self.signed.lock().unwrap().push(transaction);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(WalletError::Rejected("no response scripted".into())))
    }
}

/// Host channel that records every event
#[derive(Default)]
pub struct CapturingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl CapturingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<serde_json::Value> {
        self.events().iter().map(HostEvent::to_message).collect()
    }
}

impl HostChannel for CapturingHost {
    fn notify(&self, event: &HostEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Ledger that always answers with the same values
pub struct StaticLedger {
    pub lamports: u64,
    pub balance_calls: AtomicUsize,
}

impl StaticLedger {
    pub fn new(lamports: u64) -> Arc<Self> {
        Arc::new(Self {
            lamports,
            balance_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LedgerRpc for StaticLedger {
    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, RpcError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lamports)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(Hash::new_unique())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Ledger whose balance queries block until released, in FIFO order
pub struct GatedLedger {
    pub lamports: u64,
    gate: Semaphore,
}

impl GatedLedger {
    pub fn new(lamports: u64) -> Arc<Self> {
        Arc::new(Self {
            lamports,
            gate: Semaphore::new(0),
        })
    }

    /// Let one pending balance query complete
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl LedgerRpc for GatedLedger {
    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, RpcError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| RpcError::MalformedResponse(e.to_string()))?;
        permit.forget();
        Ok(self.lamports)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, RpcError> {
        Ok(Hash::new_unique())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Components wired by hand, without the widget event loop
pub struct Harness {
    pub wallet: Arc<FakeWallet>,
    pub host: Arc<CapturingHost>,
    pub sessions: SessionManager,
    pub balance: BalanceFetcher,
    pub orchestrator: SwapOrchestrator,
}

impl Harness {
    pub fn new(ledger: Arc<dyn LedgerRpc>) -> Self {
        Self::with_settings(ledger, Settings::devnet_defaults())
    }

    pub fn with_settings(ledger: Arc<dyn LedgerRpc>, settings: Settings) -> Self {
        let wallet = FakeWallet::new();
        let host = CapturingHost::new();
        let provider: Arc<dyn WalletProvider> = wallet.clone();
        let channel: Arc<dyn HostChannel> = host.clone();

        let sessions = SessionManager::new(Some(provider.clone()));
        sessions.attach();
        let balance = BalanceFetcher::new(ledger.clone(), sessions.watch());
        let orchestrator = SwapOrchestrator::new(
            Some(provider),
            sessions.watch(),
            balance.clone(),
            TransactionBuilder::new(ledger, settings.receiver().unwrap()),
            HostNotifier::new(Some(channel), settings.host.clone()),
            settings.swap.exchange_rate,
        );

        Self {
            wallet,
            host,
            sessions,
            balance,
            orchestrator,
        }
    }

    /// Connect the wallet and wait for the balance fetch it triggers
    pub async fn connect(&self, public_key: Pubkey) -> Option<Balance> {
        self.wallet.connect(public_key);
        match self.balance.on_session_changed(&self.sessions.current()) {
            Some(fetch) => fetch.await.unwrap(),
            None => None,
        }
    }

    pub fn disconnect(&self) {
        self.wallet.disconnect();
        self.balance.on_session_changed(&self.sessions.current());
    }
}

/// Poll `condition` until it holds, failing after two seconds
pub async fn eventually<F>(condition: F)
where
    F: Fn() -> bool,
{
    let wait = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(2), wait)
        .await
        .expect("condition not reached in time");
}

/// Await `future`, failing after two seconds
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), future)
        .await
        .expect("future did not complete in time")
}
