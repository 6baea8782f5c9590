//! Cheese Swap - SOL to CHE swap widget core
//!
//! Tracks the injected wallet's session, fetches its SOL balance, builds a
//! payment to the fixed receiver against a fresh blockhash, hands it to the
//! wallet to sign and submit, and reports the outcome to the user and to the
//! hosting frame. The CHE credit itself is delivered out of band.

pub mod chain;
pub mod config;
pub mod coordination;
pub mod error;
pub mod events;
pub mod metrics;
pub mod tx;
pub mod wallet;
pub mod widget;

pub use chain::{Balance, BalanceFetcher, LedgerRpc, RpcProvider};
pub use config::Settings;
pub use coordination::{SwapOrchestrator, SwapReceipt, SwapStatus};
pub use error::{RpcError, SwapError, SwapResult, WalletError};
pub use events::{BroadcastHostChannel, HostChannel, HostEvent, HostNotifier};
pub use tx::{SolAmount, TransactionBuilder, UnsignedTransfer};
pub use wallet::{SessionManager, WalletEvent, WalletProvider, WalletSession};
pub use widget::SwapWidget;

/// Install the default tracing subscriber.
///
/// Honors `RUST_LOG`; does nothing if a subscriber is already installed.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cheese_swap=debug,solana_client=warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .try_init();
}
