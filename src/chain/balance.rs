//! Balance of the connected wallet, fetched once per session

use super::LedgerRpc;
use crate::error::SwapError;
use crate::tx::SolAmount;
use crate::wallet::WalletSession;

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Spendable balance in lamports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Balance {
    lamports: u64,
}

impl Balance {
    pub fn from_lamports(lamports: u64) -> Self {
        Self { lamports }
    }

    pub fn lamports(&self) -> u64 {
        self.lamports
    }

    /// Balance in display units (lamports / 1e9)
    pub fn sol(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.lamports as i128, 9)
    }

    pub fn covers(&self, amount: &SolAmount) -> bool {
        amount.lamports() <= self.lamports
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sol = self
            .sol()
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{:.4} SOL", sol)
    }
}

/// Balance line shown under the input field
pub fn display_balance(balance: Option<Balance>) -> String {
    match balance {
        Some(balance) => balance.to_string(),
        None => "N/A".to_string(),
    }
}

/// Last stored value and the session generation it belongs to
#[derive(Debug, Clone, Copy, Default)]
struct BalanceState {
    generation: u64,
    balance: Option<Balance>,
}

/// Fetches the connected address's balance on every new session
#[derive(Clone)]
pub struct BalanceFetcher {
    rpc: Arc<dyn LedgerRpc>,
    session: watch::Receiver<WalletSession>,
    state: Arc<watch::Sender<BalanceState>>,
}

impl BalanceFetcher {
    pub fn new(rpc: Arc<dyn LedgerRpc>, session: watch::Receiver<WalletSession>) -> Self {
        let (state, _) = watch::channel(BalanceState::default());
        Self {
            rpc,
            session,
            state: Arc::new(state),
        }
    }

    /// Last known balance, `None` when unknown or when it belongs to a superseded session
    pub fn current(&self) -> Option<Balance> {
        let state = *self.state.borrow();
        if state.generation == self.session.borrow().generation() {
            state.balance
        } else {
            None
        }
    }

    /// React to a session transition.
    ///
    /// Clears the stored balance, then starts a background fetch when the
    /// session is connected.
    pub fn on_session_changed(&self, session: &WalletSession) -> Option<JoinHandle<Option<Balance>>> {
        self.state.send_replace(BalanceState {
            generation: session.generation(),
            balance: None,
        });

        if !session.is_connected() {
            debug!("Balance cleared for disconnected session {}", session.generation());
            return None;
        }

        let fetcher = self.clone();
        let session = session.clone();
        Some(tokio::spawn(async move { fetcher.fetch(&session).await }))
    }

    /// Fetch again for the live session
    pub async fn refresh(&self) -> Option<Balance> {
        let session = self.session.borrow().clone();
        self.fetch(&session).await
    }

    /// Query the balance for `session` and store it unless the session was superseded
    pub async fn fetch(&self, session: &WalletSession) -> Option<Balance> {
        let address = session.address()?;

        match self.rpc.get_balance(&address).await {
            Ok(lamports) => {
                let balance = Balance::from_lamports(lamports);
                if self.store(session.generation(), Some(balance)) {
                    debug!("Balance for {}: {}", address, balance);
                    crate::metrics::record_balance_fetch("ok");
                    Some(balance)
                } else {
                    debug!(
                        "Discarding balance for superseded session {}",
                        session.generation()
                    );
                    crate::metrics::record_balance_fetch("stale");
                    None
                }
            }
            Err(e) => {
                let err = SwapError::BalanceFetchFailed(e.to_string());
                warn!("Failed to fetch balance for {}: {}", address, err);
                self.store(session.generation(), None);
                crate::metrics::record_balance_fetch("error");
                None
            }
        }
    }

    /// Write only if `generation` is still the live session
    fn store(&self, generation: u64, balance: Option<Balance>) -> bool {
        if self.session.borrow().generation() != generation {
            return false;
        }
        self.state.send_replace(BalanceState {
            generation,
            balance,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_units() {
        let balance = Balance::from_lamports(2_500_000_000);
        assert_eq!(balance.sol(), Decimal::new(25, 1));
        assert_eq!(balance.to_string(), "2.5000 SOL");
        assert_eq!(display_balance(Some(Balance::from_lamports(123_456))), "0.0001 SOL");
        assert_eq!(display_balance(None), "N/A");
    }

    #[test]
    fn test_display_rounds_half_up() {
        assert_eq!(Balance::from_lamports(50_000).to_string(), "0.0001 SOL");
        assert_eq!(Balance::from_lamports(250_000).to_string(), "0.0003 SOL");
        assert_eq!(Balance::from_lamports(49_999).to_string(), "0.0000 SOL");
    }

    #[test]
    fn test_covers_compares_lamports() {
        let balance = Balance::from_lamports(2_000_000_000);
        assert!(balance.covers(&SolAmount::parse("2").unwrap()));
        assert!(balance.covers(&SolAmount::parse("1.999999999").unwrap()));
        assert!(!balance.covers(&SolAmount::parse("2.000000001").unwrap()));
    }
}
