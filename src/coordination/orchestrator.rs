//! Swap orchestration: validate, build, sign and report

use super::status::SwapStatus;
use crate::chain::BalanceFetcher;
use crate::error::{SwapError, SwapResult};
use crate::events::HostNotifier;
use crate::tx::{SolAmount, TransactionBuilder};
use crate::wallet::{WalletProvider, WalletSession};

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Result of a submitted swap
#[derive(Debug, Clone, PartialEq)]
pub struct SwapReceipt {
    pub signature: Signature,
    pub amount: SolAmount,
    /// Quoted credit, delivered out of band
    pub token_amount: Decimal,
}

/// Drives one swap attempt per user intent and owns the status value
pub struct SwapOrchestrator {
    wallet: Option<Arc<dyn WalletProvider>>,
    session: watch::Receiver<WalletSession>,
    balance: BalanceFetcher,
    builder: TransactionBuilder,
    notifier: HostNotifier,
    exchange_rate: Decimal,
    status: watch::Sender<SwapStatus>,
}

impl SwapOrchestrator {
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        session: watch::Receiver<WalletSession>,
        balance: BalanceFetcher,
        builder: TransactionBuilder,
        notifier: HostNotifier,
        exchange_rate: Decimal,
    ) -> Self {
        let (status, _) = watch::channel(SwapStatus::Idle);
        Self {
            wallet,
            session,
            balance,
            builder,
            notifier,
            exchange_rate,
            status,
        }
    }

    /// Current status
    pub fn status(&self) -> SwapStatus {
        self.status.borrow().clone()
    }

    /// Read-only view of status updates
    pub fn watch_status(&self) -> watch::Receiver<SwapStatus> {
        self.status.subscribe()
    }

    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    /// Handle a swap intent for the amount typed by the user
    pub async fn swap(&self, amount_text: &str) -> SwapResult<SwapReceipt> {
        match self.execute(amount_text).await {
            Ok(receipt) => {
                info!(
                    "Swap of {} submitted: {} ({} tokens)",
                    receipt.amount, receipt.signature, receipt.token_amount
                );
                self.set_status(SwapStatus::Submitted {
                    signature: receipt.signature,
                    token_amount: receipt.token_amount,
                });
                self.notifier
                    .transaction_succeeded(&receipt.signature, receipt.token_amount);
                crate::metrics::record_swap_success();
                Ok(receipt)
            }
            Err(e) => {
                if e.is_user_error() {
                    debug!("Swap rejected: {}", e);
                } else {
                    error!("Swap failed: {}", e);
                }
                self.set_status(SwapStatus::from_error(&e));
                self.notifier.transaction_failed(&e);
                crate::metrics::record_swap_failure(&e);
                Err(e)
            }
        }
    }

    async fn execute(&self, amount_text: &str) -> SwapResult<SwapReceipt> {
        let (wallet, sender) = self.connected_wallet()?;
        let amount = SolAmount::parse(amount_text)?;
        self.check_balance(&amount)?;
        // Quoted before anything is signed so an unrepresentable credit never moves funds
        let token_amount = amount
            .quote(self.exchange_rate)
            .ok_or_else(|| SwapError::InvalidAmount {
                input: amount_text.to_string(),
                reason: format!("quote at rate {} overflows", self.exchange_rate),
            })?;

        self.set_status(SwapStatus::Building);
        let transfer = self.builder.build(sender, amount).await?;

        self.set_status(SwapStatus::AwaitingSignature);
        debug!("Waiting for wallet approval of {} lamports", transfer.lamports());
        let signature = wallet
            .sign_and_send_transaction(transfer.transaction)
            .await?;

        Ok(SwapReceipt {
            signature,
            amount,
            token_amount,
        })
    }

    /// Wallet and address of the live session
    fn connected_wallet(&self) -> SwapResult<(Arc<dyn WalletProvider>, Pubkey)> {
        let wallet = self.wallet.clone().ok_or(SwapError::NoWalletConnected)?;
        if !wallet.is_connected() {
            return Err(SwapError::NoWalletConnected);
        }
        let sender = self
            .session
            .borrow()
            .address()
            .ok_or(SwapError::NoWalletConnected)?;
        Ok((wallet, sender))
    }

    /// Unknown balance counts as zero
    fn check_balance(&self, amount: &SolAmount) -> SwapResult<()> {
        let have = self.balance.current().map(|b| b.lamports()).unwrap_or(0);
        if amount.lamports() > have {
            return Err(SwapError::InsufficientBalance {
                have,
                need: amount.lamports(),
            });
        }
        Ok(())
    }

    fn set_status(&self, status: SwapStatus) {
        debug!("Swap status: {:?}", status);
        self.status.send_replace(status);
    }
}
