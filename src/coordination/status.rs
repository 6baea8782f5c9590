//! User-facing swap status

use crate::error::SwapError;

use rust_decimal::Decimal;
use solana_sdk::signature::Signature;
use std::fmt;

pub const MSG_CONNECT_WALLET: &str = "Please connect your wallet first.";
pub const MSG_INVALID_AMOUNT: &str = "Enter a valid SOL amount.";
pub const MSG_INSUFFICIENT_BALANCE: &str = "Insufficient SOL balance.";
pub const MSG_BUILDING: &str = "Preparing transaction...";
pub const MSG_AWAITING_SIGNATURE: &str = "Approve the transaction in your wallet...";
pub const MSG_FAILED: &str = "Swap failed. Check the console for details.";

/// Status of the latest swap attempt. Its `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SwapStatus {
    #[default]
    Idle,
    WalletNotConnected,
    InvalidAmount,
    InsufficientBalance,
    Building,
    AwaitingSignature,
    Submitted {
        signature: Signature,
        token_amount: Decimal,
    },
    Failed {
        reason: String,
    },
}

impl SwapStatus {
    /// Status an aborted attempt settles on
    pub fn from_error(error: &SwapError) -> Self {
        match error {
            SwapError::NoWalletConnected => SwapStatus::WalletNotConnected,
            SwapError::InvalidAmount { .. } => SwapStatus::InvalidAmount,
            SwapError::InsufficientBalance { .. } => SwapStatus::InsufficientBalance,
            other => SwapStatus::Failed {
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapStatus::Idle => Ok(()),
            SwapStatus::WalletNotConnected => f.write_str(MSG_CONNECT_WALLET),
            SwapStatus::InvalidAmount => f.write_str(MSG_INVALID_AMOUNT),
            SwapStatus::InsufficientBalance => f.write_str(MSG_INSUFFICIENT_BALANCE),
            SwapStatus::Building => f.write_str(MSG_BUILDING),
            SwapStatus::AwaitingSignature => f.write_str(MSG_AWAITING_SIGNATURE),
            SwapStatus::Submitted { token_amount, .. } => write!(
                f,
                "Swap complete! {} tokens have been sent to your wallet.",
                token_amount
            ),
            SwapStatus::Failed { .. } => f.write_str(MSG_FAILED),
        }
    }
}
