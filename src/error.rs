//! Error types for the swap widget

use thiserror::Error;

/// Main error type for a swap attempt
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SwapError {
    #[error("No wallet connected")]
    NoWalletConnected,

    #[error("Invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Insufficient balance: have {have} lamports, need {need}")]
    InsufficientBalance { have: u64, need: u64 },

    #[error("Balance fetch failed: {0}")]
    BalanceFetchFailed(String),

    #[error("Failed to fetch recent blockhash: {0}")]
    BlockReferenceFetchFailed(String),

    #[error("Signing rejected or failed: {0}")]
    SigningRejectedOrFailed(String),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SwapError {
    /// Check if the failure detail should be forwarded to the host frame
    pub fn is_host_reportable(&self) -> bool {
        matches!(
            self,
            SwapError::BlockReferenceFetchFailed(_)
                | SwapError::SigningRejectedOrFailed(_)
                | SwapError::SubmissionFailed(_)
        )
    }

    /// Check if the error was caused by user input or wallet state, not the network
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            SwapError::NoWalletConnected
                | SwapError::InvalidAmount { .. }
                | SwapError::InsufficientBalance { .. }
        )
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::NoWalletConnected => "no_wallet",
            SwapError::InvalidAmount { .. } => "invalid_amount",
            SwapError::InsufficientBalance { .. } => "insufficient_balance",
            SwapError::BalanceFetchFailed(_) => "balance_fetch_failed",
            SwapError::BlockReferenceFetchFailed(_) => "blockhash_fetch_failed",
            SwapError::SigningRejectedOrFailed(_) => "signing_failed",
            SwapError::SubmissionFailed(_) => "submission_failed",
            SwapError::Config(_) => "config",
        }
    }
}

/// Errors reported by the ledger RPC endpoint
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpcError {
    #[error("RPC request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("All {0} RPC endpoints failed")]
    AllEndpointsFailed(usize),

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// Errors reported by the wallet capability
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("User rejected the request: {0}")]
    Rejected(String),

    #[error("Wallet failed to submit transaction: {0}")]
    Submission(String),

    #[error("Wallet is not connected")]
    NotConnected,
}

impl From<WalletError> for SwapError {
    fn from(err: WalletError) -> Self {
        match &err {
            WalletError::Rejected(msg) => SwapError::SigningRejectedOrFailed(msg.clone()),
            WalletError::Submission(msg) => SwapError::SubmissionFailed(msg.clone()),
            // The wallet dropped the connection while asked to sign
            WalletError::NotConnected => SwapError::SigningRejectedOrFailed(err.to_string()),
        }
    }
}

/// Result type for swap operations
pub type SwapResult<T> = Result<T, SwapError>;
