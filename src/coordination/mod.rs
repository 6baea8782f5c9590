//! Coordination module for swap orchestration
//!
//! The orchestrator:
//! 1. Validates the wallet session, the typed amount and the balance
//! 2. Builds the payment against a fresh blockhash
//! 3. Hands it to the wallet to sign and submit
//! 4. Publishes the status and reports outcomes to the host frame

pub mod orchestrator;
pub mod status;

pub use orchestrator::{SwapOrchestrator, SwapReceipt};
pub use status::SwapStatus;
