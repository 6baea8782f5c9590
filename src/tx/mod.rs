//! Transaction module - amount parsing and payment construction

mod amount;
mod builder;

pub use amount::{format_quote, SolAmount};
pub use builder::{TransactionBuilder, TransferRequest, UnsignedTransfer};
