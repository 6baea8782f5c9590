//! Builds the unsigned SOL payment bound to a fresh blockhash

use super::SolAmount;
use crate::chain::LedgerRpc;
use crate::error::{SwapError, SwapResult};

use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use tracing::debug;

/// What the user asked to pay
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub sender: Pubkey,
    pub receiver: Pubkey,
    pub amount: SolAmount,
}

/// Transfer ready for the wallet to sign; fee payer is the sender
#[derive(Debug, Clone)]
pub struct UnsignedTransfer {
    pub request: TransferRequest,
    pub recent_blockhash: Hash,
    pub transaction: Transaction,
}

impl UnsignedTransfer {
    pub fn fee_payer(&self) -> Pubkey {
        self.request.sender
    }

    pub fn lamports(&self) -> u64 {
        self.request.amount.lamports()
    }
}

/// Assembles transfer transactions
pub struct TransactionBuilder {
    rpc: Arc<dyn LedgerRpc>,
    receiver: Pubkey,
}

impl TransactionBuilder {
    pub fn new(rpc: Arc<dyn LedgerRpc>, receiver: Pubkey) -> Self {
        Self { rpc, receiver }
    }

    pub fn receiver(&self) -> Pubkey {
        self.receiver
    }

    /// Build a transfer of `amount` from `sender` to the fixed receiver.
    ///
    /// Every call fetches a new blockhash.
    pub async fn build(&self, sender: Pubkey, amount: SolAmount) -> SwapResult<UnsignedTransfer> {
        let recent_blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| SwapError::BlockReferenceFetchFailed(e.to_string()))?;

        let instruction = system_instruction::transfer(&sender, &self.receiver, amount.lamports());
        let message = Message::new_with_blockhash(&[instruction], Some(&sender), &recent_blockhash);
        let transaction = Transaction::new_unsigned(message);

        debug!(
            "Built transfer of {} lamports from {} to {} at blockhash {}",
            amount.lamports(),
            sender,
            self.receiver,
            recent_blockhash
        );

        Ok(UnsignedTransfer {
            request: TransferRequest {
                sender,
                receiver: self.receiver,
                amount,
            },
            recent_blockhash,
            transaction,
        })
    }
}
