//! Pool of transactions waiting to be sealed into the next block

use crate::error::ChainError;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    pending: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and queue a transaction. Insertion order is the sealing order.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<(), ChainError> {
        tx.validate()?;
        self.pending.push(tx);
        Ok(())
    }

    /// Take every pending transaction, leaving the pool empty.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    pub fn get_all_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
