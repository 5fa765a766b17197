/// Validation logic for transactions separated from type definitions
use crate::error::ChainError;
use crate::transaction::types::Transaction;

impl Transaction {
    /// Structural checks only; there is no balance or signature model.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.sender.trim().is_empty() {
            return Err(ChainError::InvalidTransaction(
                "Sender cannot be empty".to_string(),
            ));
        }

        if self.recipient.trim().is_empty() {
            return Err(ChainError::InvalidTransaction(
                "Recipient cannot be empty".to_string(),
            ));
        }

        if self.amount < 0 {
            return Err(ChainError::InvalidTransaction(format!(
                "Amount must be non-negative, got {}",
                self.amount
            )));
        }

        Ok(())
    }
}
