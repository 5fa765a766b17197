use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Proof recorded on the genesis block
pub const GENESIS_PROOF: u64 = 100;

/// Previous-hash sentinel recorded on the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A sealed block. Field order defines the canonical serialization that
/// [`Block::hash`] digests, so it must stay fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Unix time in milliseconds
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        let timestamp = chrono::Utc::now().timestamp_millis() as u64;

        Block {
            index,
            timestamp,
            transactions,
            proof,
            previous_hash,
        }
    }

    pub fn genesis() -> Self {
        Block::new(
            1,
            Vec::new(),
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH.to_string(),
        )
    }

    /// True when the block carries the fixed genesis index, proof and
    /// previous-hash sentinel.
    pub fn is_genesis(&self) -> bool {
        self.index == 1
            && self.proof == GENESIS_PROOF
            && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// JSON encoding of the block, fields in declaration order.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Only strings and integers are involved, so encoding cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Lowercase hex SHA-256 of [`Block::canonical_bytes`].
    pub fn hash(&self) -> String {
        hex::encode(Sha256::digest(self.canonical_bytes()))
    }
}
