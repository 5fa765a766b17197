/// Transaction types for proofchain
use serde::{Deserialize, Serialize};

/// Sender recorded on the reward transaction credited to a miner
pub const REWARD_SENDER: &str = "0";

/// Amount credited to the node that seals a block
pub const MINING_REWARD: i64 = 1;

/// A transfer intent waiting in the mempool or sealed in a block.
///
/// Field order is part of the canonical block serialization and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Reward credit for the node identified by `node_id`
    pub fn reward(node_id: impl Into<String>, amount: i64) -> Self {
        Transaction::new(REWARD_SENDER, node_id, amount)
    }

    pub fn is_reward(&self) -> bool {
        self.sender == REWARD_SENDER
    }
}
