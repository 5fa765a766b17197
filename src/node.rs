//! A running ledger node: one chain, one mempool and one peer registry
//! behind a single lock, plus the consensus resolver that reconciles them
//! with peers. The HTTP layer holds an `Arc<Node>` and calls into it.

use crate::blockchain::{Block, Blockchain};
use crate::config::Config;
use crate::consensus::{ConsensusResolver, Resolution};
use crate::error::ChainError;
use crate::miner::ProofOfWork;
use crate::network::normalize_address;
use crate::sync::{ChainFetcher, HttpChainFetcher};
use crate::transaction::{Transaction, MINING_REWARD};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct Node {
    node_id: String,
    reward_amount: i64,
    pub blockchain: Arc<RwLock<Blockchain>>,
    resolver: ConsensusResolver,
}

impl Node {
    pub fn new(
        node_id: impl Into<String>,
        blockchain: Blockchain,
        fetcher: Arc<dyn ChainFetcher>,
        peer_timeout: Duration,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            reward_amount: MINING_REWARD,
            blockchain: Arc::new(RwLock::new(blockchain)),
            resolver: ConsensusResolver::new(fetcher, peer_timeout),
        }
    }

    /// Build a node from configuration, fetching peer chains over HTTP and
    /// registering any bootstrap peers.
    pub fn from_config(config: &Config) -> Result<Self, ChainError> {
        config.validate()?;

        let node_id = config
            .node
            .node_id
            .clone()
            .unwrap_or_else(generate_node_id);

        let mut blockchain = Blockchain::new(ProofOfWork::new(config.miner.difficulty));
        for peer in &config.network.bootstrap_peers {
            blockchain.peers.register(peer)?;
        }

        let mut node = Node::new(
            node_id,
            blockchain,
            Arc::new(HttpChainFetcher::new()),
            Duration::from_secs(config.consensus.peer_timeout_secs),
        );
        node.reward_amount = config.miner.reward_amount;
        Ok(node)
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Queue a submitted transaction; returns the index of the block expected
    /// to seal it.
    pub async fn submit_transaction(&self, tx: Transaction) -> Result<u64, ChainError> {
        let index = self.blockchain.write().await.new_transaction(tx)?;
        debug!(index, "transaction queued");
        Ok(index)
    }

    /// Solve the puzzle for the current tip, credit the mining reward and seal
    /// every pending transaction into a new block.
    ///
    /// The search runs on the blocking pool without holding the lock. If the
    /// tip moved in the meantime (another block mined, or the chain replaced
    /// by consensus) the proof is stale and the search starts over.
    pub async fn mine(&self) -> Result<Block, ChainError> {
        loop {
            let (tip_hash, last_proof, pow) = {
                let bc = self.blockchain.read().await;
                let last = bc.last_block()?;
                (last.hash(), last.proof, bc.pow())
            };

            let proof = tokio::task::spawn_blocking(move || pow.solve(last_proof))
                .await
                .map_err(|e| ChainError::MiningError(e.to_string()))?;

            let mut bc = self.blockchain.write().await;
            if bc.last_block()?.hash() != tip_hash {
                debug!("chain tip moved while solving; retrying");
                continue;
            }

            bc.new_transaction(Transaction::reward(self.node_id.clone(), self.reward_amount))?;
            let block = bc.append(proof, None);
            info!(
                index = block.index,
                proof = block.proof,
                transactions = block.transactions.len(),
                "New block forged"
            );
            return Ok(block);
        }
    }

    /// Snapshot of the full chain.
    pub async fn chain(&self) -> Vec<Block> {
        self.blockchain.read().await.blocks().to_vec()
    }

    pub async fn pending_transactions(&self) -> Vec<Transaction> {
        self.blockchain
            .read()
            .await
            .mempool
            .get_all_transactions()
            .to_vec()
    }

    /// Register a batch of peers. Either every address is accepted or none
    /// is. Returns the full peer list afterwards.
    pub async fn register_peers(&self, addresses: &[String]) -> Result<Vec<String>, ChainError> {
        let normalized = addresses
            .iter()
            .map(|a| normalize_address(a))
            .collect::<Result<Vec<_>, _>>()?;

        let mut bc = self.blockchain.write().await;
        for address in &normalized {
            if bc.peers.contains(address) {
                debug!(peer = %address, "peer already known");
                continue;
            }
            bc.peers.register(address)?;
            info!(peer = %address, "peer registered");
        }
        Ok(bc.peers.list())
    }

    pub async fn peers(&self) -> Vec<String> {
        self.blockchain.read().await.peers.list()
    }

    /// Run consensus and return the outcome with the resulting chain.
    pub async fn resolve(&self) -> (Resolution, Vec<Block>) {
        let resolution = self.resolver.resolve(&self.blockchain).await;
        if resolution.replaced() {
            warn!("local chain replaced by a peer chain");
        }
        (resolution, self.chain().await)
    }
}

/// Random 32-character lowercase hex identifier.
pub fn generate_node_id() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}
