//! Longest-valid-chain consensus
//!
//! Every registered peer is asked for its chain. The longest candidate that
//! is strictly longer than the local chain and passes validation replaces
//! the local chain; equal lengths never win.

use crate::blockchain::{validate_chain, Block, Blockchain};
use crate::error::ChainError;
use crate::miner::ProofOfWork;
use crate::sync::ChainFetcher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default bound on a single peer fetch
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one resolution round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Replaced,
    Kept,
}

impl Resolution {
    pub fn replaced(&self) -> bool {
        matches!(self, Resolution::Replaced)
    }
}

pub struct ConsensusResolver {
    fetcher: Arc<dyn ChainFetcher>,
    peer_timeout: Duration,
}

impl ConsensusResolver {
    pub fn new(fetcher: Arc<dyn ChainFetcher>, peer_timeout: Duration) -> Self {
        Self {
            fetcher,
            peer_timeout,
        }
    }

    pub fn peer_timeout(&self) -> Duration {
        self.peer_timeout
    }

    /// Reconcile the shared chain with every registered peer.
    ///
    /// Peers are queried without holding the lock. The write lock is taken
    /// only to swap in the winner, and the swap is skipped if the local chain
    /// has meanwhile grown to at least the winner's length.
    pub async fn resolve(&self, blockchain: &RwLock<Blockchain>) -> Resolution {
        let (peers, local_length, pow) = {
            let bc = blockchain.read().await;
            (bc.peers.list(), bc.len(), bc.pow())
        };

        let Some(candidate) = self.find_longest_chain(&peers, local_length, &pow).await else {
            info!(peers = peers.len(), local_length, "consensus.kept");
            return Resolution::Kept;
        };

        let mut bc = blockchain.write().await;
        if candidate.len() <= bc.len() {
            info!(
                candidate_length = candidate.len(),
                local_length = bc.len(),
                "local chain caught up during resolution; keeping it"
            );
            return Resolution::Kept;
        }

        let new_length = candidate.len();
        match bc.replace_chain(candidate) {
            Ok(()) => {
                info!(old_length = local_length, new_length, "consensus.replaced");
                Resolution::Replaced
            }
            Err(e) => {
                warn!(error = %e, "candidate chain rejected at replacement");
                Resolution::Kept
            }
        }
    }

    /// Scan `peers` for the longest valid chain longer than `local_length`.
    ///
    /// Unreachable peers, timeouts, malformed responses and invalid chains
    /// are logged and skipped.
    pub async fn find_longest_chain(
        &self,
        peers: &[String],
        local_length: usize,
        pow: &ProofOfWork,
    ) -> Option<Vec<Block>> {
        let mut max_length = local_length;
        let mut best = None;

        for peer in peers {
            let fetched = match self.fetch_with_timeout(peer).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    warn!(peer = %peer, error = %e, "skipping peer");
                    continue;
                }
            };

            if !fetched.is_consistent() {
                warn!(
                    peer = %peer,
                    reported = fetched.length,
                    actual = fetched.chain.len(),
                    "skipping peer with inconsistent chain length"
                );
                continue;
            }

            if fetched.length <= max_length {
                debug!(peer = %peer, length = fetched.length, max_length, "peer chain not longer");
                continue;
            }

            if let Err(e) = validate_chain(&fetched.chain, pow) {
                warn!(peer = %peer, error = %e, "rejecting peer chain");
                continue;
            }

            max_length = fetched.length;
            best = Some(fetched.chain);
        }

        best
    }

    async fn fetch_with_timeout(&self, peer: &str) -> Result<crate::sync::PeerChain, ChainError> {
        match tokio::time::timeout(self.peer_timeout, self.fetcher.fetch_chain(peer)).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::PeerUnreachable(format!(
                "{} timed out after {:?}",
                peer, self.peer_timeout
            ))),
        }
    }
}
