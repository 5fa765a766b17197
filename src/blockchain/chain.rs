use crate::blockchain::block::Block;
use crate::blockchain::validation::validate_chain;
use crate::error::ChainError;
use crate::mempool::Mempool;
use crate::miner::ProofOfWork;
use crate::network::PeerRegistry;
use crate::transaction::Transaction;

/// Ledger state owned by one node: the chain itself, the pending
/// transactions that will be sealed into the next block, and the peers
/// consulted during consensus.
///
/// The struct is not synchronized on its own; a node keeps it behind a
/// single lock so that appends, drains, registrations and replacements are
/// serialized.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    pub mempool: Mempool,
    pub peers: PeerRegistry,
    pow: ProofOfWork,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new(ProofOfWork::default())
    }
}

impl Blockchain {
    /// Create a chain holding only the genesis block.
    pub fn new(pow: ProofOfWork) -> Self {
        Blockchain {
            blocks: vec![Block::genesis()],
            mempool: Mempool::new(),
            peers: PeerRegistry::new(),
            pow,
        }
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn last_block(&self) -> Result<&Block, ChainError> {
        self.blocks.last().ok_or(ChainError::EmptyChain)
    }

    /// Index the next sealed block will carry.
    pub fn next_index(&self) -> u64 {
        self.blocks.len() as u64 + 1
    }

    /// Queue a transaction and report the index of the block expected to
    /// seal it. The index is advisory: it is only fixed by the next append.
    pub fn new_transaction(&mut self, tx: Transaction) -> Result<u64, ChainError> {
        self.mempool.add_transaction(tx)?;
        Ok(self.next_index())
    }

    /// Seal every pending transaction into a new block and append it.
    ///
    /// `proof` must already satisfy the proof-of-work predicate against the
    /// current last block. Without `previous_hash` the hash of the current
    /// last block is used.
    pub fn append(&mut self, proof: u64, previous_hash: Option<String>) -> Block {
        let previous_hash = previous_hash
            .or_else(|| self.blocks.last().map(Block::hash))
            .unwrap_or_default();
        let transactions = self.mempool.drain();
        let block = Block::new(self.next_index(), transactions, proof, previous_hash);

        self.blocks.push(block.clone());
        block
    }

    /// Check a candidate chain (typically a peer's) for linkage, index
    /// continuity and proof-of-work validity.
    pub fn is_valid_chain(&self, candidate: &[Block]) -> bool {
        validate_chain(candidate, &self.pow).is_ok()
    }

    /// Swap the local chain for `candidate` as a whole. Nothing changes when
    /// the candidate is invalid.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> Result<(), ChainError> {
        validate_chain(&candidate, &self.pow)?;
        self.blocks = candidate;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::block::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};

    fn mine(bc: &mut Blockchain) -> Block {
        let last_proof = bc.last_block().unwrap().proof;
        let proof = bc.pow().solve(last_proof);
        bc.append(proof, None)
    }

    #[test]
    fn test_new_chain_has_genesis() {
        let bc = Blockchain::new(ProofOfWork::new(2));
        assert_eq!(bc.len(), 1);
        let genesis = bc.last_block().unwrap();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(bc.mempool.is_empty());
    }

    #[test]
    fn test_append_seals_pending_transactions_in_order() {
        let mut bc = Blockchain::new(ProofOfWork::new(2));
        let t1 = Transaction::new("alice", "bob", 1);
        let t2 = Transaction::new("bob", "carol", 2);

        assert_eq!(bc.new_transaction(t1.clone()).unwrap(), 2);
        assert_eq!(bc.new_transaction(t2.clone()).unwrap(), 2);

        let genesis_hash = bc.last_block().unwrap().hash();
        let block = mine(&mut bc);

        assert_eq!(block.index, 2);
        assert_eq!(block.transactions, vec![t1, t2]);
        assert_eq!(block.previous_hash, genesis_hash);
        assert_eq!(bc.last_block().unwrap(), &block);
        assert!(bc.mempool.drain().is_empty());
    }

    #[test]
    fn test_append_with_explicit_previous_hash() {
        let mut bc = Blockchain::new(ProofOfWork::new(2));
        let block = bc.append(7, Some("feed".to_string()));
        assert_eq!(block.previous_hash, "feed");
        assert_eq!(block.index, 2);
    }

    #[test]
    fn test_invalid_transaction_is_rejected() {
        let mut bc = Blockchain::new(ProofOfWork::new(2));
        let result = bc.new_transaction(Transaction::new("", "bob", 1));
        assert!(matches!(result, Err(ChainError::InvalidTransaction(_))));
        assert!(bc.mempool.is_empty());
    }

    #[test]
    fn test_mined_chain_is_valid() {
        let mut bc = Blockchain::new(ProofOfWork::new(2));
        for i in 0..4 {
            bc.new_transaction(Transaction::new("alice", "bob", i)).unwrap();
            mine(&mut bc);
        }
        assert_eq!(bc.len(), 5);
        assert!(bc.is_valid_chain(bc.blocks()));
    }

    #[test]
    fn test_replace_chain_is_all_or_nothing() {
        let mut local = Blockchain::new(ProofOfWork::new(2));
        let before = local.blocks().to_vec();

        let mut tampered = before.clone();
        tampered.push(Block::new(2, vec![], 0, "bogus".to_string()));
        assert!(local.replace_chain(tampered).is_err());
        assert_eq!(local.blocks(), before.as_slice());

        let mut remote = Blockchain::new(ProofOfWork::new(2));
        mine(&mut remote);
        mine(&mut remote);
        local.replace_chain(remote.blocks().to_vec()).unwrap();
        assert_eq!(local.blocks(), remote.blocks());
    }

    #[test]
    fn test_empty_chain_has_no_last_block() {
        let mut bc = Blockchain::new(ProofOfWork::new(2));
        bc.blocks.clear();
        assert!(matches!(bc.last_block(), Err(ChainError::EmptyChain)));
    }
}
