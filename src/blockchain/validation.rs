use crate::blockchain::block::Block;
use crate::error::ChainError;
use crate::miner::ProofOfWork;

/// Walk a candidate chain pairwise and report the first violation.
///
/// The first block must be a genesis block (index 1, the fixed genesis
/// proof and previous-hash sentinel); every later block must carry the
/// next index, the hash of its predecessor, and a proof that solves the
/// puzzle against its predecessor's proof.
pub fn validate_chain(blocks: &[Block], pow: &ProofOfWork) -> Result<(), ChainError> {
    let first = blocks.first().ok_or_else(|| {
        ChainError::InvalidCandidateChain("Chain contains no blocks".to_string())
    })?;

    if !first.is_genesis() {
        return Err(ChainError::InvalidCandidateChain(format!(
            "First block is not a genesis block (index {}, proof {}, previous hash {})",
            first.index, first.proof, first.previous_hash
        )));
    }

    for pair in blocks.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);

        if block.index != previous.index + 1 {
            return Err(ChainError::InvalidCandidateChain(format!(
                "Invalid block index. Expected {}, but got {}.",
                previous.index + 1,
                block.index
            )));
        }

        let expected_hash = previous.hash();
        if block.previous_hash != expected_hash {
            return Err(ChainError::InvalidCandidateChain(format!(
                "Invalid previous block hash at index {}. Expected {}, but got {}.",
                block.index, expected_hash, block.previous_hash
            )));
        }

        if !pow.validate(previous.proof, block.proof) {
            return Err(ChainError::InvalidCandidateChain(format!(
                "Invalid proof of work at index {}: {} does not solve {}",
                block.index, block.proof, previous.proof
            )));
        }
    }

    Ok(())
}
