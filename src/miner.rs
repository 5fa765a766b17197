//! Proof-of-work puzzle used to gate block creation
//!
//! A candidate proof `p'` is accepted against the previous proof `p` when
//! `sha256("{p}{p'}")`, rendered as lowercase hex, starts with `difficulty`
//! zero characters. There is no retargeting; the difficulty is fixed for the
//! lifetime of a node.

use sha2::{Digest, Sha256};

/// Leading zero hex characters required by default
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Upper bound on the difficulty: a SHA-256 hex digest has 64 characters
pub const MAX_DIFFICULTY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: usize,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

impl ProofOfWork {
    pub fn new(difficulty: usize) -> Self {
        Self {
            difficulty: difficulty.min(MAX_DIFFICULTY),
        }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Search upwards from zero for the first proof accepted against `last_proof`.
    ///
    /// This is CPU-bound and has no cancellation hook; async callers should
    /// move it onto the blocking pool.
    pub fn solve(&self, last_proof: u64) -> u64 {
        let mut candidate = 0u64;
        while !self.validate(last_proof, candidate) {
            candidate += 1;
        }
        candidate
    }

    pub fn validate(&self, last_proof: u64, candidate: u64) -> bool {
        let digest = Sha256::digest(format!("{}{}", last_proof, candidate).as_bytes());
        hex::encode(digest)
            .bytes()
            .take(self.difficulty)
            .all(|c| c == b'0')
    }
}
