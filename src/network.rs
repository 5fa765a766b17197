//! Registry of peer nodes whose chains take part in consensus
//!
//! Peers are stored as `host:port` strings. Whatever form an address was
//! registered in (`http://host:port/`, `host:port`), the normalized string is
//! both the key and the address used to reach the peer.

use crate::error::ChainError;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct PeerRegistry {
    peers: BTreeSet<String>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer. Returns `false` when it was already known.
    pub fn register(&mut self, address: &str) -> Result<bool, ChainError> {
        let normalized = normalize_address(address)?;
        Ok(self.peers.insert(normalized))
    }

    /// All known peers, sorted.
    pub fn list(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }

    pub fn contains(&self, address: &str) -> bool {
        normalize_address(address)
            .map(|a| self.peers.contains(&a))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Reduce a peer address to `host:port`, dropping any scheme and path.
pub fn normalize_address(address: &str) -> Result<String, ChainError> {
    let trimmed = address.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let authority = without_scheme.split('/').next().unwrap_or_default();

    let (host, port) = authority.rsplit_once(':').ok_or_else(|| {
        ChainError::InvalidPeerAddress(format!("{} (expected host:port)", address))
    })?;

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(ChainError::InvalidPeerAddress(format!(
            "{} (missing host)",
            address
        )));
    }

    let port: u16 = port
        .parse()
        .map_err(|_| ChainError::InvalidPeerAddress(format!("{} (bad port)", address)))?;

    Ok(format!("{}:{}", host.to_ascii_lowercase(), port))
}
