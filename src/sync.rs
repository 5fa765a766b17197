//! Fetching peer chains for consensus
//!
//! The resolver never talks to the network directly; it asks a
//! [`ChainFetcher`] for a peer's chain. [`HttpChainFetcher`] is the production
//! implementation and calls the peer's `GET /chain` endpoint.
//! [`StaticChainFetcher`] serves canned answers from memory.

use crate::blockchain::Block;
use crate::error::ChainError;
use hyper::body::HttpBody;
use hyper::client::HttpConnector;
use hyper::{header, Body, Client, Uri};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Full chain as reported by a peer (the body of `GET /chain`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl PeerChain {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }

    /// A response whose reported length disagrees with its blocks is malformed.
    pub fn is_consistent(&self) -> bool {
        self.length == self.chain.len()
    }
}

/// Largest chain response accepted from a peer (32 MiB)
pub const MAX_CHAIN_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<PeerChain, ChainError>> + Send + 'a>>;

/// Source of peer chains used by consensus resolution.
pub trait ChainFetcher: Send + Sync {
    /// Fetch the full chain held by the peer at `address` (`host:port`).
    fn fetch_chain<'a>(&'a self, address: &'a str) -> FetchFuture<'a>;
}

/// Fetches chains over HTTP/1.1. Response bodies larger than
/// `max_body_bytes` are abandoned before they are fully buffered.
#[derive(Debug, Clone)]
pub struct HttpChainFetcher {
    client: Client<HttpConnector>,
    max_body_bytes: usize,
}

impl HttpChainFetcher {
    pub fn new() -> Self {
        Self::with_max_body_bytes(MAX_CHAIN_RESPONSE_BYTES)
    }

    pub fn with_max_body_bytes(max_body_bytes: usize) -> Self {
        Self {
            client: Client::new(),
            max_body_bytes,
        }
    }
}

/// Buffer `body`, failing as soon as it grows past `limit` bytes.
async fn read_limited(address: &str, mut body: Body, limit: usize) -> Result<Vec<u8>, ChainError> {
    let too_large = || {
        ChainError::SerializationError(format!(
            "{} sent a chain larger than {} bytes",
            address, limit
        ))
    };

    if body.size_hint().lower() > limit as u64 {
        return Err(too_large());
    }

    let mut buffer = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk =
            chunk.map_err(|e| ChainError::PeerUnreachable(format!("{}: {}", address, e)))?;
        if buffer.len() + chunk.len() > limit {
            return Err(too_large());
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

impl Default for HttpChainFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainFetcher for HttpChainFetcher {
    fn fetch_chain<'a>(&'a self, address: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let uri: Uri = format!("http://{}/chain", address)
                .parse()
                .map_err(|e| ChainError::PeerUnreachable(format!("{}: {}", address, e)))?;

            let response = self
                .client
                .get(uri)
                .await
                .map_err(|e| ChainError::PeerUnreachable(format!("{}: {}", address, e)))?;

            if !response.status().is_success() {
                return Err(ChainError::PeerUnreachable(format!(
                    "{} answered {}",
                    address,
                    response.status()
                )));
            }

            let declared = response
                .headers()
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            if let Some(len) = declared.filter(|&len| len > self.max_body_bytes as u64) {
                return Err(ChainError::SerializationError(format!(
                    "{} declared a chain of {} bytes (limit {})",
                    address, len, self.max_body_bytes
                )));
            }

            let body = read_limited(address, response.into_body(), self.max_body_bytes).await?;

            serde_json::from_slice::<PeerChain>(&body).map_err(|e| {
                ChainError::SerializationError(format!(
                    "{} sent a malformed chain: {}",
                    address, e
                ))
            })
        })
    }
}

/// In-memory fetcher answering from a fixed table. Unknown peers are
/// reported as unreachable.
#[derive(Debug, Clone, Default)]
pub struct StaticChainFetcher {
    responses: HashMap<String, Result<PeerChain, ChainError>>,
}

impl StaticChainFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, address: &str, chain: Vec<Block>) -> Self {
        self.responses
            .insert(address.to_string(), Ok(PeerChain::new(chain)));
        self
    }

    pub fn with_response(mut self, address: &str, response: Result<PeerChain, ChainError>) -> Self {
        self.responses.insert(address.to_string(), response);
        self
    }
}

impl ChainFetcher for StaticChainFetcher {
    fn fetch_chain<'a>(&'a self, address: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            self.responses.get(address).cloned().unwrap_or_else(|| {
                Err(ChainError::PeerUnreachable(format!(
                    "{}: no such peer",
                    address
                )))
            })
        })
    }
}
