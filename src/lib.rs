//! proofchain - a minimal proof-of-work ledger node
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain and chain validation
//! - [`transaction`] - Transaction type and structural checks
//! - [`mempool`] - Pending transactions awaiting a block
//!
//! ## Consensus & Mining
//! - [`miner`] - Proof-of-work puzzle
//! - [`consensus`] - Longest-valid-chain resolution
//!
//! ## Networking
//! - [`network`] - Peer registry
//! - [`sync`] - Fetching peer chains
//! - [`api`] - HTTP interface
//!
//! ## Node & Utilities
//! - [`node`] - Node orchestration
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod consensus;
pub mod miner;

// ============================================================================
// Networking
// ============================================================================
pub mod network;
pub mod sync;

#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Node, Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
pub mod node;
