//! Configuration management for proofchain

use crate::error::ChainError;
use crate::miner::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::transaction::MINING_REWARD;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub miner: MinerConfig,
    #[serde(default)]
    pub consensus: ConsensusConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Peers registered at startup
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            bootstrap_peers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeConfig {
    /// Fixed identifier credited with mining rewards; generated when absent
    #[serde(default)]
    pub node_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_reward_amount")]
    pub reward_amount: i64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            reward_amount: default_reward_amount(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default = "default_peer_timeout_secs")]
    pub peer_timeout_secs: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            peer_timeout_secs: default_peer_timeout_secs(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, ChainError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if self.miner.difficulty == 0 || self.miner.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::ConfigError(format!(
                "miner.difficulty must be between 1 and {}, got {}",
                MAX_DIFFICULTY, self.miner.difficulty
            )));
        }

        if self.miner.reward_amount < 0 {
            return Err(ChainError::ConfigError(
                "miner.reward_amount must be non-negative".to_string(),
            ));
        }

        if self.consensus.peer_timeout_secs == 0 {
            return Err(ChainError::ConfigError(
                "consensus.peer_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(id) = &self.node.node_id {
            if id.trim().is_empty() {
                return Err(ChainError::ConfigError(
                    "node.node_id must not be blank".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    match fs::read_to_string(path.as_ref()) {
        Ok(source) => Config::from_toml(&source),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(e.into()),
    }
}

fn default_api_port() -> u16 {
    8000
}

fn default_difficulty() -> usize {
    DEFAULT_DIFFICULTY
}

fn default_reward_amount() -> i64 {
    MINING_REWARD
}

fn default_peer_timeout_secs() -> u64 {
    5
}
