use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Chainlink ETH/USD feed on Sepolia.
pub const DEFAULT_PRICE_FEED: &str = "0x694AA1769357215DE4FAC081bf1f309aDC325306";

/// Which chain to talk to. Passed explicitly to every provider.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PriceFeedConfig {
    pub address: String,
    pub currency: String,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        PriceFeedConfig {
            address: DEFAULT_PRICE_FEED.to_string(),
            currency: "USD".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfirmationConfig {
    pub poll_interval_ms: u64,
    pub max_polls: usize,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        ConfirmationConfig {
            poll_interval_ms: 2000,
            max_polls: 60,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub factory: String,
    #[serde(default)]
    pub price_feed: PriceFeedConfig,
    /// Sender for write commands; must be unlocked on the RPC node.
    pub account: Option<String>,
    #[serde(default)]
    pub confirmation: ConfirmationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "cfund")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// The sender for write commands.
    pub fn require_account(&self) -> Result<&str> {
        self.account
            .as_deref()
            .context("No account configured; set `account` in the config file to send transactions")
    }
}
