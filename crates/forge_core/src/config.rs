use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Placeholder factory address used until a deployment is configured.
pub const UNSET_FACTORY_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

// ---------------------------------------------------------------------------
// ForgeConfig
// ---------------------------------------------------------------------------

/// Application configuration stored at `~/.forge/config.json`.
///
/// Every value the chain clients need (endpoints, program profile, factory
/// addresses, confirmation timing) lives here and is handed to the clients
/// explicitly when they are constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    // Networks
    /// Network key used for EVM calls (`cronos_testnet` or `cronos_mainnet`).
    pub evm_network: String,
    /// Network key used for Solana calls (`solana_devnet` or `solana_mainnet`).
    pub solana_network: String,
    /// Custom RPC endpoints keyed by network key.
    pub rpc_overrides: BTreeMap<String, String>,

    // Deployments
    /// Encoding profile of the deployed Forge program (`anchor-forge-v1`, ...).
    pub solana_profile: String,
    pub factory_address: String,
    /// Factories from earlier deployments, still queried when verifying tokens.
    pub legacy_factory_addresses: Vec<String>,

    // Wallets
    /// JSON-RPC endpoint of the EVM wallet provider. Falls back to the network
    /// RPC when unset.
    pub wallet_rpc_url: Option<String>,
    pub solana_keypair_path: String,

    // Timing
    pub confirm_poll_interval_ms: u64,
    pub confirm_timeout_secs: u64,
    pub http_timeout_secs: u64,

    // Storage
    /// Token store location. Defaults to `~/.forge/tokens.json`.
    pub token_store_path: Option<PathBuf>,

    // General
    pub log_level: String,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            evm_network: "cronos_testnet".into(),
            solana_network: "solana_devnet".into(),
            rpc_overrides: BTreeMap::new(),
            solana_profile: "anchor-forge-v1".into(),
            factory_address: UNSET_FACTORY_ADDRESS.into(),
            legacy_factory_addresses: Vec::new(),
            wallet_rpc_url: None,
            solana_keypair_path: "~/.config/solana/id.json".into(),
            confirm_poll_interval_ms: 1_000,
            confirm_timeout_secs: 90,
            http_timeout_secs: 30,
            token_store_path: None,
            log_level: "info".into(),
        }
    }
}

impl ForgeConfig {
    /// Returns the base config directory: `~/.forge/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".forge"))
    }

    /// Returns the config file path: `~/.forge/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.forge/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Returns the default token store path: `~/.forge/tokens.json`
    pub fn default_token_store_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("tokens.json"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        let dirs = [Self::base_dir()?, Self::logs_dir()?];
        for dir in &dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from disk, or creates default if missing.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path, writing the defaults there when
    /// the file does not exist yet.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Saves config to `~/.forge/config.json`.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Resolved token store path.
    pub fn token_store_path(&self) -> Result<PathBuf> {
        match &self.token_store_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_token_store_path(),
        }
    }

    /// Custom RPC endpoint for a network key, if one is configured.
    pub fn rpc_override(&self, network_key: &str) -> Option<&str> {
        self.rpc_overrides.get(network_key).map(String::as_str)
    }

    pub fn confirm_poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirm_poll_interval_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
