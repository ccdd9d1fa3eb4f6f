use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use forge_core::ForgeConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Networks FORGE can mint on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    CronosTestnet,
    CronosMainnet,
    SolanaDevnet,
    SolanaMainnet,
}

impl Chain {
    pub const ALL: [Chain; 4] = [
        Chain::CronosTestnet,
        Chain::CronosMainnet,
        Chain::SolanaDevnet,
        Chain::SolanaMainnet,
    ];

    /// Stable key used in config files and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            Chain::CronosTestnet => "cronos_testnet",
            Chain::CronosMainnet => "cronos_mainnet",
            Chain::SolanaDevnet => "solana_devnet",
            Chain::SolanaMainnet => "solana_mainnet",
        }
    }

    /// Human-readable label for the chain.
    pub fn label(&self) -> &'static str {
        match self {
            Chain::CronosTestnet => "Cronos Testnet",
            Chain::CronosMainnet => "Cronos Mainnet",
            Chain::SolanaDevnet => "Solana Devnet",
            Chain::SolanaMainnet => "Solana Mainnet",
        }
    }

    /// Chain identifier. EVM networks use their EIP-155 id; the Solana
    /// clusters use the conventional 101 (mainnet) and 103 (devnet).
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::CronosTestnet => 338,
            Chain::CronosMainnet => 25,
            Chain::SolanaDevnet => 103,
            Chain::SolanaMainnet => 101,
        }
    }

    /// Whether this chain uses the EVM execution model.
    pub fn is_evm(&self) -> bool {
        matches!(self, Chain::CronosTestnet | Chain::CronosMainnet)
    }

    /// Built-in descriptor for the chain.
    pub fn default_descriptor(&self) -> NetworkDescriptor {
        let (rpc_url, explorer_url, currency) = match self {
            Chain::CronosTestnet => (
                "https://evm-t3.cronos.org",
                "https://testnet.cronoscan.com",
                NativeCurrency::new("Test Cronos", "TCRO", 18),
            ),
            Chain::CronosMainnet => (
                "https://evm.cronos.org",
                "https://cronoscan.com",
                NativeCurrency::new("Cronos", "CRO", 18),
            ),
            Chain::SolanaDevnet => (
                "https://api.devnet.solana.com",
                "https://explorer.solana.com",
                NativeCurrency::new("Solana", "SOL", 9),
            ),
            Chain::SolanaMainnet => (
                "https://api.mainnet-beta.solana.com",
                "https://explorer.solana.com",
                NativeCurrency::new("Solana", "SOL", 9),
            ),
        };
        NetworkDescriptor {
            chain: *self,
            chain_id: self.chain_id(),
            name: self.label().to_string(),
            rpc_url: rpc_url.to_string(),
            native_currency: currency,
            explorer_url: explorer_url.to_string(),
            is_custom: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Chain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.key() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown network: {s}"))
    }
}

/// Native currency metadata, as sent in an add-network request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything needed to reach a network and to describe it to a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub chain: Chain,
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub native_currency: NativeCurrency,
    pub explorer_url: String,
    pub is_custom: bool,
    pub timeout_secs: u64,
}

impl NetworkDescriptor {
    /// Chain id as the `0x`-prefixed hex string wallets expect (`0x152`).
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Payload of a `wallet_addEthereumChain` request.
    pub fn add_chain_params(&self) -> Value {
        json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.name,
            "rpcUrls": [self.rpc_url],
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "blockExplorerUrls": [self.explorer_url],
        })
    }

    /// Explorer link for a transaction hash or signature.
    pub fn explorer_tx_url(&self, reference: &str) -> String {
        format!(
            "{}/tx/{reference}{}",
            self.explorer_url.trim_end_matches('/'),
            self.cluster_suffix()
        )
    }

    /// Explorer link for an account, token or contract address.
    pub fn explorer_address_url(&self, address: &str) -> String {
        let path = if self.chain.is_evm() { "address" } else { "account" };
        format!(
            "{}/{path}/{address}{}",
            self.explorer_url.trim_end_matches('/'),
            self.cluster_suffix()
        )
    }

    fn cluster_suffix(&self) -> &'static str {
        match self.chain {
            Chain::SolanaDevnet => "?cluster=devnet",
            _ => "",
        }
    }
}

/// Per-chain network descriptors with custom RPC override support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkRegistry {
    networks: HashMap<Chain, NetworkDescriptor>,
}

impl NetworkRegistry {
    /// Create a registry populated with the built-in descriptors.
    pub fn with_defaults() -> Self {
        let networks = Chain::ALL
            .into_iter()
            .map(|chain| (chain, chain.default_descriptor()))
            .collect();
        Self { networks }
    }

    /// Built-in descriptors with the config's RPC overrides and HTTP timeout
    /// applied. Unknown network keys and malformed URLs are rejected.
    pub fn from_config(config: &ForgeConfig) -> anyhow::Result<Self> {
        let mut registry = Self::with_defaults();
        for descriptor in registry.networks.values_mut() {
            descriptor.timeout_secs = config.http_timeout_secs;
        }
        for (key, url) in &config.rpc_overrides {
            let chain: Chain = key.parse()?;
            registry.set_custom_rpc(chain, url.clone())?;
        }
        Ok(registry)
    }

    /// Get the descriptor for a chain. Returns `None` if the chain has no
    /// configuration (should not happen after [`Self::with_defaults`]).
    pub fn get(&self, chain: Chain) -> Option<&NetworkDescriptor> {
        self.networks.get(&chain)
    }

    /// Descriptor for a chain, falling back to the built-in one.
    pub fn descriptor(&self, chain: Chain) -> NetworkDescriptor {
        self.get(chain)
            .cloned()
            .unwrap_or_else(|| chain.default_descriptor())
    }

    /// All descriptors, ordered by chain.
    pub fn all(&self) -> Vec<&NetworkDescriptor> {
        let mut all: Vec<_> = self.networks.values().collect();
        all.sort_by_key(|d| d.chain);
        all
    }

    /// Override the RPC URL for a chain with a custom endpoint.
    ///
    /// Returns `Err` if the URL fails validation.
    pub fn set_custom_rpc(&mut self, chain: Chain, url: String) -> anyhow::Result<()> {
        if !validate_url(&url) {
            anyhow::bail!("invalid RPC URL: {url}");
        }

        let entry = self
            .networks
            .entry(chain)
            .or_insert_with(|| chain.default_descriptor());
        entry.rpc_url = url;
        entry.is_custom = true;
        Ok(())
    }

    /// Reset a chain's RPC URL back to the built-in default.
    pub fn reset_to_default(&mut self, chain: Chain) {
        let default = chain.default_descriptor();
        let entry = self.networks.entry(chain).or_insert_with(|| default.clone());
        entry.rpc_url = default.rpc_url;
        entry.is_custom = false;
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}
