// Configuration and client construction shared by every command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use forge_chain::{
    Chain, EncodingProfile, EvmClientConfig, EvmTokenClient, ForgeProgramClient, HttpJsonRpc,
    InjectedWallet, KeypairWallet, NetworkDescriptor, NetworkRegistry, SolanaRpcClient,
    SplMintClient, TokenForge, TokenStore,
};
use forge_core::ForgeConfig;

/// Flags accepted by every subcommand.
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub rpc_url: Option<String>,
    pub keypair: Option<String>,
    pub wallet_rpc: Option<String>,
    pub json: bool,
}

pub struct AppContext {
    pub config: ForgeConfig,
    pub registry: NetworkRegistry,
    pub json: bool,
    rpc_url: Option<String>,
    keypair: Option<String>,
    wallet_rpc: Option<String>,
}

impl AppContext {
    pub fn load(args: GlobalArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => ForgeConfig::load_from_path(path)?,
            None => ForgeConfig::load()?,
        };
        let registry = NetworkRegistry::from_config(&config).context("invalid rpc_overrides")?;
        Ok(Self {
            config,
            registry,
            json: args.json,
            rpc_url: args.rpc_url,
            keypair: args.keypair,
            wallet_rpc: args.wallet_rpc,
        })
    }

    /// Descriptor for `chain` with the `--rpc-url` flag applied.
    pub fn network(&self, chain: Chain) -> Result<NetworkDescriptor> {
        let mut registry = self.registry.clone();
        if let Some(url) = &self.rpc_url {
            registry.set_custom_rpc(chain, url.clone())?;
        }
        Ok(registry.descriptor(chain))
    }

    pub fn evm_chain(&self) -> Result<Chain> {
        let chain: Chain = self.config.evm_network.parse()?;
        if !chain.is_evm() {
            bail!("evm_network {} is not an EVM network", self.config.evm_network);
        }
        Ok(chain)
    }

    pub fn solana_chain(&self) -> Result<Chain> {
        let chain: Chain = self.config.solana_network.parse()?;
        if chain.is_evm() {
            bail!("solana_network {} is not a Solana network", self.config.solana_network);
        }
        Ok(chain)
    }

    pub fn evm_client(&self) -> Result<EvmTokenClient> {
        let mut client_config = EvmClientConfig::from_config(&self.config, &self.registry)?;
        client_config.network = self.network(self.evm_chain()?)?;

        let timeout = self.config.http_timeout();
        let reader = Arc::new(HttpJsonRpc::new(&client_config.network.rpc_url, timeout)?);
        let wallet_url = self
            .wallet_rpc
            .clone()
            .or_else(|| self.config.wallet_rpc_url.clone())
            .unwrap_or_else(|| client_config.network.rpc_url.clone());
        let wallet = InjectedWallet::new(Arc::new(HttpJsonRpc::new(wallet_url, timeout)?));
        Ok(EvmTokenClient::new(wallet, reader, client_config)?)
    }

    pub fn solana_rpc(&self) -> Result<SolanaRpcClient> {
        let network = self.network(self.solana_chain()?)?;
        let rpc = HttpJsonRpc::new(network.rpc_url, self.config.http_timeout())?;
        Ok(SolanaRpcClient::new(
            Arc::new(rpc),
            self.config.confirm_poll_interval(),
            self.config.confirm_timeout(),
        ))
    }

    pub fn solana_wallet(&self) -> Result<Arc<KeypairWallet>> {
        let path = self
            .keypair
            .as_deref()
            .unwrap_or(&self.config.solana_keypair_path);
        Ok(Arc::new(KeypairWallet::from_file(path)?))
    }

    /// The `--profile` flag when given, otherwise the configured profile.
    pub fn profile(&self, flag: Option<&str>) -> Result<EncodingProfile> {
        flag.unwrap_or(&self.config.solana_profile)
            .parse()
            .context("unknown encoding profile")
    }

    pub fn program_client(&self, profile: EncodingProfile) -> Result<ForgeProgramClient> {
        Ok(ForgeProgramClient::new(
            self.solana_rpc()?,
            self.solana_wallet()?,
            profile,
            self.solana_chain()?,
        ))
    }

    pub fn spl_client(&self) -> Result<SplMintClient> {
        Ok(SplMintClient::new(
            self.solana_rpc()?,
            self.solana_wallet()?,
            self.solana_chain()?,
        ))
    }

    pub fn forge(&self) -> Result<TokenForge> {
        Ok(TokenForge::new(self.token_store()?))
    }

    pub fn token_store(&self) -> Result<TokenStore> {
        Ok(TokenStore::load(self.config.token_store_path()?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(dir: &tempfile::TempDir, rpc_url: Option<&str>) -> AppContext {
        AppContext::load(GlobalArgs {
            config: Some(dir.path().join("config.json")),
            rpc_url: rpc_url.map(str::to_string),
            keypair: None,
            wallet_rpc: None,
            json: false,
        })
        .unwrap()
    }

    #[test]
    fn first_load_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, None);
        assert!(dir.path().join("config.json").exists());
        assert_eq!(ctx.evm_chain().unwrap(), Chain::CronosTestnet);
        assert_eq!(ctx.solana_chain().unwrap(), Chain::SolanaDevnet);
        assert_eq!(ctx.profile(None).unwrap(), EncodingProfile::AnchorForgeV1);
        assert_eq!(
            ctx.profile(Some("solang-bytes32-v1")).unwrap(),
            EncodingProfile::SolangBytes32V1
        );
        assert!(ctx.profile(Some("v2")).is_err());
    }

    #[test]
    fn rpc_flag_overrides_selected_network() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, Some("http://localhost:8899"));
        let network = ctx.network(Chain::SolanaDevnet).unwrap();
        assert_eq!(network.rpc_url, "http://localhost:8899");
        assert!(network.is_custom);
        assert!(!ctx.registry.descriptor(Chain::SolanaDevnet).is_custom);

        let bad = context(&dir, Some("ftp://example.com"));
        assert!(bad.network(Chain::CronosTestnet).is_err());
    }

    #[test]
    fn mismatched_network_kinds_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, None);
        ctx.config.evm_network = "solana_mainnet".into();
        ctx.config.solana_network = "cronos_mainnet".into();
        assert!(ctx.evm_chain().is_err());
        assert!(ctx.solana_chain().is_err());
    }
}
