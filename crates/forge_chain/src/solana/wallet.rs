use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer, read_keypair_file};
use solana_sdk::transaction::Transaction;
use tracing::info;

use crate::error::{ForgeError, ForgeResult};

/// Signing capability for Solana transactions.
#[async_trait]
pub trait SolanaWallet: Send + Sync {
    /// Current signer identity, `None` when disconnected.
    fn public_key(&self) -> Option<Pubkey>;

    /// Add the wallet's signature to `tx`, keeping signatures already present.
    async fn sign_transaction(&self, tx: Transaction) -> ForgeResult<Transaction>;
}

/// Wallet backed by a local keypair (the Solana CLI's JSON key format).
#[derive(Default)]
pub struct KeypairWallet {
    keypair: RwLock<Option<Keypair>>,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair: RwLock::new(Some(keypair)),
        }
    }

    /// A wallet with no key loaded.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Load a keypair file. A leading `~` expands to the home directory.
    pub fn from_file(path: &str) -> ForgeResult<Self> {
        let path = expand_tilde(path);
        let keypair = read_keypair_file(&path).map_err(|e| {
            ForgeError::Wallet(format!("failed to load keypair from {}: {e}", path.display()))
        })?;
        info!(pubkey = %keypair.pubkey(), path = %path.display(), "loaded keypair");
        Ok(Self::new(keypair))
    }

    pub fn connect(&self, keypair: Keypair) {
        *self.keypair.write() = Some(keypair);
    }

    pub fn disconnect(&self) {
        *self.keypair.write() = None;
    }
}

#[async_trait]
impl SolanaWallet for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.keypair.read().as_ref().map(Keypair::pubkey)
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> ForgeResult<Transaction> {
        let guard = self.keypair.read();
        let keypair = guard.as_ref().ok_or(ForgeError::WalletNotConnected)?;
        let blockhash = tx.message.recent_blockhash;
        tx.try_partial_sign(&[keypair], blockhash)
            .map_err(|e| ForgeError::Wallet(e.to_string()))?;
        Ok(tx)
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => Path::new(path).to_path_buf(),
    }
}
