use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ForgeError, ForgeResult};
use crate::network::Chain;

/// A token created from this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
    pub mint_address: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub transaction_reference: String,
    pub chain: Chain,
}

/// Locally created tokens, newest first, persisted as one JSON array.
///
/// Every mutation rewrites the file; there is no server-side copy.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    tokens: Vec<TokenRecord>,
}

impl TokenStore {
    /// Open the store at `path`. A missing file yields an empty store; a file
    /// that cannot be parsed is an error rather than silently discarded.
    pub fn load(path: impl Into<PathBuf>) -> ForgeResult<Self> {
        let path = path.into();
        if !path.exists() {
            info!(path = %path.display(), "token store not found, starting empty");
            return Ok(Self {
                path,
                tokens: Vec::new(),
            });
        }

        let json = std::fs::read_to_string(&path).map_err(|e| {
            ForgeError::Storage(format!("failed to read {}: {e}", path.display()))
        })?;
        let tokens: Vec<TokenRecord> = if json.trim().is_empty() {
            warn!(path = %path.display(), "token store file is empty");
            Vec::new()
        } else {
            serde_json::from_str(&json).map_err(|e| {
                ForgeError::Storage(format!("corrupt token store {}: {e}", path.display()))
            })?
        };
        info!(path = %path.display(), count = tokens.len(), "token store loaded");
        Ok(Self { path, tokens })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert `record` at the front and persist. The insert is undone when
    /// the file cannot be written.
    pub fn add(&mut self, record: TokenRecord) -> ForgeResult<()> {
        let (id, symbol, chain) = (record.id.clone(), record.symbol.clone(), record.chain);
        self.tokens.insert(0, record);
        if let Err(e) = self.save() {
            self.tokens.remove(0);
            return Err(e);
        }
        info!(id = %id, symbol = %symbol, chain = %chain, "token recorded");
        Ok(())
    }

    /// Remove a record by id and persist. Returns the removed record, if any.
    pub fn remove(&mut self, id: &str) -> ForgeResult<Option<TokenRecord>> {
        let Some(pos) = self.tokens.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let removed = self.tokens.remove(pos);
        self.save()?;
        info!(id = %id, "token removed from store");
        Ok(Some(removed))
    }

    pub fn get(&self, id: &str) -> Option<&TokenRecord> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// All records, newest first.
    pub fn list(&self) -> &[TokenRecord] {
        &self.tokens
    }

    pub fn by_chain(&self, chain: Chain) -> Vec<&TokenRecord> {
        self.tokens.iter().filter(|t| t.chain == chain).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn save(&self) -> ForgeResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ForgeError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(&self.tokens)?;
        std::fs::write(&self.path, json).map_err(|e| {
            ForgeError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;
        info!(path = %self.path.display(), count = self.tokens.len(), "token store saved");
        Ok(())
    }
}
