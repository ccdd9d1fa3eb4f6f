//! The creation flow: validate, submit through a chain client, record.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::error::{ForgeError, ForgeResult};
use crate::network::Chain;
use crate::request::TokenCreationRequest;
use crate::token_store::{TokenRecord, TokenStore};

/// Outcome of a successful submission, independent of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedToken {
    pub chain: Chain,
    /// Token contract, mint, or program data account.
    pub address: String,
    pub owner: String,
    /// Transaction hash or signature.
    pub transaction_reference: String,
}

/// A chain client able to create tokens.
#[async_trait]
pub trait TokenCreator: Send + Sync {
    fn chain(&self) -> Chain;

    async fn create(&self, request: &TokenCreationRequest) -> ForgeResult<CreatedToken>;
}

/// Owns the local token store and runs creations against it.
pub struct TokenForge {
    store: TokenStore,
}

impl TokenForge {
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TokenStore {
        &mut self.store
    }

    /// Validate `request`, create the token through `creator` and persist a
    /// record of it. Nothing is sent when validation fails, and nothing is
    /// recorded when submission fails.
    pub async fn create(
        &mut self,
        creator: &dyn TokenCreator,
        request: &TokenCreationRequest,
    ) -> ForgeResult<TokenRecord> {
        if let Err(e) = request.validate() {
            warn!(symbol = %request.symbol, error = %e, "token request rejected");
            return Err(e.into());
        }

        let created = creator.create(request).await?;
        self.record(request, created)
    }

    /// Persist a token created outside [`Self::create`].
    ///
    /// The token already exists on chain at this point, so a failed write
    /// keeps the address and transaction reference in the error.
    pub fn record(
        &mut self,
        request: &TokenCreationRequest,
        created: CreatedToken,
    ) -> ForgeResult<TokenRecord> {
        let record = TokenRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.clone(),
            symbol: request.symbol.clone(),
            decimals: request.decimals,
            total_supply: request.initial_supply.to_string(),
            mint_address: created.address,
            owner: created.owner,
            created_at: Utc::now(),
            transaction_reference: created.transaction_reference,
            chain: created.chain,
        };
        if let Err(e) = self.store.add(record.clone()) {
            warn!(
                chain = %record.chain,
                address = %record.mint_address,
                tx = %record.transaction_reference,
                error = %e,
                "token created but not recorded"
            );
            return Err(ForgeError::Storage(format!(
                "token {} created on {} (tx {}) but not recorded: {e}",
                record.mint_address, record.chain, record.transaction_reference
            )));
        }

        info!(
            id = %record.id,
            chain = %record.chain,
            address = %record.mint_address,
            "token created and recorded"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FakeCreator {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeCreator {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl TokenCreator for FakeCreator {
        fn chain(&self) -> Chain {
            Chain::CronosTestnet
        }

        async fn create(&self, _request: &TokenCreationRequest) -> ForgeResult<CreatedToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ForgeError::WalletNotConnected);
            }
            Ok(CreatedToken {
                chain: Chain::CronosTestnet,
                address: "0x00000000000000000000000000000000000000aa".into(),
                owner: "0x00000000000000000000000000000000000000bb".into(),
                transaction_reference: "0xhash".into(),
            })
        }
    }

    fn forge() -> (tempfile::TempDir, TokenForge) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::load(dir.path().join("tokens.json")).unwrap();
        (dir, TokenForge::new(store))
    }

    #[tokio::test]
    async fn records_successful_creation() {
        let (_dir, mut forge) = forge();
        let creator = FakeCreator::new(false);
        let request = TokenCreationRequest::new("Forge", "FRG", 18, 1_000);

        let record = forge.create(&creator, &request).await.unwrap();
        assert_eq!(record.symbol, "FRG");
        assert_eq!(record.total_supply, "1000");
        assert_eq!(record.transaction_reference, "0xhash");
        assert_eq!(forge.store().list()[0], record);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_creator() {
        let (_dir, mut forge) = forge();
        let creator = FakeCreator::new(false);
        let request = TokenCreationRequest::new("Forge", "FRG", 18, 1_500).with_max_supply(1_000);

        let err = forge.create(&creator, &request).await.unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
        assert_eq!(creator.calls.load(Ordering::SeqCst), 0);
        assert!(forge.store().is_empty());
    }

    #[tokio::test]
    async fn failed_write_reports_the_created_token() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let store = TokenStore::load(blocker.join("tokens.json")).unwrap();
        let mut forge = TokenForge::new(store);
        let creator = FakeCreator::new(false);
        let request = TokenCreationRequest::new("Forge", "FRG", 18, 1_000);

        let err = forge.create(&creator, &request).await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, ForgeError::Storage(_)));
        assert!(message.contains("0xhash"), "{message}");
        assert!(message.contains("0x00000000000000000000000000000000000000aa"), "{message}");
        assert_eq!(creator.calls.load(Ordering::SeqCst), 1);
        assert!(forge.store().is_empty());
    }

    #[tokio::test]
    async fn failed_submission_is_not_recorded() {
        let (_dir, mut forge) = forge();
        let creator = FakeCreator::new(true);
        let request = TokenCreationRequest::new("Forge", "FRG", 18, 1_000);

        assert!(forge.create(&creator, &request).await.is_err());
        assert!(forge.store().is_empty());
    }
}
