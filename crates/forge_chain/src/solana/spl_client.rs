//! Plain SPL Token mints, created directly through the token program.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use solana_program::program_pack::Pack;
use solana_program::system_instruction;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use tracing::info;

use super::encoder::EncodeError;
use super::rpc::{SolanaRpcClient, TokenAmount};
use super::wallet::SolanaWallet;
use crate::error::{ForgeError, ForgeResult};
use crate::forge::{CreatedToken, TokenCreator};
use crate::network::Chain;
use crate::request::TokenCreationRequest;
use crate::serde_util;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSplMint {
    #[serde(serialize_with = "serde_util::display")]
    pub signature: Signature,
    #[serde(serialize_with = "serde_util::display")]
    pub mint: Pubkey,
    #[serde(serialize_with = "serde_util::display")]
    pub owner: Pubkey,
    #[serde(serialize_with = "serde_util::display")]
    pub owner_token_account: Pubkey,
    pub initial_supply: u64,
}

/// Instructions that create and initialise a mint owned by `authority`,
/// open the authority's associated token account and mint `supply` into it.
pub fn create_mint_instructions(
    authority: &Pubkey,
    mint: &Pubkey,
    decimals: u8,
    supply: u64,
    mint_rent: u64,
) -> ForgeResult<Vec<Instruction>> {
    let token_program = spl_token::id();
    let owner_token_account = get_associated_token_address(authority, mint);

    let mut instructions = vec![
        system_instruction::create_account(
            authority,
            mint,
            mint_rent,
            spl_token::state::Mint::LEN as u64,
            &token_program,
        ),
        spl_token::instruction::initialize_mint2(
            &token_program,
            mint,
            authority,
            Some(authority),
            decimals,
        )
        .map_err(|e| ForgeError::Instruction(e.to_string()))?,
        create_associated_token_account_idempotent(authority, authority, mint, &token_program),
    ];
    if supply > 0 {
        instructions.push(
            spl_token::instruction::mint_to(
                &token_program,
                mint,
                &owner_token_account,
                authority,
                &[],
                supply,
            )
            .map_err(|e| ForgeError::Instruction(e.to_string()))?,
        );
    }
    Ok(instructions)
}

pub struct SplMintClient {
    rpc: SolanaRpcClient,
    wallet: Arc<dyn SolanaWallet>,
    chain: Chain,
}

impl SplMintClient {
    pub fn new(rpc: SolanaRpcClient, wallet: Arc<dyn SolanaWallet>, chain: Chain) -> Self {
        Self { rpc, wallet, chain }
    }

    fn authority(&self) -> ForgeResult<Pubkey> {
        self.wallet.public_key().ok_or(ForgeError::WalletNotConnected)
    }

    /// Create a mint with the wallet as mint and freeze authority and mint the
    /// initial supply (in base units) to the wallet, in one transaction.
    pub async fn create_token(&self, request: &TokenCreationRequest) -> ForgeResult<CreatedSplMint> {
        request.validate()?;
        let supply = u64::try_from(request.initial_supply)
            .map_err(|_| EncodeError::SupplyOutOfRange(request.initial_supply))?;
        let authority = self.authority()?;
        let mint = Keypair::new();

        let rent = self
            .rpc
            .minimum_balance_for_rent_exemption(spl_token::state::Mint::LEN as u64)
            .await?;
        let instructions =
            create_mint_instructions(&authority, &mint.pubkey(), request.decimals, supply, rent)?;
        let signature = self
            .rpc
            .submit(self.wallet.as_ref(), &instructions, authority, &[&mint])
            .await?;

        info!(
            signature = %signature,
            mint = %mint.pubkey(),
            decimals = request.decimals,
            supply,
            "SPL mint created"
        );
        Ok(CreatedSplMint {
            signature,
            mint: mint.pubkey(),
            owner: authority,
            owner_token_account: get_associated_token_address(&authority, &mint.pubkey()),
            initial_supply: supply,
        })
    }

    /// Mint additional base units to the wallet's associated token account,
    /// opening it first if needed.
    pub async fn mint_tokens(&self, mint: &Pubkey, amount: u64) -> ForgeResult<Signature> {
        let authority = self.authority()?;
        let token_program = spl_token::id();
        let destination = get_associated_token_address(&authority, mint);
        let instructions = vec![
            create_associated_token_account_idempotent(&authority, &authority, mint, &token_program),
            spl_token::instruction::mint_to(
                &token_program,
                mint,
                &destination,
                &authority,
                &[],
                amount,
            )
            .map_err(|e| ForgeError::Instruction(e.to_string()))?,
        ];
        let signature = self
            .rpc
            .submit(self.wallet.as_ref(), &instructions, authority, &[])
            .await?;
        info!(signature = %signature, mint = %mint, amount, "minted");
        Ok(signature)
    }

    pub async fn token_supply(&self, mint: &Pubkey) -> ForgeResult<TokenAmount> {
        self.rpc.token_supply(mint).await
    }
}

#[async_trait]
impl TokenCreator for SplMintClient {
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn create(&self, request: &TokenCreationRequest) -> ForgeResult<CreatedToken> {
        let created = self.create_token(request).await?;
        Ok(CreatedToken {
            chain: self.chain,
            address: created.mint.to_string(),
            owner: created.owner.to_string(),
            transaction_reference: created.signature.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;
    use solana_sdk::hash::Hash;
    use solana_sdk::transaction::Transaction;

    use super::*;
    use crate::rpc::testing::ScriptedRpc;
    use crate::solana::wallet::KeypairWallet;

    fn scripted() -> Arc<ScriptedRpc> {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.always(
            "getLatestBlockhash",
            json!({"context": {"slot": 1}, "value": {"blockhash": Hash::new_unique().to_string(), "lastValidBlockHeight": 9}}),
        );
        rpc.always("getMinimumBalanceForRentExemption", json!(1_461_600));
        rpc.always("sendTransaction", json!(Signature::from([3u8; 64]).to_string()));
        rpc.always(
            "getSignatureStatuses",
            json!({"context": {"slot": 2}, "value": [{"slot": 2, "err": null, "confirmationStatus": "finalized"}]}),
        );
        rpc
    }

    fn client(rpc: Arc<ScriptedRpc>, wallet: Arc<KeypairWallet>) -> SplMintClient {
        let rpc = SolanaRpcClient::new(rpc, Duration::from_millis(10), Duration::from_secs(1));
        SplMintClient::new(rpc, wallet, Chain::SolanaDevnet)
    }

    #[test]
    fn instructions_skip_mint_to_for_zero_supply() {
        let authority = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let with_supply = create_mint_instructions(&authority, &mint, 6, 1_000, 1).unwrap();
        assert_eq!(with_supply.len(), 4);
        assert_eq!(with_supply[1].program_id, spl_token::id());
        assert_eq!(with_supply[2].program_id, spl_associated_token_account::id());
        assert_eq!(with_supply[3].program_id, spl_token::id());

        let without = create_mint_instructions(&authority, &mint, 6, 0, 1).unwrap();
        assert_eq!(without.len(), 3);
    }

    #[tokio::test]
    async fn create_token_sends_single_transaction_signed_by_mint() {
        let rpc = scripted();
        let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
        let authority = wallet.public_key().unwrap();

        let created = client(rpc.clone(), wallet)
            .create_token(&TokenCreationRequest::new("Plain", "PLN", 6, 5_000))
            .await
            .unwrap();

        let sent = rpc.calls_to("sendTransaction");
        assert_eq!(sent.len(), 1);
        let raw = STANDARD.decode(sent[0][0].as_str().unwrap()).unwrap();
        let tx: Transaction = bincode::deserialize(&raw).unwrap();
        assert!(tx.verify().is_ok());
        assert_eq!(tx.message.header.num_required_signatures, 2);
        assert_eq!(tx.message.instructions.len(), 4);

        assert_eq!(created.owner, authority);
        assert_eq!(
            created.owner_token_account,
            get_associated_token_address(&authority, &created.mint)
        );
        assert_eq!(created.initial_supply, 5_000);
        assert_eq!(rpc.calls_to("getMinimumBalanceForRentExemption")[0], json!([82]));
    }

    #[tokio::test]
    async fn disconnected_wallet_sends_nothing() {
        let rpc = scripted();
        let wallet = Arc::new(KeypairWallet::disconnected());
        let err = client(rpc.clone(), wallet)
            .create_token(&TokenCreationRequest::new("Plain", "PLN", 6, 5_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::WalletNotConnected));
        assert!(rpc.calls().is_empty());
    }

    #[tokio::test]
    async fn mint_tokens_opens_ata_idempotently() {
        let rpc = scripted();
        let wallet = Arc::new(KeypairWallet::new(Keypair::new()));
        client(rpc.clone(), wallet)
            .mint_tokens(&Pubkey::new_unique(), 42)
            .await
            .unwrap();

        let sent = rpc.calls_to("sendTransaction");
        let raw = STANDARD.decode(sent[0][0].as_str().unwrap()).unwrap();
        let tx: Transaction = bincode::deserialize(&raw).unwrap();
        assert_eq!(tx.message.instructions.len(), 2);
    }

    #[tokio::test]
    async fn token_supply_reads_rpc() {
        let rpc = scripted();
        rpc.push(
            "getTokenSupply",
            json!({"context": {"slot": 1}, "value": {"amount": "5000", "decimals": 6, "uiAmount": 0.005, "uiAmountString": "0.005"}}),
        );
        let wallet = Arc::new(KeypairWallet::disconnected());
        let supply = client(rpc, wallet)
            .token_supply(&Pubkey::new_unique())
            .await
            .unwrap();
        assert_eq!(supply.ui_amount_string, "0.005");
    }
}
