//! Client for the deployed FORGE programs.
//!
//! The client is bound to one [`EncodingProfile`]; the profile decides the
//! instruction layout, the account list and whether a data account has to be
//! created first.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use solana_program::{system_instruction, system_program, sysvar};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use spl_associated_token_account::get_associated_token_address;
use tracing::{info, warn};

use super::encoder::{
    AmountInstruction, InstructionIdentifiers, TokenConfigAccount, decode_token_config,
    encode_amount_instruction, encode_create_token,
};
use super::profile::{DISPATCHER_DATA_ACCOUNT_SPACE, EncodingProfile};
use super::rpc::SolanaRpcClient;
use super::wallet::SolanaWallet;
use crate::error::{ForgeError, ForgeResult};
use crate::forge::{CreatedToken, TokenCreator};
use crate::network::Chain;
use crate::request::TokenCreationRequest;
use crate::serde_util;

/// Accounts produced by a create-token call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSolanaToken {
    #[serde(serialize_with = "serde_util::display")]
    pub signature: Signature,
    /// Data-account creation, for profiles that need one.
    #[serde(serialize_with = "serde_util::display_opt")]
    pub setup_signature: Option<Signature>,
    pub profile: EncodingProfile,
    #[serde(serialize_with = "serde_util::display_opt")]
    pub mint: Option<Pubkey>,
    #[serde(serialize_with = "serde_util::display_opt")]
    pub token_config: Option<Pubkey>,
    #[serde(serialize_with = "serde_util::display")]
    pub owner: Pubkey,
    #[serde(serialize_with = "serde_util::display_opt")]
    pub owner_token_account: Option<Pubkey>,
    #[serde(serialize_with = "serde_util::display_opt")]
    pub data_account: Option<Pubkey>,
}

impl CreatedSolanaToken {
    /// Address recorded for the token: the mint, or the data account for
    /// programs that keep token state there.
    pub fn token_address(&self) -> Option<Pubkey> {
        self.mint.or(self.data_account)
    }

    pub fn summary(&self, chain: Chain) -> ForgeResult<CreatedToken> {
        let address = self
            .token_address()
            .ok_or_else(|| ForgeError::InvalidResponse("no token address".into()))?;
        Ok(CreatedToken {
            chain,
            address: address.to_string(),
            owner: self.owner.to_string(),
            transaction_reference: self.signature.to_string(),
        })
    }
}

pub struct ForgeProgramClient {
    rpc: SolanaRpcClient,
    wallet: Arc<dyn SolanaWallet>,
    profile: EncodingProfile,
    chain: Chain,
}

impl ForgeProgramClient {
    pub fn new(
        rpc: SolanaRpcClient,
        wallet: Arc<dyn SolanaWallet>,
        profile: EncodingProfile,
        chain: Chain,
    ) -> Self {
        Self {
            rpc,
            wallet,
            profile,
            chain,
        }
    }

    pub fn profile(&self) -> EncodingProfile {
        self.profile
    }

    fn payer(&self) -> ForgeResult<Pubkey> {
        self.wallet.public_key().ok_or(ForgeError::WalletNotConnected)
    }

    async fn submit(
        &self,
        instructions: &[Instruction],
        payer: Pubkey,
        signers: &[&Keypair],
    ) -> ForgeResult<Signature> {
        self.rpc
            .submit(self.wallet.as_ref(), instructions, payer, signers)
            .await
    }

    /// Create a token through the program. The request is validated and
    /// encoded, and the wallet checked, before anything is sent.
    pub async fn create_token(
        &self,
        request: &TokenCreationRequest,
    ) -> ForgeResult<CreatedSolanaToken> {
        request.validate()?;
        let payer = self.payer()?;
        info!(
            profile = %self.profile,
            program = %self.profile.program_id(),
            name = %request.name,
            symbol = %request.symbol,
            "creating token"
        );
        match self.profile {
            EncodingProfile::AnchorForgeV1 => self.create_anchor(request, payer).await,
            EncodingProfile::SolangDispatcherV1 => self.create_dispatcher(request, payer).await,
            EncodingProfile::SolangBytes32V1 => self.create_bytes32(request, payer).await,
        }
    }

    async fn create_anchor(
        &self,
        request: &TokenCreationRequest,
        payer: Pubkey,
    ) -> ForgeResult<CreatedSolanaToken> {
        let encoded = encode_create_token(self.profile, request, None)?;
        let mint = Keypair::new();
        let token_config = Keypair::new();
        let owner_token_account = get_associated_token_address(&payer, &mint.pubkey());

        let accounts = vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(token_config.pubkey(), true),
            AccountMeta::new(mint.pubkey(), true),
            AccountMeta::new(owner_token_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ];
        let ix = Instruction::new_with_bytes(self.profile.program_id(), &encoded.to_bytes(), accounts);
        let signature = self.submit(&[ix], payer, &[&mint, &token_config]).await?;

        info!(signature = %signature, mint = %mint.pubkey(), "token created");
        Ok(CreatedSolanaToken {
            signature,
            setup_signature: None,
            profile: self.profile,
            mint: Some(mint.pubkey()),
            token_config: Some(token_config.pubkey()),
            owner: payer,
            owner_token_account: Some(owner_token_account),
            data_account: None,
        })
    }

    async fn create_dispatcher(
        &self,
        request: &TokenCreationRequest,
        payer: Pubkey,
    ) -> ForgeResult<CreatedSolanaToken> {
        let encoded = encode_create_token(self.profile, request, None)?;
        let program_id = self.profile.program_id();
        let data_account = Keypair::new();
        let space = self
            .profile
            .data_account_space()
            .unwrap_or(DISPATCHER_DATA_ACCOUNT_SPACE);

        let lamports = self.rpc.minimum_balance_for_rent_exemption(space).await?;
        let create = system_instruction::create_account(
            &payer,
            &data_account.pubkey(),
            lamports,
            space,
            &program_id,
        );
        let setup_signature = self.submit(&[create], payer, &[&data_account]).await?;
        info!(
            signature = %setup_signature,
            data_account = %data_account.pubkey(),
            "data account created"
        );

        let call = Instruction::new_with_bytes(
            program_id,
            &encoded.to_bytes(),
            vec![AccountMeta::new(data_account.pubkey(), false)],
        );
        let signature = match self.submit(&[call], payer, &[]).await {
            Ok(signature) => signature,
            Err(e) => {
                warn!(
                    data_account = %data_account.pubkey(),
                    error = %e,
                    "createToken failed after data account was funded"
                );
                return Err(e);
            }
        };

        info!(signature = %signature, "token created");
        Ok(CreatedSolanaToken {
            signature,
            setup_signature: Some(setup_signature),
            profile: self.profile,
            mint: None,
            token_config: None,
            owner: payer,
            owner_token_account: None,
            data_account: Some(data_account.pubkey()),
        })
    }

    async fn create_bytes32(
        &self,
        request: &TokenCreationRequest,
        payer: Pubkey,
    ) -> ForgeResult<CreatedSolanaToken> {
        let token_config = Keypair::new();
        let mint = Keypair::new();
        let owner_token_account = Keypair::new();
        let identifiers = InstructionIdentifiers {
            payer,
            token_config: token_config.pubkey(),
            mint: mint.pubkey(),
            owner_token_account: owner_token_account.pubkey(),
        };
        let encoded = encode_create_token(self.profile, request, Some(&identifiers))?;

        let accounts = vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(token_config.pubkey(), true),
            AccountMeta::new(mint.pubkey(), true),
            AccountMeta::new(owner_token_account.pubkey(), true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
        ];
        let ix = Instruction::new_with_bytes(self.profile.program_id(), &encoded.to_bytes(), accounts);
        let signature = self
            .submit(&[ix], payer, &[&token_config, &mint, &owner_token_account])
            .await?;

        info!(signature = %signature, mint = %mint.pubkey(), "token created");
        Ok(CreatedSolanaToken {
            signature,
            setup_signature: None,
            profile: self.profile,
            mint: Some(mint.pubkey()),
            token_config: Some(token_config.pubkey()),
            owner: payer,
            owner_token_account: Some(owner_token_account.pubkey()),
            data_account: None,
        })
    }

    /// Mint `amount` base units to the wallet's associated token account.
    pub async fn mint_tokens(
        &self,
        mint: &Pubkey,
        token_config: &Pubkey,
        amount: u64,
    ) -> ForgeResult<Signature> {
        self.amount_instruction(AmountInstruction::Mint, mint, token_config, amount)
            .await
    }

    /// Burn `amount` base units from the wallet's associated token account.
    pub async fn burn_tokens(
        &self,
        mint: &Pubkey,
        token_config: &Pubkey,
        amount: u64,
    ) -> ForgeResult<Signature> {
        self.amount_instruction(AmountInstruction::Burn, mint, token_config, amount)
            .await
    }

    async fn amount_instruction(
        &self,
        instruction: AmountInstruction,
        mint: &Pubkey,
        token_config: &Pubkey,
        amount: u64,
    ) -> ForgeResult<Signature> {
        let data = encode_amount_instruction(self.profile, instruction, amount)?;
        let payer = self.payer()?;
        let token_account = get_associated_token_address(&payer, mint);

        let accounts = vec![
            AccountMeta::new(payer, true),
            AccountMeta::new(*token_config, false),
            AccountMeta::new(*mint, false),
            AccountMeta::new(token_account, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ];
        let ix = Instruction::new_with_bytes(self.profile.program_id(), &data, accounts);
        let signature = self.submit(&[ix], payer, &[]).await?;
        info!(signature = %signature, ?instruction, amount, mint = %mint, "supply updated");
        Ok(signature)
    }

    /// Read and decode the program's `TokenConfig` account.
    pub async fn fetch_token_config(&self, token_config: &Pubkey) -> ForgeResult<TokenConfigAccount> {
        if !self.profile.supports_supply_management() {
            return Err(ForgeError::Unsupported(format!(
                "{} has no readable token config",
                self.profile
            )));
        }
        let data = self
            .rpc
            .account_data(token_config)
            .await?
            .ok_or_else(|| ForgeError::InvalidResponse(format!("account {token_config} not found")))?;
        Ok(decode_token_config(&data)?)
    }
}

#[async_trait]
impl TokenCreator for ForgeProgramClient {
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn create(&self, request: &TokenCreationRequest) -> ForgeResult<CreatedToken> {
        self.create_token(request).await?.summary(self.chain)
    }
}
