// Forge program and SPL mint commands

use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use forge_chain::validation::format_token_amount;
use forge_chain::{NetworkDescriptor, TokenCreationRequest};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;

use super::utils::{emit, info, success};
use crate::context::AppContext;

#[derive(Args)]
pub struct SolanaCmd {
    #[command(subcommand)]
    command: SolanaSubcommand,
}

#[derive(Subcommand)]
enum SolanaSubcommand {
    /// Create a token through the deployed Forge program
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        #[arg(long, default_value_t = 9)]
        decimals: u8,

        /// Initial supply in base units
        #[arg(long)]
        supply: u128,

        /// Supply cap in base units
        #[arg(long)]
        max_supply: Option<u128>,

        /// Encoding profile (defaults to the configured one)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Mint base units through the program into the wallet's token account
    Mint {
        #[arg(long)]
        mint: String,

        #[arg(long)]
        token_config: String,

        #[arg(long)]
        amount: u64,
    },

    /// Burn base units through the program from the wallet's token account
    Burn {
        #[arg(long)]
        mint: String,

        #[arg(long)]
        token_config: String,

        #[arg(long)]
        amount: u64,
    },

    /// Show a program token config account
    Config {
        #[arg(long)]
        token_config: String,
    },

    /// Create a plain SPL mint without the Forge program
    SplCreate {
        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        #[arg(long, default_value_t = 9)]
        decimals: u8,

        /// Initial supply in base units
        #[arg(long)]
        supply: u128,
    },

    /// Mint base units of a plain SPL mint to the wallet
    SplMint {
        #[arg(long)]
        mint: String,

        #[arg(long)]
        amount: u64,
    },

    /// Show the supply of a mint
    Supply {
        #[arg(long)]
        mint: String,
    },
}

fn pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("invalid public key {value}"))
}

fn print_signature(
    ctx: &AppContext,
    network: &NetworkDescriptor,
    label: &str,
    signature: Signature,
) -> Result<()> {
    let signature = signature.to_string();
    let explorer = network.explorer_tx_url(&signature);
    emit(
        ctx.json,
        &serde_json::json!({ "signature": signature, "explorer": explorer }),
        |_| {
            success(&format!("{label}: {signature}"));
            info(&explorer);
        },
    )
}

pub async fn execute(cmd: SolanaCmd, ctx: &AppContext) -> Result<()> {
    let chain = ctx.solana_chain()?;
    let network = ctx.network(chain)?;

    match cmd.command {
        SolanaSubcommand::Create {
            name,
            symbol,
            decimals,
            supply,
            max_supply,
            profile,
        } => {
            let profile = ctx.profile(profile.as_deref())?;
            let mut request = TokenCreationRequest::new(name, symbol, decimals, supply);
            if let Some(max) = max_supply {
                request = request.with_max_supply(max);
            }
            info(&format!(
                "Creating {} ({}) through {} on {}...",
                request.name, request.symbol, profile, network.name
            ));

            let client = ctx.program_client(profile)?;
            let mut forge = ctx.forge()?;
            let created = client.create_token(&request).await?;
            let record = forge.record(&request, created.summary(chain)?)?;
            emit(ctx.json, &created, |created| {
                success(&format!("Token created: {}", record.mint_address));
                info(&format!("Signature: {}", created.signature));
                if let Some(token_config) = created.token_config {
                    info(&format!("Token config: {token_config}"));
                }
                if let Some(account) = created.owner_token_account {
                    info(&format!("Owner token account: {account}"));
                }
                info(&network.explorer_tx_url(&created.signature.to_string()));
            })
        }

        SolanaSubcommand::Mint {
            mint,
            token_config,
            amount,
        } => {
            let client = ctx.program_client(ctx.profile(None)?)?;
            let signature = client
                .mint_tokens(&pubkey(&mint)?, &pubkey(&token_config)?, amount)
                .await?;
            print_signature(ctx, &network, &format!("Minted {amount}"), signature)
        }

        SolanaSubcommand::Burn {
            mint,
            token_config,
            amount,
        } => {
            let client = ctx.program_client(ctx.profile(None)?)?;
            let signature = client
                .burn_tokens(&pubkey(&mint)?, &pubkey(&token_config)?, amount)
                .await?;
            print_signature(ctx, &network, &format!("Burned {amount}"), signature)
        }

        SolanaSubcommand::Config { token_config } => {
            let client = ctx.program_client(ctx.profile(None)?)?;
            let config = client.fetch_token_config(&pubkey(&token_config)?).await?;
            emit(ctx.json, &config, |config| {
                println!("{} ({})", config.name, config.symbol);
                println!("  mint          {}", config.mint);
                println!("  owner         {}", config.owner);
                println!("  decimals      {}", config.decimals);
                println!("  total supply  {}", config.total_supply);
                println!("  created at    {}", config.created_at);
            })
        }

        SolanaSubcommand::SplCreate {
            name,
            symbol,
            decimals,
            supply,
        } => {
            let request = TokenCreationRequest::new(name, symbol, decimals, supply);
            let client = ctx.spl_client()?;
            let mut forge = ctx.forge()?;
            let record = forge.create(&client, &request).await?;
            emit(ctx.json, &record, |record| {
                success(&format!("SPL mint created: {}", record.mint_address));
                info(&network.explorer_tx_url(&record.transaction_reference));
            })
        }

        SolanaSubcommand::SplMint { mint, amount } => {
            let signature = ctx.spl_client()?.mint_tokens(&pubkey(&mint)?, amount).await?;
            print_signature(ctx, &network, &format!("Minted {amount}"), signature)
        }

        SolanaSubcommand::Supply { mint } => {
            let supply = ctx.solana_rpc()?.token_supply(&pubkey(&mint)?).await?;
            let amount = format_token_amount(&supply.amount, supply.decimals)
                .unwrap_or_else(|| supply.ui_amount_string.clone());
            emit(
                ctx.json,
                &serde_json::json!({
                    "amount": supply.amount,
                    "decimals": supply.decimals,
                    "uiAmount": amount,
                }),
                |_| info(&format!("Supply: {amount} ({} base units)", supply.amount)),
            )
        }
    }
}
