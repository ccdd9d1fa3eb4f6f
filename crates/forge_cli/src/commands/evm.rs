// Token factory commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use forge_chain::evm::{TOKEN_DECIMALS, TokenInfo, parse_address};
use forge_chain::validation::{format_number, format_token_amount};
use forge_chain::{EvmTokenClient, TokenCreationRequest};
use web3::types::{Address, H256};

use super::utils::{emit, info, success};
use crate::context::AppContext;

#[derive(Args)]
pub struct EvmCmd {
    #[command(subcommand)]
    command: EvmSubcommand,
}

#[derive(Subcommand)]
enum EvmSubcommand {
    /// Deploy a token through the factory
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        /// Initial supply in whole tokens
        #[arg(long)]
        supply: u128,

        /// Supply cap in whole tokens (0 or absent for none)
        #[arg(long)]
        max_supply: Option<u128>,
    },

    /// Mint tokens to an address
    Mint {
        #[arg(long)]
        token: String,

        #[arg(long)]
        to: String,

        /// Amount in whole tokens, e.g. 1.5
        #[arg(long)]
        amount: String,
    },

    /// Burn tokens from the connected account
    Burn {
        #[arg(long)]
        token: String,

        #[arg(long)]
        amount: String,
    },

    /// Pause transfers
    Pause {
        #[arg(long)]
        token: String,
    },

    /// Resume transfers
    Unpause {
        #[arg(long)]
        token: String,
    },

    /// Show token metadata
    Info {
        #[arg(long)]
        token: String,

        /// Also show this holder's balance
        #[arg(long)]
        holder: Option<String>,
    },

    /// Tokens created by an account through the current factory
    List {
        /// Creator address (defaults to the connected account)
        #[arg(long)]
        creator: Option<String>,
    },

    /// Tokens created by an account across current and legacy factories
    Verify {
        #[arg(long)]
        creator: Option<String>,
    },

    /// Number of tokens the factory has deployed
    Count,
}

fn address(value: &str) -> Result<Address> {
    parse_address(value).with_context(|| format!("invalid address {value}"))
}

async fn creator_or_signer(client: &EvmTokenClient, creator: Option<&str>) -> Result<Address> {
    match creator {
        Some(creator) => address(creator),
        None => Ok(client.wallet().signer().await?),
    }
}

fn print_tx(ctx: &AppContext, client: &EvmTokenClient, label: &str, hash: H256) -> Result<()> {
    let hash = format!("{hash:#x}");
    let explorer = client.config().network.explorer_tx_url(&hash);
    emit(
        ctx.json,
        &serde_json::json!({ "transactionHash": hash, "explorer": explorer }),
        |_| {
            success(&format!("{label}: {hash}"));
            info(&explorer);
        },
    )
}

fn print_tokens(ctx: &AppContext, tokens: &[TokenInfo]) -> Result<()> {
    emit(ctx.json, tokens, |tokens| {
        if tokens.is_empty() {
            info("no tokens found");
        }
        for token in tokens {
            print_token(token);
        }
    })
}

fn print_token(token: &TokenInfo) {
    let supply = format_token_amount(&token.total_supply.to_string(), token.decimals)
        .unwrap_or_else(|| token.total_supply.to_string());
    println!("{:#x}  {} ({})", token.address, token.name, token.symbol);
    println!("  decimals      {}", token.decimals);
    println!("  total supply  {supply}");
    if let Some(balance) = token.balance {
        let balance = format_token_amount(&balance.to_string(), token.decimals)
            .unwrap_or_else(|| balance.to_string());
        println!("  balance       {balance}");
    }
    if let Some(paused) = token.paused {
        println!("  paused        {paused}");
    }
}

pub async fn execute(cmd: EvmCmd, ctx: &AppContext) -> Result<()> {
    let client = ctx.evm_client()?;
    match cmd.command {
        EvmSubcommand::Create {
            name,
            symbol,
            supply,
            max_supply,
        } => {
            let mut request = TokenCreationRequest::new(name, symbol, TOKEN_DECIMALS, supply);
            if let Some(max) = max_supply {
                request = request.with_max_supply(max);
            }
            info(&format!(
                "Creating {} ({}) with {} tokens on {}...",
                request.name,
                request.symbol,
                format_number(supply),
                client.config().network.name
            ));

            let mut forge = ctx.forge()?;
            let record = forge.create(&client, &request).await?;
            let network = &client.config().network;
            emit(ctx.json, &record, |record| {
                success(&format!("Token deployed at {}", record.mint_address));
                info(&format!("Transaction: {}", record.transaction_reference));
                info(&network.explorer_address_url(&record.mint_address));
            })
        }

        EvmSubcommand::Mint { token, to, amount } => {
            let hash = client
                .mint_tokens(address(&token)?, address(&to)?, &amount)
                .await?;
            print_tx(ctx, &client, &format!("Minted {amount}"), hash)
        }

        EvmSubcommand::Burn { token, amount } => {
            let hash = client.burn_tokens(address(&token)?, &amount).await?;
            print_tx(ctx, &client, &format!("Burned {amount}"), hash)
        }

        EvmSubcommand::Pause { token } => {
            let hash = client.pause(address(&token)?).await?;
            print_tx(ctx, &client, "Paused", hash)
        }

        EvmSubcommand::Unpause { token } => {
            let hash = client.unpause(address(&token)?).await?;
            print_tx(ctx, &client, "Unpaused", hash)
        }

        EvmSubcommand::Info { token, holder } => {
            let holder = holder.as_deref().map(address).transpose()?;
            let token = client.token_info(address(&token)?, holder).await?;
            emit(ctx.json, &token, print_token)
        }

        EvmSubcommand::List { creator } => {
            let creator = creator_or_signer(&client, creator.as_deref()).await?;
            let tokens = client.creator_tokens(creator).await?;
            print_tokens(ctx, &tokens)
        }

        EvmSubcommand::Verify { creator } => {
            let creator = creator_or_signer(&client, creator.as_deref()).await?;
            let tokens = client.verify_creator_tokens(creator).await?;
            print_tokens(ctx, &tokens)
        }

        EvmSubcommand::Count => {
            let count = client.token_count().await?;
            emit(ctx.json, &count.to_string(), |count| {
                info(&format!("Factory has deployed {count} tokens"));
            })
        }
    }
}
