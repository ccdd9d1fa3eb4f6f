// Local token store commands

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use forge_chain::validation::{format_number, truncate_address};
use forge_chain::{Chain, TokenRecord};

use super::utils::{emit, info, success};
use crate::context::AppContext;

#[derive(Args)]
pub struct TokensCmd {
    #[command(subcommand)]
    command: TokensSubcommand,
}

#[derive(Subcommand)]
enum TokensSubcommand {
    /// List recorded tokens, newest first
    List {
        /// Only tokens on this network (e.g. cronos_testnet)
        #[arg(long)]
        network: Option<String>,
    },

    /// Forget a recorded token. Nothing changes on chain.
    Remove {
        /// Record id
        id: String,
    },
}

fn print_record(record: &TokenRecord) {
    let supply = record
        .total_supply
        .parse::<u128>()
        .map(format_number)
        .unwrap_or_else(|_| record.total_supply.clone());
    println!(
        "{}  {:<10} {:<24} {:<16} {}  {}",
        record.created_at.format("%Y-%m-%d %H:%M"),
        record.symbol,
        truncate_address(&record.mint_address, 8, 6),
        record.chain.key(),
        supply,
        record.id
    );
}

pub fn execute(cmd: TokensCmd, ctx: &AppContext) -> Result<()> {
    let mut store = ctx.token_store()?;
    match cmd.command {
        TokensSubcommand::List { network } => {
            let records: Vec<&TokenRecord> = match network {
                Some(key) => {
                    let chain: Chain = key.parse()?;
                    store.by_chain(chain)
                }
                None => store.list().iter().collect(),
            };
            emit(ctx.json, &records, |records| {
                if records.is_empty() {
                    info(&format!("no tokens recorded in {}", store.path().display()));
                }
                for record in records {
                    print_record(record);
                }
            })
        }

        TokensSubcommand::Remove { id } => match store.remove(&id)? {
            Some(removed) => {
                success(&format!("Removed {} ({})", removed.symbol, removed.id));
                Ok(())
            }
            None => bail!("no token with id {id}"),
        },
    }
}
