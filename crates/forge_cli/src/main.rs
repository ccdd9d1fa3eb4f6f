// Command-line front end for creating and managing tokens on Cronos and
// Solana.

mod commands;
mod context;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use context::{AppContext, GlobalArgs};

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "Create and manage tokens on Cronos and Solana", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.forge/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// RPC endpoint for the network the command talks to
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Path to the Solana keypair file
    #[arg(long, global = true)]
    keypair: Option<String>,

    /// JSON-RPC endpoint of the EVM wallet provider
    #[arg(long, global = true)]
    wallet_rpc: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check token parameters without sending anything
    Validate(commands::validate::ValidateCmd),

    /// Show the instruction bytes a Solana program profile would receive
    Encode(commands::encode::EncodeCmd),

    /// List known networks
    Networks,

    /// Token factory operations on Cronos
    Evm(commands::evm::EvmCmd),

    /// Forge program and SPL mint operations on Solana
    Solana(commands::solana::SolanaCmd),

    /// Locally recorded tokens
    Tokens(commands::tokens::TokensCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::load(GlobalArgs {
        config: cli.config,
        rpc_url: cli.rpc_url,
        keypair: cli.keypair,
        wallet_rpc: cli.wallet_rpc,
        json: cli.json,
    })?;

    // Console output still works when the log directory is unavailable.
    let _log_guard = match forge_core::init_logging(&ctx.config.log_level) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("[WARN] logging disabled: {e}");
            None
        }
    };

    let result = match cli.command {
        Commands::Validate(cmd) => commands::validate::execute(cmd, &ctx),
        Commands::Encode(cmd) => commands::encode::execute(cmd, &ctx),
        Commands::Networks => commands::networks::execute(&ctx),
        Commands::Evm(cmd) => commands::evm::execute(cmd, &ctx).await,
        Commands::Solana(cmd) => commands::solana::execute(cmd, &ctx).await,
        Commands::Tokens(cmd) => commands::tokens::execute(cmd, &ctx),
    };
    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result
}
