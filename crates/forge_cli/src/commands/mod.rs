// Subcommand implementations

pub mod encode;
pub mod evm;
pub mod networks;
pub mod solana;
pub mod tokens;
pub mod utils;
pub mod validate;
