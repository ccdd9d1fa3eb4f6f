//! EVM side: factory and token ABIs, the wallet provider and the token client.

pub mod abi;
pub mod client;
pub mod wallet;

pub use abi::ForgeAbi;
pub use client::{
    CreatedEvmToken, EvmClientConfig, EvmTokenClient, TOKEN_DECIMALS, TokenInfo, parse_address,
    parse_amount, scale_whole_tokens,
};
pub use wallet::{InjectedWallet, UNRECOGNIZED_CHAIN};
