//! Token creation on an EVM chain and on Solana.
//!
//! The crate is layered leaves first: [`validation`] and [`request`] are
//! pure, [`solana::encoder`] turns a request into instruction bytes for one
//! deployed program profile, the chain clients submit through a wallet
//! capability, and [`forge::TokenForge`] strings the steps together and
//! records the result in the local [`token_store`].

pub mod error;
pub mod evm;
pub mod forge;
pub mod network;
pub mod request;
pub mod rpc;
mod serde_util;
pub mod solana;
pub mod token_store;
pub mod validation;

// Re-export primary types for convenient access.
pub use error::{ErrorCategory, ForgeError, ForgeResult};
pub use evm::{CreatedEvmToken, EvmClientConfig, EvmTokenClient, InjectedWallet, TokenInfo};
pub use forge::{CreatedToken, TokenCreator, TokenForge};
pub use network::{Chain, NativeCurrency, NetworkDescriptor, NetworkRegistry, validate_url};
pub use request::TokenCreationRequest;
pub use rpc::{HttpJsonRpc, JsonRpc, RpcError};
pub use solana::{
    CreatedSolanaToken, EncodedInstruction, EncodingProfile, ForgeProgramClient,
    InstructionIdentifiers, KeypairWallet, SolanaRpcClient, SolanaWallet, SplMintClient,
};
pub use token_store::{TokenRecord, TokenStore};
pub use validation::ValidationError;
