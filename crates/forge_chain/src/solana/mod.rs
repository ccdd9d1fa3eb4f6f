//! Solana side: instruction encoding, keypair wallet, RPC and the two token
//! clients (the FORGE programs and plain SPL mints).

pub mod encoder;
pub mod profile;
pub mod program_client;
pub mod rpc;
pub mod spl_client;
pub mod wallet;

pub use encoder::{
    AmountInstruction, DecodedCreateToken, EncodeError, EncodedInstruction,
    InstructionIdentifiers, TokenConfigAccount,
};
pub use profile::{EncodingProfile, LengthPrefix};
pub use program_client::{CreatedSolanaToken, ForgeProgramClient};
pub use rpc::{SignatureStatus, SolanaRpcClient, TokenAmount};
pub use spl_client::{CreatedSplMint, SplMintClient};
pub use wallet::{KeypairWallet, SolanaWallet};
