//! Calling conventions of the deployed FORGE programs.
//!
//! Each deployed program expects its own instruction layout. They are kept as
//! separate, versioned profiles rather than one configurable encoder so that a
//! layout never changes underneath a program that is already on chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

const ANCHOR_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("DkkU1jrPLiK2uEnJTBicEijdyyttr2rXHQWCijtRRgUz");
const DISPATCHER_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("Fx634QQpNVFugKodwYtHagsHUz5Wx5UgokDJtijjsBtK");
const BYTES32_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("78Xz6aQi6iozz4rhZqbpaGZjiQSTYw6m8Fh7bpr1WLxR");

/// `create_token` discriminator of the Anchor program.
pub const ANCHOR_CREATE_TOKEN: [u8; 8] = [0x15, 0x5f, 0x4d, 0x35, 0xc4, 0xb5, 0x76, 0xa8];

/// `createToken` selector of the Solang dispatcher build.
pub const DISPATCHER_CREATE_TOKEN: [u8; 8] = [0x20, 0x9e, 0xc1, 0x03, 0x20, 0xb2, 0x13, 0x60];

/// `createToken` selector of the Solang build taking `bytes32` accounts.
pub const BYTES32_CREATE_TOKEN: [u8; 4] = [0x5a, 0xf4, 0x7d, 0x2a];

/// Size of the data account the dispatcher program writes into.
pub const DISPATCHER_DATA_ACCOUNT_SPACE: u64 = 1024;

/// Largest transaction the Solana runtime accepts.
const PACKET_DATA_SIZE: usize = 1232;

/// Width of a string length prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    U32,
    U64,
}

impl LengthPrefix {
    pub fn width(&self) -> usize {
        match self {
            LengthPrefix::U32 => 4,
            LengthPrefix::U64 => 8,
        }
    }
}

/// One deployed program's instruction layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingProfile {
    /// Anchor program: 8-byte discriminator, u32 string prefixes, accounts
    /// passed in the account list.
    #[default]
    #[serde(rename = "anchor-forge-v1")]
    AnchorForgeV1,

    /// Solang dispatcher: 8-byte selector, u64 string prefixes, writes into a
    /// pre-allocated data account.
    #[serde(rename = "solang-dispatcher-v1")]
    SolangDispatcherV1,

    /// Solang build taking the four accounts as leading `bytes32` arguments.
    #[serde(rename = "solang-bytes32-v1")]
    SolangBytes32V1,
}

impl EncodingProfile {
    pub const ALL: [EncodingProfile; 3] = [
        EncodingProfile::AnchorForgeV1,
        EncodingProfile::SolangDispatcherV1,
        EncodingProfile::SolangBytes32V1,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EncodingProfile::AnchorForgeV1 => "anchor-forge-v1",
            EncodingProfile::SolangDispatcherV1 => "solang-dispatcher-v1",
            EncodingProfile::SolangBytes32V1 => "solang-bytes32-v1",
        }
    }

    pub fn version(&self) -> u32 {
        1
    }

    pub fn program_id(&self) -> Pubkey {
        match self {
            EncodingProfile::AnchorForgeV1 => ANCHOR_PROGRAM_ID,
            EncodingProfile::SolangDispatcherV1 => DISPATCHER_PROGRAM_ID,
            EncodingProfile::SolangBytes32V1 => BYTES32_PROGRAM_ID,
        }
    }

    /// Leading bytes identifying the create-token operation.
    pub fn create_token_selector(&self) -> Vec<u8> {
        match self {
            EncodingProfile::AnchorForgeV1 => ANCHOR_CREATE_TOKEN.to_vec(),
            EncodingProfile::SolangDispatcherV1 => DISPATCHER_CREATE_TOKEN.to_vec(),
            EncodingProfile::SolangBytes32V1 => BYTES32_CREATE_TOKEN.to_vec(),
        }
    }

    /// Whether the payload carries the four 32-byte account identifiers.
    pub fn identifier_fields(&self) -> bool {
        matches!(self, EncodingProfile::SolangBytes32V1)
    }

    pub fn length_prefix(&self) -> LengthPrefix {
        match self {
            EncodingProfile::SolangDispatcherV1 => LengthPrefix::U64,
            _ => LengthPrefix::U32,
        }
    }

    /// Maximum instruction data length the receiving program accepts.
    pub fn capacity(&self) -> usize {
        match self {
            EncodingProfile::AnchorForgeV1 => PACKET_DATA_SIZE,
            EncodingProfile::SolangDispatcherV1 => DISPATCHER_DATA_ACCOUNT_SPACE as usize,
            EncodingProfile::SolangBytes32V1 => 4000,
        }
    }

    /// Space of the data account created ahead of the call, if any.
    pub fn data_account_space(&self) -> Option<u64> {
        match self {
            EncodingProfile::SolangDispatcherV1 => Some(DISPATCHER_DATA_ACCOUNT_SPACE),
            _ => None,
        }
    }

    /// Whether the program exposes mint/burn instructions and a readable
    /// config account.
    pub fn supports_supply_management(&self) -> bool {
        matches!(self, EncodingProfile::AnchorForgeV1)
    }
}

impl fmt::Display for EncodingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EncodingProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EncodingProfile::ALL
            .into_iter()
            .find(|profile| profile.name() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown encoding profile: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_widths() {
        assert_eq!(EncodingProfile::AnchorForgeV1.create_token_selector().len(), 8);
        assert_eq!(EncodingProfile::SolangDispatcherV1.create_token_selector().len(), 8);
        assert_eq!(EncodingProfile::SolangBytes32V1.create_token_selector().len(), 4);
    }

    #[test]
    fn fixed_selectors() {
        assert_eq!(
            hex::encode(EncodingProfile::AnchorForgeV1.create_token_selector()),
            "155f4d35c4b576a8"
        );
        assert_eq!(
            hex::encode(EncodingProfile::SolangDispatcherV1.create_token_selector()),
            "209ec10320b21360"
        );
        assert_eq!(
            hex::encode(EncodingProfile::SolangBytes32V1.create_token_selector()),
            "5af47d2a"
        );
    }

    #[test]
    fn program_ids_are_distinct() {
        assert_eq!(
            EncodingProfile::AnchorForgeV1.program_id().to_string(),
            "DkkU1jrPLiK2uEnJTBicEijdyyttr2rXHQWCijtRRgUz"
        );
        assert_ne!(
            EncodingProfile::SolangDispatcherV1.program_id(),
            EncodingProfile::SolangBytes32V1.program_id()
        );
    }

    #[test]
    fn layout_parameters() {
        assert_eq!(EncodingProfile::AnchorForgeV1.length_prefix().width(), 4);
        assert_eq!(EncodingProfile::SolangDispatcherV1.length_prefix().width(), 8);
        assert!(EncodingProfile::SolangBytes32V1.identifier_fields());
        assert!(!EncodingProfile::AnchorForgeV1.identifier_fields());
        assert_eq!(EncodingProfile::SolangDispatcherV1.data_account_space(), Some(1024));
        assert_eq!(EncodingProfile::SolangBytes32V1.capacity(), 4000);
    }

    #[test]
    fn names_round_trip_through_serde_and_from_str() {
        for profile in EncodingProfile::ALL {
            assert_eq!(profile.name().parse::<EncodingProfile>().unwrap(), profile);
            let json = serde_json::to_string(&profile).unwrap();
            assert_eq!(json, format!("\"{}\"", profile.name()));
        }
        assert!("solang-v2".parse::<EncodingProfile>().is_err());
    }
}
