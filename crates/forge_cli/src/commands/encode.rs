// Offline instruction encoding

use anyhow::Result;
use clap::Args;
use forge_chain::solana::encoder::{decode_create_token, encode_create_token};
use forge_chain::{EncodingProfile, InstructionIdentifiers, TokenCreationRequest};
use serde::Serialize;
use solana_sdk::signature::{Keypair, Signer};

use super::utils::{emit, info};
use crate::context::AppContext;

#[derive(Args)]
pub struct EncodeCmd {
    #[arg(long)]
    name: String,

    #[arg(long)]
    symbol: String,

    #[arg(long, default_value_t = 9)]
    decimals: u8,

    /// Initial supply in base units
    #[arg(long)]
    supply: u128,

    /// Encoding profile (defaults to the configured one)
    #[arg(long)]
    profile: Option<String>,

    /// Encode for every known profile
    #[arg(long, conflicts_with = "profile")]
    all_profiles: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Encoded {
    profile: EncodingProfile,
    version: u32,
    program_id: String,
    selector: String,
    data: String,
    length: usize,
    capacity: usize,
}

pub fn execute(cmd: EncodeCmd, ctx: &AppContext) -> Result<()> {
    let request = TokenCreationRequest::new(cmd.name, cmd.symbol, cmd.decimals, cmd.supply);
    request.validate()?;

    let profiles = if cmd.all_profiles {
        EncodingProfile::ALL.to_vec()
    } else {
        vec![ctx.profile(cmd.profile.as_deref())?]
    };

    // Embedded accounts are generated per call, as the client does.
    let identifiers = InstructionIdentifiers {
        payer: Keypair::new().pubkey(),
        token_config: Keypair::new().pubkey(),
        mint: Keypair::new().pubkey(),
        owner_token_account: Keypair::new().pubkey(),
    };

    let mut encoded = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let instruction = encode_create_token(profile, &request, Some(&identifiers))?;
        let data = instruction.to_bytes();
        decode_create_token(profile, &data)?;
        encoded.push(Encoded {
            profile,
            version: profile.version(),
            program_id: profile.program_id().to_string(),
            selector: hex::encode(&instruction.selector),
            data: hex::encode(&data),
            length: data.len(),
            capacity: profile.capacity(),
        });
    }

    emit(ctx.json, &encoded, |encoded| {
        for e in encoded {
            info(&format!("{} v{} -> program {}", e.profile, e.version, e.program_id));
            println!("  selector  {}", e.selector);
            println!("  length    {} / {} bytes", e.length, e.capacity);
            println!("  data      {}", e.data);
        }
    })
}
