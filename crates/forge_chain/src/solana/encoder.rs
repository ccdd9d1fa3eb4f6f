//! Byte-level instruction encoding for the FORGE programs.
//!
//! Layout of a create-token instruction, in order:
//!
//! | field | width |
//! |---|---|
//! | selector | 8 bytes, or 4 for `solang-bytes32-v1` |
//! | payer, token config, mint, owner token account | 4 × 32 bytes, `solang-bytes32-v1` only |
//! | name, symbol | length prefix (u32 or u64 LE) + UTF-8 bytes |
//! | decimals | 1 byte |
//! | initial supply | u64 LE |
//!
//! Every function here is pure. Failures surface before a transaction is
//! built.

use serde::Serialize;
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

use super::profile::{EncodingProfile, LengthPrefix};
use crate::request::TokenCreationRequest;
use crate::serde_util;

const IDENTIFIER_WIDTH: usize = 32;

/// Reasons a request cannot be laid out, or a buffer cannot be read back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error(
        "field `{field}` needs {needed} bytes but only {remaining} of {capacity} remain"
    )]
    CapacityExceeded {
        field: &'static str,
        needed: usize,
        remaining: usize,
        capacity: usize,
    },

    #[error("supply {0} does not fit in an unsigned 64-bit integer")]
    SupplyOutOfRange(u128),

    #[error("profile {0} requires account identifiers")]
    MissingIdentifiers(&'static str),

    #[error("selector mismatch: expected {expected}, found {found}")]
    SelectorMismatch { expected: String, found: String },

    #[error("buffer ends inside field `{0}`")]
    Truncated(&'static str),

    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),

    #[error("field `{0}` is not valid UTF-8")]
    InvalidUtf8(&'static str),

    #[error("account discriminator mismatch")]
    DiscriminatorMismatch,

    #[error("profile {profile} has no {instruction} instruction")]
    UnsupportedInstruction {
        profile: &'static str,
        instruction: &'static str,
    },
}

/// Accounts that some profiles embed in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionIdentifiers {
    pub payer: Pubkey,
    pub token_config: Pubkey,
    pub mint: Pubkey,
    pub owner_token_account: Pubkey,
}

/// A create-token call laid out for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInstruction {
    pub profile: EncodingProfile,
    pub selector: Vec<u8>,
    pub payload: Vec<u8>,
}

impl EncodedInstruction {
    pub fn len(&self) -> usize {
        self.selector.len() + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Selector followed by payload: the instruction data sent on chain.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.len());
        data.extend_from_slice(&self.selector);
        data.extend_from_slice(&self.payload);
        data
    }
}

/// Fields recovered from an encoded create-token instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCreateToken {
    pub identifiers: Option<InstructionIdentifiers>,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u64,
}

/// Supply-management instructions of the Anchor program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountInstruction {
    Mint,
    Burn,
}

impl AmountInstruction {
    fn method(&self) -> &'static str {
        match self {
            AmountInstruction::Mint => "mint_tokens",
            AmountInstruction::Burn => "burn_tokens",
        }
    }
}

/// Appends fields while tracking the remaining capacity.
struct FieldWriter {
    buf: Vec<u8>,
    capacity: usize,
}

impl FieldWriter {
    fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::new(),
            capacity,
        }
    }

    fn put(&mut self, field: &'static str, bytes: &[u8]) -> Result<(), EncodeError> {
        let remaining = self.capacity.saturating_sub(self.buf.len());
        if bytes.len() > remaining {
            return Err(EncodeError::CapacityExceeded {
                field,
                needed: bytes.len(),
                remaining,
                capacity: self.capacity,
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn put_str(
        &mut self,
        field: &'static str,
        value: &str,
        prefix: LengthPrefix,
    ) -> Result<(), EncodeError> {
        let bytes = value.as_bytes();
        let mut framed = Vec::with_capacity(prefix.width() + bytes.len());
        // Oversized strings are rejected by `put`, so the u32 cast never truncates
        // a prefix that ends up in the buffer.
        match prefix {
            LengthPrefix::U32 => framed.extend_from_slice(&(bytes.len() as u32).to_le_bytes()),
            LengthPrefix::U64 => framed.extend_from_slice(&(bytes.len() as u64).to_le_bytes()),
        }
        framed.extend_from_slice(bytes);
        self.put(field, &framed)
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads fields back in layout order.
struct FieldReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], EncodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(EncodeError::Truncated(field))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], EncodeError> {
        let slice = self.take(field, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, EncodeError> {
        Ok(self.array::<1>(field)?[0])
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, EncodeError> {
        Ok(u64::from_le_bytes(self.array(field)?))
    }

    fn i64(&mut self, field: &'static str) -> Result<i64, EncodeError> {
        Ok(i64::from_le_bytes(self.array(field)?))
    }

    fn pubkey(&mut self, field: &'static str) -> Result<Pubkey, EncodeError> {
        Ok(Pubkey::new_from_array(self.array(field)?))
    }

    fn string(&mut self, field: &'static str, prefix: LengthPrefix) -> Result<String, EncodeError> {
        let len = match prefix {
            LengthPrefix::U32 => u32::from_le_bytes(self.array(field)?) as usize,
            LengthPrefix::U64 => usize::try_from(u64::from_le_bytes(self.array(field)?))
                .map_err(|_| EncodeError::Truncated(field))?,
        };
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| EncodeError::InvalidUtf8(field))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Exact byte length of the create-token instruction for `request`.
pub fn encoded_len(profile: EncodingProfile, request: &TokenCreationRequest) -> usize {
    let prefix = profile.length_prefix().width();
    let identifiers = if profile.identifier_fields() {
        4 * IDENTIFIER_WIDTH
    } else {
        0
    };
    profile.create_token_selector().len()
        + identifiers
        + prefix
        + request.name.len()
        + prefix
        + request.symbol.len()
        + 1
        + 8
}

/// Lay out a create-token call for `profile`.
///
/// `identifiers` is required by profiles that embed account keys in the
/// payload and ignored by the others.
pub fn encode_create_token(
    profile: EncodingProfile,
    request: &TokenCreationRequest,
    identifiers: Option<&InstructionIdentifiers>,
) -> Result<EncodedInstruction, EncodeError> {
    let supply = u64::try_from(request.initial_supply)
        .map_err(|_| EncodeError::SupplyOutOfRange(request.initial_supply))?;

    let selector = profile.create_token_selector();
    let mut writer = FieldWriter::new(profile.capacity());
    writer.put("selector", &selector)?;
    if profile.identifier_fields() {
        let ids = identifiers.ok_or(EncodeError::MissingIdentifiers(profile.name()))?;
        writer.put("payer", ids.payer.as_ref())?;
        writer.put("token_config", ids.token_config.as_ref())?;
        writer.put("mint", ids.mint.as_ref())?;
        writer.put("owner_token_account", ids.owner_token_account.as_ref())?;
    }

    let prefix = profile.length_prefix();
    writer.put_str("name", &request.name, prefix)?;
    writer.put_str("symbol", &request.symbol, prefix)?;
    writer.put("decimals", &[request.decimals])?;
    writer.put("initial_supply", &supply.to_le_bytes())?;

    let payload = writer.finish().split_off(selector.len());
    Ok(EncodedInstruction {
        profile,
        selector,
        payload,
    })
}

/// Parse instruction data produced for `profile` back into its fields.
pub fn decode_create_token(
    profile: EncodingProfile,
    data: &[u8],
) -> Result<DecodedCreateToken, EncodeError> {
    let expected = profile.create_token_selector();
    let mut reader = FieldReader::new(data);
    let found = reader.take("selector", expected.len())?;
    if found != expected.as_slice() {
        return Err(EncodeError::SelectorMismatch {
            expected: hex::encode(&expected),
            found: hex::encode(found),
        });
    }

    let identifiers = if profile.identifier_fields() {
        Some(InstructionIdentifiers {
            payer: reader.pubkey("payer")?,
            token_config: reader.pubkey("token_config")?,
            mint: reader.pubkey("mint")?,
            owner_token_account: reader.pubkey("owner_token_account")?,
        })
    } else {
        None
    };

    let prefix = profile.length_prefix();
    let name = reader.string("name", prefix)?;
    let symbol = reader.string("symbol", prefix)?;
    let decimals = reader.u8("decimals")?;
    let initial_supply = reader.u64("initial_supply")?;

    match reader.remaining() {
        0 => Ok(DecodedCreateToken {
            identifiers,
            name,
            symbol,
            decimals,
            initial_supply,
        }),
        extra => Err(EncodeError::TrailingBytes(extra)),
    }
}

/// First 8 bytes of `sha256("<namespace>:<name>")`, the Anchor convention for
/// instruction (`global`) and account (`account`) discriminators.
pub fn anchor_discriminator(namespace: &str, name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Instruction data for `mint_tokens(amount)` / `burn_tokens(amount)`.
pub fn encode_amount_instruction(
    profile: EncodingProfile,
    instruction: AmountInstruction,
    amount: u64,
) -> Result<Vec<u8>, EncodeError> {
    if !profile.supports_supply_management() {
        return Err(EncodeError::UnsupportedInstruction {
            profile: profile.name(),
            instruction: instruction.method(),
        });
    }
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&anchor_discriminator("global", instruction.method()));
    data.extend_from_slice(&amount.to_le_bytes());
    Ok(data)
}

/// On-chain `TokenConfig` account of the Anchor program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfigAccount {
    #[serde(serialize_with = "serde_util::display")]
    pub mint: Pubkey,
    #[serde(serialize_with = "serde_util::display")]
    pub owner: Pubkey,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u64,
    pub created_at: i64,
}

/// Decode a `TokenConfig` account. Trailing bytes are the account's unused
/// allocation and are ignored.
pub fn decode_token_config(data: &[u8]) -> Result<TokenConfigAccount, EncodeError> {
    let mut reader = FieldReader::new(data);
    let discriminator = reader.take("discriminator", 8)?;
    if discriminator != anchor_discriminator("account", "TokenConfig") {
        return Err(EncodeError::DiscriminatorMismatch);
    }
    Ok(TokenConfigAccount {
        mint: reader.pubkey("mint")?,
        owner: reader.pubkey("owner")?,
        name: reader.string("name", LengthPrefix::U32)?,
        symbol: reader.string("symbol", LengthPrefix::U32)?,
        decimals: reader.u8("decimals")?,
        total_supply: reader.u64("total_supply")?,
        created_at: reader.i64("created_at")?,
    })
}
