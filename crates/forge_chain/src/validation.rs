//! Input predicates for the token forms plus a couple of display helpers.
//!
//! Every predicate takes one raw value and answers with a `bool`; none of them
//! panic. [`crate::request::TokenCreationRequest::validate`] composes them
//! into the pre-submission gate.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use solana_sdk::pubkey::Pubkey;

/// Largest integer a supply may reach (2^53 - 1), the precision limit of the
/// browser forms the supply values originate from.
pub const MAX_SAFE_SUPPLY: f64 = 9_007_199_254_740_991.0;

pub const MAX_NAME_CHARS: usize = 32;
pub const MAX_SYMBOL_CHARS: usize = 10;
pub const MAX_DECIMALS: u8 = 18;

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]+$").expect("valid symbol regex"));
static EVM_ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address regex"));

/// Reasons a token request is rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("token name must be 1-{MAX_NAME_CHARS} characters")]
    InvalidName,

    #[error("token symbol must be 1-{MAX_SYMBOL_CHARS} uppercase letters or digits")]
    InvalidSymbol,

    #[error("decimals must be between 0 and {MAX_DECIMALS}, got {0}")]
    InvalidDecimals(u8),

    #[error("initial supply must be greater than zero and below 2^53")]
    InvalidSupply,

    #[error("initial supply {initial} exceeds max supply {max}")]
    SupplyExceedsCap { initial: u128, max: u128 },

    #[error("invalid {chain} address: {address}")]
    InvalidAddress { chain: &'static str, address: String },

    #[error("amount must be a positive number, got {0:?}")]
    InvalidAmount(String),
}

/// Name must be 1-32 characters.
pub fn validate_token_name(name: &str) -> bool {
    let len = name.chars().count();
    len > 0 && len <= MAX_NAME_CHARS
}

/// Symbol must be 1-10 characters, uppercase ASCII letters and digits only.
pub fn validate_token_symbol(symbol: &str) -> bool {
    let len = symbol.chars().count();
    len > 0 && len <= MAX_SYMBOL_CHARS && SYMBOL_RE.is_match(symbol)
}

/// Supply must parse as a number, be positive and stay below 2^53 - 1.
pub fn validate_supply(supply: &str) -> bool {
    match supply.trim().parse::<f64>() {
        Ok(num) => !num.is_nan() && num > 0.0 && num < MAX_SAFE_SUPPLY,
        Err(_) => false,
    }
}

/// Whole-number supply check used by typed requests.
pub fn validate_supply_value(supply: u128) -> bool {
    supply > 0 && (supply as f64) < MAX_SAFE_SUPPLY
}

/// Decimals must be an integer between 0 and 18.
pub fn validate_decimals(decimals: &str) -> bool {
    match decimals.trim().parse::<i64>() {
        Ok(num) => (0..=i64::from(MAX_DECIMALS)).contains(&num),
        Err(_) => false,
    }
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_valid_evm_address(address: &str) -> bool {
    EVM_ADDRESS_RE.is_match(address)
}

/// Base58 string that decodes to a 32-byte public key.
pub fn is_valid_solana_address(address: &str) -> bool {
    Pubkey::from_str(address).is_ok()
}

/// Group the digits of an integer with commas: `1234567` -> `1,234,567`.
pub fn format_number(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Shorten an address for display: `0x1234...abcd`.
///
/// Addresses too short to shorten are returned unchanged.
pub fn truncate_address(address: &str, start_chars: usize, end_chars: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= start_chars + end_chars {
        return address.to_string();
    }
    let head: String = chars[..start_chars].iter().collect();
    let tail: String = chars[chars.len() - end_chars..].iter().collect();
    format!("{head}...{tail}")
}

/// Convert a decimal amount such as `"1.5"` into base units with `decimals`
/// fractional digits, returned as a digit string (`"1500000000000000000"`).
///
/// Returns `None` for malformed input or more fractional digits than allowed.
pub fn parse_token_amount(amount: &str, decimals: u8) -> Option<String> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > usize::from(decimals) {
        return None;
    }

    let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
    digits.push_str(whole);
    digits.push_str(frac);
    digits.extend(std::iter::repeat_n('0', usize::from(decimals) - frac.len()));

    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

/// Inverse of [`parse_token_amount`]: render base units as a decimal amount.
/// Whole values keep one fractional digit (`"1.0"`).
pub fn format_token_amount(raw: &str, decimals: u8) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let decimals = usize::from(decimals);
    let padded = format!("{raw:0>width$}", width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);

    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    let frac = frac.trim_end_matches('0');
    let frac = if frac.is_empty() { "0" } else { frac };
    Some(format!("{whole}.{frac}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_bounds() {
        assert!(validate_token_name("A"));
        assert!(validate_token_name(&"n".repeat(32)));
        assert!(!validate_token_name(""));
        assert!(!validate_token_name(&"n".repeat(33)));
    }

    #[test]
    fn symbol_accepts_uppercase_and_digits() {
        assert!(validate_token_symbol("ABC123"));
        assert!(validate_token_symbol("X"));
        assert!(validate_token_symbol("ABCDEFGHIJ"));
    }

    #[test]
    fn symbol_rejects_lowercase_long_and_empty() {
        assert!(!validate_token_symbol("abc"));
        assert!(!validate_token_symbol("AbC"));
        assert!(!validate_token_symbol("ABCDEFGHIJK"));
        assert!(!validate_token_symbol(""));
        assert!(!validate_token_symbol("AB-C"));
    }

    #[test]
    fn decimals_range() {
        assert!(validate_decimals("0"));
        assert!(validate_decimals("18"));
        assert!(validate_decimals("9"));
        assert!(!validate_decimals("-1"));
        assert!(!validate_decimals("19"));
        assert!(!validate_decimals("ten"));
        // whole field must parse, no numeric prefix
        assert!(!validate_decimals("18abc"));
        assert!(!validate_decimals("1.5"));
    }

    #[test]
    fn supply_bounds() {
        assert!(validate_supply("1"));
        assert!(validate_supply("1000000.5"));
        assert!(!validate_supply("0"));
        assert!(!validate_supply("-5"));
        assert!(!validate_supply("NaN"));
        assert!(!validate_supply("9007199254740991"));
        assert!(!validate_supply("lots"));
        assert!(!validate_supply("100abc"));

        assert!(validate_supply_value(1));
        assert!(!validate_supply_value(0));
        assert!(!validate_supply_value(9_007_199_254_740_991));
    }

    #[test]
    fn evm_addresses() {
        assert!(is_valid_evm_address(
            "0x742d35Cc6634C0532925a3b844Bc9e7595f2bD18"
        ));
        assert!(!is_valid_evm_address("742d35Cc6634C0532925a3b844Bc9e7595f2bD18"));
        assert!(!is_valid_evm_address("0x742d35Cc6634C0532925a3b844Bc9e7595f2bD1"));
        assert!(!is_valid_evm_address("0xZZ2d35Cc6634C0532925a3b844Bc9e7595f2bD18"));
    }

    #[test]
    fn solana_addresses() {
        assert!(is_valid_solana_address(
            "TokenkegQfeZyiNwAJsyFbPVwwQQfk5LsKZoHon136"
        ));
        assert!(is_valid_solana_address(&Pubkey::new_unique().to_string()));
        assert!(!is_valid_solana_address("not-base58-0OIl"));
        assert!(!is_valid_solana_address("abc"));
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn truncate_address_keeps_ends() {
        assert_eq!(
            truncate_address("0x742d35Cc6634C0532925a3b844Bc9e7595f2bD18", 6, 4),
            "0x742d...bD18"
        );
        assert_eq!(truncate_address("short", 6, 4), "short");
    }

    #[test]
    fn parse_token_amount_scales() {
        assert_eq!(parse_token_amount("1", 18).as_deref(), Some("1000000000000000000"));
        assert_eq!(parse_token_amount("1.5", 2).as_deref(), Some("150"));
        assert_eq!(parse_token_amount("0.01", 2).as_deref(), Some("1"));
        assert_eq!(parse_token_amount("0", 9).as_deref(), Some("0"));
        assert_eq!(parse_token_amount("1.234", 2), None);
        assert_eq!(parse_token_amount("1e5", 2), None);
        assert_eq!(parse_token_amount("", 2), None);
    }

    #[test]
    fn format_token_amount_renders_decimals() {
        assert_eq!(
            format_token_amount("1000000000000000000", 18).as_deref(),
            Some("1.0")
        );
        assert_eq!(format_token_amount("150", 2).as_deref(), Some("1.5"));
        assert_eq!(format_token_amount("1", 3).as_deref(), Some("0.001"));
        assert_eq!(format_token_amount("42", 0).as_deref(), Some("42.0"));
        assert_eq!(format_token_amount("x", 2), None);
    }
}
