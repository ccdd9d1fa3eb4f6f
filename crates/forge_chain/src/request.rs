use serde::{Deserialize, Serialize};

use crate::validation::{
    MAX_DECIMALS, ValidationError, validate_supply_value, validate_token_name,
    validate_token_symbol,
};

/// User-supplied parameters describing a token to mint.
///
/// Supply is counted in whole tokens on the EVM path (the factory's tokens
/// use 18 decimals and the client scales) and in base units on Solana.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCreationRequest {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub initial_supply: u128,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_supply: Option<u128>,
}

impl TokenCreationRequest {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        initial_supply: u128,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
            initial_supply,
            max_supply: None,
        }
    }

    pub fn with_max_supply(mut self, max_supply: u128) -> Self {
        self.max_supply = Some(max_supply);
        self
    }

    /// The supply cap, treating an explicit zero as "uncapped".
    pub fn effective_max_supply(&self) -> Option<u128> {
        self.max_supply.filter(|max| *max > 0)
    }

    /// Run every field check plus the cap invariant. Nothing may be sent to a
    /// network for a request that fails here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !validate_token_name(&self.name) {
            return Err(ValidationError::InvalidName);
        }
        if !validate_token_symbol(&self.symbol) {
            return Err(ValidationError::InvalidSymbol);
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ValidationError::InvalidDecimals(self.decimals));
        }
        if !validate_supply_value(self.initial_supply) {
            return Err(ValidationError::InvalidSupply);
        }
        if let Some(max) = self.effective_max_supply() {
            if self.initial_supply > max {
                return Err(ValidationError::SupplyExceedsCap {
                    initial: self.initial_supply,
                    max,
                });
            }
        }
        Ok(())
    }
}
