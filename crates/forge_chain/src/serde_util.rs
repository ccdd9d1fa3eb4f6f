//! `serialize_with` helpers for chain types whose serde form is not the
//! string users expect.

use std::fmt::Display;

use serde::Serializer;
use web3::types::{Address, H256};

pub(crate) fn display<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

pub(crate) fn display_opt<T: Display, S: Serializer>(
    value: &Option<T>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => s.collect_str(value),
        None => s.serialize_none(),
    }
}

/// Full lowercase `0x` hex; `Display` on addresses abbreviates.
pub fn address_hex(address: &Address) -> String {
    format!("{address:#x}")
}

pub(crate) fn address<S: Serializer>(value: &Address, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&address_hex(value))
}

pub(crate) fn address_opt<S: Serializer>(
    value: &Option<Address>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => address(value, s),
        None => s.serialize_none(),
    }
}

pub(crate) fn hash<S: Serializer>(value: &H256, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{value:#x}"))
}
