//! Wallet address shape check (Ethereum-style account ids).

use std::fmt;

use crate::{errors::Error, Result};

pub const ADDRESS_PREFIX: &str = "0x";
pub const ADDRESS_LEN: usize = 42;

/// Whether `s` looks like a wallet address: `0x` prefix and exactly 42 chars.
///
/// No hex-alphabet or checksum validation is performed.
pub fn is_valid_address(s: &str) -> bool {
    s.starts_with(ADDRESS_PREFIX) && s.len() == ADDRESS_LEN
}

/// An address that passed [`is_valid_address`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn parse(raw: &str) -> Result<Self> {
        if is_valid_address(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::InvalidAddress(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
