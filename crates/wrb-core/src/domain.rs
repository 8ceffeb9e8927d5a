use std::fmt;

use rust_decimal::Decimal;

use crate::{errors::Error, Result};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Wei per ether.
pub const WEI_SCALE: u32 = 18;

/// Native-token balance in ether, exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Balance(Decimal);

impl Balance {
    /// Convert a smallest-unit (wei) amount into ether.
    ///
    /// Returns `None` when the amount does not fit a 96-bit decimal mantissa,
    /// which is far above the total ether supply.
    pub fn from_wei(wei: u128) -> Option<Self> {
        let wei = i128::try_from(wei).ok()?;
        Decimal::try_from_i128_with_scale(wei, WEI_SCALE)
            .ok()
            .map(|d| Self(d.normalize()))
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Whole amounts keep one fractional digit: `1.0`, not `1`.
        if self.0.scale() == 0 {
            write!(f, "{}.0", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Spot price of an asset in USD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(Decimal);

impl Price {
    pub fn new(usd: Decimal) -> Self {
        Self(usd.normalize())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase, non-empty asset identifier (e.g. `bitcoin`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AssetId(String);

impl AssetId {
    pub fn parse(raw: &str) -> Result<Self> {
        let id = raw.trim().to_lowercase();
        if id.is_empty() {
            Err(Error::EmptyAsset)
        } else {
            Ok(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
