//! Network identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric network ID, as reported by `info.getNetworkID` and embedded in
/// every transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(u32);

impl NetworkId {
    /// The production network.
    pub const MAINNET: Self = Self(1);
    /// The public test network.
    pub const FUJI: Self = Self(5);
    /// Local development network.
    pub const LOCAL: Self = Self(12345);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn is_mainnet(&self) -> bool {
        *self == Self::MAINNET
    }

    /// Human-readable part used when formatting bech32 addresses.
    pub fn hrp(&self) -> &'static str {
        match self.0 {
            1 => "avax",
            5 => "fuji",
            12345 => "local",
            _ => "custom",
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            1 => "mainnet",
            5 => "fuji",
            12345 => "local",
            _ => "custom",
        }
    }
}

impl From<u32> for NetworkId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.0)
    }
}
