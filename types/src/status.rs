//! Ledger-reported status enums.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Status of an issued transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxStatus {
    Unknown,
    Processing,
    Committed,
    Aborted,
    Dropped,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Processing => "Processing",
            Self::Committed => "Committed",
            Self::Aborted => "Aborted",
            Self::Dropped => "Dropped",
        }
    }

    /// Aborted and dropped transactions will never commit.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Aborted | Self::Dropped)
    }
}

/// Status of a blockchain on the local node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockchainStatus {
    Unknown,
    Validating,
    Created,
    Preferred,
    Syncing,
}

impl BlockchainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Validating => "Validating",
            Self::Created => "Created",
            Self::Preferred => "Preferred",
            Self::Syncing => "Syncing",
        }
    }
}

// Unrecognised strings map to `Unknown`; the ledger may add statuses.
impl FromStr for TxStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Processing" => Self::Processing,
            "Committed" => Self::Committed,
            "Aborted" => Self::Aborted,
            "Dropped" => Self::Dropped,
            _ => Self::Unknown,
        })
    }
}

impl FromStr for BlockchainStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Validating" => Self::Validating,
            "Created" => Self::Created,
            "Preferred" => Self::Preferred,
            "Syncing" => Self::Syncing,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for BlockchainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TxStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TxStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Self::Unknown))
    }
}

impl Serialize for BlockchainStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockchainStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or(Self::Unknown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_status_parse() {
        assert_eq!("Committed".parse::<TxStatus>().unwrap(), TxStatus::Committed);
        assert_eq!("whatever".parse::<TxStatus>().unwrap(), TxStatus::Unknown);
    }

    #[test]
    fn rejected_statuses() {
        assert!(TxStatus::Aborted.is_rejected());
        assert!(TxStatus::Dropped.is_rejected());
        assert!(!TxStatus::Processing.is_rejected());
        assert!(!TxStatus::Committed.is_rejected());
    }

    #[test]
    fn blockchain_status_json() {
        let status: BlockchainStatus = serde_json::from_str("\"Validating\"").unwrap();
        assert_eq!(status, BlockchainStatus::Validating);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Validating\"");
    }
}
