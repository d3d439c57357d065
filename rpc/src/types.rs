//! Typed request parameters and responses.
//!
//! The node encodes 64-bit integers as decimal strings; [`json_u64`]
//! accepts either form.

use serde::{Deserialize, Serialize};
use subnet_types::{Id, NodeId};

/// Serde adapter for integers the node sends as strings.
pub mod json_u64 {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&v.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        struct U64Visitor;

        impl<'de> Visitor<'de> for U64Visitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a u64 as a number or decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
                Ok(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
                v.parse().map_err(E::custom)
            }
        }

        d.deserialize_any(U64Visitor)
    }
}

mod opt_json_u64 {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    struct Wrapped(#[serde(with = "super::json_u64")] u64);

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(Option::<Wrapped>::deserialize(d)?.map(|Wrapped(v)| v))
    }
}

/// Fee schedule from `info.getTxFee`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxFee {
    #[serde(with = "json_u64")]
    pub tx_fee: u64,
    #[serde(with = "json_u64")]
    pub create_subnet_tx_fee: u64,
    #[serde(with = "json_u64")]
    pub create_blockchain_tx_fee: u64,
}

/// A current validator from `platform.getCurrentValidators`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorInfo {
    #[serde(rename = "nodeID")]
    pub node_id: NodeId,
    #[serde(with = "json_u64")]
    pub start_time: u64,
    #[serde(with = "json_u64")]
    pub end_time: u64,
    /// Present for subnet validators.
    #[serde(default, deserialize_with = "opt_json_u64::deserialize")]
    pub weight: Option<u64>,
    /// Present for primary-network validators.
    #[serde(default, deserialize_with = "opt_json_u64::deserialize")]
    pub stake_amount: Option<u64>,
}

/// A subnet from `platform.getSubnets`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetInfo {
    pub id: Id,
    #[serde(default)]
    pub control_keys: Vec<String>,
    #[serde(default, deserialize_with = "opt_json_u64::deserialize")]
    pub threshold: Option<u64>,
}

/// A blockchain from `platform.getBlockchains`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct BlockchainInfo {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "subnetID")]
    pub subnet_id: Id,
    #[serde(rename = "vmID")]
    pub vm_id: Id,
}

/// Balance from `platform.getBalance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(with = "json_u64")]
    pub balance: u64,
    #[serde(default, deserialize_with = "opt_json_u64::deserialize")]
    pub unlocked: Option<u64>,
    #[serde(default, deserialize_with = "opt_json_u64::deserialize")]
    pub locked_stakeable: Option<u64>,
}

/// Pagination cursor for `platform.getUTXOs`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoIndex {
    pub address: String,
    pub utxo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_fee_from_strings() {
        let fee: TxFee = serde_json::from_str(
            r#"{"txFee":"1000000","createAssetTxFee":"10000000","createSubnetTxFee":"100000000","createBlockchainTxFee":"100000000"}"#,
        )
        .unwrap();
        assert_eq!(fee.tx_fee, 1_000_000);
        assert_eq!(fee.create_subnet_tx_fee, 100_000_000);
    }

    #[test]
    fn validator_optional_fields() {
        let node = NodeId::new([4; 20]);
        let json = format!(
            r#"{{"txID":"{}","nodeID":"{}","startTime":"10","endTime":"20","stakeAmount":"2000"}}"#,
            Id::EMPTY,
            node
        );
        let v: ValidatorInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(v.node_id, node);
        assert_eq!((v.start_time, v.end_time), (10, 20));
        assert_eq!(v.stake_amount, Some(2000));
        assert_eq!(v.weight, None);
    }

    #[test]
    fn numeric_and_string_forms_agree() {
        let a: Balance = serde_json::from_str(r#"{"balance":"5"}"#).unwrap();
        let b: Balance = serde_json::from_str(r#"{"balance":5}"#).unwrap();
        assert_eq!(a, b);
    }
}
