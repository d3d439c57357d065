//! Fundamental types for the subnet transaction builder.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers and their cb58 text form, timestamps, network IDs, ledger
//! statuses, and secp256k1 key material.

pub mod amount;
pub mod error;
pub mod formatting;
pub mod id;
pub mod keys;
pub mod network;
pub mod status;
pub mod time;

pub use amount::{format_units, AVAX, NANO_AVAX};
pub use error::TypesError;
pub use id::{Id, NodeId, ShortId, NODE_ID_PREFIX};
pub use keys::{PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use status::{BlockchainStatus, TxStatus};
pub use time::{Clock, SystemClock, Timestamp};
