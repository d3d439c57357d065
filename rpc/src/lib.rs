//! JSON-RPC client for the platform chain.
//!
//! Provides:
//! - [`PlatformApi`] / [`InfoApi`] async traits, the seam the rest of the
//!   workspace programs against
//! - [`NodeClient`], the HTTP implementation
//! - hex-with-checksum payload encoding

pub mod api;
pub mod client;
pub mod encoding;
pub mod error;
pub mod types;

pub use api::{InfoApi, PlatformApi};
pub use client::{NodeClient, INFO_ENDPOINT, PLATFORM_ENDPOINT};
pub use encoding::{decode_hex_with_checksum, encode_hex_with_checksum};
pub use error::RpcError;
pub use types::{Balance, BlockchainInfo, SubnetInfo, TxFee, ValidatorInfo};
