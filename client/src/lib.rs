//! Subnet operations against a platform-chain node.
//!
//! Each operation validates its arguments, checks the key's balance,
//! selects inputs from a fresh UTXO snapshot, builds and signs the
//! transaction, issues it and optionally waits for it to settle:
//!
//! - [`Client::create_subnet`]
//! - [`Client::add_validator`]
//! - [`Client::add_subnet_validator`]
//! - [`Client::create_blockchain`]
//! - [`Client::remove_subnet_validator`]

pub mod client;
pub mod config;
pub mod error;
pub mod options;
pub mod subnet;
pub mod validator;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT};
pub use error::ClientError;
pub use options::{
    AddSubnetValidatorOptions, AddValidatorOptions, CreateBlockchainOptions, CreateSubnetOptions,
    PollOptions, DEFAULT_REWARD_SHARES,
};
pub use validator::{default_stake_amount, MAINNET_STAKE_AMOUNT, TESTNET_STAKE_AMOUNT};
