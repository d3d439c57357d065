//! Wallet side of the platform client.
//!
//! - [`KeyManager`]: addresses we control, owner matching, UTXO spending
//! - [`SoftKey`] / [`HardKey`]: in-memory and device-backed key managers
//! - [`stake`]: coin selection for stake plus fee
//! - [`sign_tx`]: credentials and the final signed bytes
//! - [`authorize`]: subnet authorization against the on-chain owner
//! - [`keystore`]: key file load/save

pub mod authorize;
pub mod error;
pub mod hard_key;
pub mod keys;
pub mod keystore;
pub mod signer;
pub mod soft_key;
pub mod stake;

pub use authorize::{authorize, authorize_owner, subnet_owner, SubnetAuthorization};
pub use error::WalletError;
pub use hard_key::{HardKey, SigningDevice, DEVICE_ADDRESS_COUNT};
pub use keys::{KeyManager, OwnerMatch, SpendOptions, Spends, Spent};
pub use keystore::{load_key, parse_key_file, save_key};
pub use signer::sign_tx;
pub use soft_key::SoftKey;
pub use stake::{stake, Selection, StakeRequest};
