//! Cryptographic primitives for the subnet transaction builder.
//!
//! - **secp256k1** recoverable ECDSA (RFC 6979 nonces) for transaction signatures
//! - **SHA-256** for signature hashes and transaction IDs
//! - **RIPEMD-160** over SHA-256 for address derivation
//! - bech32 `P-<hrp>1...` address formatting and the `PrivateKey-` text form

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{bech32_decode, bech32_encode, format_address, format_p_address, parse_address};
pub use error::CryptoError;
pub use hash::{hash160, hash_transaction, ripemd160, sha256};
pub use keys::{
    address_from_public, generate_private_key, private_key_from_bytes, private_key_from_str,
    private_key_to_string, public_from_private, PRIVATE_KEY_PREFIX,
};
pub use sign::{recover_public, sign_hash, verify_signature};
