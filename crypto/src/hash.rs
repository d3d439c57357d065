//! SHA-256 and RIPEMD-160 hashing.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use subnet_types::{Id, ShortId};

/// Compute SHA-256 of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Sha256::digest(data));
    output
}

/// Compute RIPEMD-160 of arbitrary data.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut output = [0u8; 20];
    output.copy_from_slice(&Ripemd160::digest(data));
    output
}

/// `ripemd160(sha256(data))`, the address hash.
pub fn hash160(data: &[u8]) -> ShortId {
    ShortId::new(ripemd160(&sha256(data)))
}

/// Hash serialized transaction bytes into an [`Id`].
pub fn hash_transaction(tx_bytes: &[u8]) -> Id {
    Id::new(sha256(tx_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn ripemd160_known_vector() {
        assert_eq!(
            hex::encode(ripemd160(b"abc")),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn hash_transaction_is_sha256() {
        assert_eq!(hash_transaction(b"tx").as_bytes(), &sha256(b"tx"));
    }
}
