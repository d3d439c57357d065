//! Checksummed base58 ("cb58") text encoding for identifiers.
//!
//! cb58 is base58 (bitcoin alphabet) over the payload followed by the last
//! four bytes of `sha256(payload)`.

use sha2::{Digest, Sha256};

use crate::error::TypesError;

/// Number of checksum bytes appended by cb58.
pub const CHECKSUM_LEN: usize = 4;

/// Last four bytes of `sha256(payload)`.
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    out
}

/// Encode bytes as cb58 (base58 with a 4-byte sha256 checksum).
pub fn cb58_encode(payload: &[u8]) -> String {
    let mut checked = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    checked.extend_from_slice(payload);
    checked.extend_from_slice(&checksum(payload));
    bs58::encode(checked).into_string()
}

/// Decode a cb58 string, verifying and stripping its checksum.
pub fn cb58_decode(s: &str) -> Result<Vec<u8>, TypesError> {
    let raw = bs58::decode(s)
        .into_vec()
        .map_err(|_| TypesError::InvalidEncoding(s.to_string()))?;
    if raw.len() < CHECKSUM_LEN {
        return Err(TypesError::InvalidEncoding(s.to_string()));
    }
    let (payload, sum) = raw.split_at(raw.len() - CHECKSUM_LEN);
    if sum != checksum(payload) {
        return Err(TypesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cb58_rejects_invalid_chars() {
        assert!(matches!(
            cb58_decode("0OIl"),
            Err(TypesError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn cb58_empty_id_vector() {
        assert_eq!(
            cb58_encode(&[0u8; 32]),
            "11111111111111111111111111111111LpoYY"
        );
    }

    #[test]
    fn cb58_roundtrip() {
        let payload = [7u8; 20];
        let encoded = cb58_encode(&payload);
        assert_eq!(cb58_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn cb58_bad_checksum_rejected() {
        let mut encoded = cb58_encode(&[9u8; 32]);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '2' { '3' } else { '2' });
        assert!(cb58_decode(&encoded).is_err());
    }

    #[test]
    fn cb58_too_short_rejected() {
        assert!(matches!(
            cb58_decode("1"),
            Err(TypesError::InvalidEncoding(_))
        ));
    }
}
