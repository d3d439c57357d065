//! `0x`-prefixed hex with a trailing 4-byte sha256 checksum, the node's
//! `"encoding": "hex"` payload form.

use subnet_crypto::sha256;

use crate::error::RpcError;

const CHECKSUM_LEN: usize = 4;

/// Encode bytes for an RPC payload.
pub fn encode_hex_with_checksum(bytes: &[u8]) -> String {
    let digest = sha256(bytes);
    let mut buf = Vec::with_capacity(bytes.len() + CHECKSUM_LEN);
    buf.extend_from_slice(bytes);
    buf.extend_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    format!("0x{}", hex::encode(buf))
}

/// Decode an RPC payload, verifying its checksum.
pub fn decode_hex_with_checksum(s: &str) -> Result<Vec<u8>, RpcError> {
    let body = s.strip_prefix("0x").unwrap_or(s);
    let mut raw = hex::decode(body).map_err(|e| RpcError::InvalidEncoding(e.to_string()))?;
    if raw.len() < CHECKSUM_LEN {
        return Err(RpcError::InvalidEncoding(format!(
            "{} bytes is shorter than the checksum",
            raw.len()
        )));
    }
    let checksum = raw.split_off(raw.len() - CHECKSUM_LEN);
    let digest = sha256(&raw);
    if digest[digest.len() - CHECKSUM_LEN..] != checksum[..] {
        return Err(RpcError::ChecksumMismatch);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_roundtrip() {
        let payload = vec![0, 0, 1, 2, 3, 0xff];
        let encoded = encode_hex_with_checksum(&payload);
        assert!(encoded.starts_with("0x"));
        assert_eq!(encoded.len(), 2 + (payload.len() + 4) * 2);
        assert_eq!(decode_hex_with_checksum(&encoded).unwrap(), payload);
    }

    #[test]
    fn empty_payload_has_checksum_only() {
        // sha256("") = e3b0c442...b855
        assert_eq!(encode_hex_with_checksum(&[]), "0x7852b855");
        assert!(decode_hex_with_checksum("0x7852b855").unwrap().is_empty());
    }

    #[test]
    fn corrupted_payload_rejected() {
        let mut encoded = encode_hex_with_checksum(&[9, 9, 9]);
        encoded.replace_range(2..4, "08");
        assert!(matches!(
            decode_hex_with_checksum(&encoded),
            Err(RpcError::ChecksumMismatch)
        ));
        assert!(decode_hex_with_checksum("0xzz").is_err());
        assert!(decode_hex_with_checksum("0x01").is_err());
    }
}
