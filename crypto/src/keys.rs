//! secp256k1 key generation, address derivation and the `PrivateKey-` text form.

use k256::ecdsa::SigningKey;
use subnet_types::formatting::{cb58_decode, cb58_encode};
use subnet_types::{PrivateKey, PublicKey, ShortId};

use crate::error::CryptoError;
use crate::hash::hash160;

/// Prefix of the textual private key form.
pub const PRIVATE_KEY_PREFIX: &str = "PrivateKey-";

/// Generate a new private key from the operating system's random source.
pub fn generate_private_key() -> Result<PrivateKey, CryptoError> {
    loop {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes).map_err(|e| CryptoError::Random(e.to_string()))?;
        // Zero and values >= the curve order are not valid scalars.
        if SigningKey::from_slice(&bytes).is_ok() {
            return Ok(PrivateKey(bytes));
        }
    }
}

/// Build a private key from raw bytes, rejecting invalid scalars.
pub fn private_key_from_bytes(bytes: &[u8]) -> Result<PrivateKey, CryptoError> {
    SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidPrivateKey)?;
    Ok(PrivateKey(arr))
}

/// Derive the compressed public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> Result<PublicKey, CryptoError> {
    let signing_key =
        SigningKey::from_slice(private.as_bytes()).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let point = signing_key.verifying_key().to_encoded_point(true);
    let mut compressed = [0u8; 33];
    compressed.copy_from_slice(point.as_bytes());
    Ok(PublicKey(compressed))
}

/// Derive the 20-byte address of a public key: `ripemd160(sha256(pubkey))`.
pub fn address_from_public(public: &PublicKey) -> ShortId {
    hash160(public.as_bytes())
}

/// Parse `PrivateKey-<cb58>`.
pub fn private_key_from_str(s: &str) -> Result<PrivateKey, CryptoError> {
    let body = s
        .strip_prefix(PRIVATE_KEY_PREFIX)
        .ok_or_else(|| CryptoError::InvalidPrivateKeyEncoding("missing PrivateKey- prefix".into()))?;
    let bytes = cb58_decode(body).map_err(|e| CryptoError::InvalidPrivateKeyEncoding(e.to_string()))?;
    private_key_from_bytes(&bytes)
}

/// Format a private key as `PrivateKey-<cb58>`.
pub fn private_key_to_string(private: &PrivateKey) -> String {
    format!("{PRIVATE_KEY_PREFIX}{}", cb58_encode(private.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EWOQ: &str = "PrivateKey-ewoqjP7PxY4yr3iLTpLisriqt94hdyDFNgchSxGGztUrTXtNN";

    #[test]
    fn ewoq_address() {
        let private = private_key_from_str(EWOQ).unwrap();
        let public = public_from_private(&private).unwrap();
        let address = address_from_public(&public);
        assert_eq!(
            hex::encode(address.as_bytes()),
            "3cb7d3842e8cee6a0ebd09f1fe884f6861e1b29c"
        );
    }

    #[test]
    fn private_key_text_roundtrip() {
        let private = private_key_from_str(EWOQ).unwrap();
        assert_eq!(private_key_to_string(&private), EWOQ);
    }

    #[test]
    fn missing_prefix_rejected() {
        assert!(matches!(
            private_key_from_str("ewoqjP7PxY4yr3iLTpLisriqt94hdyDFNgchSxGGztUrTXtNN"),
            Err(CryptoError::InvalidPrivateKeyEncoding(_))
        ));
    }

    #[test]
    fn zero_scalar_rejected() {
        assert!(matches!(
            private_key_from_bytes(&[0u8; 32]),
            Err(CryptoError::InvalidPrivateKey)
        ));
    }

    #[test]
    fn generated_keys_differ() {
        let a = generate_private_key().unwrap();
        let b = generate_private_key().unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn public_key_is_compressed() {
        let private = generate_private_key().unwrap();
        let public = public_from_private(&private).unwrap();
        assert!(public.as_bytes()[0] == 0x02 || public.as_bytes()[0] == 0x03);
    }
}
