//! Recoverable secp256k1 signatures over 32-byte hashes.
//!
//! Nonces are derived per RFC 6979, so signing the same hash with the same
//! key always yields the same 65 bytes.

use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use subnet_types::{PrivateKey, PublicKey, Signature};

use crate::error::CryptoError;

/// Sign a prehashed message, returning `r || s || v`.
pub fn sign_hash(hash: &[u8; 32], private: &PrivateKey) -> Result<Signature, CryptoError> {
    let signing_key =
        SigningKey::from_slice(private.as_bytes()).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(hash)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(Signature(out))
}

/// Recover the compressed public key that produced `signature` over `hash`.
pub fn recover_public(hash: &[u8; 32], signature: &Signature) -> Result<PublicKey, CryptoError> {
    let raw = signature.as_bytes();
    let sig = EcdsaSignature::from_slice(&raw[..64]).map_err(|_| CryptoError::InvalidSignature)?;
    let recovery_id = RecoveryId::from_byte(raw[64]).ok_or(CryptoError::InvalidSignature)?;
    let key = VerifyingKey::recover_from_prehash(hash, &sig, recovery_id)
        .map_err(|_| CryptoError::InvalidSignature)?;

    let point = key.to_encoded_point(true);
    let mut compressed = [0u8; 33];
    compressed.copy_from_slice(point.as_bytes());
    Ok(PublicKey(compressed))
}

/// Check that `signature` over `hash` was produced by `public`.
pub fn verify_signature(hash: &[u8; 32], signature: &Signature, public: &PublicKey) -> bool {
    recover_public(hash, signature)
        .map(|recovered| recovered == *public)
        .unwrap_or(false)
}
