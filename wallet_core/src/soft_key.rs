//! In-memory secp256k1 key.

use std::fmt;
use std::str::FromStr;

use subnet_crypto::{
    address_from_public, format_p_address, generate_private_key, private_key_from_bytes,
    private_key_from_str, private_key_to_string, public_from_private, sign_hash,
};
use subnet_types::{NetworkId, PrivateKey, PublicKey, ShortId, Signature};

use crate::error::WalletError;
use crate::keys::KeyManager;

/// A single private key held in memory (zeroized on drop).
pub struct SoftKey {
    private: PrivateKey,
    public: PublicKey,
    addresses: [ShortId; 1],
}

impl SoftKey {
    /// Generate a fresh key from OS randomness.
    pub fn generate() -> Result<Self, WalletError> {
        Self::from_private_key(generate_private_key()?)
    }

    pub fn from_private_key(private: PrivateKey) -> Result<Self, WalletError> {
        let public = public_from_private(&private)?;
        let address = address_from_public(&public);
        Ok(Self {
            private,
            public,
            addresses: [address],
        })
    }

    /// From 32 raw secret bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        Self::from_private_key(private_key_from_bytes(bytes)?)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn address(&self) -> ShortId {
        self.addresses[0]
    }

    /// Bech32 `P-<hrp>1...` form for `network`.
    pub fn p_address(&self, network: NetworkId) -> Result<String, WalletError> {
        Ok(format_p_address(network, &self.addresses[0])?)
    }

    /// `PrivateKey-<cb58>` form.
    pub fn encode(&self) -> String {
        private_key_to_string(&self.private)
    }

    pub fn raw_bytes(&self) -> &[u8; 32] {
        self.private.as_bytes()
    }
}

impl FromStr for SoftKey {
    type Err = WalletError;

    /// Parse the `PrivateKey-<cb58>` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_private_key(private_key_from_str(s)?)
    }
}

impl fmt::Debug for SoftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftKey")
            .field("address", &self.addresses[0])
            .finish_non_exhaustive()
    }
}

impl KeyManager for SoftKey {
    fn addresses(&self) -> &[ShortId] {
        &self.addresses
    }

    fn sign_hash(&self, hash: &[u8; 32], signers: &[ShortId]) -> Result<Vec<Signature>, WalletError> {
        signers
            .iter()
            .map(|signer| {
                if *signer != self.addresses[0] {
                    return Err(WalletError::UnknownSigner(*signer));
                }
                Ok(sign_hash(hash, &self.private)?)
            })
            .collect()
    }
}
