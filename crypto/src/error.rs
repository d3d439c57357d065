use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid private key encoding: {0}")]
    InvalidPrivateKeyEncoding(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("random source unavailable: {0}")]
    Random(String),
}
