//! RPC error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("request to {method} failed: {message}")]
    Transport { method: String, message: String },

    #[error("{method} returned HTTP {status}")]
    Status { method: String, status: u16 },

    #[error("{method} failed with code {code}: {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
    },

    #[error("{0} returned neither result nor error")]
    EmptyResponse(String),

    #[error("invalid {method} response: {message}")]
    Decode { method: String, message: String },

    #[error("invalid hex payload: {0}")]
    InvalidEncoding(String),

    #[error("hex payload checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    Types(#[from] subnet_types::TypesError),
}
