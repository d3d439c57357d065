//! Errors for parsing and validating fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid node ID: {0}")]
    InvalidNodeId(String),
}
