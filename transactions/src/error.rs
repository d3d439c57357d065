use thiserror::Error;

/// Failures encoding or decoding wire bytes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input at offset {offset} (needed {needed} bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    #[error("unsupported codec version {0}")]
    UnsupportedVersion(u16),

    #[error("unknown type ID {0}")]
    UnknownTypeId(u32),

    #[error("type {0} is not registered with this codec")]
    UnregisteredType(&'static str),

    #[error("unexpected type: expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("type {0} is registered but not decodable by this client")]
    UnsupportedType(&'static str),

    #[error("subnet owner has unrecognised type {0}")]
    UnknownOwner(&'static str),

    #[error("length {0} exceeds the codec limit")]
    LengthOverflow(usize),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

/// Failures assembling or finalising a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("inputs are not sorted and unique by (tx ID, output index)")]
    InputsNotSorted,

    #[error("invalid owners: {reason}")]
    InvalidOwners { reason: String },

    #[error("invalid validator: {reason}")]
    InvalidValidator { reason: String },

    #[error("invalid chain name {name:?}: {reason}")]
    InvalidChainName { name: String, reason: String },

    #[error("output amount must be positive")]
    ZeroAmount,

    #[error("credential count mismatch: {inputs} inputs need credentials, got {credentials}")]
    CredentialCountMismatch { inputs: usize, credentials: usize },

    #[error("credential {index} has {actual} signatures, input requires {expected}")]
    SignatureCountMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}
