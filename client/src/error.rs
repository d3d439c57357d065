use subnet_confirmation::CheckerError;
use subnet_crypto::CryptoError;
use subnet_rpc::RpcError;
use subnet_transactions::{CodecError, TransactionError};
use subnet_types::{Id, NodeId};
use subnet_wallet_core::WalletError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("empty URI")]
    EmptyUri,

    #[error("invalid poll interval")]
    InvalidInterval,

    #[error("invalid request timeout")]
    InvalidRequestTimeout,

    #[error("config error: {0}")]
    Config(String),

    #[error("empty {0}")]
    EmptyId(&'static str),

    #[error("validator weight must be non-zero")]
    ZeroWeight,

    #[error("invalid validation period: start {start} is not before end {end}")]
    InvalidPeriod { start: u64, end: u64 },

    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("unexpected subnet ID: built {expected}, node returned {actual}")]
    UnexpectedSubnetId { expected: Id, actual: Id },

    #[error("{0} already validates the primary network")]
    AlreadyValidator(NodeId),

    #[error("{node_id} already validates subnet {subnet_id}")]
    AlreadySubnetValidator { subnet_id: Id, node_id: NodeId },

    #[error("{0} does not validate the primary network")]
    NotValidatingPrimaryNetwork(NodeId),

    #[error(
        "invalid subnet validate period: [{start}, {end}] is outside the primary window [{primary_start}, {primary_end}]"
    )]
    InvalidSubnetValidatePeriod {
        start: u64,
        end: u64,
        primary_start: u64,
        primary_end: u64,
    },

    #[error("validator {node_id} not found on subnet {subnet_id}")]
    ValidatorNotFound { subnet_id: Id, node_id: NodeId },

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Checker(#[from] CheckerError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
