use subnet_crypto::CryptoError;
use subnet_rpc::RpcError;
use subnet_transactions::{CodecError, TransactionError};
use subnet_types::ShortId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("insufficient balance for stake amount: need {required}, staked {staked}")]
    InsufficientBalanceForStake { required: u64, staked: u64 },

    #[error("insufficient balance for fee: need {required}, burned {burned}")]
    InsufficientBalanceForFee { required: u64, burned: u64 },

    #[error("wrong transaction type: expected CreateSubnetTx, found {found}")]
    WrongTxType { found: &'static str },

    #[error("unknown subnet owner type {0}")]
    UnknownOwners(&'static str),

    #[error("can't sign: hold {matched} of {threshold} required owner keys")]
    CantSign { threshold: u32, matched: usize },

    #[error("no key held for signer {0}")]
    UnknownSigner(ShortId),

    #[error("signing device: {0}")]
    Device(String),

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("invalid private key length (expect 64 hex characters)")]
    InvalidPrivateKeyLength,

    #[error("invalid private key ending")]
    InvalidPrivateKeyEnding,

    #[error("invalid private key encoding")]
    InvalidPrivateKeyEncoding,

    #[error("key file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}
