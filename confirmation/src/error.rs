use subnet_rpc::RpcError;
use subnet_types::{Id, TxStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("transaction {tx_id} was {status} while waiting for commitment")]
    AbortedOrDropped { tx_id: Id, status: TxStatus },

    #[error("empty {0}")]
    EmptyId(&'static str),

    #[error("poll interval must be non-zero")]
    ZeroInterval,

    #[error("cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Transient; the poll loop retries these.
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

impl CheckerError {
    /// Whether the caller stopped the wait, as opposed to the ledger
    /// reaching a bad state.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
