//! Waiting for platform-chain state to settle.
//!
//! Each wait is a sequence of poll loops; a later phase starts only once
//! the earlier one's condition holds. Reported durations cover all phases.

use std::time::Duration;

use subnet_rpc::{InfoApi, PlatformApi};
use subnet_types::{BlockchainStatus, Id, TxStatus};

use crate::error::CheckerError;
use crate::poll::{poll, PollContext};

/// What [`Checker::poll_blockchain`] waits for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockchainWait {
    /// Used to discover the blockchain when `blockchain_id` is unknown.
    pub subnet_id: Option<Id>,
    pub blockchain_id: Option<Id>,
    pub status: BlockchainStatus,
    /// Also wait for the local node to finish bootstrapping the chain.
    pub check_bootstrapped: bool,
}

impl Default for BlockchainWait {
    fn default() -> Self {
        Self {
            subnet_id: None,
            blockchain_id: None,
            status: BlockchainStatus::Validating,
            check_bootstrapped: false,
        }
    }
}

pub struct Checker<'a> {
    platform: &'a dyn PlatformApi,
    info: &'a dyn InfoApi,
    interval: Duration,
}

impl<'a> Checker<'a> {
    pub fn new(platform: &'a dyn PlatformApi, info: &'a dyn InfoApi, interval: Duration) -> Self {
        Self {
            platform,
            info,
            interval,
        }
    }

    /// Wait until `tx_id` reports `want`.
    ///
    /// Waiting for [`TxStatus::Committed`] fails at once if the transaction
    /// is aborted or dropped.
    pub async fn poll_tx(
        &self,
        ctx: &PollContext,
        tx_id: Id,
        want: TxStatus,
    ) -> Result<Duration, CheckerError> {
        if tx_id.is_empty() {
            return Err(CheckerError::EmptyId("transaction ID"));
        }
        tracing::info!(tx_id = %tx_id, expected = %want, "polling tx");
        let platform = self.platform;
        let ((), took) = poll(ctx, self.interval, || tx_reached(platform, tx_id, want)).await?;
        Ok(took)
    }

    /// Wait for the creating transaction to commit, then for the subnet to
    /// be listed.
    pub async fn poll_subnet(&self, ctx: &PollContext, subnet_id: Id) -> Result<Duration, CheckerError> {
        if subnet_id.is_empty() {
            return Err(CheckerError::EmptyId("subnet ID"));
        }
        let committed = self.poll_tx(ctx, subnet_id, TxStatus::Committed).await?;
        tracing::info!(subnet_id = %subnet_id, "finding subnet");
        let platform = self.platform;
        let ((), found) = poll(ctx, self.interval, || subnet_listed(platform, subnet_id)).await?;
        Ok(committed + found)
    }

    /// Wait for a blockchain to exist, commit, reach `wait.status` and,
    /// optionally, finish bootstrapping.
    ///
    /// Returns the blockchain ID, which is discovered through
    /// `wait.subnet_id` when not given.
    pub async fn poll_blockchain(
        &self,
        ctx: &PollContext,
        wait: BlockchainWait,
    ) -> Result<(Id, Duration), CheckerError> {
        let mut took = Duration::ZERO;
        let blockchain_id = match wait.blockchain_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                let subnet_id = wait
                    .subnet_id
                    .filter(|id| !id.is_empty())
                    .ok_or(CheckerError::EmptyId("subnet and blockchain ID"))?;
                tracing::info!(subnet_id = %subnet_id, "finding blockchain");
                let platform = self.platform;
                let (id, found) =
                    poll(ctx, self.interval, || blockchain_on(platform, subnet_id)).await?;
                took += found;
                id
            }
        };

        took += self.poll_tx(ctx, blockchain_id, TxStatus::Committed).await?;

        tracing::info!(
            blockchain_id = %blockchain_id,
            expected = %wait.status,
            "polling blockchain status"
        );
        let platform = self.platform;
        let ((), reached) = poll(ctx, self.interval, || {
            blockchain_reached(platform, blockchain_id, wait.status)
        })
        .await?;
        took += reached;

        if wait.check_bootstrapped {
            let info = self.info;
            let chain = blockchain_id.to_string();
            let ((), bootstrapped) =
                poll(ctx, self.interval, || bootstrapped(info, chain.clone())).await?;
            took += bootstrapped;
        }
        Ok((blockchain_id, took))
    }
}

async fn tx_reached(
    platform: &dyn PlatformApi,
    tx_id: Id,
    want: TxStatus,
) -> Result<Option<()>, CheckerError> {
    let status = platform.get_tx_status(&tx_id).await?;
    tracing::debug!(tx_id = %tx_id, status = %status, "tx status");
    if status == want {
        return Ok(Some(()));
    }
    if want == TxStatus::Committed && status.is_rejected() {
        return Err(CheckerError::AbortedOrDropped { tx_id, status });
    }
    Ok(None)
}

async fn subnet_listed(platform: &dyn PlatformApi, subnet_id: Id) -> Result<Option<()>, CheckerError> {
    let subnets = platform.get_subnets(&[subnet_id]).await?;
    Ok(subnets.iter().any(|s| s.id == subnet_id).then_some(()))
}

async fn blockchain_on(platform: &dyn PlatformApi, subnet_id: Id) -> Result<Option<Id>, CheckerError> {
    let chains = platform.get_blockchains().await?;
    Ok(chains.iter().find(|c| c.subnet_id == subnet_id).map(|c| c.id))
}

async fn blockchain_reached(
    platform: &dyn PlatformApi,
    blockchain_id: Id,
    want: BlockchainStatus,
) -> Result<Option<()>, CheckerError> {
    let status = platform.get_blockchain_status(&blockchain_id).await?;
    if status != want {
        tracing::info!(current = %status, "waiting for blockchain status");
        return Ok(None);
    }
    Ok(Some(()))
}

async fn bootstrapped(info: &dyn InfoApi, chain: String) -> Result<Option<()>, CheckerError> {
    if info.is_bootstrapped(&chain).await? {
        return Ok(Some(()));
    }
    tracing::debug!(chain = %chain, "blockchain not bootstrapped yet");
    Ok(None)
}
