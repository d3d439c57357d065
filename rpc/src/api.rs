//! The node surface the client consumes, as async traits so tests can
//! swap in an in-memory ledger.

use async_trait::async_trait;
use subnet_types::{BlockchainStatus, Id, NodeId, TxStatus};

use crate::error::RpcError;
use crate::types::{Balance, BlockchainInfo, SubnetInfo, TxFee, ValidatorInfo};

/// Platform-chain queries and submission.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// All UTXOs owned by `addresses` (bech32 `P-` form), as raw codec bytes.
    async fn get_utxos(&self, addresses: &[String]) -> Result<Vec<Vec<u8>>, RpcError>;

    /// Signed bytes of an accepted transaction.
    async fn get_tx(&self, tx_id: &Id) -> Result<Vec<u8>, RpcError>;

    /// Submit signed bytes; returns the ID the node assigned.
    async fn issue_tx(&self, tx_bytes: &[u8]) -> Result<Id, RpcError>;

    async fn get_tx_status(&self, tx_id: &Id) -> Result<TxStatus, RpcError>;

    /// Current validators of `subnet_id` (empty ID is the primary network),
    /// optionally filtered by node.
    async fn get_current_validators(
        &self,
        subnet_id: &Id,
        node_ids: &[NodeId],
    ) -> Result<Vec<ValidatorInfo>, RpcError>;

    /// Subnets by ID; an empty slice lists all.
    async fn get_subnets(&self, ids: &[Id]) -> Result<Vec<SubnetInfo>, RpcError>;

    async fn get_blockchains(&self) -> Result<Vec<BlockchainInfo>, RpcError>;

    async fn get_blockchain_status(&self, blockchain_id: &Id) -> Result<BlockchainStatus, RpcError>;

    async fn get_balance(&self, addresses: &[String]) -> Result<Balance, RpcError>;

    async fn get_staking_asset_id(&self) -> Result<Id, RpcError>;
}

/// Node-level queries.
#[async_trait]
pub trait InfoApi: Send + Sync {
    async fn get_tx_fee(&self) -> Result<TxFee, RpcError>;

    /// Whether the node has bootstrapped `chain` (an ID or alias).
    async fn is_bootstrapped(&self, chain: &str) -> Result<bool, RpcError>;

    async fn get_network_id(&self) -> Result<u32, RpcError>;
}
