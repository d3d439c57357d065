//! JSON-RPC 2.0 client for a node's `/ext/P` and `/ext/info` endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use subnet_types::{BlockchainStatus, Id, NodeId, TxStatus};

use crate::api::{InfoApi, PlatformApi};
use crate::encoding::{decode_hex_with_checksum, encode_hex_with_checksum};
use crate::error::RpcError;
use crate::types::{json_u64, Balance, BlockchainInfo, SubnetInfo, TxFee, UtxoIndex, ValidatorInfo};

pub const PLATFORM_ENDPOINT: &str = "/ext/P";
pub const INFO_ENDPOINT: &str = "/ext/info";

/// Page size for `platform.getUTXOs`.
pub const UTXO_PAGE_LIMIT: u32 = 1024;

/// JSON-RPC envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// HTTP client for one node.
#[derive(Clone, Debug)]
pub struct NodeClient {
    http: reqwest::Client,
    base_uri: String,
}

impl NodeClient {
    /// Create a client for `base_uri` (e.g. `http://127.0.0.1:9650`).
    pub fn new(base_uri: impl Into<String>, request_timeout: Duration) -> Result<Self, RpcError> {
        let base_uri = base_uri.into().trim_end_matches('/').to_string();
        if base_uri.is_empty() {
            return Err(RpcError::InvalidEndpoint("empty URI".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RpcError::InvalidEndpoint(e.to_string()))?;
        Ok(Self { http, base_uri })
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Send one JSON-RPC request and decode its `result`.
    async fn call<P, R>(&self, endpoint: &str, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        tracing::trace!(method, endpoint, "rpc call");

        let response = self
            .http
            .post(format!("{}{}", self.base_uri, endpoint))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RpcError::Transport {
                method: method.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RpcError::Status {
                method: method.to_string(),
                status: response.status().as_u16(),
            });
        }

        let parsed: JsonRpcResponse<R> = response.json().await.map_err(|e| RpcError::Decode {
            method: method.to_string(),
            message: e.to_string(),
        })?;

        if let Some(error) = parsed.error {
            return Err(RpcError::Remote {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        parsed
            .result
            .ok_or_else(|| RpcError::EmptyResponse(method.to_string()))
    }

    async fn platform<R: DeserializeOwned + Send>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        self.call(PLATFORM_ENDPOINT, method, params).await
    }

    async fn info<R: DeserializeOwned + Send>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        self.call(INFO_ENDPOINT, method, params).await
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetUtxosReply {
    #[serde(with = "json_u64")]
    num_fetched: u64,
    utxos: Vec<String>,
    end_index: UtxoIndex,
}

#[derive(Deserialize)]
struct TxReply {
    tx: String,
}

#[derive(Deserialize)]
struct TxIdReply {
    #[serde(rename = "txID")]
    tx_id: Id,
}

#[derive(Deserialize)]
struct StatusReply<S> {
    status: S,
}

#[derive(Deserialize)]
struct ValidatorsReply {
    validators: Vec<ValidatorInfo>,
}

#[derive(Deserialize)]
struct SubnetsReply {
    subnets: Vec<SubnetInfo>,
}

#[derive(Deserialize)]
struct BlockchainsReply {
    blockchains: Vec<BlockchainInfo>,
}

#[derive(Deserialize)]
struct AssetIdReply {
    #[serde(rename = "assetID")]
    asset_id: Id,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BootstrappedReply {
    is_bootstrapped: bool,
}

#[derive(Deserialize)]
struct NetworkIdReply {
    #[serde(rename = "networkID", with = "json_u64")]
    network_id: u64,
}

#[async_trait]
impl PlatformApi for NodeClient {
    async fn get_utxos(&self, addresses: &[String]) -> Result<Vec<Vec<u8>>, RpcError> {
        let mut utxos = Vec::new();
        let mut start: Option<UtxoIndex> = None;
        loop {
            let mut params = json!({
                "addresses": addresses,
                "limit": UTXO_PAGE_LIMIT,
                "encoding": "hex",
            });
            if let Some(index) = &start {
                params["startIndex"] = json!(index);
            }
            let reply: GetUtxosReply = self.platform("platform.getUTXOs", params).await?;
            for utxo in &reply.utxos {
                utxos.push(decode_hex_with_checksum(utxo)?);
            }
            if reply.num_fetched < u64::from(UTXO_PAGE_LIMIT) {
                break;
            }
            start = Some(reply.end_index);
        }
        tracing::debug!(count = utxos.len(), "fetched UTXOs");
        Ok(utxos)
    }

    async fn get_tx(&self, tx_id: &Id) -> Result<Vec<u8>, RpcError> {
        let reply: TxReply = self
            .platform(
                "platform.getTx",
                json!({ "txID": tx_id.to_string(), "encoding": "hex" }),
            )
            .await?;
        decode_hex_with_checksum(&reply.tx)
    }

    async fn issue_tx(&self, tx_bytes: &[u8]) -> Result<Id, RpcError> {
        let reply: TxIdReply = self
            .platform(
                "platform.issueTx",
                json!({ "tx": encode_hex_with_checksum(tx_bytes), "encoding": "hex" }),
            )
            .await?;
        Ok(reply.tx_id)
    }

    async fn get_tx_status(&self, tx_id: &Id) -> Result<TxStatus, RpcError> {
        let reply: StatusReply<TxStatus> = self
            .platform("platform.getTxStatus", json!({ "txID": tx_id.to_string() }))
            .await?;
        Ok(reply.status)
    }

    async fn get_current_validators(
        &self,
        subnet_id: &Id,
        node_ids: &[NodeId],
    ) -> Result<Vec<ValidatorInfo>, RpcError> {
        let nodes: Vec<String> = node_ids.iter().map(ToString::to_string).collect();
        let reply: ValidatorsReply = self
            .platform(
                "platform.getCurrentValidators",
                json!({ "subnetID": subnet_id.to_string(), "nodeIDs": nodes }),
            )
            .await?;
        Ok(reply.validators)
    }

    async fn get_subnets(&self, ids: &[Id]) -> Result<Vec<SubnetInfo>, RpcError> {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        let reply: SubnetsReply = self
            .platform("platform.getSubnets", json!({ "ids": ids }))
            .await?;
        Ok(reply.subnets)
    }

    async fn get_blockchains(&self) -> Result<Vec<BlockchainInfo>, RpcError> {
        let reply: BlockchainsReply = self.platform("platform.getBlockchains", json!({})).await?;
        Ok(reply.blockchains)
    }

    async fn get_blockchain_status(&self, blockchain_id: &Id) -> Result<BlockchainStatus, RpcError> {
        let reply: StatusReply<BlockchainStatus> = self
            .platform(
                "platform.getBlockchainStatus",
                json!({ "blockchainID": blockchain_id.to_string() }),
            )
            .await?;
        Ok(reply.status)
    }

    async fn get_balance(&self, addresses: &[String]) -> Result<Balance, RpcError> {
        self.platform("platform.getBalance", json!({ "addresses": addresses }))
            .await
    }

    async fn get_staking_asset_id(&self) -> Result<Id, RpcError> {
        let reply: AssetIdReply = self
            .platform("platform.getStakingAssetID", json!({}))
            .await?;
        Ok(reply.asset_id)
    }
}

#[async_trait]
impl InfoApi for NodeClient {
    async fn get_tx_fee(&self) -> Result<TxFee, RpcError> {
        self.info("info.getTxFee", json!({})).await
    }

    async fn is_bootstrapped(&self, chain: &str) -> Result<bool, RpcError> {
        let reply: BootstrappedReply = self
            .info("info.isBootstrapped", json!({ "chain": chain }))
            .await?;
        Ok(reply.is_bootstrapped)
    }

    async fn get_network_id(&self) -> Result<u32, RpcError> {
        let reply: NetworkIdReply = self.info("info.getNetworkID", json!({})).await?;
        u32::try_from(reply.network_id).map_err(|e| RpcError::Decode {
            method: "info.getNetworkID".into(),
            message: e.to_string(),
        })
    }
}
