//! The connected client and the plumbing its operations share.

use std::sync::Arc;
use std::time::Duration;

use subnet_confirmation::Checker;
use subnet_crypto::format_p_address;
use subnet_rpc::{Balance, InfoApi, NodeClient, PlatformApi};
use subnet_transactions::{Codec, Tx, UnsignedTx, Utxo};
use subnet_types::{Clock, Id, NetworkId, ShortId, SystemClock};
use subnet_wallet_core::{sign_tx, stake, KeyManager, Selection, StakeRequest};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::config::ClientConfig;
use crate::error::ClientError;

/// A platform-chain client bound to one node and network.
///
/// Every operation takes a fresh UTXO snapshot, so one client can serve
/// several keys and several operations in turn.
///
/// Signing may block on a hardware device. On a multi-threaded runtime the
/// worker hands its other tasks off for the duration; on a current-thread
/// runtime the whole runtime waits for the device.
pub struct Client {
    pub(crate) platform: Arc<dyn PlatformApi>,
    pub(crate) info: Arc<dyn InfoApi>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) codec: Codec,
    network_id: u32,
    asset_id: Id,
    poll_interval: Duration,
}

impl Client {
    /// Connect to the node at `cfg.uri`, fetching whatever the config
    /// leaves unset.
    pub async fn connect(cfg: &ClientConfig) -> Result<Self, ClientError> {
        cfg.validate()?;
        let node = Arc::new(NodeClient::new(cfg.uri.clone(), cfg.request_timeout)?);
        Self::with_apis(cfg, node.clone(), node, Arc::new(SystemClock)).await
    }

    /// Build a client over arbitrary API implementations.
    pub async fn with_apis(
        cfg: &ClientConfig,
        platform: Arc<dyn PlatformApi>,
        info: Arc<dyn InfoApi>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClientError> {
        cfg.validate()?;
        let network_id = match cfg.network_id {
            Some(id) => id,
            None => info.get_network_id().await?,
        };
        let asset_id = match cfg.asset_id {
            Some(id) => id,
            None => platform.get_staking_asset_id().await?,
        };
        tracing::info!(
            uri = %cfg.uri,
            network = %NetworkId::new(network_id),
            asset_id = %asset_id,
            "client ready"
        );
        Ok(Self {
            platform,
            info,
            clock,
            codec: Codec::platform(),
            network_id,
            asset_id,
            poll_interval: cfg.poll_interval,
        })
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    pub fn asset_id(&self) -> Id {
        self.asset_id
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn platform(&self) -> &dyn PlatformApi {
        self.platform.as_ref()
    }

    pub fn info(&self) -> &dyn InfoApi {
        self.info.as_ref()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn checker(&self) -> Checker<'_> {
        Checker::new(self.platform.as_ref(), self.info.as_ref(), self.poll_interval)
    }

    /// `P-` form of `address` on this network.
    pub fn p_address(&self, address: &ShortId) -> Result<String, ClientError> {
        Ok(format_p_address(NetworkId::new(self.network_id), address)?)
    }

    /// Remote balance of the key's first address.
    pub async fn balance<K: KeyManager + ?Sized>(&self, key: &K) -> Result<Balance, ClientError> {
        let address = self.p_address(&key.primary_address())?;
        let balance = self.platform.get_balance(&[address.clone()]).await?;
        tracing::debug!(address = %address, balance = balance.balance, "fetched balance");
        Ok(balance)
    }

    /// Unix seconds by the client's clock.
    pub fn now(&self) -> u64 {
        self.clock.now().as_secs()
    }

    /// Sign `unsigned`, letting the runtime keep other tasks moving while
    /// the key blocks.
    pub(crate) fn sign<K: KeyManager + ?Sized>(
        &self,
        key: &K,
        unsigned: UnsignedTx,
        signers: &[Vec<ShortId>],
    ) -> Result<Tx, ClientError> {
        let sign = || sign_tx(&self.codec, key, unsigned, signers);
        let signed = match Handle::try_current().map(|h| h.runtime_flavor()) {
            Ok(RuntimeFlavor::MultiThread) => tokio::task::block_in_place(sign),
            _ => sign(),
        };
        Ok(signed?)
    }

    /// Fail early when the key's balance cannot cover `required`.
    pub(crate) async fn check_balance<K: KeyManager + ?Sized>(
        &self,
        key: &K,
        required: u64,
    ) -> Result<(), ClientError> {
        let available = self.balance(key).await?.balance;
        if available < required {
            return Err(ClientError::InsufficientBalance {
                required,
                available,
            });
        }
        Ok(())
    }

    /// Every UTXO the key's addresses own, as of now.
    pub(crate) async fn utxos<K: KeyManager + ?Sized>(&self, key: &K) -> Result<Vec<Utxo>, ClientError> {
        let addresses = key
            .addresses()
            .iter()
            .map(|a| self.p_address(a))
            .collect::<Result<Vec<_>, _>>()?;
        let raw = self.platform.get_utxos(&addresses).await?;
        let utxos = raw
            .iter()
            .map(|bytes| Utxo::from_bytes(&self.codec, bytes))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(addresses = addresses.len(), utxos = utxos.len(), "fetched UTXOs");
        Ok(utxos)
    }

    /// Check the balance, snapshot UTXOs and select inputs covering
    /// `stake_amount + fee`.
    pub(crate) async fn fund<K: KeyManager + ?Sized>(
        &self,
        key: &K,
        stake_amount: u64,
        fee: u64,
        change_address: ShortId,
    ) -> Result<Selection, ClientError> {
        self.check_balance(key, stake_amount.saturating_add(fee)).await?;
        let utxos = self.utxos(key).await?;
        let req = StakeRequest {
            asset_id: self.asset_id,
            stake_amount,
            fee,
            change_address,
            now: self.now(),
        };
        Ok(stake(&self.codec, key, &utxos, &req)?)
    }

    /// Submit `tx`; returns the ID the node assigned.
    pub(crate) async fn issue(&self, tx: &Tx) -> Result<Id, ClientError> {
        let actual = self.platform.issue_tx(tx.bytes()).await?;
        tracing::info!(
            tx_id = %actual,
            kind = tx.unsigned().kind().name(),
            bytes = tx.bytes().len(),
            "issued tx"
        );
        Ok(actual)
    }
}
