//! Nullable platform node, an in-memory ledger behind the RPC traits.
//!
//! Issued transactions are decoded, checked against the UTXO set, their
//! credentials verified and their effects applied, so a client driven
//! against this double exercises the same byte paths as against a node.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use subnet_crypto::{address_from_public, format_p_address, parse_address, recover_public, sha256};
use subnet_rpc::{
    Balance, BlockchainInfo, InfoApi, PlatformApi, RpcError, SubnetInfo, TxFee, ValidatorInfo,
};
use subnet_transactions::signed::check_credentials;
use subnet_transactions::{
    unsigned_hash, Codec, Credential, Output, OutputOwners, StakeableLockOut, TransferOutput, Tx,
    UnsignedTx, Utxo, UtxoId,
};
use subnet_types::{BlockchainStatus, Id, NetworkId, NodeId, ShortId, TxStatus};

/// Error code the node uses for rejected calls.
const REMOTE_ERROR_CODE: i64 = -32000;

#[derive(Default)]
struct Ledger {
    asset_id: Id,
    fees: TxFee,
    utxos: BTreeMap<UtxoId, Utxo>,
    txs: HashMap<Id, Vec<u8>>,
    statuses: HashMap<Id, TxStatus>,
    /// Remaining `Processing` answers before a tx reports its real status.
    processing: HashMap<Id, usize>,
    commit_delay: usize,
    subnet_owners: BTreeMap<Id, OutputOwners>,
    blockchains: Vec<BlockchainInfo>,
    chain_status: HashMap<Id, BlockchainStatus>,
    /// Keyed by subnet; the primary network is [`Id::EMPTY`].
    validators: HashMap<Id, Vec<ValidatorInfo>>,
    bootstrapped: bool,
    failures: usize,
    issued: Vec<Id>,
    /// Reported by the next `issue_tx` in place of the real ID.
    misreport: Option<Id>,
    nonce: u64,
}

/// An in-memory ledger for tests.
///
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullPlatform {
    codec: Codec,
    network_id: u32,
    state: Mutex<Ledger>,
}

impl NullPlatform {
    /// An empty ledger with zero fees, a bootstrapped node and a fixed
    /// staking asset.
    pub fn new(network_id: u32) -> Self {
        let ledger = Ledger {
            asset_id: Id::new(sha256(b"staking asset")),
            bootstrapped: true,
            ..Ledger::default()
        };
        Self {
            codec: Codec::platform(),
            network_id,
            state: Mutex::new(ledger),
        }
    }

    fn state(&self) -> MutexGuard<'_, Ledger> {
        // A panicking test thread must not hide the ledger from the rest.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn asset_id(&self) -> Id {
        self.state().asset_id
    }

    pub fn set_fees(&self, fees: TxFee) {
        self.state().fees = fees;
    }

    /// Credit `amount` to a fresh UTXO owned by `owner`.
    pub fn fund(&self, owner: ShortId, amount: u64) -> UtxoId {
        self.add_output(Output::Transfer(TransferOutput {
            amount,
            owners: OutputOwners::single(owner),
        }))
    }

    /// Credit `amount` under a stakeable lock until `locktime`.
    pub fn fund_locked(&self, owner: ShortId, amount: u64, locktime: u64) -> UtxoId {
        self.add_output(Output::StakeableLock(StakeableLockOut {
            locktime,
            output: TransferOutput {
                amount,
                owners: OutputOwners::single(owner),
            },
        }))
    }

    fn add_output(&self, output: Output) -> UtxoId {
        let mut state = self.state();
        state.nonce += 1;
        let utxo_id = UtxoId {
            tx_id: Id::new(sha256(&state.nonce.to_be_bytes())),
            output_index: 0,
        };
        let asset_id = state.asset_id;
        state.utxos.insert(
            utxo_id,
            Utxo {
                utxo_id,
                asset_id,
                output,
            },
        );
        utxo_id
    }

    /// Register a current validator of `subnet_id`.
    pub fn add_validator(&self, subnet_id: Id, info: ValidatorInfo) {
        self.state().validators.entry(subnet_id).or_default().push(info);
    }

    pub fn set_bootstrapped(&self, bootstrapped: bool) {
        self.state().bootstrapped = bootstrapped;
    }

    pub fn set_tx_status(&self, tx_id: Id, status: TxStatus) {
        let mut state = self.state();
        state.processing.remove(&tx_id);
        state.statuses.insert(tx_id, status);
    }

    pub fn set_blockchain_status(&self, blockchain_id: Id, status: BlockchainStatus) {
        self.state().chain_status.insert(blockchain_id, status);
    }

    /// Make the next `n` status queries fail as transport errors.
    pub fn fail_next(&self, n: usize) {
        self.state().failures = n;
    }

    /// Transactions issued from now on report `Processing` for their first
    /// `polls` status queries.
    pub fn delay_commit(&self, polls: usize) {
        self.state().commit_delay = polls;
    }

    /// Make the next accepted `issue_tx` answer with `id` instead of the
    /// transaction's real ID. The transaction is still applied.
    pub fn misreport_next_id(&self, id: Id) {
        self.state().misreport = Some(id);
    }

    /// IDs accepted by `issue_tx`, in order.
    pub fn issued(&self) -> Vec<Id> {
        self.state().issued.clone()
    }

    pub fn utxo_count(&self) -> usize {
        self.state().utxos.len()
    }

    /// Spendable total owned (at least partly) by `owner`.
    pub fn balance_of(&self, owner: &ShortId) -> u64 {
        self.state()
            .utxos
            .values()
            .filter(|u| u.output.owners().addresses.contains(owner))
            .map(|u| u.output.amount())
            .sum()
    }

    /// Apply signed transaction bytes, as `issue_tx` does.
    pub fn issue_raw(&self, bytes: &[u8]) -> Result<Id, RpcError> {
        let tx = Tx::from_bytes(&self.codec, bytes)
            .map_err(|e| remote("platform.issueTx", format!("couldn't parse tx: {e}")))?;
        let id = tx.id();
        let mut state = self.state();
        if state.txs.contains_key(&id) {
            return Err(remote("platform.issueTx", format!("duplicate tx {id}")));
        }
        self.verify(&state, &tx)?;

        let base = tx.unsigned().base();
        for input in &base.inputs {
            state.utxos.remove(&input.utxo_id);
        }
        for (index, out) in base.outputs.iter().enumerate() {
            let utxo_id = UtxoId {
                tx_id: id,
                output_index: index as u32,
            };
            state.utxos.insert(
                utxo_id,
                Utxo {
                    utxo_id,
                    asset_id: out.asset_id,
                    output: out.output.clone(),
                },
            );
        }

        match tx.unsigned() {
            UnsignedTx::CreateSubnet(create) => {
                state.subnet_owners.insert(id, create.owner.clone());
            }
            UnsignedTx::AddValidator(add) => {
                let staked = add.stake.iter().map(|o| o.output.amount()).sum();
                state.validators.entry(Id::EMPTY).or_default().push(ValidatorInfo {
                    node_id: add.validator.node_id,
                    start_time: add.validator.start,
                    end_time: add.validator.end,
                    weight: None,
                    stake_amount: Some(staked),
                });
            }
            UnsignedTx::AddSubnetValidator(add) => {
                let v = &add.validator.validator;
                state
                    .validators
                    .entry(add.validator.subnet_id)
                    .or_default()
                    .push(ValidatorInfo {
                        node_id: v.node_id,
                        start_time: v.start,
                        end_time: v.end,
                        weight: Some(v.weight),
                        stake_amount: None,
                    });
            }
            UnsignedTx::CreateChain(create) => {
                state.blockchains.push(BlockchainInfo {
                    id,
                    name: create.chain_name.clone(),
                    subnet_id: create.subnet_id,
                    vm_id: create.vm_id,
                });
                state.chain_status.insert(id, BlockchainStatus::Validating);
            }
            UnsignedTx::RemoveSubnetValidator(remove) => {
                if let Some(validators) = state.validators.get_mut(&remove.subnet_id) {
                    validators.retain(|v| v.node_id != remove.node_id);
                }
            }
        }

        state.txs.insert(id, bytes.to_vec());
        state.statuses.insert(id, TxStatus::Committed);
        let delay = state.commit_delay;
        if delay > 0 {
            state.processing.insert(id, delay);
        }
        state.issued.push(id);
        tracing::debug!(tx_id = %id, kind = tx.unsigned().kind().name(), "null ledger accepted tx");
        Ok(id)
    }

    /// Inputs exist, value balances against the fee, every credential
    /// recovers to the owner addresses it claims.
    fn verify(&self, state: &Ledger, tx: &Tx) -> Result<(), RpcError> {
        const METHOD: &str = "platform.issueTx";
        let unsigned = tx.unsigned();
        let base = unsigned.base();
        check_credentials(unsigned, tx.credentials()).map_err(|e| remote(METHOD, e.to_string()))?;
        let hash = unsigned_hash(&self.codec, unsigned)
            .map_err(|e| remote(METHOD, e.to_string()))?;

        let mut consumed = 0u64;
        for (input, credential) in base.inputs.iter().zip(tx.credentials()) {
            let utxo = state
                .utxos
                .get(&input.utxo_id)
                .ok_or_else(|| remote(METHOD, format!("missing UTXO {}", input.utxo_id.tx_id)))?;
            if utxo.output.amount() != input.input.amount() {
                return Err(remote(METHOD, "input amount does not match UTXO".into()));
            }
            check_signers(
                &hash,
                utxo.output.owners(),
                input.input.sig_indices(),
                credential,
            )?;
            consumed += input.input.amount();
        }

        if let Some(auth) = unsigned.subnet_auth() {
            let subnet_id = match unsigned {
                UnsignedTx::AddSubnetValidator(tx) => tx.validator.subnet_id,
                UnsignedTx::CreateChain(tx) => tx.subnet_id,
                UnsignedTx::RemoveSubnetValidator(tx) => tx.subnet_id,
                _ => Id::EMPTY,
            };
            let owner = state
                .subnet_owners
                .get(&subnet_id)
                .ok_or_else(|| remote(METHOD, format!("unknown subnet {subnet_id}")))?;
            let credential = tx
                .credentials()
                .last()
                .ok_or_else(|| remote(METHOD, "missing subnet auth credential".into()))?;
            check_signers(&hash, owner, &auth.sig_indices, credential)?;
        }

        let mut produced: u64 = base.outputs.iter().map(|o| o.output.amount()).sum();
        if let UnsignedTx::AddValidator(add) = unsigned {
            produced += add.stake.iter().map(|o| o.output.amount()).sum::<u64>();
        }
        let fee = match unsigned {
            UnsignedTx::CreateSubnet(_) => state.fees.create_subnet_tx_fee,
            UnsignedTx::CreateChain(_) => state.fees.create_blockchain_tx_fee,
            UnsignedTx::AddValidator(_) => 0,
            _ => state.fees.tx_fee,
        };
        if consumed != produced + fee {
            return Err(remote(
                METHOD,
                format!("flow check failed: consumed {consumed}, produced {produced}, fee {fee}"),
            ));
        }
        Ok(())
    }

    fn query(&self, method: &str) -> Result<MutexGuard<'_, Ledger>, RpcError> {
        let mut state = self.state();
        if state.failures > 0 {
            state.failures -= 1;
            return Err(RpcError::Transport {
                method: method.into(),
                message: "connection refused".into(),
            });
        }
        Ok(state)
    }

    fn owners_to_keys(&self, owners: &OutputOwners) -> Result<Vec<String>, RpcError> {
        let network = NetworkId::new(self.network_id);
        owners
            .addresses
            .iter()
            .map(|a| format_p_address(network, a).map_err(|e| remote("platform.getSubnets", e.to_string())))
            .collect()
    }
}

fn remote(method: &str, message: String) -> RpcError {
    RpcError::Remote {
        method: method.into(),
        code: REMOTE_ERROR_CODE,
        message,
    }
}

fn check_signers(
    hash: &[u8; 32],
    owners: &OutputOwners,
    sig_indices: &[u32],
    credential: &Credential,
) -> Result<(), RpcError> {
    const METHOD: &str = "platform.issueTx";
    if sig_indices.len() != credential.signatures.len() {
        return Err(remote(METHOD, "wrong number of signatures".into()));
    }
    if sig_indices.len() < owners.threshold as usize {
        return Err(remote(METHOD, "threshold not met".into()));
    }
    for (index, signature) in sig_indices.iter().zip(&credential.signatures) {
        let expected = owners
            .addresses
            .get(*index as usize)
            .ok_or_else(|| remote(METHOD, format!("signature index {index} out of range")))?;
        let public = recover_public(hash, signature).map_err(|e| remote(METHOD, e.to_string()))?;
        if address_from_public(&public) != *expected {
            return Err(remote(METHOD, format!("signature {index} from wrong key")));
        }
    }
    Ok(())
}

#[async_trait]
impl PlatformApi for NullPlatform {
    async fn get_utxos(&self, addresses: &[String]) -> Result<Vec<Vec<u8>>, RpcError> {
        let wanted = addresses
            .iter()
            .map(|a| {
                parse_address(a)
                    .map(|(_, _, id)| id)
                    .map_err(|e| remote("platform.getUTXOs", e.to_string()))
            })
            .collect::<Result<Vec<ShortId>, _>>()?;
        let state = self.query("platform.getUTXOs")?;
        state
            .utxos
            .values()
            .filter(|u| u.output.owners().addresses.iter().any(|a| wanted.contains(a)))
            .map(|u| {
                self.codec
                    .marshal(u)
                    .map_err(|e| remote("platform.getUTXOs", e.to_string()))
            })
            .collect()
    }

    async fn get_tx(&self, tx_id: &Id) -> Result<Vec<u8>, RpcError> {
        self.query("platform.getTx")?
            .txs
            .get(tx_id)
            .cloned()
            .ok_or_else(|| remote("platform.getTx", "not found".into()))
    }

    async fn issue_tx(&self, tx_bytes: &[u8]) -> Result<Id, RpcError> {
        let id = self.issue_raw(tx_bytes)?;
        Ok(self.state().misreport.take().unwrap_or(id))
    }

    async fn get_tx_status(&self, tx_id: &Id) -> Result<TxStatus, RpcError> {
        let mut state = self.query("platform.getTxStatus")?;
        if let Some(remaining) = state.processing.get_mut(tx_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(TxStatus::Processing);
            }
        }
        Ok(state.statuses.get(tx_id).copied().unwrap_or(TxStatus::Unknown))
    }

    async fn get_current_validators(
        &self,
        subnet_id: &Id,
        node_ids: &[NodeId],
    ) -> Result<Vec<ValidatorInfo>, RpcError> {
        let state = self.query("platform.getCurrentValidators")?;
        Ok(state
            .validators
            .get(subnet_id)
            .map(|all| {
                all.iter()
                    .filter(|v| node_ids.is_empty() || node_ids.contains(&v.node_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_subnets(&self, ids: &[Id]) -> Result<Vec<SubnetInfo>, RpcError> {
        let state = self.query("platform.getSubnets")?;
        state
            .subnet_owners
            .iter()
            .filter(|(id, _)| ids.is_empty() || ids.contains(id))
            .map(|(id, owner)| {
                Ok(SubnetInfo {
                    id: *id,
                    control_keys: self.owners_to_keys(owner)?,
                    threshold: Some(owner.threshold.into()),
                })
            })
            .collect()
    }

    async fn get_blockchains(&self) -> Result<Vec<BlockchainInfo>, RpcError> {
        Ok(self.query("platform.getBlockchains")?.blockchains.clone())
    }

    async fn get_blockchain_status(&self, blockchain_id: &Id) -> Result<BlockchainStatus, RpcError> {
        Ok(self
            .query("platform.getBlockchainStatus")?
            .chain_status
            .get(blockchain_id)
            .copied()
            .unwrap_or(BlockchainStatus::Unknown))
    }

    async fn get_balance(&self, addresses: &[String]) -> Result<Balance, RpcError> {
        let mut balance = Balance::default();
        let mut unlocked = 0;
        let mut locked = 0;
        for bytes in self.get_utxos(addresses).await? {
            let utxo = Utxo::from_bytes(&self.codec, &bytes)
                .map_err(|e| remote("platform.getBalance", e.to_string()))?;
            match utxo.output {
                Output::StakeableLock(lock) => locked += lock.output.amount,
                other => unlocked += other.amount(),
            }
        }
        balance.balance = unlocked + locked;
        balance.unlocked = Some(unlocked);
        balance.locked_stakeable = Some(locked);
        Ok(balance)
    }

    async fn get_staking_asset_id(&self) -> Result<Id, RpcError> {
        Ok(self.query("platform.getStakingAssetID")?.asset_id)
    }
}

#[async_trait]
impl InfoApi for NullPlatform {
    async fn get_tx_fee(&self) -> Result<TxFee, RpcError> {
        Ok(self.query("info.getTxFee")?.fees)
    }

    async fn is_bootstrapped(&self, _chain: &str) -> Result<bool, RpcError> {
        Ok(self.query("info.isBootstrapped")?.bootstrapped)
    }

    async fn get_network_id(&self) -> Result<u32, RpcError> {
        Ok(self.network_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn funded_utxos_listed_by_address() {
        let ledger = NullPlatform::new(1337);
        let owner = ShortId::new([4; 20]);
        ledger.fund(owner, 100);
        ledger.fund_locked(owner, 50, 9_999);
        ledger.fund(ShortId::new([5; 20]), 7);

        let address = format_p_address(NetworkId::new(1337), &owner).unwrap();
        let utxos = ledger.get_utxos(&[address.clone()]).await.unwrap();
        assert_eq!(utxos.len(), 2);

        let balance = ledger.get_balance(&[address]).await.unwrap();
        assert_eq!(balance.balance, 150);
        assert_eq!(balance.unlocked, Some(100));
        assert_eq!(balance.locked_stakeable, Some(50));
    }

    #[tokio::test]
    async fn transient_failures_then_recovery() {
        let ledger = NullPlatform::new(1337);
        ledger.fail_next(2);
        let id = Id::new([1; 32]);
        assert!(ledger.get_tx_status(&id).await.is_err());
        assert!(ledger.get_tx_status(&id).await.is_err());
        assert_eq!(ledger.get_tx_status(&id).await.unwrap(), TxStatus::Unknown);
    }

    #[tokio::test]
    async fn garbage_rejected_remotely() {
        let ledger = NullPlatform::new(1337);
        let err = ledger.issue_tx(&[0, 0, 1]).await.unwrap_err();
        assert!(matches!(err, RpcError::Remote { code: REMOTE_ERROR_CODE, .. }));
        assert!(ledger.issued().is_empty());
    }
}
