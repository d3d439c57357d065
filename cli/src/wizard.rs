//! `wizard`: take a set of nodes from nothing to a running blockchain.
//!
//! Nodes that are not yet primary-network validators are staked first.
//! Then a subnet is created, every node is added to it for as long as it
//! validates the primary network, and the blockchain is launched.

use std::time::Duration;

use anyhow::bail;
use subnet_client::{
    default_stake_amount, AddSubnetValidatorOptions, AddValidatorOptions, Client, ClientError,
    CreateBlockchainOptions, CreateSubnetOptions,
};
use subnet_confirmation::{poll, CheckerError, PollContext};
use subnet_rpc::{InfoApi, PlatformApi};
use subnet_types::{Id, NetworkId, NodeId, Timestamp};
use subnet_wallet_core::KeyManager;

/// Delay before a freshly added validator starts validating.
pub const START_DELAY: Duration = Duration::from_secs(30);

pub struct WizardPlan {
    pub node_ids: Vec<NodeId>,
    /// Stake per new primary validator; network default when unset.
    pub stake_amount: Option<u64>,
    /// End of the primary validation period for new validators.
    pub validate_end: Timestamp,
    pub validate_weight: u64,
    pub chain_name: String,
    pub vm_id: Id,
    pub genesis: Vec<u8>,
}

/// What the wizard will spend, checked against the key's balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WizardCost {
    /// Nodes that still need to stake on the primary network.
    pub new_validators: Vec<NodeId>,
    pub stake_amount: u64,
    pub fees: u64,
    pub balance: u64,
}

impl WizardCost {
    pub fn required(&self) -> u64 {
        self.stake_amount * self.new_validators.len() as u64 + self.fees
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WizardOutcome {
    pub subnet_id: Id,
    pub blockchain_id: Id,
}

pub struct Wizard<'a, K: ?Sized> {
    client: &'a Client,
    key: &'a K,
    ctx: &'a PollContext,
}

impl<'a, K: KeyManager + ?Sized> Wizard<'a, K> {
    pub fn new(client: &'a Client, key: &'a K, ctx: &'a PollContext) -> Self {
        Self { client, key, ctx }
    }

    /// Find the nodes that need staking and price the whole run.
    pub async fn estimate(&self, plan: &WizardPlan) -> anyhow::Result<WizardCost> {
        if plan.node_ids.is_empty() {
            bail!("no node IDs given");
        }
        if plan.vm_id.is_empty() {
            return Err(ClientError::EmptyId("VM ID").into());
        }

        let mut new_validators = Vec::new();
        for node_id in &plan.node_ids {
            match self.client.get_validator(Id::EMPTY, *node_id).await {
                Ok(_) => tracing::info!(node_id = %node_id, "already a primary validator"),
                Err(ClientError::ValidatorNotFound { .. }) => new_validators.push(*node_id),
                Err(e) => return Err(e.into()),
            }
        }

        let fees = self.client.info().get_tx_fee().await?;
        let cost = WizardCost {
            new_validators,
            stake_amount: plan
                .stake_amount
                .unwrap_or_else(|| default_stake_amount(NetworkId::new(self.client.network_id()))),
            fees: fees.create_subnet_tx_fee
                + fees.tx_fee * plan.node_ids.len() as u64
                + fees.create_blockchain_tx_fee,
            balance: self.client.balance(self.key).await?.balance,
        };
        if cost.balance < cost.required() {
            return Err(ClientError::InsufficientBalance {
                required: cost.required(),
                available: cost.balance,
            }
            .into());
        }
        Ok(cost)
    }

    pub async fn run(&self, plan: &WizardPlan, cost: &WizardCost) -> anyhow::Result<WizardOutcome> {
        let start = Timestamp::new(self.client.now()).plus(START_DELAY);
        for node_id in &cost.new_validators {
            let mut opts = AddValidatorOptions::new(start, plan.validate_end);
            opts.stake_amount = Some(cost.stake_amount);
            let took = self
                .client
                .add_validator(self.ctx, self.key, *node_id, opts)
                .await?;
            tracing::info!(node_id = %node_id, took = ?took, "added primary validator");
        }
        self.wait_validators(Id::EMPTY, &cost.new_validators).await?;

        let (subnet_id, _) = self
            .client
            .create_subnet(self.ctx, self.key, CreateSubnetOptions::default())
            .await?;
        tracing::info!(
            subnet_id = %subnet_id,
            vm_id = %plan.vm_id,
            "created subnet; track it on every node and install the VM plugin before the chain can bootstrap"
        );

        let subnet_start = Timestamp::new(self.client.now()).plus(START_DELAY);
        for node_id in &plan.node_ids {
            let primary = self.client.get_validator(Id::EMPTY, *node_id).await?;
            let start = subnet_start.max(Timestamp::new(primary.start_time));
            let opts = AddSubnetValidatorOptions::new(start, Timestamp::new(primary.end_time), plan.validate_weight);
            self.client
                .add_subnet_validator(self.ctx, self.key, subnet_id, *node_id, opts)
                .await?;
            tracing::info!(node_id = %node_id, subnet_id = %subnet_id, "added subnet validator");
        }
        self.wait_validators(subnet_id, &plan.node_ids).await?;

        let opts = CreateBlockchainOptions::new(plan.chain_name.clone(), plan.genesis.clone());
        let (blockchain_id, _) = self
            .client
            .create_blockchain(self.ctx, self.key, subnet_id, plan.vm_id, opts)
            .await?;
        Ok(WizardOutcome {
            subnet_id,
            blockchain_id,
        })
    }

    /// Wait until every node in `node_ids` is listed as a current validator
    /// of `subnet_id`.
    async fn wait_validators(&self, subnet_id: Id, node_ids: &[NodeId]) -> Result<Duration, CheckerError> {
        if node_ids.is_empty() {
            return Ok(Duration::ZERO);
        }
        let platform = self.client.platform();
        let ((), took) = poll(self.ctx, self.client.poll_interval(), || async move {
            let current = platform.get_current_validators(&subnet_id, node_ids).await?;
            let all = node_ids
                .iter()
                .all(|n| current.iter().any(|v| v.node_id == *n));
            Ok::<_, CheckerError>(all.then_some(()))
        })
        .await?;
        tracing::info!(subnet_id = %subnet_id, validators = node_ids.len(), took = ?took, "validators active");
        Ok(took)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use subnet_client::ClientConfig;
    use subnet_nullables::{NullClock, NullPlatform};
    use subnet_rpc::{TxFee, ValidatorInfo};
    use subnet_types::AVAX;
    use subnet_wallet_core::SoftKey;

    const NOW: u64 = 1_700_000_000;
    const TX_FEE: u64 = 1_000_000;
    const CREATE_FEE: u64 = 100_000_000;

    async fn setup(funds: u64) -> (Arc<NullPlatform>, Client, SoftKey) {
        let ledger = Arc::new(NullPlatform::new(1337));
        ledger.set_fees(TxFee {
            tx_fee: TX_FEE,
            create_subnet_tx_fee: CREATE_FEE,
            create_blockchain_tx_fee: CREATE_FEE,
        });
        let key = SoftKey::generate().unwrap();
        ledger.fund(key.address(), funds);
        let mut cfg = ClientConfig::new("http://127.0.0.1:9650");
        cfg.poll_interval = Duration::from_millis(5);
        let client = Client::with_apis(&cfg, ledger.clone(), ledger.clone(), Arc::new(NullClock::new(NOW)))
            .await
            .unwrap();
        (ledger, client, key)
    }

    fn plan(node_ids: Vec<NodeId>) -> WizardPlan {
        WizardPlan {
            node_ids,
            stake_amount: None,
            validate_end: Timestamp::new(NOW + 86_400),
            validate_weight: 1_000,
            chain_name: "wizard chain".into(),
            vm_id: Id::new([9; 32]),
            genesis: b"{}".to_vec(),
        }
    }

    fn ctx() -> PollContext {
        PollContext::new().with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn stakes_only_new_nodes_and_launches_chain() {
        let (ledger, client, key) = setup(10 * AVAX).await;
        let staked = NodeId::new([1; 20]);
        let fresh = NodeId::new([2; 20]);
        ledger.add_validator(
            Id::EMPTY,
            ValidatorInfo {
                node_id: staked,
                start_time: NOW - 100,
                end_time: NOW + 10_000,
                weight: None,
                stake_amount: Some(AVAX),
            },
        );

        let ctx = ctx();
        let wizard = Wizard::new(&client, &key, &ctx);
        let plan = plan(vec![staked, fresh]);
        let cost = wizard.estimate(&plan).await.unwrap();
        assert_eq!(cost.new_validators, vec![fresh]);
        assert_eq!(cost.stake_amount, AVAX);
        assert_eq!(cost.fees, 2 * CREATE_FEE + 2 * TX_FEE);

        let outcome = wizard.run(&plan, &cost).await.unwrap();

        let members = ledger
            .get_current_validators(&outcome.subnet_id, &[])
            .await
            .unwrap();
        assert_eq!(members.len(), 2);
        let staked_member = members.iter().find(|v| v.node_id == staked).unwrap();
        assert_eq!(staked_member.end_time, NOW + 10_000);
        let fresh_member = members.iter().find(|v| v.node_id == fresh).unwrap();
        assert_eq!(fresh_member.end_time, NOW + 86_400);

        let chains = ledger.get_blockchains().await.unwrap();
        let chain = chains.iter().find(|c| c.id == outcome.blockchain_id).unwrap();
        assert_eq!(chain.subnet_id, outcome.subnet_id);
        assert_eq!(ledger.balance_of(&key.address()), 10 * AVAX - cost.required());
    }

    #[tokio::test]
    async fn estimate_refuses_short_balance() {
        let (_, client, key) = setup(AVAX).await;
        let ctx = ctx();
        let wizard = Wizard::new(&client, &key, &ctx);
        let err = wizard
            .estimate(&plan(vec![NodeId::new([3; 20])]))
            .await
            .unwrap_err();
        let required = AVAX + 2 * CREATE_FEE + TX_FEE;
        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::InsufficientBalance { required: r, available: AVAX }) if *r == required
        ));
    }

    #[tokio::test]
    async fn estimate_needs_nodes() {
        let (_, client, key) = setup(AVAX).await;
        let ctx = ctx();
        let wizard = Wizard::new(&client, &key, &ctx);
        assert!(wizard.estimate(&plan(vec![])).await.is_err());
    }
}
