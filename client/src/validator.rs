//! Primary-network and subnet validator management.

use std::time::Duration;

use subnet_confirmation::PollContext;
use subnet_rpc::ValidatorInfo;
use subnet_transactions::{OutputOwners, Payload, SubnetValidator, TxBuilder, Validator};
use subnet_types::{Id, NetworkId, NodeId, Timestamp, TxStatus, AVAX};
use subnet_wallet_core::{authorize, KeyManager};

use crate::client::Client;
use crate::error::ClientError;
use crate::options::{AddSubnetValidatorOptions, AddValidatorOptions, PollOptions};

/// Minimum primary-network stake on mainnet.
pub const MAINNET_STAKE_AMOUNT: u64 = 2_000 * AVAX;
/// Stake used on every other network when none is given.
pub const TESTNET_STAKE_AMOUNT: u64 = AVAX;

impl Client {
    /// The current validator record for `node_id` on `subnet_id` (the
    /// empty ID is the primary network).
    pub async fn get_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<ValidatorInfo, ClientError> {
        if node_id.is_empty() {
            return Err(ClientError::EmptyId("node ID"));
        }
        self.platform
            .get_current_validators(&subnet_id, &[node_id])
            .await?
            .into_iter()
            .find(|v| v.node_id == node_id)
            .ok_or(ClientError::ValidatorNotFound { subnet_id, node_id })
    }

    /// `Some` when `node_id` currently validates `subnet_id`.
    async fn find_validator(&self, subnet_id: Id, node_id: NodeId) -> Result<Option<ValidatorInfo>, ClientError> {
        match self.get_validator(subnet_id, node_id).await {
            Ok(v) => Ok(Some(v)),
            Err(ClientError::ValidatorNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Stake `node_id` as a primary-network validator.
    pub async fn add_validator<K: KeyManager + ?Sized>(
        &self,
        ctx: &PollContext,
        key: &K,
        node_id: NodeId,
        opts: AddValidatorOptions,
    ) -> Result<Duration, ClientError> {
        if node_id.is_empty() {
            return Err(ClientError::EmptyId("node ID"));
        }
        check_period(opts.start, opts.end)?;

        if self.find_validator(Id::EMPTY, node_id).await?.is_some() {
            return Err(ClientError::AlreadyValidator(node_id));
        }

        let stake_amount = match opts.stake_amount {
            Some(amount) => amount,
            None => {
                let amount = default_stake_amount(NetworkId::new(self.network_id()));
                tracing::info!(stake_amount = amount, "stake amount not set, using network default");
                amount
            }
        };
        let owner = key.primary_address();
        let reward_address = opts.reward_address.unwrap_or(owner);
        let change_address = opts.change_address.unwrap_or(owner);

        let selection = self.fund(key, stake_amount, 0, change_address).await?;
        let unsigned = TxBuilder::new(&self.codec, self.network_id()).build(
            selection.inputs,
            selection.returned,
            Payload::AddValidator {
                validator: Validator {
                    node_id,
                    start: opts.start.as_secs(),
                    end: opts.end.as_secs(),
                    weight: stake_amount,
                },
                stake: selection.staked,
                rewards_owner: OutputOwners::single(reward_address),
                shares: opts.reward_shares,
            },
        )?;
        let tx = self.sign(key, unsigned, &selection.signers)?;
        let tx_id = self.issue(&tx).await?;
        tracing::info!(
            tx_id = %tx_id,
            node_id = %node_id,
            stake_amount,
            reward_address = %reward_address,
            "issued add validator"
        );
        self.wait_committed(ctx, tx_id, opts.poll).await
    }

    /// Admit `node_id`, already a primary-network validator, to `subnet_id`.
    pub async fn add_subnet_validator<K: KeyManager + ?Sized>(
        &self,
        ctx: &PollContext,
        key: &K,
        subnet_id: Id,
        node_id: NodeId,
        opts: AddSubnetValidatorOptions,
    ) -> Result<Duration, ClientError> {
        if subnet_id.is_empty() {
            return Err(ClientError::EmptyId("subnet ID"));
        }
        if node_id.is_empty() {
            return Err(ClientError::EmptyId("node ID"));
        }
        if opts.weight == 0 {
            return Err(ClientError::ZeroWeight);
        }
        check_period(opts.start, opts.end)?;

        if self.find_validator(subnet_id, node_id).await?.is_some() {
            return Err(ClientError::AlreadySubnetValidator { subnet_id, node_id });
        }
        let primary = self
            .find_validator(Id::EMPTY, node_id)
            .await?
            .ok_or(ClientError::NotValidatingPrimaryNetwork(node_id))?;
        let (start, end) = (opts.start.as_secs(), opts.end.as_secs());
        if start < primary.start_time || end > primary.end_time {
            return Err(ClientError::InvalidSubnetValidatePeriod {
                start,
                end,
                primary_start: primary.start_time,
                primary_end: primary.end_time,
            });
        }

        let fee = self.info.get_tx_fee().await?.tx_fee;
        let selection = self.fund(key, 0, fee, key.primary_address()).await?;
        let authorization = authorize(self.platform.as_ref(), &self.codec, key, &subnet_id, self.now()).await?;

        let unsigned = TxBuilder::new(&self.codec, self.network_id()).build(
            selection.inputs,
            selection.returned,
            Payload::AddSubnetValidator {
                validator: SubnetValidator {
                    validator: Validator {
                        node_id,
                        start,
                        end,
                        weight: opts.weight,
                    },
                    subnet_id,
                },
                subnet_auth: authorization.auth,
            },
        )?;
        let mut signers = selection.signers;
        signers.push(authorization.signers);
        let tx = self.sign(key, unsigned, &signers)?;
        let tx_id = self.issue(&tx).await?;
        tracing::info!(
            tx_id = %tx_id,
            subnet_id = %subnet_id,
            node_id = %node_id,
            weight = opts.weight,
            "issued add subnet validator"
        );
        self.wait_committed(ctx, tx_id, opts.poll).await
    }

    /// Drop `node_id` from the validator set of `subnet_id`.
    pub async fn remove_subnet_validator<K: KeyManager + ?Sized>(
        &self,
        ctx: &PollContext,
        key: &K,
        subnet_id: Id,
        node_id: NodeId,
        opts: PollOptions,
    ) -> Result<Duration, ClientError> {
        if subnet_id.is_empty() {
            return Err(ClientError::EmptyId("subnet ID"));
        }
        self.get_validator(subnet_id, node_id).await?;

        let fee = self.info.get_tx_fee().await?.tx_fee;
        let selection = self.fund(key, 0, fee, key.primary_address()).await?;
        let authorization = authorize(self.platform.as_ref(), &self.codec, key, &subnet_id, self.now()).await?;

        let unsigned = TxBuilder::new(&self.codec, self.network_id()).build(
            selection.inputs,
            selection.returned,
            Payload::RemoveSubnetValidator {
                node_id,
                subnet_id,
                subnet_auth: authorization.auth,
            },
        )?;
        let mut signers = selection.signers;
        signers.push(authorization.signers);
        let tx = self.sign(key, unsigned, &signers)?;
        let tx_id = self.issue(&tx).await?;
        tracing::info!(
            tx_id = %tx_id,
            subnet_id = %subnet_id,
            node_id = %node_id,
            "issued remove subnet validator"
        );
        self.wait_committed(ctx, tx_id, opts.poll).await
    }

    async fn wait_committed(&self, ctx: &PollContext, tx_id: Id, poll: bool) -> Result<Duration, ClientError> {
        if !poll {
            return Ok(Duration::ZERO);
        }
        Ok(self.checker().poll_tx(ctx, tx_id, TxStatus::Committed).await?)
    }
}

/// Stake used when the caller gives none.
pub fn default_stake_amount(network: NetworkId) -> u64 {
    if network.is_mainnet() {
        MAINNET_STAKE_AMOUNT
    } else {
        TESTNET_STAKE_AMOUNT
    }
}

fn check_period(start: Timestamp, end: Timestamp) -> Result<(), ClientError> {
    if start >= end {
        return Err(ClientError::InvalidPeriod {
            start: start.as_secs(),
            end: end.as_secs(),
        });
    }
    Ok(())
}
