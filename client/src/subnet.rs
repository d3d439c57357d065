//! Creating subnets and the blockchains that run on them.

use std::time::Duration;

use subnet_confirmation::{BlockchainWait, PollContext};
use subnet_transactions::{ChainSpec, OutputOwners, Payload, TxBuilder};
use subnet_types::{BlockchainStatus, Id};
use subnet_wallet_core::{authorize, KeyManager};

use crate::client::Client;
use crate::error::ClientError;
use crate::options::{CreateBlockchainOptions, CreateSubnetOptions};

impl Client {
    /// Create a subnet owned by the key's first address.
    ///
    /// Returns the subnet ID (the creating transaction's ID) and how long
    /// the wait took. A dry run returns the ID the subnet would get.
    pub async fn create_subnet<K: KeyManager + ?Sized>(
        &self,
        ctx: &PollContext,
        key: &K,
        opts: CreateSubnetOptions,
    ) -> Result<(Id, Duration), ClientError> {
        let owner_address = key.primary_address();
        let fee = self.info.get_tx_fee().await?.create_subnet_tx_fee;
        let selection = self.fund(key, 0, fee, owner_address).await?;

        let unsigned = TxBuilder::new(&self.codec, self.network_id()).build(
            selection.inputs,
            selection.returned,
            Payload::CreateSubnet {
                owner: OutputOwners::single(owner_address),
            },
        )?;
        let tx = self.sign(key, unsigned, &selection.signers)?;
        let expected = tx.id();

        if opts.dry_run {
            tracing::info!(subnet_id = %expected, fee, "dry run, not issuing");
            return Ok((expected, Duration::ZERO));
        }

        let subnet_id = self.issue(&tx).await?;
        if subnet_id != expected {
            return Err(ClientError::UnexpectedSubnetId {
                expected,
                actual: subnet_id,
            });
        }
        if !opts.poll {
            return Ok((subnet_id, Duration::ZERO));
        }
        let took = self.checker().poll_subnet(ctx, subnet_id).await?;
        tracing::info!(subnet_id = %subnet_id, took = ?took, "created subnet");
        Ok((subnet_id, took))
    }

    /// Launch a blockchain running `vm_id` on `subnet_id`.
    ///
    /// With `opts.poll`, waits until the chain is validating and the local
    /// node has bootstrapped it.
    pub async fn create_blockchain<K: KeyManager + ?Sized>(
        &self,
        ctx: &PollContext,
        key: &K,
        subnet_id: Id,
        vm_id: Id,
        opts: CreateBlockchainOptions,
    ) -> Result<(Id, Duration), ClientError> {
        if subnet_id.is_empty() {
            return Err(ClientError::EmptyId("subnet ID"));
        }
        if vm_id.is_empty() {
            return Err(ClientError::EmptyId("VM ID"));
        }

        let fee = self.info.get_tx_fee().await?.create_blockchain_tx_fee;
        let selection = self.fund(key, 0, fee, key.primary_address()).await?;
        let authorization = authorize(self.platform.as_ref(), &self.codec, key, &subnet_id, self.now()).await?;

        let unsigned = TxBuilder::new(&self.codec, self.network_id()).build(
            selection.inputs,
            selection.returned,
            Payload::CreateChain {
                chain: ChainSpec {
                    subnet_id,
                    chain_name: opts.name.clone(),
                    vm_id,
                    fx_ids: opts.fx_ids,
                    genesis_data: opts.genesis,
                },
                subnet_auth: authorization.auth,
            },
        )?;
        let mut signers = selection.signers;
        signers.push(authorization.signers);
        let tx = self.sign(key, unsigned, &signers)?;
        let blockchain_id = self.issue(&tx).await?;
        tracing::info!(
            blockchain_id = %blockchain_id,
            subnet_id = %subnet_id,
            name = %opts.name,
            "issued blockchain creation"
        );
        if !opts.poll {
            return Ok((blockchain_id, Duration::ZERO));
        }

        let wait = BlockchainWait {
            subnet_id: Some(subnet_id),
            blockchain_id: Some(blockchain_id),
            status: BlockchainStatus::Validating,
            check_bootstrapped: true,
        };
        Ok(self.checker().poll_blockchain(ctx, wait).await?)
    }
}
