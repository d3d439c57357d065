//! Assembly of unsigned transactions from selected inputs and outputs.
//!
//! The builder is pure: it checks shapes, puts outputs in canonical order
//! and wraps everything in the right [`UnsignedTx`] arm. Inputs must
//! already be sorted, because their order is tied to the signer sets the
//! caller holds.

use subnet_types::{Id, NodeId};

use crate::add_subnet_validator::AddSubnetValidatorTx;
use crate::add_validator::AddValidatorTx;
use crate::avax::{inputs_sorted_and_unique, sort_outputs, BaseTx, TransferableInput, TransferableOutput};
use crate::codec::Codec;
use crate::create_chain::{CreateChainTx, MAX_CHAIN_NAME_LEN};
use crate::create_subnet::CreateSubnetTx;
use crate::error::TransactionError;
use crate::fx::{OutputOwners, SubnetAuth};
use crate::remove_subnet_validator::RemoveSubnetValidatorTx;
use crate::validator::{SubnetValidator, Validator};
use crate::UnsignedTx;

/// Blockchain to create on a subnet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainSpec {
    pub subnet_id: Id,
    pub chain_name: String,
    pub vm_id: Id,
    pub fx_ids: Vec<Id>,
    pub genesis_data: Vec<u8>,
}

/// Kind-specific part of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    CreateSubnet {
        owner: OutputOwners,
    },
    AddValidator {
        validator: Validator,
        stake: Vec<TransferableOutput>,
        rewards_owner: OutputOwners,
        shares: u32,
    },
    AddSubnetValidator {
        validator: SubnetValidator,
        subnet_auth: SubnetAuth,
    },
    CreateChain {
        chain: ChainSpec,
        subnet_auth: SubnetAuth,
    },
    RemoveSubnetValidator {
        node_id: NodeId,
        subnet_id: Id,
        subnet_auth: SubnetAuth,
    },
}

/// Builds transactions for one network and chain.
#[derive(Clone, Debug)]
pub struct TxBuilder<'c> {
    codec: &'c Codec,
    network_id: u32,
    blockchain_id: Id,
}

impl<'c> TxBuilder<'c> {
    /// Builder for the platform chain, whose blockchain ID is all zeroes.
    pub fn new(codec: &'c Codec, network_id: u32) -> Self {
        Self {
            codec,
            network_id,
            blockchain_id: Id::EMPTY,
        }
    }

    pub fn with_blockchain_id(mut self, blockchain_id: Id) -> Self {
        self.blockchain_id = blockchain_id;
        self
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    /// Assemble an unsigned transaction.
    pub fn build(
        &self,
        inputs: Vec<TransferableInput>,
        outputs: Vec<TransferableOutput>,
        payload: Payload,
    ) -> Result<UnsignedTx, TransactionError> {
        let base = self.base(inputs, outputs)?;
        let tx = match payload {
            Payload::CreateSubnet { owner } => {
                owner.verify()?;
                UnsignedTx::CreateSubnet(CreateSubnetTx { base, owner })
            }
            Payload::AddValidator {
                validator,
                mut stake,
                rewards_owner,
                shares,
            } => {
                check_validator(&validator)?;
                check_outputs(&stake)?;
                if stake.is_empty() {
                    return Err(TransactionError::ZeroAmount);
                }
                sort_outputs(self.codec, &mut stake)?;
                rewards_owner.verify()?;
                UnsignedTx::AddValidator(AddValidatorTx {
                    base,
                    validator,
                    stake,
                    rewards_owner,
                    shares,
                })
            }
            Payload::AddSubnetValidator {
                validator,
                subnet_auth,
            } => {
                check_validator(&validator.validator)?;
                check_subnet_auth(&subnet_auth)?;
                UnsignedTx::AddSubnetValidator(AddSubnetValidatorTx {
                    base,
                    validator,
                    subnet_auth,
                })
            }
            Payload::CreateChain { chain, subnet_auth } => {
                check_chain_name(&chain.chain_name)?;
                check_subnet_auth(&subnet_auth)?;
                let mut fx_ids = chain.fx_ids;
                fx_ids.sort();
                fx_ids.dedup();
                UnsignedTx::CreateChain(CreateChainTx {
                    base,
                    subnet_id: chain.subnet_id,
                    chain_name: chain.chain_name,
                    vm_id: chain.vm_id,
                    fx_ids,
                    genesis_data: chain.genesis_data,
                    subnet_auth,
                })
            }
            Payload::RemoveSubnetValidator {
                node_id,
                subnet_id,
                subnet_auth,
            } => {
                if node_id.is_empty() {
                    return Err(TransactionError::InvalidValidator {
                        reason: "empty node ID".into(),
                    });
                }
                check_subnet_auth(&subnet_auth)?;
                UnsignedTx::RemoveSubnetValidator(RemoveSubnetValidatorTx {
                    base,
                    node_id,
                    subnet_id,
                    subnet_auth,
                })
            }
        };
        Ok(tx)
    }

    fn base(
        &self,
        inputs: Vec<TransferableInput>,
        mut outputs: Vec<TransferableOutput>,
    ) -> Result<BaseTx, TransactionError> {
        if !inputs_sorted_and_unique(&inputs) {
            return Err(TransactionError::InputsNotSorted);
        }
        check_outputs(&outputs)?;
        sort_outputs(self.codec, &mut outputs)?;
        Ok(BaseTx {
            network_id: self.network_id,
            blockchain_id: self.blockchain_id,
            outputs,
            inputs,
            memo: Vec::new(),
        })
    }
}

fn check_outputs(outputs: &[TransferableOutput]) -> Result<(), TransactionError> {
    for out in outputs {
        if out.output.amount() == 0 {
            return Err(TransactionError::ZeroAmount);
        }
        out.output.owners().verify()?;
    }
    Ok(())
}

fn check_validator(validator: &Validator) -> Result<(), TransactionError> {
    let reason = if validator.node_id.is_empty() {
        "empty node ID"
    } else if validator.weight == 0 {
        "zero weight"
    } else if validator.start >= validator.end {
        "start time must be before end time"
    } else {
        return Ok(());
    };
    Err(TransactionError::InvalidValidator {
        reason: reason.into(),
    })
}

fn check_subnet_auth(auth: &SubnetAuth) -> Result<(), TransactionError> {
    if !auth.sig_indices.windows(2).all(|w| w[0] < w[1]) {
        return Err(TransactionError::InvalidOwners {
            reason: "subnet auth indices not sorted and unique".into(),
        });
    }
    Ok(())
}

fn check_chain_name(name: &str) -> Result<(), TransactionError> {
    let reason = if name.is_empty() {
        "empty"
    } else if name.len() > MAX_CHAIN_NAME_LEN {
        "too long"
    } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        "only ASCII letters, digits and spaces are allowed"
    } else {
        return Ok(());
    };
    Err(TransactionError::InvalidChainName {
        name: name.to_string(),
        reason: reason.into(),
    })
}
