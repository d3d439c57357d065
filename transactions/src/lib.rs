//! Platform-chain transactions and their wire encoding.
//!
//! Transaction kinds built by this client:
//! - **CreateSubnet**: register a subnet owned by a threshold owner spec
//! - **AddValidator**: stake on the primary network
//! - **AddSubnetValidator**: admit a primary validator to a subnet
//! - **CreateChain**: launch a blockchain on a subnet
//! - **RemoveSubnetValidator**: drop a node from a subnet
//!
//! All bytes go through an explicit [`Codec`]; nothing is registered
//! globally.

pub mod add_subnet_validator;
pub mod add_validator;
pub mod avax;
pub mod builder;
pub mod codec;
pub mod create_chain;
pub mod create_subnet;
pub mod error;
pub mod fx;
pub mod remove_subnet_validator;
pub mod signed;
pub mod validator;

pub use add_subnet_validator::AddSubnetValidatorTx;
pub use add_validator::{AddValidatorTx, REWARD_SHARES_DENOMINATOR};
pub use avax::{BaseTx, TransferableInput, TransferableOutput, Utxo, UtxoId};
pub use builder::{ChainSpec, Payload, TxBuilder};
pub use codec::{Codec, Packable, Packer, TypeKind, Unpackable, Unpacker, CODEC_VERSION};
pub use create_chain::{CreateChainTx, MAX_CHAIN_NAME_LEN};
pub use create_subnet::CreateSubnetTx;
pub use error::{CodecError, TransactionError};
pub use fx::{
    Credential, Input, MintOutput, Output, OutputOwners, StakeableLockIn, StakeableLockOut,
    SubnetAuth, TransferInput, TransferOutput,
};
pub use remove_subnet_validator::RemoveSubnetValidatorTx;
pub use signed::{unsigned_hash, Tx};
pub use validator::{SubnetValidator, Validator};

/// An unsigned platform transaction, one arm per supported kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnsignedTx {
    CreateSubnet(CreateSubnetTx),
    AddValidator(AddValidatorTx),
    AddSubnetValidator(AddSubnetValidatorTx),
    CreateChain(CreateChainTx),
    RemoveSubnetValidator(RemoveSubnetValidatorTx),
}

impl UnsignedTx {
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::CreateSubnet(_) => TypeKind::CreateSubnetTx,
            Self::AddValidator(_) => TypeKind::AddValidatorTx,
            Self::AddSubnetValidator(_) => TypeKind::AddSubnetValidatorTx,
            Self::CreateChain(_) => TypeKind::CreateChainTx,
            Self::RemoveSubnetValidator(_) => TypeKind::RemoveSubnetValidatorTx,
        }
    }

    pub fn base(&self) -> &BaseTx {
        match self {
            Self::CreateSubnet(tx) => &tx.base,
            Self::AddValidator(tx) => &tx.base,
            Self::AddSubnetValidator(tx) => &tx.base,
            Self::CreateChain(tx) => &tx.base,
            Self::RemoveSubnetValidator(tx) => &tx.base,
        }
    }

    pub fn inputs(&self) -> &[TransferableInput] {
        &self.base().inputs
    }

    /// The subnet authorization proof, for subnet-scoped kinds.
    pub fn subnet_auth(&self) -> Option<&SubnetAuth> {
        match self {
            Self::AddSubnetValidator(tx) => Some(&tx.subnet_auth),
            Self::CreateChain(tx) => Some(&tx.subnet_auth),
            Self::RemoveSubnetValidator(tx) => Some(&tx.subnet_auth),
            Self::CreateSubnet(_) | Self::AddValidator(_) => None,
        }
    }

    /// Signatures required per credential: one entry per input in order,
    /// then one for the subnet authorization when present.
    pub fn signature_counts(&self) -> Vec<usize> {
        self.inputs()
            .iter()
            .map(|input| input.input.sig_indices().len())
            .chain(self.subnet_auth().map(|auth| auth.sig_indices.len()))
            .collect()
    }
}

impl Packable for UnsignedTx {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        codec.pack_type(self.kind(), packer)?;
        match self {
            Self::CreateSubnet(tx) => tx.pack(codec, packer),
            Self::AddValidator(tx) => tx.pack(codec, packer),
            Self::AddSubnetValidator(tx) => tx.pack(codec, packer),
            Self::CreateChain(tx) => tx.pack(codec, packer),
            Self::RemoveSubnetValidator(tx) => tx.pack(codec, packer),
        }
    }
}

impl Unpackable for UnsignedTx {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let kind = codec.unpack_type(unpacker)?;
        match kind {
            TypeKind::CreateSubnetTx => Ok(Self::CreateSubnet(CreateSubnetTx::unpack(codec, unpacker)?)),
            TypeKind::AddValidatorTx => Ok(Self::AddValidator(AddValidatorTx::unpack(codec, unpacker)?)),
            TypeKind::AddSubnetValidatorTx => Ok(Self::AddSubnetValidator(
                AddSubnetValidatorTx::unpack(codec, unpacker)?,
            )),
            TypeKind::CreateChainTx => Ok(Self::CreateChain(CreateChainTx::unpack(codec, unpacker)?)),
            TypeKind::RemoveSubnetValidatorTx => Ok(Self::RemoveSubnetValidator(
                RemoveSubnetValidatorTx::unpack(codec, unpacker)?,
            )),
            TypeKind::AddDelegatorTx
            | TypeKind::ImportTx
            | TypeKind::ExportTx
            | TypeKind::AdvanceTimeTx
            | TypeKind::RewardValidatorTx => Err(CodecError::UnsupportedType(kind.name())),
            other => Err(CodecError::UnexpectedType {
                expected: "unsigned transaction",
                found: other.name(),
            }),
        }
    }
}
