//! CreateSubnet: registers a subnet owned by a threshold owner spec.
//!
//! The subnet ID is the ID of this transaction.

use crate::avax::BaseTx;
use crate::codec::{Codec, Packable, Packer, TypeKind, Unpackable, Unpacker};
use crate::error::CodecError;
use crate::fx::OutputOwners;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CreateSubnetTx {
    pub base: BaseTx,
    /// Who may administer the subnet.
    pub owner: OutputOwners,
}

impl Packable for CreateSubnetTx {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(codec, packer)?;
        codec.pack_type(TypeKind::OutputOwners, packer)?;
        self.owner.pack(codec, packer)
    }
}

impl Unpackable for CreateSubnetTx {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let base = BaseTx::unpack(codec, unpacker)?;
        match codec.unpack_type(unpacker)? {
            TypeKind::OutputOwners => Ok(Self {
                base,
                owner: OutputOwners::unpack(codec, unpacker)?,
            }),
            other => Err(CodecError::UnknownOwner(other.name())),
        }
    }
}
