//! RemoveSubnetValidator: drop a node from a subnet's validator set.

use subnet_types::{Id, NodeId};

use crate::avax::BaseTx;
use crate::codec::{Codec, Packable, Packer, Unpackable, Unpacker};
use crate::error::CodecError;
use crate::fx::SubnetAuth;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RemoveSubnetValidatorTx {
    pub base: BaseTx,
    pub node_id: NodeId,
    pub subnet_id: Id,
    pub subnet_auth: SubnetAuth,
}

impl Packable for RemoveSubnetValidatorTx {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(codec, packer)?;
        self.node_id.pack(codec, packer)?;
        self.subnet_id.pack(codec, packer)?;
        self.subnet_auth.pack(codec, packer)
    }
}

impl Unpackable for RemoveSubnetValidatorTx {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(codec, unpacker)?,
            node_id: NodeId::unpack(codec, unpacker)?,
            subnet_id: Id::unpack(codec, unpacker)?,
            subnet_auth: SubnetAuth::unpack(codec, unpacker)?,
        })
    }
}
