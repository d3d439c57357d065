//! CreateChain: launch a blockchain on a subnet.

use subnet_types::Id;

use crate::avax::BaseTx;
use crate::codec::{Codec, Packable, Packer, Unpackable, Unpacker};
use crate::error::CodecError;
use crate::fx::SubnetAuth;

/// Longest chain name the ledger accepts.
pub const MAX_CHAIN_NAME_LEN: usize = 128;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CreateChainTx {
    pub base: BaseTx,
    pub subnet_id: Id,
    pub chain_name: String,
    pub vm_id: Id,
    pub fx_ids: Vec<Id>,
    pub genesis_data: Vec<u8>,
    pub subnet_auth: SubnetAuth,
}

impl Packable for CreateChainTx {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(codec, packer)?;
        self.subnet_id.pack(codec, packer)?;
        packer.pack_str(&self.chain_name)?;
        self.vm_id.pack(codec, packer)?;
        packer.pack_slice(codec, &self.fx_ids)?;
        packer.pack_bytes(&self.genesis_data)?;
        self.subnet_auth.pack(codec, packer)
    }
}

impl Unpackable for CreateChainTx {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(codec, unpacker)?,
            subnet_id: Id::unpack(codec, unpacker)?,
            chain_name: unpacker.unpack_str()?,
            vm_id: Id::unpack(codec, unpacker)?,
            fx_ids: unpacker.unpack_slice(codec)?,
            genesis_data: unpacker.unpack_bytes()?,
            subnet_auth: SubnetAuth::unpack(codec, unpacker)?,
        })
    }
}
