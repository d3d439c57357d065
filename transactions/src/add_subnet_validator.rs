//! AddSubnetValidator: admit a primary-network validator to a subnet.

use crate::avax::BaseTx;
use crate::codec::{Codec, Packable, Packer, Unpackable, Unpacker};
use crate::error::CodecError;
use crate::fx::SubnetAuth;
use crate::validator::SubnetValidator;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AddSubnetValidatorTx {
    pub base: BaseTx,
    pub validator: SubnetValidator,
    pub subnet_auth: SubnetAuth,
}

impl Packable for AddSubnetValidatorTx {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(codec, packer)?;
        self.validator.pack(codec, packer)?;
        self.subnet_auth.pack(codec, packer)
    }
}

impl Unpackable for AddSubnetValidatorTx {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            base: BaseTx::unpack(codec, unpacker)?,
            validator: SubnetValidator::unpack(codec, unpacker)?,
            subnet_auth: SubnetAuth::unpack(codec, unpacker)?,
        })
    }
}
