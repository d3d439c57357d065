//! AddValidator: stake on the primary network.

use crate::avax::{BaseTx, TransferableOutput};
use crate::codec::{Codec, Packable, Packer, TypeKind, Unpackable, Unpacker};
use crate::error::CodecError;
use crate::fx::OutputOwners;
use crate::validator::Validator;

/// Reward shares are parts per million of the delegation reward.
pub const REWARD_SHARES_DENOMINATOR: u32 = 1_000_000;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AddValidatorTx {
    pub base: BaseTx,
    pub validator: Validator,
    /// Locked for the validation period, returned afterwards.
    pub stake: Vec<TransferableOutput>,
    pub rewards_owner: OutputOwners,
    /// Delegation fee, out of [`REWARD_SHARES_DENOMINATOR`].
    pub shares: u32,
}

impl Packable for AddValidatorTx {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.base.pack(codec, packer)?;
        self.validator.pack(codec, packer)?;
        packer.pack_slice(codec, &self.stake)?;
        codec.pack_type(TypeKind::OutputOwners, packer)?;
        self.rewards_owner.pack(codec, packer)?;
        packer.pack_u32(self.shares);
        Ok(())
    }
}

impl Unpackable for AddValidatorTx {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let base = BaseTx::unpack(codec, unpacker)?;
        let validator = Validator::unpack(codec, unpacker)?;
        let stake = unpacker.unpack_slice(codec)?;
        codec.expect_type(TypeKind::OutputOwners, unpacker)?;
        Ok(Self {
            base,
            validator,
            stake,
            rewards_owner: OutputOwners::unpack(codec, unpacker)?,
            shares: unpacker.unpack_u32()?,
        })
    }
}
