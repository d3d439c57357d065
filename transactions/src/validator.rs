//! Validator records embedded in staking transactions.

use subnet_types::{Id, NodeId};

use crate::codec::{Codec, Packable, Packer, Unpackable, Unpacker};
use crate::error::CodecError;

/// A node's validation period and weight.
///
/// `start < end` is enforced by the ledger; the builder only rejects the
/// obviously broken cases (empty node, zero weight, inverted range).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Validator {
    pub node_id: NodeId,
    /// Unix seconds.
    pub start: u64,
    /// Unix seconds.
    pub end: u64,
    pub weight: u64,
}

impl Packable for Validator {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.node_id.pack(codec, packer)?;
        packer.pack_u64(self.start);
        packer.pack_u64(self.end);
        packer.pack_u64(self.weight);
        Ok(())
    }
}

impl Unpackable for Validator {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            node_id: NodeId::unpack(codec, unpacker)?,
            start: unpacker.unpack_u64()?,
            end: unpacker.unpack_u64()?,
            weight: unpacker.unpack_u64()?,
        })
    }
}

/// A validator scoped to a subnet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubnetValidator {
    pub validator: Validator,
    pub subnet_id: Id,
}

impl Packable for SubnetValidator {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.validator.pack(codec, packer)?;
        self.subnet_id.pack(codec, packer)
    }
}

impl Unpackable for SubnetValidator {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            validator: Validator::unpack(codec, unpacker)?,
            subnet_id: Id::unpack(codec, unpacker)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validator_layout() {
        let codec = Codec::platform();
        let v = Validator {
            node_id: NodeId::new([7; 20]),
            start: 1,
            end: 2,
            weight: 3,
        };
        let bytes = codec.pack_bare(&v).unwrap();
        assert_eq!(bytes.len(), 20 + 24);
        assert_eq!(&bytes[..20], &[7; 20]);
        assert_eq!(&bytes[20..28], &1u64.to_be_bytes());
        assert_eq!(&bytes[36..44], &3u64.to_be_bytes());
    }
}
