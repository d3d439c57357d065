//! secp256k1 feature-extension types: owners, outputs, inputs and credentials.
//!
//! Values that only ever sit behind an interface on the wire ([`Output`],
//! [`Input`], [`SubnetAuth`], [`Credential`]) write their type ID first and
//! check or dispatch on it when decoding. The remaining structs write only
//! their body.

use subnet_types::{ShortId, Signature};

use crate::codec::{Codec, Packable, Packer, TypeKind, Unpackable, Unpacker};
use crate::error::{CodecError, TransactionError};

/// Threshold multisig owner spec: `threshold` of `addresses` may spend
/// once `locktime` has passed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OutputOwners {
    pub locktime: u64,
    pub threshold: u32,
    pub addresses: Vec<ShortId>,
}

impl OutputOwners {
    /// A 1-of-1 owner with no lock.
    pub fn single(address: ShortId) -> Self {
        Self {
            locktime: 0,
            threshold: 1,
            addresses: vec![address],
        }
    }

    /// Check the shape the ledger requires: reachable threshold and
    /// strictly ascending addresses.
    pub fn verify(&self) -> Result<(), TransactionError> {
        if self.threshold as usize > self.addresses.len() {
            return Err(TransactionError::InvalidOwners {
                reason: format!(
                    "threshold {} exceeds {} addresses",
                    self.threshold,
                    self.addresses.len()
                ),
            });
        }
        if self.threshold == 0 && !self.addresses.is_empty() {
            return Err(TransactionError::InvalidOwners {
                reason: "zero threshold with addresses".into(),
            });
        }
        if !self.addresses.windows(2).all(|w| w[0] < w[1]) {
            return Err(TransactionError::InvalidOwners {
                reason: "addresses not sorted and unique".into(),
            });
        }
        Ok(())
    }
}

impl Packable for OutputOwners {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.locktime);
        packer.pack_u32(self.threshold);
        packer.pack_slice(codec, &self.addresses)
    }
}

impl Unpackable for OutputOwners {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            locktime: unpacker.unpack_u64()?,
            threshold: unpacker.unpack_u32()?,
            addresses: unpacker.unpack_slice(codec)?,
        })
    }
}

// ── Outputs ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferOutput {
    pub amount: u64,
    pub owners: OutputOwners,
}

impl Packable for TransferOutput {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.amount);
        self.owners.pack(codec, packer)
    }
}

impl Unpackable for TransferOutput {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: unpacker.unpack_u64()?,
            owners: OutputOwners::unpack(codec, unpacker)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MintOutput {
    pub owners: OutputOwners,
}

impl Packable for MintOutput {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.owners.pack(codec, packer)
    }
}

impl Unpackable for MintOutput {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            owners: OutputOwners::unpack(codec, unpacker)?,
        })
    }
}

/// Value locked for staking until `locktime`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StakeableLockOut {
    pub locktime: u64,
    pub output: TransferOutput,
}

impl Packable for StakeableLockOut {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.locktime);
        codec.pack_type(TypeKind::TransferOutput, packer)?;
        self.output.pack(codec, packer)
    }
}

impl Unpackable for StakeableLockOut {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let locktime = unpacker.unpack_u64()?;
        codec.expect_type(TypeKind::TransferOutput, unpacker)?;
        Ok(Self {
            locktime,
            output: TransferOutput::unpack(codec, unpacker)?,
        })
    }
}

/// An output variant, one arm per wire type tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Output {
    Transfer(TransferOutput),
    StakeableLock(StakeableLockOut),
    Mint(MintOutput),
}

impl Output {
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Transfer(_) => TypeKind::TransferOutput,
            Self::StakeableLock(_) => TypeKind::StakeableLockOut,
            Self::Mint(_) => TypeKind::MintOutput,
        }
    }

    /// Value carried; mint outputs carry none.
    pub fn amount(&self) -> u64 {
        match self {
            Self::Transfer(out) => out.amount,
            Self::StakeableLock(out) => out.output.amount,
            Self::Mint(_) => 0,
        }
    }

    /// Owners that must sign to spend.
    pub fn owners(&self) -> &OutputOwners {
        match self {
            Self::Transfer(out) => &out.owners,
            Self::StakeableLock(out) => &out.output.owners,
            Self::Mint(out) => &out.owners,
        }
    }
}

impl Packable for Output {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        codec.pack_type(self.kind(), packer)?;
        match self {
            Self::Transfer(out) => out.pack(codec, packer),
            Self::StakeableLock(out) => out.pack(codec, packer),
            Self::Mint(out) => out.pack(codec, packer),
        }
    }
}

impl Unpackable for Output {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match codec.unpack_type(unpacker)? {
            TypeKind::TransferOutput => Ok(Self::Transfer(TransferOutput::unpack(codec, unpacker)?)),
            TypeKind::StakeableLockOut => {
                Ok(Self::StakeableLock(StakeableLockOut::unpack(codec, unpacker)?))
            }
            TypeKind::MintOutput => Ok(Self::Mint(MintOutput::unpack(codec, unpacker)?)),
            other => Err(CodecError::UnexpectedType {
                expected: "output",
                found: other.name(),
            }),
        }
    }
}

// ── Inputs ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferInput {
    pub amount: u64,
    /// Indices into the spent output's owner addresses, ascending.
    pub sig_indices: Vec<u32>,
}

impl Packable for TransferInput {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.amount);
        packer.pack_slice(codec, &self.sig_indices)
    }
}

impl Unpackable for TransferInput {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            amount: unpacker.unpack_u64()?,
            sig_indices: unpacker.unpack_slice(codec)?,
        })
    }
}

/// Spends a [`StakeableLockOut`] whose lock is still in force.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StakeableLockIn {
    pub locktime: u64,
    pub input: TransferInput,
}

impl Packable for StakeableLockIn {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u64(self.locktime);
        codec.pack_type(TypeKind::TransferInput, packer)?;
        self.input.pack(codec, packer)
    }
}

impl Unpackable for StakeableLockIn {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        let locktime = unpacker.unpack_u64()?;
        codec.expect_type(TypeKind::TransferInput, unpacker)?;
        Ok(Self {
            locktime,
            input: TransferInput::unpack(codec, unpacker)?,
        })
    }
}

/// An input variant, one arm per wire type tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    Transfer(TransferInput),
    StakeableLock(StakeableLockIn),
}

impl Input {
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Transfer(_) => TypeKind::TransferInput,
            Self::StakeableLock(_) => TypeKind::StakeableLockIn,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::Transfer(input) => input.amount,
            Self::StakeableLock(input) => input.input.amount,
        }
    }

    pub fn sig_indices(&self) -> &[u32] {
        match self {
            Self::Transfer(input) => &input.sig_indices,
            Self::StakeableLock(input) => &input.input.sig_indices,
        }
    }
}

impl Packable for Input {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        codec.pack_type(self.kind(), packer)?;
        match self {
            Self::Transfer(input) => input.pack(codec, packer),
            Self::StakeableLock(input) => input.pack(codec, packer),
        }
    }
}

impl Unpackable for Input {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        match codec.unpack_type(unpacker)? {
            TypeKind::TransferInput => Ok(Self::Transfer(TransferInput::unpack(codec, unpacker)?)),
            TypeKind::StakeableLockIn => {
                Ok(Self::StakeableLock(StakeableLockIn::unpack(codec, unpacker)?))
            }
            other => Err(CodecError::UnexpectedType {
                expected: "input",
                found: other.name(),
            }),
        }
    }
}

/// Authorization proof for subnet-scoped transactions: indices into the
/// subnet owner's addresses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubnetAuth {
    pub sig_indices: Vec<u32>,
}

impl Packable for SubnetAuth {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        codec.pack_type(TypeKind::Input, packer)?;
        packer.pack_slice(codec, &self.sig_indices)
    }
}

impl Unpackable for SubnetAuth {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        codec.expect_type(TypeKind::Input, unpacker)?;
        Ok(Self {
            sig_indices: unpacker.unpack_slice(codec)?,
        })
    }
}

/// Signatures for one input, ordered like the input's signature indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Credential {
    pub signatures: Vec<Signature>,
}

impl Packable for Credential {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        codec.pack_type(TypeKind::Credential, packer)?;
        packer.pack_slice(codec, &self.signatures)
    }
}

impl Unpackable for Credential {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        codec.expect_type(TypeKind::Credential, unpacker)?;
        Ok(Self {
            signatures: unpacker.unpack_slice(codec)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> ShortId {
        ShortId::new([b; 20])
    }

    #[test]
    fn owners_verify() {
        assert!(OutputOwners::single(addr(1)).verify().is_ok());

        let unreachable = OutputOwners {
            locktime: 0,
            threshold: 2,
            addresses: vec![addr(1)],
        };
        assert!(unreachable.verify().is_err());

        let unsorted = OutputOwners {
            locktime: 0,
            threshold: 1,
            addresses: vec![addr(2), addr(1)],
        };
        assert!(unsorted.verify().is_err());

        let duplicate = OutputOwners {
            locktime: 0,
            threshold: 1,
            addresses: vec![addr(1), addr(1)],
        };
        assert!(duplicate.verify().is_err());
    }

    #[test]
    fn transfer_output_layout() {
        let codec = Codec::platform();
        let out = Output::Transfer(TransferOutput {
            amount: 0x2386f269cb1f00,
            owners: OutputOwners::single(addr(0xAA)),
        });
        let bytes = codec.pack_bare(&out).unwrap();
        let mut expected = vec![0, 0, 0, 7];
        expected.extend_from_slice(&0x2386f269cb1f00u64.to_be_bytes());
        expected.extend_from_slice(&[0; 8]);
        expected.extend_from_slice(&[0, 0, 0, 1]);
        expected.extend_from_slice(&[0, 0, 0, 1]);
        expected.extend_from_slice(&[0xAA; 20]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn stakeable_lock_out_nests_transfer_output() {
        let codec = Codec::platform();
        let out = Output::StakeableLock(StakeableLockOut {
            locktime: 99,
            output: TransferOutput {
                amount: 5,
                owners: OutputOwners::single(addr(3)),
            },
        });
        let bytes = codec.pack_bare(&out).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 22]);
        assert_eq!(&bytes[4..12], &99u64.to_be_bytes());
        assert_eq!(&bytes[12..16], &[0, 0, 0, 7]);

        let decoded: Output = codec.unmarshal(&codec.marshal(&out).unwrap()).unwrap();
        assert_eq!(decoded, out);
        assert_eq!(decoded.amount(), 5);
    }

    #[test]
    fn stakeable_lock_in_decodes() {
        let codec = Codec::platform();
        let input = Input::StakeableLock(StakeableLockIn {
            locktime: 7,
            input: TransferInput {
                amount: 10,
                sig_indices: vec![0, 2],
            },
        });
        let decoded: Input = codec.unmarshal(&codec.marshal(&input).unwrap()).unwrap();
        assert_eq!(decoded.sig_indices(), &[0, 2]);
        assert_eq!(decoded.amount(), 10);
    }

    #[test]
    fn input_tag_in_output_position_rejected() {
        let codec = Codec::platform();
        let input = Input::Transfer(TransferInput {
            amount: 1,
            sig_indices: vec![],
        });
        let bytes = codec.marshal(&input).unwrap();
        assert!(matches!(
            codec.unmarshal::<Output>(&bytes),
            Err(CodecError::UnexpectedType { .. })
        ));
    }

    #[test]
    fn credential_layout() {
        let codec = Codec::platform();
        let cred = Credential {
            signatures: vec![Signature([1u8; 65])],
        };
        let bytes = codec.pack_bare(&cred).unwrap();
        assert_eq!(&bytes[..8], &[0, 0, 0, 9, 0, 0, 0, 1]);
        assert_eq!(bytes.len(), 8 + 65);
    }
}
