//! Linear wire codec for platform-chain values.
//!
//! Every top-level value is prefixed by a big-endian `u16` codec version.
//! Integers are fixed-width big-endian; slices carry a `u32` length and
//! strings a `u16` length. Fields whose Go type is an interface carry a
//! `u32` type ID looked up in the [`Codec`]'s registration table.

use crate::error::CodecError;

/// Current (and only) codec version.
pub const CODEC_VERSION: u16 = 0;

/// Upper bound on any single slice length accepted while decoding.
pub const MAX_SLICE_LEN: u32 = 256 * 1024;

/// Every type the platform codec registers, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    ProposalBlock,
    AbortBlock,
    CommitBlock,
    StandardBlock,
    AtomicBlock,
    TransferInput,
    MintOutput,
    TransferOutput,
    MintOperation,
    Credential,
    Input,
    OutputOwners,
    AddValidatorTx,
    AddSubnetValidatorTx,
    AddDelegatorTx,
    CreateChainTx,
    CreateSubnetTx,
    ImportTx,
    ExportTx,
    AdvanceTimeTx,
    RewardValidatorTx,
    StakeableLockIn,
    StakeableLockOut,
    RemoveSubnetValidatorTx,
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProposalBlock => "ProposalBlock",
            Self::AbortBlock => "AbortBlock",
            Self::CommitBlock => "CommitBlock",
            Self::StandardBlock => "StandardBlock",
            Self::AtomicBlock => "AtomicBlock",
            Self::TransferInput => "TransferInput",
            Self::MintOutput => "MintOutput",
            Self::TransferOutput => "TransferOutput",
            Self::MintOperation => "MintOperation",
            Self::Credential => "Credential",
            Self::Input => "Input",
            Self::OutputOwners => "OutputOwners",
            Self::AddValidatorTx => "AddValidatorTx",
            Self::AddSubnetValidatorTx => "AddSubnetValidatorTx",
            Self::AddDelegatorTx => "AddDelegatorTx",
            Self::CreateChainTx => "CreateChainTx",
            Self::CreateSubnetTx => "CreateSubnetTx",
            Self::ImportTx => "ImportTx",
            Self::ExportTx => "ExportTx",
            Self::AdvanceTimeTx => "AdvanceTimeTx",
            Self::RewardValidatorTx => "RewardValidatorTx",
            Self::StakeableLockIn => "StakeableLockIn",
            Self::StakeableLockOut => "StakeableLockOut",
            Self::RemoveSubnetValidatorTx => "RemoveSubnetValidatorTx",
        }
    }
}

/// Codec with an explicit, ordered type registration table.
///
/// The position of a kind in the table is its wire type ID. Build one with
/// [`Codec::platform`] and pass it by reference wherever bytes are produced
/// or consumed.
#[derive(Clone, Debug)]
pub struct Codec {
    version: u16,
    registrations: Vec<TypeKind>,
}

impl Codec {
    /// Codec for the platform chain.
    pub fn platform() -> Self {
        use TypeKind::*;
        Self {
            version: CODEC_VERSION,
            registrations: vec![
                // Blocks occupy the first IDs so later tags line up.
                ProposalBlock,
                AbortBlock,
                CommitBlock,
                StandardBlock,
                AtomicBlock,
                // secp256k1fx
                TransferInput,
                MintOutput,
                TransferOutput,
                MintOperation,
                Credential,
                Input,
                OutputOwners,
                // Unsigned transactions
                AddValidatorTx,
                AddSubnetValidatorTx,
                AddDelegatorTx,
                CreateChainTx,
                CreateSubnetTx,
                ImportTx,
                ExportTx,
                AdvanceTimeTx,
                RewardValidatorTx,
                // Staking locks
                StakeableLockIn,
                StakeableLockOut,
                RemoveSubnetValidatorTx,
            ],
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    /// Wire type ID of `kind`.
    pub fn type_id(&self, kind: TypeKind) -> Result<u32, CodecError> {
        self.registrations
            .iter()
            .position(|k| *k == kind)
            .map(|i| i as u32)
            .ok_or(CodecError::UnregisteredType(kind.name()))
    }

    /// Kind registered under `type_id`.
    pub fn kind(&self, type_id: u32) -> Result<TypeKind, CodecError> {
        self.registrations
            .get(type_id as usize)
            .copied()
            .ok_or(CodecError::UnknownTypeId(type_id))
    }

    /// Write the type ID of `kind`.
    pub fn pack_type(&self, kind: TypeKind, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.type_id(kind)?);
        Ok(())
    }

    /// Read a type ID and resolve it to a kind.
    pub fn unpack_type(&self, unpacker: &mut Unpacker<'_>) -> Result<TypeKind, CodecError> {
        let type_id = unpacker.unpack_u32()?;
        self.kind(type_id)
    }

    /// Read a type ID and require it to be `expected`.
    pub fn expect_type(
        &self,
        expected: TypeKind,
        unpacker: &mut Unpacker<'_>,
    ) -> Result<(), CodecError> {
        let found = self.unpack_type(unpacker)?;
        if found != expected {
            return Err(CodecError::UnexpectedType {
                expected: expected.name(),
                found: found.name(),
            });
        }
        Ok(())
    }

    /// Marshal a value with the codec version prefix.
    pub fn marshal<T: Packable + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut packer = Packer::new();
        packer.pack_u16(self.version);
        value.pack(self, &mut packer)?;
        Ok(packer.into_bytes())
    }

    /// Unmarshal a version-prefixed value, rejecting trailing bytes.
    pub fn unmarshal<T: Unpackable>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        self.unpack_version(&mut unpacker)?;
        let value = T::unpack(self, &mut unpacker)?;
        unpacker.finish()?;
        Ok(value)
    }

    /// Read and check the codec version prefix.
    pub fn unpack_version(&self, unpacker: &mut Unpacker<'_>) -> Result<(), CodecError> {
        let version = unpacker.unpack_u16()?;
        if version != self.version {
            return Err(CodecError::UnsupportedVersion(version));
        }
        Ok(())
    }

    /// Encode a value without the version prefix (used for sort keys).
    pub fn pack_bare<T: Packable + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut packer = Packer::new();
        value.pack(self, &mut packer)?;
        Ok(packer.into_bytes())
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::platform()
    }
}

/// A value with a wire encoding.
pub trait Packable {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError>;
}

/// A value decodable from its wire encoding.
pub trait Unpackable: Sized {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError>;
}

// ── Packer ──────────────────────────────────────────────────────────────

/// Append-only big-endian writer.
#[derive(Debug, Default)]
pub struct Packer {
    bytes: Vec<u8>,
}

impl Packer {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn pack_u16(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn pack_u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    pub fn pack_u64(&mut self, v: u64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    /// Raw bytes with no length prefix.
    pub fn pack_fixed(&mut self, v: &[u8]) {
        self.bytes.extend_from_slice(v);
    }

    /// `u32` length followed by the bytes.
    pub fn pack_bytes(&mut self, v: &[u8]) -> Result<(), CodecError> {
        self.pack_len(v.len())?;
        self.bytes.extend_from_slice(v);
        Ok(())
    }

    /// `u16` length followed by UTF-8 bytes.
    pub fn pack_str(&mut self, v: &str) -> Result<(), CodecError> {
        let len = u16::try_from(v.len()).map_err(|_| CodecError::LengthOverflow(v.len()))?;
        self.pack_u16(len);
        self.bytes.extend_from_slice(v.as_bytes());
        Ok(())
    }

    /// `u32` slice length.
    pub fn pack_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow(len))?;
        self.pack_u32(len);
        Ok(())
    }

    /// Length-prefixed slice of packable values.
    pub fn pack_slice<T: Packable>(&mut self, codec: &Codec, items: &[T]) -> Result<(), CodecError> {
        self.pack_len(items.len())?;
        for item in items {
            item.pack(codec, self)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// ── Unpacker ────────────────────────────────────────────────────────────

/// Cursor over encoded bytes.
#[derive(Debug)]
pub struct Unpacker<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::UnexpectedEof {
                offset: self.offset,
                needed: n,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    pub fn unpack_u16(&mut self) -> Result<u16, CodecError> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2)?);
        Ok(u16::from_be_bytes(buf))
    }

    pub fn unpack_u32(&mut self) -> Result<u32, CodecError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    pub fn unpack_u64(&mut self) -> Result<u64, CodecError> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn unpack_fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    /// `u32` slice length, bounded by [`MAX_SLICE_LEN`].
    pub fn unpack_len(&mut self) -> Result<usize, CodecError> {
        let len = self.unpack_u32()?;
        if len > MAX_SLICE_LEN {
            return Err(CodecError::LengthOverflow(len as usize));
        }
        Ok(len as usize)
    }

    pub fn unpack_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.unpack_len()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn unpack_str(&mut self) -> Result<String, CodecError> {
        let len = self.unpack_u16()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn unpack_slice<T: Unpackable>(&mut self, codec: &Codec) -> Result<Vec<T>, CodecError> {
        let len = self.unpack_len()?;
        let mut items = Vec::with_capacity(len.min(1024));
        for _ in 0..len {
            items.push(T::unpack(codec, self)?);
        }
        Ok(items)
    }

    /// Require that every byte has been consumed.
    pub fn finish(&self) -> Result<(), CodecError> {
        if self.remaining() != 0 {
            return Err(CodecError::TrailingBytes(self.remaining()));
        }
        Ok(())
    }
}

// ── Primitive impls ─────────────────────────────────────────────────────

impl Packable for u32 {
    fn pack(&self, _codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(*self);
        Ok(())
    }
}

impl Unpackable for u32 {
    fn unpack(_codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        unpacker.unpack_u32()
    }
}

impl Packable for subnet_types::Id {
    fn pack(&self, _codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes());
        Ok(())
    }
}

impl Unpackable for subnet_types::Id {
    fn unpack(_codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(unpacker.unpack_fixed::<32>()?))
    }
}

impl Packable for subnet_types::ShortId {
    fn pack(&self, _codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes());
        Ok(())
    }
}

impl Unpackable for subnet_types::ShortId {
    fn unpack(_codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(unpacker.unpack_fixed::<20>()?))
    }
}

impl Packable for subnet_types::NodeId {
    fn pack(&self, _codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes());
        Ok(())
    }
}

impl Unpackable for subnet_types::NodeId {
    fn unpack(_codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(unpacker.unpack_fixed::<20>()?))
    }
}

impl Packable for subnet_types::Signature {
    fn pack(&self, _codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_fixed(self.as_bytes());
        Ok(())
    }
}

impl Unpackable for subnet_types::Signature {
    fn unpack(_codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self(unpacker.unpack_fixed::<65>()?))
    }
}
