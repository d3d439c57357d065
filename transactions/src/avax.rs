//! UTXOs, transferable inputs/outputs, the shared base transaction and
//! canonical ordering.

use subnet_types::Id;

use crate::codec::{Codec, Packable, Packer, Unpackable, Unpacker};
use crate::error::CodecError;
use crate::fx::{Input, Output};

/// Reference to an output of a previous transaction.
///
/// Field order gives the canonical input order: tx ID bytes, then index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtxoId {
    pub tx_id: Id,
    pub output_index: u32,
}

impl Packable for UtxoId {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.tx_id.pack(codec, packer)?;
        packer.pack_u32(self.output_index);
        Ok(())
    }
}

impl Unpackable for UtxoId {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            tx_id: Id::unpack(codec, unpacker)?,
            output_index: unpacker.unpack_u32()?,
        })
    }
}

/// An unspent output as observed on the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Utxo {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub output: Output,
}

impl Utxo {
    /// Decode the version-prefixed bytes returned by the UTXO RPC.
    pub fn from_bytes(codec: &Codec, bytes: &[u8]) -> Result<Self, CodecError> {
        codec.unmarshal(bytes)
    }
}

impl Packable for Utxo {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.utxo_id.pack(codec, packer)?;
        self.asset_id.pack(codec, packer)?;
        self.output.pack(codec, packer)
    }
}

impl Unpackable for Utxo {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            utxo_id: UtxoId::unpack(codec, unpacker)?,
            asset_id: Id::unpack(codec, unpacker)?,
            output: Output::unpack(codec, unpacker)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferableOutput {
    pub asset_id: Id,
    pub output: Output,
}

impl TransferableOutput {
    /// Canonical sort key: asset bytes followed by the encoded output.
    pub fn sort_key(&self, codec: &Codec) -> Result<Vec<u8>, CodecError> {
        let mut key = self.asset_id.as_bytes().to_vec();
        key.extend(codec.pack_bare(&self.output)?);
        Ok(key)
    }
}

impl Packable for TransferableOutput {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.asset_id.pack(codec, packer)?;
        self.output.pack(codec, packer)
    }
}

impl Unpackable for TransferableOutput {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            asset_id: Id::unpack(codec, unpacker)?,
            output: Output::unpack(codec, unpacker)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransferableInput {
    pub utxo_id: UtxoId,
    pub asset_id: Id,
    pub input: Input,
}

impl Packable for TransferableInput {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        self.utxo_id.pack(codec, packer)?;
        self.asset_id.pack(codec, packer)?;
        self.input.pack(codec, packer)
    }
}

impl Unpackable for TransferableInput {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            utxo_id: UtxoId::unpack(codec, unpacker)?,
            asset_id: Id::unpack(codec, unpacker)?,
            input: Input::unpack(codec, unpacker)?,
        })
    }
}

/// Fields shared by every platform transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BaseTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub outputs: Vec<TransferableOutput>,
    pub inputs: Vec<TransferableInput>,
    pub memo: Vec<u8>,
}

impl Packable for BaseTx {
    fn pack(&self, codec: &Codec, packer: &mut Packer) -> Result<(), CodecError> {
        packer.pack_u32(self.network_id);
        self.blockchain_id.pack(codec, packer)?;
        packer.pack_slice(codec, &self.outputs)?;
        packer.pack_slice(codec, &self.inputs)?;
        packer.pack_bytes(&self.memo)
    }
}

impl Unpackable for BaseTx {
    fn unpack(codec: &Codec, unpacker: &mut Unpacker<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            network_id: unpacker.unpack_u32()?,
            blockchain_id: Id::unpack(codec, unpacker)?,
            outputs: unpacker.unpack_slice(codec)?,
            inputs: unpacker.unpack_slice(codec)?,
            memo: unpacker.unpack_bytes()?,
        })
    }
}

// ── Canonical ordering ──────────────────────────────────────────────────

/// Sort outputs by `(asset, encoded output)`.
pub fn sort_outputs(codec: &Codec, outputs: &mut Vec<TransferableOutput>) -> Result<(), CodecError> {
    let mut keyed = outputs
        .drain(..)
        .map(|out| Ok((out.sort_key(codec)?, out)))
        .collect::<Result<Vec<_>, CodecError>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    outputs.extend(keyed.into_iter().map(|(_, out)| out));
    Ok(())
}

/// Whether outputs are already in canonical order.
pub fn outputs_sorted(codec: &Codec, outputs: &[TransferableOutput]) -> Result<bool, CodecError> {
    let keys = outputs
        .iter()
        .map(|out| out.sort_key(codec))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(keys.windows(2).all(|w| w[0] <= w[1]))
}

/// Sort inputs by UTXO ID, carrying a parallel payload (the signer set)
/// along so the two stay index-aligned.
pub fn sort_inputs_with<S>(pairs: &mut [(TransferableInput, S)]) {
    pairs.sort_by(|a, b| a.0.utxo_id.cmp(&b.0.utxo_id));
}

/// Whether inputs are strictly ascending by UTXO ID (sorted, no duplicates).
pub fn inputs_sorted_and_unique(inputs: &[TransferableInput]) -> bool {
    inputs.windows(2).all(|w| w[0].utxo_id < w[1].utxo_id)
}
