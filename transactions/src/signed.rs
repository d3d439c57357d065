//! Signed transactions: unsigned body plus credentials.

use subnet_crypto::{hash_transaction, sha256};
use subnet_types::Id;

use crate::codec::{Codec, Packable, Packer, Unpackable, Unpacker};
use crate::error::{CodecError, TransactionError};
use crate::fx::Credential;
use crate::UnsignedTx;

/// The hash every credential signs: sha256 of the version-prefixed
/// unsigned bytes.
pub fn unsigned_hash(codec: &Codec, unsigned: &UnsignedTx) -> Result<[u8; 32], CodecError> {
    Ok(sha256(&codec.marshal(unsigned)?))
}

/// A finalised transaction with its submitted bytes and ID.
///
/// The ID is sha256 of the signed bytes. Signatures are deterministic, so
/// rebuilding from the same unsigned transaction and keys reproduces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx {
    unsigned: UnsignedTx,
    credentials: Vec<Credential>,
    bytes: Vec<u8>,
    id: Id,
}

impl Tx {
    /// Attach credentials, checking they line up with the inputs (and the
    /// subnet authorization, if any) before encoding.
    pub fn new(
        codec: &Codec,
        unsigned: UnsignedTx,
        credentials: Vec<Credential>,
    ) -> Result<Self, TransactionError> {
        check_credentials(&unsigned, &credentials)?;
        let mut packer = Packer::new();
        packer.pack_u16(codec.version());
        unsigned.pack(codec, &mut packer)?;
        packer.pack_slice(codec, &credentials)?;
        let bytes = packer.into_bytes();
        let id = hash_transaction(&bytes);
        Ok(Self {
            unsigned,
            credentials,
            bytes,
            id,
        })
    }

    /// Decode a signed transaction, e.g. one fetched from the ledger.
    pub fn from_bytes(codec: &Codec, bytes: &[u8]) -> Result<Self, CodecError> {
        let mut unpacker = Unpacker::new(bytes);
        codec.unpack_version(&mut unpacker)?;
        let unsigned = UnsignedTx::unpack(codec, &mut unpacker)?;
        let credentials = unpacker.unpack_slice(codec)?;
        unpacker.finish()?;
        Ok(Self {
            unsigned,
            credentials,
            bytes: bytes.to_vec(),
            id: hash_transaction(bytes),
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn unsigned(&self) -> &UnsignedTx {
        &self.unsigned
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn unsigned_bytes(&self, codec: &Codec) -> Result<Vec<u8>, CodecError> {
        codec.marshal(&self.unsigned)
    }
}

/// One credential per signature slot, each with exactly as many
/// signatures as the slot's index list.
pub fn check_credentials(
    unsigned: &UnsignedTx,
    credentials: &[Credential],
) -> Result<(), TransactionError> {
    let counts = unsigned.signature_counts();
    if counts.len() != credentials.len() {
        return Err(TransactionError::CredentialCountMismatch {
            inputs: counts.len(),
            credentials: credentials.len(),
        });
    }
    for (index, (expected, credential)) in counts.iter().zip(credentials).enumerate() {
        if credential.signatures.len() != *expected {
            return Err(TransactionError::SignatureCountMismatch {
                index,
                expected: *expected,
                actual: credential.signatures.len(),
            });
        }
    }
    Ok(())
}
