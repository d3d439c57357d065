//! Turning an unsigned transaction into the bytes the node accepts.

use subnet_transactions::{unsigned_hash, Codec, TransactionError, Tx, UnsignedTx};
use subnet_types::ShortId;

use crate::error::WalletError;
use crate::keys::KeyManager;

/// Sign `unsigned` with one signer set per credential slot: the inputs in
/// order, then the subnet authorization for subnet-scoped kinds.
///
/// Slot counts are checked before anything is signed, so a hardware
/// device is never asked to sign a transaction that cannot be finalised.
pub fn sign_tx<K: KeyManager + ?Sized>(
    codec: &Codec,
    key: &K,
    unsigned: UnsignedTx,
    signer_sets: &[Vec<ShortId>],
) -> Result<Tx, WalletError> {
    let counts = unsigned.signature_counts();
    if counts.len() != signer_sets.len() {
        return Err(TransactionError::CredentialCountMismatch {
            inputs: counts.len(),
            credentials: signer_sets.len(),
        }
        .into());
    }
    for (index, (expected, set)) in counts.iter().zip(signer_sets).enumerate() {
        if set.len() != *expected {
            return Err(TransactionError::SignatureCountMismatch {
                index,
                expected: *expected,
                actual: set.len(),
            }
            .into());
        }
    }

    let hash = unsigned_hash(codec, &unsigned)?;
    let credentials = key.credentials(&hash, signer_sets)?;
    let tx = Tx::new(codec, unsigned, credentials)?;
    tracing::debug!(tx_id = %tx.id(), kind = tx.unsigned().kind().name(), "signed transaction");
    Ok(tx)
}
