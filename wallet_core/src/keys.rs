//! The key manager capability: which addresses we control, how to match
//! them against owner specs, and how to turn UTXOs into inputs.
//!
//! Two implementations exist: [`SoftKey`](crate::soft_key::SoftKey) holds
//! a private key in memory, [`HardKey`](crate::hard_key::HardKey) forwards
//! to an external signing device.

use std::collections::{BTreeSet, HashMap};

use subnet_transactions::avax::sort_inputs_with;
use subnet_transactions::{
    Credential, Input, Output, OutputOwners, StakeableLockIn, TransferInput, TransferableInput,
    Utxo,
};
use subnet_types::{ShortId, Signature};

use crate::error::WalletError;

/// Which of an owner spec's addresses will sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerMatch {
    /// Positions in the owner's address list, ascending.
    pub sig_indices: Vec<u32>,
    /// The addresses at those positions.
    pub signers: Vec<ShortId>,
}

/// One UTXO turned into an input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spent {
    pub input: TransferableInput,
    pub signers: Vec<ShortId>,
}

/// Options for [`KeyManager::spend`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpendOptions {
    /// Unix seconds used for locktime checks.
    pub now: u64,
    /// Stop once this much (plus `fee_deduct`) has been gathered.
    pub target_amount: Option<u64>,
    pub fee_deduct: u64,
}

/// Result of [`KeyManager::spend`]; inputs are sorted and `signers` is
/// index-aligned with them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Spends {
    pub total: u64,
    pub inputs: Vec<TransferableInput>,
    pub signers: Vec<Vec<ShortId>>,
}

/// A set of addresses we can produce signatures for.
pub trait KeyManager: Send + Sync {
    /// Controlled addresses. Never empty.
    fn addresses(&self) -> &[ShortId];

    /// Sign `hash` once per entry of `signers`, returning signatures in
    /// the same order.
    ///
    /// Hardware implementations block until the device answers, which may
    /// include waiting for a person to confirm on the device.
    fn sign_hash(&self, hash: &[u8; 32], signers: &[ShortId]) -> Result<Vec<Signature>, WalletError>;

    /// The first controlled address, used as the default owner and change
    /// destination.
    fn primary_address(&self) -> ShortId {
        self.addresses().first().copied().unwrap_or_default()
    }

    fn holds(&self, address: &ShortId) -> bool {
        self.addresses().contains(address)
    }

    /// Match `owners` at time `now`: the lock must have passed and we must
    /// hold at least `threshold` of its addresses. Signers are taken in
    /// address-list order.
    fn match_owners(&self, owners: &OutputOwners, now: u64) -> Option<OwnerMatch> {
        if now < owners.locktime {
            return None;
        }
        let threshold = owners.threshold as usize;
        let mut found = OwnerMatch {
            sig_indices: Vec::with_capacity(threshold),
            signers: Vec::with_capacity(threshold),
        };
        for (i, address) in owners.addresses.iter().enumerate() {
            if found.signers.len() == threshold {
                break;
            }
            if self.holds(address) {
                found.sig_indices.push(i as u32);
                found.signers.push(*address);
            }
        }
        (found.signers.len() == threshold).then_some(found)
    }

    /// Turn one UTXO into an input if we can spend it at `now`.
    ///
    /// A stakeable lock still in force yields a [`StakeableLockIn`]; an
    /// expired one is spent as a plain transfer. Mint outputs carry no
    /// value and are never spent here.
    fn spend_utxo(&self, utxo: &Utxo, now: u64) -> Option<Spent> {
        let (input, signers) = match &utxo.output {
            Output::Transfer(out) => {
                let m = self.match_owners(&out.owners, now)?;
                let input = TransferInput {
                    amount: out.amount,
                    sig_indices: m.sig_indices,
                };
                (Input::Transfer(input), m.signers)
            }
            Output::StakeableLock(lock) => {
                let m = self.match_owners(&lock.output.owners, now)?;
                let input = TransferInput {
                    amount: lock.output.amount,
                    sig_indices: m.sig_indices,
                };
                if lock.locktime > now {
                    let locked = StakeableLockIn {
                        locktime: lock.locktime,
                        input,
                    };
                    (Input::StakeableLock(locked), m.signers)
                } else {
                    (Input::Transfer(input), m.signers)
                }
            }
            Output::Mint(_) => return None,
        };
        Some(Spent {
            input: TransferableInput {
                utxo_id: utxo.utxo_id,
                asset_id: utxo.asset_id,
                input,
            },
            signers,
        })
    }

    /// Spend `utxos` in the given order, skipping ones we cannot spend.
    fn spend(&self, utxos: &[Utxo], opts: &SpendOptions) -> Spends {
        let mut total = 0u64;
        let mut pairs = Vec::new();
        for utxo in utxos {
            let Some(spent) = self.spend_utxo(utxo, opts.now) else {
                tracing::debug!(
                    tx_id = %utxo.utxo_id.tx_id,
                    index = utxo.utxo_id.output_index,
                    "cannot spend UTXO with current key"
                );
                continue;
            };
            total = total.saturating_add(spent.input.input.amount());
            pairs.push((spent.input, spent.signers));
            if let Some(target) = opts.target_amount {
                if total >= target.saturating_add(opts.fee_deduct) {
                    break;
                }
            }
        }
        sort_inputs_with(&mut pairs);
        let (inputs, signers) = pairs.into_iter().unzip();
        Spends {
            total,
            inputs,
            signers,
        }
    }

    /// Build one credential per signer set, requesting each distinct
    /// signature only once.
    fn credentials(
        &self,
        hash: &[u8; 32],
        signer_sets: &[Vec<ShortId>],
    ) -> Result<Vec<Credential>, WalletError> {
        let unique: Vec<ShortId> = signer_sets
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let signatures = self.sign_hash(hash, &unique)?;
        if signatures.len() != unique.len() {
            return Err(WalletError::Device(format!(
                "requested {} signatures, got {}",
                unique.len(),
                signatures.len()
            )));
        }
        let by_signer: HashMap<ShortId, Signature> = unique.into_iter().zip(signatures).collect();
        signer_sets
            .iter()
            .map(|set| {
                let signatures = set
                    .iter()
                    .map(|signer| {
                        by_signer
                            .get(signer)
                            .copied()
                            .ok_or(WalletError::UnknownSigner(*signer))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Credential { signatures })
            })
            .collect()
    }
}
