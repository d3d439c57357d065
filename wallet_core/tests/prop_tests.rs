use std::collections::BTreeSet;

use proptest::prelude::*;

use subnet_transactions::{
    Codec, Output, OutputOwners, StakeableLockOut, TransferOutput, Utxo, UtxoId,
};
use subnet_types::Id;
use subnet_wallet_core::{stake, SoftKey, StakeRequest, WalletError};

const NOW: u64 = 10_000;

fn asset() -> Id {
    Id::new([1; 32])
}

/// `(tx byte, index, amount, locked)` into a UTXO owned by `key`.
fn utxo(key: &SoftKey, spec: &(u8, u32, u64, bool)) -> Utxo {
    let (tx, index, amount, locked) = *spec;
    let inner = TransferOutput {
        amount,
        owners: OutputOwners::single(key.address()),
    };
    let output = if locked {
        Output::StakeableLock(StakeableLockOut {
            locktime: NOW + 1,
            output: inner,
        })
    } else {
        Output::Transfer(inner)
    };
    Utxo {
        utxo_id: UtxoId {
            tx_id: Id::new([tx; 32]),
            output_index: index,
        },
        asset_id: asset(),
        output,
    }
}

fn request(key: &SoftKey, stake_amount: u64, fee: u64) -> StakeRequest {
    StakeRequest {
        asset_id: asset(),
        stake_amount,
        fee,
        change_address: key.address(),
        now: NOW,
    }
}

fn utxo_specs() -> impl Strategy<Value = Vec<(u8, u32, u64, bool)>> {
    prop::collection::btree_map((any::<u8>(), 0u32..4), (1u64..5_000, any::<bool>()), 0..12)
        .prop_map(|m| m.into_iter().map(|((t, i), (a, l))| (t, i, a, l)).collect())
}

proptest! {
    /// Selected value is fully accounted for: nothing created or lost.
    #[test]
    fn selection_conserves_value(
        specs in utxo_specs(),
        stake_amount in 0u64..20_000,
        fee in 0u64..500,
    ) {
        let codec = Codec::platform();
        let key = SoftKey::generate().unwrap();
        let utxos: Vec<_> = specs.iter().map(|s| utxo(&key, s)).collect();
        let unlocked: u64 = specs.iter().filter(|s| !s.3).map(|s| s.2).sum();
        let locked: u64 = specs.iter().filter(|s| s.3).map(|s| s.2).sum();
        // locked funds only stake; unlocked funds pay the fee first
        let stakeable = stake_amount.min(locked) + unlocked.saturating_sub(fee);
        let short_stake = stakeable < stake_amount;
        let short_fee = unlocked < fee;
        match stake(&codec, &key, &utxos, &request(&key, stake_amount, fee)) {
            Ok(sel) => {
                prop_assert!(!short_stake && !short_fee);
                prop_assert_eq!(sel.burned, fee);
                prop_assert_eq!(sel.staked_total(), stake_amount);
                prop_assert_eq!(
                    sel.input_total(),
                    sel.returned_total() + sel.staked_total() + fee
                );
                prop_assert_eq!(sel.inputs.len(), sel.signers.len());
            }
            Err(WalletError::InsufficientBalanceForStake { required, staked }) => {
                prop_assert!(short_stake);
                prop_assert_eq!(required, stake_amount);
                prop_assert_eq!(staked, stakeable);
            }
            Err(WalletError::InsufficientBalanceForFee { required, burned }) => {
                prop_assert!(!short_stake && short_fee);
                prop_assert_eq!(required, fee);
                prop_assert_eq!(burned, unlocked);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    /// Listing order does not change the result.
    #[test]
    fn selection_is_order_independent(
        specs in utxo_specs(),
        stake_amount in 0u64..10_000,
        fee in 0u64..200,
        rotate in any::<usize>(),
    ) {
        let codec = Codec::platform();
        let key = SoftKey::generate().unwrap();
        let a: Vec<_> = specs.iter().map(|s| utxo(&key, s)).collect();
        let mut b = a.clone();
        if !b.is_empty() {
            let k = rotate % b.len();
            b.rotate_left(k);
            b.reverse();
        }
        let req = request(&key, stake_amount, fee);
        let x = stake(&codec, &key, &a, &req).ok();
        let y = stake(&codec, &key, &b, &req).ok();
        prop_assert_eq!(x, y);
    }

    /// No UTXO is spent twice, even when the node lists it twice.
    #[test]
    fn no_double_spend(
        specs in utxo_specs(),
        stake_amount in 0u64..10_000,
        fee in 0u64..200,
    ) {
        let codec = Codec::platform();
        let key = SoftKey::generate().unwrap();
        let mut utxos: Vec<_> = specs.iter().map(|s| utxo(&key, s)).collect();
        utxos.extend(utxos.clone());
        if let Ok(sel) = stake(&codec, &key, &utxos, &request(&key, stake_amount, fee)) {
            let unique: BTreeSet<_> = sel.inputs.iter().map(|i| i.utxo_id).collect();
            prop_assert_eq!(unique.len(), sel.inputs.len());
            prop_assert!(sel.inputs.windows(2).all(|w| w[0].utxo_id < w[1].utxo_id));
        }
    }

    /// Asking for more than the wallet holds never partially succeeds.
    #[test]
    fn overdraw_is_insufficient_stake(
        specs in utxo_specs(),
        extra in 1u64..1_000,
    ) {
        let codec = Codec::platform();
        let key = SoftKey::generate().unwrap();
        let utxos: Vec<_> = specs.iter().map(|s| utxo(&key, s)).collect();
        let total: u64 = specs.iter().map(|s| s.2).sum();
        let err = stake(&codec, &key, &utxos, &request(&key, total + extra, 0)).unwrap_err();
        let is_stake_error = matches!(err, WalletError::InsufficientBalanceForStake { .. });
        prop_assert!(is_stake_error);
    }
}
