use proptest::prelude::*;

use subnet_transactions::avax::{outputs_sorted, sort_inputs_with, sort_outputs};
use subnet_transactions::{
    Codec, Input, Output, OutputOwners, TransferInput, TransferOutput, TransferableInput,
    TransferableOutput, Tx, UnsignedTx, UtxoId,
};
use subnet_types::{Id, ShortId};

fn output(asset: u8, amount: u64, addr: u8) -> TransferableOutput {
    TransferableOutput {
        asset_id: Id::new([asset; 32]),
        output: Output::Transfer(TransferOutput {
            amount,
            owners: OutputOwners::single(ShortId::new([addr; 20])),
        }),
    }
}

proptest! {
    /// Canonical output order does not depend on the starting order.
    #[test]
    fn output_sort_is_order_independent(
        specs in prop::collection::vec((0u8..3, 1u64..10_000, 0u8..3), 0..12),
        seed in any::<u64>(),
    ) {
        let codec = Codec::platform();
        let mut a: Vec<_> = specs.iter().map(|(s, n, o)| output(*s, *n, *o)).collect();
        let mut b = a.clone();
        // Deterministic shuffle by rotating on the seed.
        if !b.is_empty() {
            let k = (seed % b.len() as u64) as usize;
            b.rotate_left(k);
            b.reverse();
        }
        sort_outputs(&codec, &mut a).unwrap();
        sort_outputs(&codec, &mut b).unwrap();
        prop_assert!(outputs_sorted(&codec, &a).unwrap());
        prop_assert_eq!(a, b);
    }

    /// Sorting inputs keeps each payload attached to its input.
    #[test]
    fn input_sort_keeps_pairs(
        refs in prop::collection::btree_set((0u8..8, 0u32..4), 0..16),
    ) {
        let mut pairs: Vec<_> = refs
            .iter()
            .rev()
            .map(|(tx, idx)| {
                let input = TransferableInput {
                    utxo_id: UtxoId { tx_id: Id::new([*tx; 32]), output_index: *idx },
                    asset_id: Id::EMPTY,
                    input: Input::Transfer(TransferInput { amount: 1, sig_indices: vec![0] }),
                };
                (input, (*tx, *idx))
            })
            .collect();
        sort_inputs_with(&mut pairs);
        for (input, (tx, idx)) in &pairs {
            prop_assert_eq!(input.utxo_id.tx_id, Id::new([*tx; 32]));
            prop_assert_eq!(input.utxo_id.output_index, *idx);
        }
        let inputs: Vec<_> = pairs.into_iter().map(|(i, _)| i).collect();
        prop_assert!(subnet_transactions::avax::inputs_sorted_and_unique(&inputs));
    }

    /// Arbitrary bytes never panic the decoder.
    #[test]
    fn decoder_rejects_garbage_gracefully(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let codec = Codec::platform();
        let _ = codec.unmarshal::<UnsignedTx>(&bytes);
        let _ = Tx::from_bytes(&codec, &bytes);
    }
}
