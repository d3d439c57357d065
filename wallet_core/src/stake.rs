//! Coin selection for staking and fees.
//!
//! Two passes over the wallet's UTXOs of the staking asset:
//!
//! 1. UTXOs still under a stakeable lock fund the stake. The staked part
//!    keeps the lock and the original owners; any remainder comes back as
//!    change.
//! 2. Unlocked (or expired) UTXOs pay the fee first, then whatever stake is
//!    still missing, then change.
//!
//! The UTXOs are put in canonical order before either pass, so the same
//! set selects the same inputs however the node listed them.

use subnet_transactions::avax::{sort_inputs_with, sort_outputs};
use subnet_transactions::{
    Codec, Output, OutputOwners, StakeableLockOut, TransferOutput, TransferableInput,
    TransferableOutput, Utxo,
};
use subnet_types::{Id, ShortId};

use crate::error::WalletError;
use crate::keys::KeyManager;

/// What to fund.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeRequest {
    pub asset_id: Id,
    /// Zero for transactions that only pay a fee.
    pub stake_amount: u64,
    pub fee: u64,
    /// Receives change and the unlocked part of the stake.
    pub change_address: ShortId,
    /// Unix seconds used for every locktime comparison.
    pub now: u64,
}

/// Selected inputs and the outputs that balance them.
///
/// Inputs are sorted with `signers` index-aligned; both output lists are
/// in canonical order. `inputs == returned + staked + burned`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub inputs: Vec<TransferableInput>,
    pub signers: Vec<Vec<ShortId>>,
    pub returned: Vec<TransferableOutput>,
    pub staked: Vec<TransferableOutput>,
    pub burned: u64,
}

impl Selection {
    pub fn input_total(&self) -> u64 {
        self.inputs.iter().map(|i| i.input.amount()).sum()
    }

    pub fn staked_total(&self) -> u64 {
        self.staked.iter().map(|o| o.output.amount()).sum()
    }

    pub fn returned_total(&self) -> u64 {
        self.returned.iter().map(|o| o.output.amount()).sum()
    }
}

struct Tally<'a> {
    req: &'a StakeRequest,
    change: OutputOwners,
    staked: u64,
    burned: u64,
    pairs: Vec<(TransferableInput, Vec<ShortId>)>,
    returned: Vec<TransferableOutput>,
    staked_outs: Vec<TransferableOutput>,
}

impl Tally<'_> {
    fn stake_needed(&self) -> u64 {
        self.req.stake_amount.saturating_sub(self.staked)
    }

    fn fee_needed(&self) -> u64 {
        self.req.fee.saturating_sub(self.burned)
    }

    fn done(&self) -> bool {
        self.stake_needed() == 0 && self.fee_needed() == 0
    }

    fn transfer(&self, amount: u64, owners: OutputOwners) -> TransferableOutput {
        TransferableOutput {
            asset_id: self.req.asset_id,
            output: Output::Transfer(TransferOutput { amount, owners }),
        }
    }

    fn give_change(&mut self, amount: u64) {
        if amount > 0 {
            let out = self.transfer(amount, self.change.clone());
            self.returned.push(out);
        }
    }
}

/// Select inputs covering `req.stake_amount` plus `req.fee`.
///
/// Fails with [`WalletError::InsufficientBalanceForStake`] or
/// [`WalletError::InsufficientBalanceForFee`] when the spendable balance
/// falls short, including when nothing at all could be staked or burned.
pub fn stake<K: KeyManager + ?Sized>(
    codec: &Codec,
    key: &K,
    utxos: &[Utxo],
    req: &StakeRequest,
) -> Result<Selection, WalletError> {
    let mut utxos: Vec<&Utxo> = utxos
        .iter()
        .filter(|u| u.asset_id == req.asset_id)
        .collect();
    utxos.sort_by_key(|u| u.utxo_id);
    utxos.dedup_by_key(|u| u.utxo_id);

    let mut tally = Tally {
        req,
        change: OutputOwners::single(req.change_address),
        staked: 0,
        burned: 0,
        pairs: Vec::new(),
        returned: Vec::new(),
        staked_outs: Vec::new(),
    };

    for utxo in &utxos {
        if tally.stake_needed() == 0 {
            break;
        }
        let Output::StakeableLock(lock) = &utxo.output else {
            continue;
        };
        if lock.locktime <= req.now {
            continue;
        }
        let Some(spent) = key.spend_utxo(utxo, req.now) else {
            tracing::debug!(utxo = %utxo.utxo_id.tx_id, "locked UTXO not spendable by this key");
            continue;
        };
        let amount = lock.output.amount;
        let to_stake = tally.stake_needed().min(amount);
        tally.staked_outs.push(TransferableOutput {
            asset_id: req.asset_id,
            output: Output::StakeableLock(StakeableLockOut {
                locktime: lock.locktime,
                output: TransferOutput {
                    amount: to_stake,
                    owners: lock.output.owners.clone(),
                },
            }),
        });
        tally.staked += to_stake;
        tally.give_change(amount - to_stake);
        tally.pairs.push((spent.input, spent.signers));
    }

    for utxo in &utxos {
        if tally.done() {
            break;
        }
        let amount = match &utxo.output {
            Output::Transfer(out) => out.amount,
            Output::StakeableLock(lock) if lock.locktime <= req.now => lock.output.amount,
            _ => continue,
        };
        let Some(spent) = key.spend_utxo(utxo, req.now) else {
            tracing::debug!(utxo = %utxo.utxo_id.tx_id, "UTXO not spendable by this key");
            continue;
        };
        let to_burn = tally.fee_needed().min(amount);
        let to_stake = tally.stake_needed().min(amount - to_burn);
        if to_stake > 0 {
            let out = tally.transfer(to_stake, tally.change.clone());
            tally.staked_outs.push(out);
        }
        tally.burned += to_burn;
        tally.staked += to_stake;
        tally.give_change(amount - to_burn - to_stake);
        tally.pairs.push((spent.input, spent.signers));
    }

    if tally.staked < req.stake_amount {
        return Err(WalletError::InsufficientBalanceForStake {
            required: req.stake_amount,
            staked: tally.staked,
        });
    }
    if tally.burned < req.fee {
        return Err(WalletError::InsufficientBalanceForFee {
            required: req.fee,
            burned: tally.burned,
        });
    }

    let Tally {
        burned,
        mut pairs,
        mut returned,
        staked_outs: mut staked,
        ..
    } = tally;
    sort_inputs_with(&mut pairs);
    sort_outputs(codec, &mut returned)?;
    sort_outputs(codec, &mut staked)?;
    tracing::debug!(
        inputs = pairs.len(),
        staked = req.stake_amount,
        burned,
        "selected inputs"
    );
    let (inputs, signers) = pairs.into_iter().unzip();
    Ok(Selection {
        inputs,
        signers,
        returned,
        staked,
        burned,
    })
}
