//! Per-operation options.

use subnet_transactions::REWARD_SHARES_DENOMINATOR;
use subnet_types::{Id, ShortId, Timestamp};

/// Options for operations whose only choice is whether to wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollOptions {
    /// Wait for the transaction to commit before returning.
    pub poll: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self { poll: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateSubnetOptions {
    /// Build and sign, but return the predicted ID without issuing.
    pub dry_run: bool,
    pub poll: bool,
}

impl Default for CreateSubnetOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            poll: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddValidatorOptions {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Defaults to 2000 AVAX on mainnet and 1 AVAX elsewhere.
    pub stake_amount: Option<u64>,
    /// Defaults to the key's first address.
    pub reward_address: Option<ShortId>,
    /// Delegation fee, parts per million.
    pub reward_shares: u32,
    /// Defaults to the key's first address.
    pub change_address: Option<ShortId>,
    pub poll: bool,
}

impl AddValidatorOptions {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end,
            stake_amount: None,
            reward_address: None,
            reward_shares: DEFAULT_REWARD_SHARES,
            change_address: None,
            poll: true,
        }
    }
}

/// 2% of delegator rewards.
pub const DEFAULT_REWARD_SHARES: u32 = REWARD_SHARES_DENOMINATOR / 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddSubnetValidatorOptions {
    pub start: Timestamp,
    pub end: Timestamp,
    pub weight: u64,
    pub poll: bool,
}

impl AddSubnetValidatorOptions {
    pub fn new(start: Timestamp, end: Timestamp, weight: u64) -> Self {
        Self {
            start,
            end,
            weight,
            poll: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateBlockchainOptions {
    pub name: String,
    pub genesis: Vec<u8>,
    /// Feature extensions the VM uses; usually empty.
    pub fx_ids: Vec<Id>,
    pub poll: bool,
}

impl CreateBlockchainOptions {
    pub fn new(name: impl Into<String>, genesis: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            genesis,
            fx_ids: Vec::new(),
            poll: true,
        }
    }
}
