//! Nullable infrastructure for deterministic testing.
//!
//! The node and the wall clock sit behind traits. This crate provides
//! in-memory stand-ins that:
//! - answer from state the test sets up
//! - apply issued transactions the way the ledger would
//! - never touch the network or the system clock

pub mod clock;
pub mod platform;

pub use clock::NullClock;
pub use platform::NullPlatform;
