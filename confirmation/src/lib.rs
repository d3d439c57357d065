//! Confirmation of platform-chain operations.
//!
//! - [`poll`]: the interval loop with cancellation and deadline
//! - [`Checker`]: tx, subnet and blockchain waits built on it

pub mod cancel;
pub mod checker;
pub mod error;
pub mod poll;

pub use cancel::{CancelController, CancelToken};
pub use checker::{BlockchainWait, Checker};
pub use error::CheckerError;
pub use poll::{poll, PollContext};
