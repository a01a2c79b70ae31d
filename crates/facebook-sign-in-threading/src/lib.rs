#![doc = include_str!("../README.md")]

mod attempt;
mod slot;

pub use attempt::{AttemptCounter, AttemptToken};
pub use slot::{PendingResultSlot, PutError, SlotError};
pub use tokio_util::sync::CancellationToken;
