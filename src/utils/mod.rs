//! Shared utility types.

mod busy;

pub use busy::{BusyFlag, BusyGuard};
