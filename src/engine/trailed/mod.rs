//! Backtrackable scalar state.
//!
//! Counters and partial sums that propagators maintain across decisions register here; the values
//! follow the same checkpoint discipline as the domains, so restoring a checkpoint restores them
//! too.

mod trailed_values;

pub use trailed_values::TrailedInt;
pub use trailed_values::TrailedValues;
