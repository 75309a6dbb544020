//! The propagators the engine itself is exercised with.
//!
//! The full constraint catalogue lives outside the core; these implementations cover the
//! propagator contract end-to-end (trigger registration, notification bookkeeping, backtrackable
//! state, wipeout signalling) and are what the search and optimisation layers are tested
//! against.

mod hamming_distance;
mod linear_equal;
mod not_equal;

pub use hamming_distance::HammingDistancePropagator;
pub use linear_equal::LinearEqualPropagator;
pub use not_equal::NotEqualPropagator;
