//! The propagator contract and the machinery that drives it.

mod contexts;
mod local_id;
mod propagator;
mod propagator_id;
mod queue;
mod store;

pub use contexts::InitialisationContext;
pub use contexts::NotificationContext;
pub use contexts::PropagationContextMut;
pub use local_id::LocalId;
pub use propagator::EnqueueDecision;
pub use propagator::Propagator;
pub use propagator_id::PropagatorId;
pub(crate) use queue::PropagatorQueue;
pub(crate) use store::PropagatorStore;
