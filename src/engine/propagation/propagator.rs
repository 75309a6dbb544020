use super::contexts::InitialisationContext;
use super::contexts::NotificationContext;
use super::contexts::PropagationContextMut;
use super::LocalId;
use crate::engine::notifications::DomainDelta;
use crate::engine::notifications::DomainEvent;
use crate::engine::EmptyDomain;

/// The propagator contract.
///
/// A constraint registers its triggers once during [`Propagator::initialise`] and is afterwards
/// driven entirely by the engine: every event matching one of its triggers leads to a
/// [`Propagator::notify`] call, and an enqueued propagator eventually gets
/// [`Propagator::propagate`] invoked to restore its consistency level.
///
/// A propagator may only mutate variables it subscribed to; violating this is not detected cheaply
/// but breaks the fixpoint reasoning of the engine.
pub trait Propagator {
    /// A convenience name used in logging and diagnostics.
    fn name(&self) -> &str;

    /// Called once when the propagator is added to the engine. This is where triggers are
    /// registered and backtrackable state is allocated.
    fn initialise(&mut self, context: &mut InitialisationContext<'_>);

    /// Tighten variable domains as far as this propagator's consistency level requires.
    ///
    /// Returning [`EmptyDomain`] signals a wipeout; the engine unwinds the current round and
    /// reports a dead branch. Propagators are not required to reach their own fixpoint in a
    /// single call; the engine re-invokes them while their triggers keep firing.
    fn propagate(&mut self, context: PropagationContextMut<'_>) -> Result<(), EmptyDomain>;

    /// Called for every fired trigger; decides whether the propagator needs a propagation run.
    ///
    /// Intended for cheap incremental bookkeeping only; expensive work belongs in
    /// [`Propagator::propagate`].
    fn notify(
        &mut self,
        _context: NotificationContext<'_>,
        _local_id: LocalId,
        _event: DomainEvent,
        _delta: DomainDelta,
    ) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }
}

/// Indicator of what to do when a propagator is notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}
