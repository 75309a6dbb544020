use log::trace;

use crate::engine::notifications::WatchList;
use crate::engine::notifications::Watchers;
use crate::engine::propagation::EnqueueDecision;
use crate::engine::propagation::InitialisationContext;
use crate::engine::propagation::NotificationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorId;
use crate::engine::propagation::PropagatorQueue;
use crate::engine::propagation::PropagatorStore;
use crate::engine::trailed::TrailedValues;
use crate::engine::variables::VarRef;
use crate::engine::DomainStore;
use crate::engine::EmptyDomain;

/// One self-contained solver instance: the domains, the trigger lists, the propagators, and the
/// propagation queue, threaded through the API as a value instead of living in process globals.
///
/// The core is single-threaded and cooperative; there is exactly one search tree active against a
/// core at a time.
#[derive(Default, Debug)]
pub struct SolverCore {
    store: DomainStore,
    watch_list: WatchList,
    propagators: PropagatorStore,
    queue: PropagatorQueue,
    trailed: TrailedValues,
}

impl SolverCore {
    pub fn new() -> Self {
        SolverCore::default()
    }

    pub fn new_boolean(&mut self) -> VarRef {
        self.watch_list.grow();
        VarRef::Boolean(self.store.new_boolean())
    }

    pub fn new_bounds(&mut self, min: i32, max: i32) -> VarRef {
        self.watch_list.grow();
        VarRef::Bounds(self.store.new_bounds(min, max))
    }

    pub fn new_sparse(&mut self, values: Vec<i32>) -> VarRef {
        self.watch_list.grow();
        VarRef::SparseBounds(self.store.new_sparse(values))
    }

    pub fn new_discrete(&mut self, min: i32, max: i32) -> VarRef {
        self.watch_list.grow();
        VarRef::Discrete(self.store.new_discrete(min, max))
    }

    /// Add a propagator: it registers its triggers, and is queued for an initial propagation run
    /// on the next call to [`SolverCore::propagate`].
    pub fn add_propagator(&mut self, propagator: impl Propagator + 'static) -> PropagatorId {
        let id = self.propagators.push(Box::new(propagator));
        let mut context = InitialisationContext::new(
            Watchers::new(id, &mut self.watch_list),
            &self.store,
            &mut self.trailed,
        );
        self.propagators[id].initialise(&mut context);
        self.queue.enqueue(id);
        id
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.num_propagators()
    }

    pub fn store(&self) -> &DomainStore {
        &self.store
    }

    /// Mutable access to the domains, for model setup and for the search layers; propagators go
    /// through their contexts instead.
    pub fn store_mut(&mut self) -> &mut DomainStore {
        &mut self.store
    }

    /// Run propagation to fixpoint: fire the triggers for all pending events, drain the queue,
    /// and repeat until both are empty.
    ///
    /// A wipeout anywhere unwinds the round: the queue and pending events are dropped and the
    /// dead branch is reported to the caller.
    pub fn propagate(&mut self) -> Result<(), EmptyDomain> {
        loop {
            while self.store.has_pending_events() {
                let events = self.store.drain_events();
                for (var, event, delta) in events {
                    for trigger in self.watch_list.affected(var, event, delta.removed_value()) {
                        let decision = self.propagators[trigger.propagator].notify(
                            NotificationContext::new(&self.store, &mut self.trailed),
                            trigger.local_id,
                            event,
                            delta,
                        );
                        if decision == EnqueueDecision::Enqueue {
                            self.queue.enqueue(trigger.propagator);
                        }
                    }
                }
            }

            let Some(propagator_id) = self.queue.pop() else {
                return Ok(());
            };

            let status = self.propagators[propagator_id]
                .propagate(PropagationContextMut::new(&mut self.store, &mut self.trailed));
            if status.is_err() {
                trace!(
                    "wipeout in propagator {} ({})",
                    propagator_id,
                    self.propagators[propagator_id].name()
                );
                self.queue.clear();
                self.store.clear_events();
                return Err(EmptyDomain);
            }
        }
    }

    pub fn push_checkpoint(&mut self) {
        self.store.push_checkpoint();
        self.trailed.push_checkpoint();
    }

    /// Restore the domains and all backtrackable state to the last checkpoint. Pending events and
    /// queued propagators of the abandoned branch are dropped.
    pub fn restore_to_last_checkpoint(&mut self) {
        self.queue.clear();
        self.store.restore_to_last_checkpoint();
        self.trailed.restore_to_last_checkpoint();
    }

    pub fn checkpoint_count(&self) -> usize {
        self.store.checkpoint_count()
    }

    /// Unwind every checkpoint above `target`.
    pub fn rewind_to_checkpoint(&mut self, target: usize) {
        while self.checkpoint_count() > target {
            self.restore_to_last_checkpoint();
        }
    }
}
