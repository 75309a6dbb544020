use crate::basic_types::Trail;
use crate::calabash_assert_moderate;
use crate::calabash_assert_simple;
use crate::containers::KeyedVec;
use crate::engine::domains::BooleanDomain;
use crate::engine::domains::BoundsDomain;
use crate::engine::domains::DiscreteDomain;
use crate::engine::domains::DomainRep;
use crate::engine::domains::SparseBoundsDomain;
use crate::engine::domains::VarDomain;
use crate::engine::notifications::DomainDelta;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::EventSink;
use crate::engine::variables::VarId;

/// The wipeout signal: a mutation would have left a domain empty.
///
/// This is routine control flow, not an error condition; it unwinds propagation to the nearest
/// search decision, which treats the branch as dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyDomain;

/// One undo record on the trail.
///
/// A single mutation may append more than one record (removing a value at a bound both clears a
/// presence bit and moves the bound); restoration applies them in reverse order.
#[derive(Clone, Copy, Debug)]
pub(crate) enum TrailEntry {
    BoundsChanged {
        var: VarId,
        prior_min: i32,
        prior_max: i32,
    },
    ValueRemoved {
        var: VarId,
        value: i32,
    },
}

/// Owns every base variable's domain, the undo trail, and the event sink.
///
/// All mutators are all-or-nothing: they return [`EmptyDomain`] without touching anything iff the
/// result would be empty, and otherwise record the prior state on the trail and emit the events
/// the change generated. Inside a branch bounds only ever tighten; they loosen exclusively
/// through [`DomainStore::restore_to_last_checkpoint`].
#[derive(Default, Debug)]
pub struct DomainStore {
    domains: KeyedVec<VarId, VarDomain>,
    trail: Trail<TrailEntry>,
    events: EventSink,
}

impl DomainStore {
    fn grow(&mut self, initial_min: i32, initial_max: i32, rep: DomainRep) -> VarId {
        calabash_assert_simple!(
            self.trail.checkpoint_count() == 0,
            "variables can only be created at the root"
        );
        self.events.grow();
        self.domains
            .push(VarDomain::new(initial_min, initial_max, rep))
    }

    pub fn new_boolean(&mut self) -> VarId {
        self.grow(0, 1, DomainRep::Boolean(BooleanDomain::new()))
    }

    pub fn new_bounds(&mut self, min: i32, max: i32) -> VarId {
        calabash_assert_simple!(min <= max, "a variable needs a non-empty initial domain");
        self.grow(min, max, DomainRep::Bounds(BoundsDomain::new(min, max)))
    }

    pub fn new_sparse(&mut self, mut values: Vec<i32>) -> VarId {
        calabash_assert_simple!(
            !values.is_empty(),
            "a variable needs a non-empty initial domain"
        );
        values.sort_unstable();
        values.dedup();

        let min = values[0];
        let max = values[values.len() - 1];
        self.grow(
            min,
            max,
            DomainRep::SparseBounds(SparseBoundsDomain::new(values.into_boxed_slice())),
        )
    }

    pub fn new_discrete(&mut self, min: i32, max: i32) -> VarId {
        calabash_assert_simple!(min <= max, "a variable needs a non-empty initial domain");
        self.grow(min, max, DomainRep::Discrete(DiscreteDomain::new(min, max)))
    }

    pub fn num_variables(&self) -> usize {
        self.domains.len()
    }

    pub fn var_ids(&self) -> impl Iterator<Item = VarId> + '_ {
        self.domains.keys()
    }

    pub fn min(&self, var: VarId) -> i32 {
        match &self.domains[var].rep {
            DomainRep::Boolean(b) => b.min(),
            DomainRep::Bounds(b) => b.min(),
            DomainRep::SparseBounds(s) => s.min(),
            DomainRep::Discrete(d) => d.min(),
        }
    }

    pub fn max(&self, var: VarId) -> i32 {
        match &self.domains[var].rep {
            DomainRep::Boolean(b) => b.max(),
            DomainRep::Bounds(b) => b.max(),
            DomainRep::SparseBounds(s) => s.max(),
            DomainRep::Discrete(d) => d.max(),
        }
    }

    pub fn bounds(&self, var: VarId) -> (i32, i32) {
        (self.min(var), self.max(var))
    }

    pub fn in_domain(&self, var: VarId, value: i32) -> bool {
        match &self.domains[var].rep {
            DomainRep::Boolean(b) => b.in_domain(value),
            DomainRep::Bounds(b) => b.in_domain(value),
            DomainRep::SparseBounds(s) => s.in_domain(value),
            DomainRep::Discrete(d) => d.in_domain(value),
        }
    }

    pub fn dom_size(&self, var: VarId) -> usize {
        match &self.domains[var].rep {
            DomainRep::Boolean(b) => b.dom_size(),
            DomainRep::Bounds(b) => b.dom_size(),
            DomainRep::SparseBounds(s) => s.dom_size(),
            DomainRep::Discrete(d) => d.dom_size(),
        }
    }

    pub fn is_assigned(&self, var: VarId) -> bool {
        let (min, max) = self.bounds(var);
        min == max
    }

    pub fn assigned_value(&self, var: VarId) -> Option<i32> {
        let (min, max) = self.bounds(var);
        (min == max).then_some(min)
    }

    pub fn initial_min(&self, var: VarId) -> i32 {
        self.domains[var].initial_min
    }

    pub fn initial_max(&self, var: VarId) -> i32 {
        self.domains[var].initial_max
    }

    pub fn set_min(&mut self, var: VarId, value: i32) -> Result<(), EmptyDomain> {
        let (min, max) = self.bounds(var);
        if value <= min {
            return Ok(());
        }
        if value > max {
            return Err(EmptyDomain);
        }

        let new_min = match &self.domains[var].rep {
            DomainRep::Boolean(b) => b.first_at_or_above(value),
            DomainRep::Bounds(_) => value,
            DomainRep::SparseBounds(s) => s.first_at_or_above(value),
            DomainRep::Discrete(d) => d.first_at_or_above(value),
        };
        self.apply_bounds(var, new_min, max);
        Ok(())
    }

    pub fn set_max(&mut self, var: VarId, value: i32) -> Result<(), EmptyDomain> {
        let (min, max) = self.bounds(var);
        if value >= max {
            return Ok(());
        }
        if value < min {
            return Err(EmptyDomain);
        }

        let new_max = match &self.domains[var].rep {
            DomainRep::Boolean(b) => b.first_at_or_below(value),
            DomainRep::Bounds(_) => value,
            DomainRep::SparseBounds(s) => s.first_at_or_below(value),
            DomainRep::Discrete(d) => d.first_at_or_below(value),
        };
        self.apply_bounds(var, min, new_max);
        Ok(())
    }

    pub fn remove(&mut self, var: VarId, value: i32) -> Result<(), EmptyDomain> {
        if !self.in_domain(var, value) {
            return Ok(());
        }
        let (min, max) = self.bounds(var);
        if min == max {
            // `value` is the last remaining value.
            return Err(EmptyDomain);
        }

        // First phase: update the presence information (where the variety has any) and work out
        // where the bounds land. The borrow of the representation ends before the trail and event
        // bookkeeping of the second phase.
        let (new_bounds, cleared_bit) = match &mut self.domains[var].rep {
            DomainRep::Boolean(_) => {
                let other = 1 - value;
                ((other, other), false)
            }
            DomainRep::Bounds(_) => {
                // The interval cannot represent holes; the propagator contract forbids asking.
                if value == min {
                    ((value + 1, max), false)
                } else if value == max {
                    ((min, value - 1), false)
                } else {
                    panic!(
                        "contract violation: removal of interior value {value} from bounds \
                         variable {var} with domain [{min}, {max}]"
                    );
                }
            }
            DomainRep::SparseBounds(s) => {
                s.clear_value(value);
                let bounds = if value == min {
                    (s.first_at_or_above(value + 1), max)
                } else if value == max {
                    (min, s.first_at_or_below(value - 1))
                } else {
                    (min, max)
                };
                (bounds, true)
            }
            DomainRep::Discrete(d) => {
                d.clear_value(value);
                let bounds = if value == min {
                    (d.first_at_or_above(value + 1), max)
                } else if value == max {
                    (min, d.first_at_or_below(value - 1))
                } else {
                    (min, max)
                };
                (bounds, true)
            }
        };

        if cleared_bit {
            self.trail.record(TrailEntry::ValueRemoved { var, value });
        }
        self.events
            .event_occurred(var, DomainEvent::Removal, DomainDelta::removal(value));
        if new_bounds != (min, max) {
            self.apply_bounds(var, new_bounds.0, new_bounds.1);
        } else {
            self.events
                .event_occurred(var, DomainEvent::DomainChange, DomainDelta::default());
        }
        Ok(())
    }

    pub fn assign(&mut self, var: VarId, value: i32) -> Result<(), EmptyDomain> {
        if !self.in_domain(var, value) {
            return Err(EmptyDomain);
        }
        self.unchecked_assign(var, value);
        Ok(())
    }

    /// Assignment without the in-domain test; the caller guarantees legality. Used on the
    /// branching side of a decision where the value was picked from the domain.
    pub fn unchecked_assign(&mut self, var: VarId, value: i32) {
        calabash_assert_moderate!(
            self.in_domain(var, value),
            "unchecked_assign of {value} outside the domain of {var}"
        );
        let (min, max) = self.bounds(var);
        if min == value && max == value {
            return;
        }
        self.apply_bounds(var, value, value);
    }

    /// Record the prior bounds, install the new ones, and emit the generated events. The new
    /// bounds must be a strict tightening and land on in-domain values.
    fn apply_bounds(&mut self, var: VarId, new_min: i32, new_max: i32) {
        let (min, max) = self.bounds(var);
        calabash_assert_moderate!(new_min >= min && new_max <= max && (new_min, new_max) != (min, max));
        calabash_assert_moderate!(new_min <= new_max);

        self.trail.record(TrailEntry::BoundsChanged {
            var,
            prior_min: min,
            prior_max: max,
        });
        match &mut self.domains[var].rep {
            DomainRep::Boolean(b) => b.set_bounds(new_min, new_max),
            DomainRep::Bounds(b) => b.set_bounds(new_min, new_max),
            DomainRep::SparseBounds(s) => s.set_bounds(new_min, new_max),
            DomainRep::Discrete(d) => d.set_bounds(new_min, new_max),
        }

        let delta = DomainDelta::bounds(new_min - min, max - new_max);
        self.events
            .event_occurred(var, DomainEvent::BoundsChange, delta);
        self.events
            .event_occurred(var, DomainEvent::DomainChange, DomainDelta::default());
        if new_min == new_max {
            self.events
                .event_occurred(var, DomainEvent::Assign, DomainDelta::default());
        }
    }

    pub fn push_checkpoint(&mut self) {
        self.trail.push_checkpoint();
    }

    pub fn checkpoint_count(&self) -> usize {
        self.trail.checkpoint_count()
    }

    /// Undo every mutation since the last checkpoint, in reverse order. Pending events from the
    /// abandoned branch are discarded.
    pub fn restore_to_last_checkpoint(&mut self) {
        self.events.clear();
        for entry in self.trail.pop_checkpoint() {
            match entry {
                TrailEntry::BoundsChanged {
                    var,
                    prior_min,
                    prior_max,
                } => match &mut self.domains[var].rep {
                    DomainRep::Boolean(b) => b.set_bounds(prior_min, prior_max),
                    DomainRep::Bounds(b) => b.set_bounds(prior_min, prior_max),
                    DomainRep::SparseBounds(s) => s.set_bounds(prior_min, prior_max),
                    DomainRep::Discrete(d) => d.set_bounds(prior_min, prior_max),
                },
                TrailEntry::ValueRemoved { var, value } => match &mut self.domains[var].rep {
                    DomainRep::SparseBounds(s) => s.restore_value(value),
                    DomainRep::Discrete(d) => d.restore_value(value),
                    _ => unreachable!("only hole-capable varieties record value removals"),
                },
            }
        }
    }

    pub(crate) fn has_pending_events(&self) -> bool {
        self.events.has_events()
    }

    pub(crate) fn drain_events(&mut self) -> Vec<(VarId, DomainEvent, DomainDelta)> {
        self.events.drain()
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }
}
