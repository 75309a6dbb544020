use std::rc::Rc;

use enumset::EnumSet;

use super::AnyVariable;
use super::Mapper;
use super::VarId;
use crate::basic_types::Solution;
use crate::calabash_assert_moderate;
use crate::engine::notifications::DomainDelta;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::propagation::LocalId;
use crate::engine::DomainStore;
use crate::engine::EmptyDomain;

/// The uniform variable handle: a tagged variant over the four domain varieties, constants, and
/// mapped forms, with [`VarRef::Any`] as the dynamically-dispatched escape hatch.
///
/// Handles are cheap to clone and carry no domain state of their own; all state lives in the
/// [`DomainStore`] the handle is used against. Dispatch on the hot propagation path is a `match`,
/// not a virtual call, except for the `Any` arm.
#[derive(Clone, Debug)]
pub enum VarRef {
    /// A constant standing in where a variable is expected.
    Constant(i32),
    Boolean(VarId),
    Bounds(VarId),
    SparseBounds(VarId),
    Discrete(VarId),
    /// An algebraic view of an inner handle.
    Mapped(Box<MappedVar>),
    /// A capability object for handle shapes the enum does not cover.
    Any(Rc<dyn AnyVariable>),
}

/// One mapper layered over an inner handle.
#[derive(Clone, Debug)]
pub struct MappedVar {
    pub(crate) inner: VarRef,
    pub(crate) mapper: Mapper,
}

impl VarRef {
    pub fn constant(value: i32) -> VarRef {
        VarRef::Constant(value)
    }

    pub fn any(var: Rc<dyn AnyVariable>) -> VarRef {
        VarRef::Any(var)
    }

    fn mapped(&self, mapper: Mapper) -> VarRef {
        VarRef::Mapped(Box::new(MappedVar {
            inner: self.clone(),
            mapper,
        }))
    }

    /// The handle `self + offset`.
    pub fn shifted(&self, offset: i32) -> VarRef {
        if offset == 0 {
            self.clone()
        } else {
            self.mapped(Mapper::Shift(offset))
        }
    }

    /// The handle `scale * self`; `scale` must be non-zero.
    pub fn scaled(&self, scale: i32) -> VarRef {
        match scale {
            1 => self.clone(),
            -1 => self.negated(),
            _ => self.mapped(Mapper::new_scale(scale)),
        }
    }

    /// The handle `-self`.
    pub fn negated(&self) -> VarRef {
        self.mapped(Mapper::Neg)
    }

    pub fn min(&self, store: &DomainStore) -> i32 {
        match self {
            VarRef::Constant(value) => *value,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.min(*id),
            VarRef::Mapped(m) => {
                if m.mapper.flips_order() {
                    m.mapper.map(m.inner.max(store))
                } else {
                    m.mapper.map(m.inner.min(store))
                }
            }
            VarRef::Any(a) => a.min(store),
        }
    }

    pub fn max(&self, store: &DomainStore) -> i32 {
        match self {
            VarRef::Constant(value) => *value,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.max(*id),
            VarRef::Mapped(m) => {
                if m.mapper.flips_order() {
                    m.mapper.map(m.inner.min(store))
                } else {
                    m.mapper.map(m.inner.max(store))
                }
            }
            VarRef::Any(a) => a.max(store),
        }
    }

    pub fn initial_min(&self, store: &DomainStore) -> i32 {
        match self {
            VarRef::Constant(value) => *value,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.initial_min(*id),
            VarRef::Mapped(m) => {
                if m.mapper.flips_order() {
                    m.mapper.map(m.inner.initial_max(store))
                } else {
                    m.mapper.map(m.inner.initial_min(store))
                }
            }
            VarRef::Any(a) => a.initial_min(store),
        }
    }

    pub fn initial_max(&self, store: &DomainStore) -> i32 {
        match self {
            VarRef::Constant(value) => *value,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.initial_max(*id),
            VarRef::Mapped(m) => {
                if m.mapper.flips_order() {
                    m.mapper.map(m.inner.initial_min(store))
                } else {
                    m.mapper.map(m.inner.initial_max(store))
                }
            }
            VarRef::Any(a) => a.initial_max(store),
        }
    }

    pub fn in_domain(&self, store: &DomainStore, value: i32) -> bool {
        match self {
            VarRef::Constant(c) => value == *c,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.in_domain(*id, value),
            VarRef::Mapped(m) => match m.mapper.invert_exact(value) {
                Some(inner_value) => m.inner.in_domain(store, inner_value),
                None => false,
            },
            VarRef::Any(a) => a.in_domain(store, value),
        }
    }

    pub fn dom_size(&self, store: &DomainStore) -> usize {
        match self {
            VarRef::Constant(_) => 1,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.dom_size(*id),
            VarRef::Mapped(m) => m.inner.dom_size(store),
            VarRef::Any(a) => a.dom_size(store),
        }
    }

    pub fn is_assigned(&self, store: &DomainStore) -> bool {
        self.min(store) == self.max(store)
    }

    pub fn assigned_value(&self, store: &DomainStore) -> Option<i32> {
        let min = self.min(store);
        (min == self.max(store)).then_some(min)
    }

    /// Whether this handle's domain representation can only express an interval, in which case
    /// removal is only supported at the bounds.
    pub fn is_interval_only(&self, store: &DomainStore) -> bool {
        match self {
            VarRef::Constant(_) => false,
            VarRef::Bounds(_) => true,
            VarRef::Boolean(_) | VarRef::SparseBounds(_) | VarRef::Discrete(_) => false,
            VarRef::Mapped(m) => m.inner.is_interval_only(store),
            // Capability objects do not advertise their representation; assume the conservative
            // answer so callers stay within the universally supported operations.
            VarRef::Any(_) => true,
        }
    }

    pub fn set_min(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
        match self {
            VarRef::Constant(c) => {
                if value <= *c {
                    Ok(())
                } else {
                    Err(EmptyDomain)
                }
            }
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.set_min(*id, value),
            VarRef::Mapped(m) => {
                let inner_bound = m.mapper.invert_at_least(value);
                if m.mapper.flips_order() {
                    m.inner.set_max(store, inner_bound)
                } else {
                    m.inner.set_min(store, inner_bound)
                }
            }
            VarRef::Any(a) => a.set_min(store, value),
        }
    }

    pub fn set_max(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
        match self {
            VarRef::Constant(c) => {
                if value >= *c {
                    Ok(())
                } else {
                    Err(EmptyDomain)
                }
            }
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.set_max(*id, value),
            VarRef::Mapped(m) => {
                let inner_bound = m.mapper.invert_at_most(value);
                if m.mapper.flips_order() {
                    m.inner.set_min(store, inner_bound)
                } else {
                    m.inner.set_max(store, inner_bound)
                }
            }
            VarRef::Any(a) => a.set_max(store, value),
        }
    }

    pub fn remove(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
        match self {
            VarRef::Constant(c) => {
                if value == *c {
                    Err(EmptyDomain)
                } else {
                    Ok(())
                }
            }
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.remove(*id, value),
            VarRef::Mapped(m) => match m.mapper.invert_exact(value) {
                Some(inner_value) => m.inner.remove(store, inner_value),
                None => Ok(()),
            },
            VarRef::Any(a) => a.remove(store, value),
        }
    }

    pub fn assign(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
        match self {
            VarRef::Constant(c) => {
                if value == *c {
                    Ok(())
                } else {
                    Err(EmptyDomain)
                }
            }
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.assign(*id, value),
            VarRef::Mapped(m) => match m.mapper.invert_exact(value) {
                Some(inner_value) => m.inner.assign(store, inner_value),
                None => Err(EmptyDomain),
            },
            VarRef::Any(a) => a.assign(store, value),
        }
    }

    pub fn unchecked_assign(&self, store: &mut DomainStore, value: i32) {
        match self {
            VarRef::Constant(c) => {
                calabash_assert_moderate!(value == *c);
            }
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => store.unchecked_assign(*id, value),
            VarRef::Mapped(m) => {
                let inner_value = m
                    .mapper
                    .invert_exact(value)
                    .expect("unchecked_assign of a value the mapped handle cannot attain");
                m.inner.unchecked_assign(store, inner_value);
            }
            VarRef::Any(a) => a.unchecked_assign(store, value),
        }
    }

    /// Subscribe a trigger for `events` on this handle's base variable.
    pub fn watch(
        &self,
        watchers: &mut Watchers<'_>,
        local_id: LocalId,
        events: EnumSet<DomainEvent>,
    ) {
        match self {
            VarRef::Constant(_) => {}
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => watchers.watch(*id, local_id, events),
            // The event alphabet is symmetric under the mappers: a bound move on the base is a
            // bound move in every view.
            VarRef::Mapped(m) => m.inner.watch(watchers, local_id, events),
            VarRef::Any(a) => a.watch(watchers, local_id.unpack(), events),
        }
    }

    /// Subscribe a value-removed(v) trigger; the filter value is translated into the base view.
    pub fn watch_value_removal(&self, watchers: &mut Watchers<'_>, local_id: LocalId, value: i32) {
        match self {
            VarRef::Constant(_) => {}
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => watchers.watch_value_removal(*id, local_id, value),
            VarRef::Mapped(m) => {
                if let Some(inner_value) = m.mapper.invert_exact(value) {
                    m.inner.watch_value_removal(watchers, local_id, inner_value);
                }
                // A value the view cannot attain can never be removed; nothing to watch.
            }
            VarRef::Any(a) => a.watch_value_removal(watchers, local_id.unpack(), value),
        }
    }

    /// The base variable identifier, for handles standing on a single one.
    pub fn base_var(&self) -> Option<VarId> {
        match self {
            VarRef::Constant(_) => None,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => Some(*id),
            VarRef::Mapped(m) => m.inner.base_var(),
            VarRef::Any(a) => a.base_var(),
        }
    }

    /// The mapper stack, outermost first. Capability objects present themselves as unmapped.
    pub fn mapper_stack(&self) -> Vec<Mapper> {
        match self {
            VarRef::Mapped(m) => {
                let mut stack = vec![m.mapper];
                stack.extend(m.inner.mapper_stack());
                stack
            }
            _ => Vec::new(),
        }
    }

    /// Strip one mapper layer, exposing the handle underneath. On an unmapped handle this is the
    /// identity.
    pub fn pop_one_mapper(&self) -> VarRef {
        match self {
            VarRef::Mapped(m) => m.inner.clone(),
            VarRef::Any(a) => a.pop_one_mapper(),
            _ => self.clone(),
        }
    }

    /// Project a delta produced on the base variable into this handle's view.
    pub fn domain_change(&self, delta: DomainDelta) -> DomainDelta {
        match self {
            VarRef::Mapped(m) => {
                let inner_delta = m.inner.domain_change(delta);
                let mapper = m.mapper;
                let projected = inner_delta.scaled(mapper.magnitude(), |value| mapper.map(value));
                if mapper.flips_order() {
                    projected.flipped()
                } else {
                    projected
                }
            }
            VarRef::Any(a) => a.domain_change(delta),
            _ => delta,
        }
    }

    /// The value this handle takes in a snapshotted solution.
    pub fn solution_value(&self, solution: &Solution) -> i32 {
        match self {
            VarRef::Constant(value) => *value,
            VarRef::Boolean(id)
            | VarRef::Bounds(id)
            | VarRef::SparseBounds(id)
            | VarRef::Discrete(id) => solution.base_value(*id),
            VarRef::Mapped(m) => m.mapper.map(m.inner.solution_value(solution)),
            VarRef::Any(a) => a.solution_value(solution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_negated_view_mirrors_the_domain() {
        let mut store = DomainStore::default();
        let x = VarRef::Discrete(store.new_discrete(2, 7));
        let y = x.negated();

        assert_eq!(-7, y.min(&store));
        assert_eq!(-2, y.max(&store));
        assert!(y.in_domain(&store, -5));
        assert!(!y.in_domain(&store, 5));

        assert_eq!(Ok(()), y.set_min(&mut store, -6));
        assert_eq!((2, 6), store.bounds(x.base_var().unwrap()));
    }

    #[test]
    fn a_scaled_view_only_attains_multiples() {
        let mut store = DomainStore::default();
        let x = VarRef::Discrete(store.new_discrete(0, 4));
        let y = x.scaled(3);

        assert_eq!(0, y.min(&store));
        assert_eq!(12, y.max(&store));
        assert!(y.in_domain(&store, 6));
        assert!(!y.in_domain(&store, 7));
        assert_eq!(5, y.dom_size(&store));

        // Tightening to a non-multiple rounds into the feasible side.
        assert_eq!(Ok(()), y.set_min(&mut store, 7));
        assert_eq!(9, y.min(&store));
    }

    #[test]
    fn mapper_stacks_pop_one_layer_at_a_time() {
        let mut store = DomainStore::default();
        let base = VarRef::Bounds(store.new_bounds(0, 10));
        let view = base.shifted(5).scaled(2).negated();

        assert_eq!(
            vec![Mapper::Neg, Mapper::Scale(2), Mapper::Shift(5)],
            view.mapper_stack()
        );

        let mut handle = view.clone();
        for _ in 0..3 {
            handle = handle.pop_one_mapper();
        }
        assert!(handle.mapper_stack().is_empty());
        assert_eq!(base.base_var(), handle.base_var());
        // Popping the base handle is the identity.
        assert_eq!(handle.base_var(), handle.pop_one_mapper().base_var());
    }

    #[test]
    fn assignment_through_a_view_lands_on_the_base() {
        let mut store = DomainStore::default();
        let x = VarRef::Discrete(store.new_discrete(-10, 10));
        let y = x.scaled(2).shifted(1);

        assert_eq!(Ok(()), y.assign(&mut store, 7));
        assert_eq!(Some(3), x.assigned_value(&store));
        assert_eq!(Some(7), y.assigned_value(&store));

        // 8 is not attainable by 2x + 1.
        let z = x.scaled(2).shifted(2);
        assert_eq!(Some(8), z.assigned_value(&store));
    }

    #[test]
    fn unattainable_assignment_through_a_view_wipes_out() {
        let mut store = DomainStore::default();
        let x = VarRef::Discrete(store.new_discrete(0, 10));
        let y = x.scaled(2);

        assert_eq!(Err(EmptyDomain), y.assign(&mut store, 5));
    }

    #[test]
    fn deltas_project_through_the_mapper_stack() {
        let delta = DomainDelta::bounds(1, 2);

        let mut store = DomainStore::default();
        let x = VarRef::Discrete(store.new_discrete(0, 10));
        let neg = x.negated();
        let projected = neg.domain_change(delta);
        assert_eq!(2, projected.lower_shift());
        assert_eq!(1, projected.upper_shift());

        let scaled = x.scaled(3);
        let projected = scaled.domain_change(delta);
        assert_eq!(3, projected.lower_shift());
        assert_eq!(6, projected.upper_shift());

        let removal = x.shifted(4).domain_change(DomainDelta::removal(2));
        assert_eq!(Some(6), removal.removed_value());
    }

    #[test]
    fn constants_behave_as_singleton_domains() {
        let mut store = DomainStore::default();
        let c = VarRef::constant(5);

        assert_eq!(5, c.min(&store));
        assert_eq!(5, c.max(&store));
        assert_eq!(1, c.dom_size(&store));
        assert_eq!(Ok(()), c.set_min(&mut store, 5));
        assert_eq!(Err(EmptyDomain), c.set_min(&mut store, 6));
        assert_eq!(Err(EmptyDomain), c.remove(&mut store, 5));
        assert_eq!(Ok(()), c.remove(&mut store, 4));
    }
}
