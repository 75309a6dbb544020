use std::fmt::Debug;

use enumset::EnumSet;

use super::VarId;
use super::VarRef;
use crate::basic_types::Solution;
use crate::engine::notifications::DomainDelta;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::DomainStore;
use crate::engine::EmptyDomain;

/// The dynamically-dispatched fallback behind [`VarRef::Any`].
///
/// Covers handle shapes the tagged variant does not enumerate. Implementations typically wrap one
/// or more inner [`VarRef`]s and delegate, applying their own transformation; the enumerated
/// varieties and mappers stay monomorphised and never pay for this indirection.
pub trait AnyVariable: Debug {
    fn min(&self, store: &DomainStore) -> i32;
    fn max(&self, store: &DomainStore) -> i32;
    fn initial_min(&self, store: &DomainStore) -> i32;
    fn initial_max(&self, store: &DomainStore) -> i32;
    fn in_domain(&self, store: &DomainStore, value: i32) -> bool;
    fn dom_size(&self, store: &DomainStore) -> usize;

    fn set_min(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain>;
    fn set_max(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain>;
    fn remove(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain>;
    fn assign(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain>;
    fn unchecked_assign(&self, store: &mut DomainStore, value: i32);

    fn watch(&self, watchers: &mut Watchers<'_>, local_id: u32, events: EnumSet<DomainEvent>);
    fn watch_value_removal(&self, watchers: &mut Watchers<'_>, local_id: u32, value: i32);

    /// The base variable this capability object ultimately stands on, when there is a single one.
    fn base_var(&self) -> Option<VarId>;

    /// Strip one layer of the handle; a capability object with no layers returns itself as a
    /// fresh [`VarRef::Any`].
    fn pop_one_mapper(&self) -> VarRef;

    /// Project a delta produced on the base variable into this handle's view.
    fn domain_change(&self, delta: DomainDelta) -> DomainDelta;

    fn solution_value(&self, solution: &Solution) -> i32;
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    /// A capability object the tagged variant does not enumerate: a clamped window onto an inner
    /// handle which refuses values outside `[low, high]`.
    #[derive(Debug)]
    struct WindowedVar {
        inner: VarRef,
        low: i32,
        high: i32,
    }

    impl AnyVariable for WindowedVar {
        fn min(&self, store: &DomainStore) -> i32 {
            self.inner.min(store).max(self.low)
        }

        fn max(&self, store: &DomainStore) -> i32 {
            self.inner.max(store).min(self.high)
        }

        fn initial_min(&self, store: &DomainStore) -> i32 {
            self.inner.initial_min(store).max(self.low)
        }

        fn initial_max(&self, store: &DomainStore) -> i32 {
            self.inner.initial_max(store).min(self.high)
        }

        fn in_domain(&self, store: &DomainStore, value: i32) -> bool {
            value >= self.low && value <= self.high && self.inner.in_domain(store, value)
        }

        fn dom_size(&self, store: &DomainStore) -> usize {
            (self.min(store)..=self.max(store))
                .filter(|&value| self.in_domain(store, value))
                .count()
        }

        fn set_min(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
            if value > self.high {
                return Err(EmptyDomain);
            }
            self.inner.set_min(store, value.max(self.low))
        }

        fn set_max(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
            if value < self.low {
                return Err(EmptyDomain);
            }
            self.inner.set_max(store, value.min(self.high))
        }

        fn remove(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
            if !self.in_domain(store, value) {
                return Ok(());
            }
            self.inner.remove(store, value)
        }

        fn assign(&self, store: &mut DomainStore, value: i32) -> Result<(), EmptyDomain> {
            if !self.in_domain(store, value) {
                return Err(EmptyDomain);
            }
            self.inner.assign(store, value)
        }

        fn unchecked_assign(&self, store: &mut DomainStore, value: i32) {
            self.inner.unchecked_assign(store, value);
        }

        fn watch(&self, watchers: &mut Watchers<'_>, local_id: u32, events: EnumSet<DomainEvent>) {
            self.inner
                .watch(watchers, crate::engine::propagation::LocalId::from(local_id), events);
        }

        fn watch_value_removal(&self, watchers: &mut Watchers<'_>, local_id: u32, value: i32) {
            self.inner.watch_value_removal(
                watchers,
                crate::engine::propagation::LocalId::from(local_id),
                value,
            );
        }

        fn base_var(&self) -> Option<VarId> {
            self.inner.base_var()
        }

        fn pop_one_mapper(&self) -> VarRef {
            self.inner.clone()
        }

        fn domain_change(&self, delta: DomainDelta) -> DomainDelta {
            self.inner.domain_change(delta)
        }

        fn solution_value(&self, solution: &crate::basic_types::Solution) -> i32 {
            self.inner.solution_value(solution)
        }
    }

    #[test]
    fn a_capability_object_behaves_like_any_other_handle() {
        let mut store = DomainStore::default();
        let base = VarRef::Discrete(store.new_discrete(0, 10));
        let window = VarRef::any(Rc::new(WindowedVar {
            inner: base.clone(),
            low: 2,
            high: 7,
        }));

        assert_eq!(2, window.min(&store));
        assert_eq!(7, window.max(&store));
        assert!(!window.in_domain(&store, 8));
        assert_eq!(6, window.dom_size(&store));

        assert_eq!(Ok(()), window.set_min(&mut store, 1));
        assert_eq!(2, base.min(&store));
        assert_eq!(Err(EmptyDomain), window.set_min(&mut store, 8));

        assert_eq!(Ok(()), window.assign(&mut store, 5));
        assert_eq!(Some(5), base.assigned_value(&store));

        // Popping a layer off the capability object exposes the wrapped handle.
        assert_eq!(base.base_var(), window.pop_one_mapper().base_var());
    }
}
