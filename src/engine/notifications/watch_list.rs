use enumset::EnumSet;

use super::DomainEvent;
use crate::containers::KeyedVec;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagatorId;
use crate::engine::variables::VarId;

/// A dynamic trigger: which propagator to notify, the variable's slot within that propagator, and
/// an optional value filter for removal subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TriggerRef {
    pub(crate) propagator: PropagatorId,
    pub(crate) local_id: LocalId,
    pub(crate) value: Option<i32>,
}

#[derive(Default, Debug)]
struct VariableWatchers {
    assign: Vec<TriggerRef>,
    bounds: Vec<TriggerRef>,
    domain: Vec<TriggerRef>,
    removal: Vec<TriggerRef>,
}

impl VariableWatchers {
    fn list_for(&mut self, event: DomainEvent) -> &mut Vec<TriggerRef> {
        match event {
            DomainEvent::Assign => &mut self.assign,
            DomainEvent::BoundsChange => &mut self.bounds,
            DomainEvent::DomainChange => &mut self.domain,
            DomainEvent::Removal => &mut self.removal,
        }
    }
}

/// The per-variable trigger lists, indexed by event kind.
#[derive(Default, Debug)]
pub(crate) struct WatchList {
    watchers: KeyedVec<VarId, VariableWatchers>,
}

impl WatchList {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(VariableWatchers::default());
    }

    pub(crate) fn watch(&mut self, trigger: TriggerRef, var: VarId, events: EnumSet<DomainEvent>) {
        for event in events {
            let list = self.watchers[var].list_for(event);
            if !list.contains(&trigger) {
                list.push(trigger);
            }
        }
    }

    /// The triggers to fire for `event` on `var`; `removed` is the removed value for removal
    /// events so value-filtered subscriptions only match their own value.
    pub(crate) fn affected(
        &self,
        var: VarId,
        event: DomainEvent,
        removed: Option<i32>,
    ) -> impl Iterator<Item = TriggerRef> + '_ {
        let watchers = &self.watchers[var];
        let list = match event {
            DomainEvent::Assign => &watchers.assign,
            DomainEvent::BoundsChange => &watchers.bounds,
            DomainEvent::DomainChange => &watchers.domain,
            DomainEvent::Removal => &watchers.removal,
        };

        list.iter()
            .filter(move |trigger| match (trigger.value, removed) {
                (Some(watched), Some(removed)) => watched == removed,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .copied()
    }
}

/// Registration handle given to a propagator while it sets up its subscriptions.
#[derive(Debug)]
pub struct Watchers<'a> {
    propagator: PropagatorId,
    watch_list: &'a mut WatchList,
}

impl<'a> Watchers<'a> {
    pub(crate) fn new(propagator: PropagatorId, watch_list: &'a mut WatchList) -> Self {
        Watchers {
            propagator,
            watch_list,
        }
    }

    pub(crate) fn watch(&mut self, var: VarId, local_id: LocalId, events: EnumSet<DomainEvent>) {
        let trigger = TriggerRef {
            propagator: self.propagator,
            local_id,
            value: None,
        };
        self.watch_list.watch(trigger, var, events);
    }

    pub(crate) fn watch_value_removal(&mut self, var: VarId, local_id: LocalId, value: i32) {
        let trigger = TriggerRef {
            propagator: self.propagator,
            local_id,
            value: Some(value),
        };
        self.watch_list
            .watch(trigger, var, EnumSet::only(DomainEvent::Removal));
    }
}
