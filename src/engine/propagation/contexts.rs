use enumset::EnumSet;

use super::LocalId;
use crate::engine::notifications::DomainEvent;
use crate::engine::notifications::Watchers;
use crate::engine::trailed::TrailedInt;
use crate::engine::trailed::TrailedValues;
use crate::engine::variables::VarRef;
use crate::engine::DomainStore;
use crate::engine::EmptyDomain;

/// Context handed to a propagator while it sets itself up: trigger registration, backtrackable
/// state allocation, and read access to the root domains.
#[derive(Debug)]
pub struct InitialisationContext<'a> {
    watchers: Watchers<'a>,
    store: &'a DomainStore,
    trailed: &'a mut TrailedValues,
}

impl<'a> InitialisationContext<'a> {
    pub(crate) fn new(
        watchers: Watchers<'a>,
        store: &'a DomainStore,
        trailed: &'a mut TrailedValues,
    ) -> Self {
        InitialisationContext {
            watchers,
            store,
            trailed,
        }
    }

    pub fn register(&mut self, var: &VarRef, local_id: LocalId, events: EnumSet<DomainEvent>) {
        var.watch(&mut self.watchers, local_id, events);
    }

    pub fn register_value_removal(&mut self, var: &VarRef, local_id: LocalId, value: i32) {
        var.watch_value_removal(&mut self.watchers, local_id, value);
    }

    pub fn new_trailed_int(&mut self, initial_value: i64) -> TrailedInt {
        self.trailed.grow(initial_value)
    }

    pub fn min(&self, var: &VarRef) -> i32 {
        var.min(self.store)
    }

    pub fn max(&self, var: &VarRef) -> i32 {
        var.max(self.store)
    }

    pub fn in_domain(&self, var: &VarRef, value: i32) -> bool {
        var.in_domain(self.store, value)
    }

    pub fn is_assigned(&self, var: &VarRef) -> bool {
        var.is_assigned(self.store)
    }

    pub fn assigned_value(&self, var: &VarRef) -> Option<i32> {
        var.assigned_value(self.store)
    }
}

/// Read-and-mutate context for [`Propagator::propagate`](super::Propagator::propagate).
#[derive(Debug)]
pub struct PropagationContextMut<'a> {
    store: &'a mut DomainStore,
    trailed: &'a mut TrailedValues,
}

impl<'a> PropagationContextMut<'a> {
    pub(crate) fn new(store: &'a mut DomainStore, trailed: &'a mut TrailedValues) -> Self {
        PropagationContextMut { store, trailed }
    }

    pub fn min(&self, var: &VarRef) -> i32 {
        var.min(self.store)
    }

    pub fn max(&self, var: &VarRef) -> i32 {
        var.max(self.store)
    }

    pub fn in_domain(&self, var: &VarRef, value: i32) -> bool {
        var.in_domain(self.store, value)
    }

    pub fn dom_size(&self, var: &VarRef) -> usize {
        var.dom_size(self.store)
    }

    pub fn is_assigned(&self, var: &VarRef) -> bool {
        var.is_assigned(self.store)
    }

    pub fn assigned_value(&self, var: &VarRef) -> Option<i32> {
        var.assigned_value(self.store)
    }

    pub fn set_min(&mut self, var: &VarRef, value: i32) -> Result<(), EmptyDomain> {
        var.set_min(self.store, value)
    }

    pub fn set_max(&mut self, var: &VarRef, value: i32) -> Result<(), EmptyDomain> {
        var.set_max(self.store, value)
    }

    pub fn remove(&mut self, var: &VarRef, value: i32) -> Result<(), EmptyDomain> {
        var.remove(self.store, value)
    }

    pub fn assign(&mut self, var: &VarRef, value: i32) -> Result<(), EmptyDomain> {
        var.assign(self.store, value)
    }

    pub fn read_trailed(&self, trailed_int: TrailedInt) -> i64 {
        self.trailed.read(trailed_int)
    }

    pub fn assign_trailed(&mut self, trailed_int: TrailedInt, value: i64) {
        self.trailed.assign(trailed_int, value);
    }

    pub fn add_assign_trailed(&mut self, trailed_int: TrailedInt, addition: i64) {
        self.trailed.add_assign(trailed_int, addition);
    }
}

/// Read-only context for [`Propagator::notify`](super::Propagator::notify); backtrackable state
/// may be updated, domains may not.
#[derive(Debug)]
pub struct NotificationContext<'a> {
    store: &'a DomainStore,
    trailed: &'a mut TrailedValues,
}

impl<'a> NotificationContext<'a> {
    pub(crate) fn new(store: &'a DomainStore, trailed: &'a mut TrailedValues) -> Self {
        NotificationContext { store, trailed }
    }

    pub fn min(&self, var: &VarRef) -> i32 {
        var.min(self.store)
    }

    pub fn max(&self, var: &VarRef) -> i32 {
        var.max(self.store)
    }

    pub fn is_assigned(&self, var: &VarRef) -> bool {
        var.is_assigned(self.store)
    }

    pub fn assigned_value(&self, var: &VarRef) -> Option<i32> {
        var.assigned_value(self.store)
    }

    pub fn read_trailed(&self, trailed_int: TrailedInt) -> i64 {
        self.trailed.read(trailed_int)
    }

    pub fn assign_trailed(&mut self, trailed_int: TrailedInt, value: i64) {
        self.trailed.assign(trailed_int, value);
    }

    pub fn add_assign_trailed(&mut self, trailed_int: TrailedInt, addition: i64) {
        self.trailed.add_assign(trailed_int, addition);
    }
}
