use crate::containers::StorageKey;
use crate::engine::variables::VarId;
use crate::engine::variables::VarRef;
use crate::engine::DomainStore;

/// A full assignment of the base variables, snapshotted from a [`DomainStore`] in which every
/// branching variable is assigned.
///
/// The incumbent of an optimisation run is stored in this form, outside of the search tree, so it
/// survives backtracking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    values: Vec<i32>,
}

impl Solution {
    pub fn from_store(store: &DomainStore) -> Self {
        Solution {
            values: store.var_ids().map(|id| store.min(id)).collect(),
        }
    }

    /// The value of a base variable in this solution.
    pub fn base_value(&self, var: VarId) -> i32 {
        self.values[var.index()]
    }

    /// The value of an arbitrary variable handle, projected through any mappers it carries.
    pub fn value_of(&self, var: &VarRef) -> i32 {
        var.solution_value(self)
    }

    pub fn num_variables(&self) -> usize {
        self.values.len()
    }
}
