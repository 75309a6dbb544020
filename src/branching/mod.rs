//! Branching: the ordered variable list the search walks and the per-variable value ordering.

mod value_selection;

pub use value_selection::ValueSelector;

use crate::engine::variables::VarRef;

/// One entry of a branching order.
#[derive(Clone, Debug)]
pub struct BranchingVariable {
    pub var: VarRef,
    pub selector: ValueSelector,
}

/// The ordered branching variables of one search. Variable selection is input order over the
/// unassigned entries; value selection is per entry.
#[derive(Clone, Debug, Default)]
pub struct SearchOrder {
    pub variables: Vec<BranchingVariable>,
}

impl SearchOrder {
    /// A branching order over `vars` with ascending value order.
    pub fn ascending(vars: impl IntoIterator<Item = VarRef>) -> Self {
        SearchOrder {
            variables: vars
                .into_iter()
                .map(|var| BranchingVariable {
                    var,
                    selector: ValueSelector::InDomainMin,
                })
                .collect(),
        }
    }

    /// A branching order over `vars` with the given value order for every entry.
    pub fn uniform(vars: impl IntoIterator<Item = VarRef>, selector: ValueSelector) -> Self {
        SearchOrder {
            variables: vars
                .into_iter()
                .map(|var| BranchingVariable { var, selector })
                .collect(),
        }
    }

    pub fn push(&mut self, var: VarRef, selector: ValueSelector) {
        self.variables.push(BranchingVariable { var, selector });
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
