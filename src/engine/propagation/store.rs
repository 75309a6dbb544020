use std::fmt::Debug;
use std::ops::Index;
use std::ops::IndexMut;

use super::Propagator;
use super::PropagatorId;
use crate::containers::KeyedVec;

/// A central store for the propagators of one engine.
#[derive(Default)]
pub(crate) struct PropagatorStore {
    propagators: KeyedVec<PropagatorId, Box<dyn Propagator>>,
}

impl PropagatorStore {
    pub(crate) fn push(&mut self, propagator: Box<dyn Propagator>) -> PropagatorId {
        self.propagators.push(propagator)
    }

    pub(crate) fn num_propagators(&self) -> usize {
        self.propagators.len()
    }
}

impl Index<PropagatorId> for PropagatorStore {
    type Output = dyn Propagator;

    fn index(&self, index: PropagatorId) -> &Self::Output {
        self.propagators[index].as_ref()
    }
}

impl IndexMut<PropagatorId> for PropagatorStore {
    fn index_mut(&mut self, index: PropagatorId) -> &mut Self::Output {
        self.propagators[index].as_mut()
    }
}

impl Debug for PropagatorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.propagators.iter().map(|p| p.name()).collect();
        write!(f, "PropagatorStore({names:?})")
    }
}
