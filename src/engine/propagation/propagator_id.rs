use crate::containers::StorageKey;

/// Identifies a propagator in the [`PropagatorStore`](super::PropagatorStore).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropagatorId(pub(crate) u32);

impl StorageKey for PropagatorId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        PropagatorId(index as u32)
    }
}

impl std::fmt::Display for PropagatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}
