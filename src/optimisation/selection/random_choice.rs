use crate::basic_types::Random;
use crate::calabash_assert_simple;
use crate::optimisation::NeighbourhoodContainer;

/// Uniform choice over the enabled combinations.
#[derive(Debug, Default)]
pub(crate) struct RandomSelection;

impl RandomSelection {
    pub(crate) fn select(&mut self, nhc: &NeighbourhoodContainer, rng: &mut dyn Random) -> usize {
        let enabled: Vec<usize> = nhc.enabled_combinations().collect();
        calabash_assert_simple!(!enabled.is_empty(), "no combination is enabled");
        enabled[rng.generate_usize_in_range(0..enabled.len())]
    }
}
