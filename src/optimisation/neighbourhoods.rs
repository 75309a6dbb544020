use itertools::Itertools;

use super::ConfigurationError;
use crate::engine::variables::VarRef;
use crate::engine::DomainStore;

/// A named subset of the primary variables plus the deviation variable bounding how many of them
/// a move may alter.
///
/// The deviation variable is tied to the member variables by a constraint in the model (see
/// [`HammingDistancePropagator`](crate::propagators::HammingDistancePropagator)); the controller
/// only manipulates its domain.
#[derive(Clone, Debug)]
pub struct Neighbourhood {
    pub name: String,
    /// Indices into the container's primary variables.
    pub members: Vec<usize>,
    /// One reference variable per member. During an activation the search layer pins these to
    /// the incumbent's values so the model's deviation constraint measures distance from the
    /// incumbent. May be empty for neighbourhoods without a deviation constraint.
    pub shadows: Vec<VarRef>,
    pub deviation: VarRef,
}

/// Owns the primary variables, the neighbourhoods over them, and the ordered combinations in
/// which neighbourhoods are activated together.
#[derive(Clone, Debug)]
pub struct NeighbourhoodContainer {
    primary_variables: Vec<VarRef>,
    neighbourhoods: Vec<Neighbourhood>,
    combinations: Vec<Vec<usize>>,
    enabled: Vec<bool>,
}

impl NeighbourhoodContainer {
    pub fn new(
        primary_variables: Vec<VarRef>,
        neighbourhoods: Vec<Neighbourhood>,
        combinations: Vec<Vec<usize>>,
    ) -> Result<Self, ConfigurationError> {
        if neighbourhoods.is_empty() {
            return Err(ConfigurationError::InvalidNeighbourhoods(
                "no neighbourhoods were given".into(),
            ));
        }
        if combinations.is_empty() {
            return Err(ConfigurationError::InvalidNeighbourhoods(
                "no combinations were given".into(),
            ));
        }
        for neighbourhood in &neighbourhoods {
            if neighbourhood.members.is_empty() {
                return Err(ConfigurationError::InvalidNeighbourhoods(format!(
                    "neighbourhood {} has no member variables",
                    neighbourhood.name
                )));
            }
            if let Some(&out_of_range) = neighbourhood
                .members
                .iter()
                .find(|&&member| member >= primary_variables.len())
            {
                return Err(ConfigurationError::InvalidNeighbourhoods(format!(
                    "neighbourhood {} refers to primary variable {out_of_range} which does not \
                     exist",
                    neighbourhood.name
                )));
            }
            if !neighbourhood.shadows.is_empty()
                && neighbourhood.shadows.len() != neighbourhood.members.len()
            {
                return Err(ConfigurationError::InvalidNeighbourhoods(format!(
                    "neighbourhood {} needs one shadow variable per member or none at all",
                    neighbourhood.name
                )));
            }
        }
        for combination in &combinations {
            if combination.is_empty() {
                return Err(ConfigurationError::InvalidNeighbourhoods(
                    "a combination must activate at least one neighbourhood".into(),
                ));
            }
            if let Some(&out_of_range) = combination
                .iter()
                .find(|&&index| index >= neighbourhoods.len())
            {
                return Err(ConfigurationError::InvalidNeighbourhoods(format!(
                    "a combination refers to neighbourhood {out_of_range} which does not exist"
                )));
            }
            // The neighbourhoods of one combination are activated together; their variable sets
            // must not overlap.
            let distinct_members = combination
                .iter()
                .flat_map(|&index| neighbourhoods[index].members.iter().copied())
                .unique()
                .count();
            let total_members: usize = combination
                .iter()
                .map(|&index| neighbourhoods[index].members.len())
                .sum();
            if distinct_members != total_members {
                return Err(ConfigurationError::InvalidNeighbourhoods(
                    "the neighbourhoods of a combination share variables".into(),
                ));
            }
        }

        let enabled = vec![true; combinations.len()];
        Ok(NeighbourhoodContainer {
            primary_variables,
            neighbourhoods,
            combinations,
            enabled,
        })
    }

    pub fn primary_variables(&self) -> &[VarRef] {
        &self.primary_variables
    }

    pub fn neighbourhoods(&self) -> &[Neighbourhood] {
        &self.neighbourhoods
    }

    pub fn num_combinations(&self) -> usize {
        self.combinations.len()
    }

    /// The neighbourhood indices activated by combination `index`, in activation order.
    pub fn combination(&self, index: usize) -> &[usize] {
        &self.combinations[index]
    }

    pub fn is_combination_enabled(&self, index: usize) -> bool {
        self.enabled[index]
    }

    pub fn set_combination_enabled(&mut self, index: usize, enabled: bool) {
        self.enabled[index] = enabled;
    }

    pub fn enabled_combinations(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.combinations.len()).filter(|&index| self.enabled[index])
    }

    /// The deviation variable controlling the size of moves under combination `index` (the first
    /// activated neighbourhood's).
    pub fn combination_deviation(&self, index: usize) -> &VarRef {
        &self.neighbourhoods[self.combinations[index][0]].deviation
    }

    /// Whether primary variable `variable` belongs to any neighbourhood of combination `index`.
    pub fn is_in_combination(&self, index: usize, variable: usize) -> bool {
        self.combinations[index]
            .iter()
            .any(|&nh| self.neighbourhoods[nh].members.contains(&variable))
    }

    /// The largest neighbourhood size any move can have.
    pub fn max_neighbourhood_size(&self) -> i32 {
        self.neighbourhoods
            .iter()
            .map(|neighbourhood| neighbourhood.members.len() as i32)
            .max()
            .unwrap_or(0)
    }

    /// The largest size the deviation variable of `index` still admits.
    pub fn max_size_of_combination(&self, store: &DomainStore, index: usize) -> i32 {
        self.combination_deviation(index).max(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolverCore;

    fn two_neighbourhoods(core: &mut SolverCore) -> (Vec<VarRef>, Vec<Neighbourhood>) {
        let vars: Vec<_> = (0..4).map(|_| core.new_discrete(0, 3)).collect();
        let neighbourhoods = vec![
            Neighbourhood {
                name: "left".into(),
                members: vec![0, 1],
                shadows: vec![],
                deviation: core.new_discrete(0, 2),
            },
            Neighbourhood {
                name: "right".into(),
                members: vec![2, 3],
                shadows: vec![],
                deviation: core.new_discrete(0, 2),
            },
        ];
        (vars, neighbourhoods)
    }

    #[test]
    fn a_well_formed_container_is_accepted() {
        let mut core = SolverCore::new();
        let (vars, neighbourhoods) = two_neighbourhoods(&mut core);
        let container =
            NeighbourhoodContainer::new(vars, neighbourhoods, vec![vec![0], vec![1], vec![0, 1]])
                .unwrap();

        assert_eq!(3, container.num_combinations());
        assert_eq!(2, container.max_neighbourhood_size());
        assert!(container.is_in_combination(2, 3));
        assert!(!container.is_in_combination(0, 3));
    }

    #[test]
    fn overlapping_neighbourhoods_in_one_combination_are_rejected() {
        let mut core = SolverCore::new();
        let (vars, mut neighbourhoods) = two_neighbourhoods(&mut core);
        neighbourhoods[1].members = vec![1, 2];

        let result = NeighbourhoodContainer::new(vars, neighbourhoods, vec![vec![0, 1]]);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidNeighbourhoods(_))
        ));
    }

    #[test]
    fn out_of_range_members_are_rejected() {
        let mut core = SolverCore::new();
        let (vars, mut neighbourhoods) = two_neighbourhoods(&mut core);
        neighbourhoods[0].members.push(17);

        let result = NeighbourhoodContainer::new(vars, neighbourhoods, vec![vec![0]]);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidNeighbourhoods(_))
        ));
    }
}
