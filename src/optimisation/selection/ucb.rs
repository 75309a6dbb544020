use crate::calabash_assert_simple;
use crate::optimisation::NeighbourhoodContainer;
use crate::optimisation::NeighbourhoodStats;

/// Upper-confidence-bound bandit over the combinations.
///
/// Untried arms are chosen first; afterwards the arm maximising
/// `reward_i / n_i + sqrt(2 ln N / n_i)` wins, where the reward of one play is the improvement
/// over the incumbent normalised by the initial objective range.
#[derive(Debug)]
pub(crate) struct UcbSelection {
    num_plays: Vec<u64>,
    total_reward: Vec<f64>,
    total_plays: u64,
    objective_range: f64,
}

impl UcbSelection {
    pub(crate) fn new(num_combinations: usize, objective_range: i32) -> Self {
        UcbSelection {
            num_plays: vec![0; num_combinations],
            total_reward: vec![0.0; num_combinations],
            total_plays: 0,
            objective_range: objective_range.max(1) as f64,
        }
    }

    pub(crate) fn select(&mut self, nhc: &NeighbourhoodContainer) -> usize {
        if let Some(untried) = nhc
            .enabled_combinations()
            .find(|&index| self.num_plays[index] == 0)
        {
            return untried;
        }

        let best = nhc
            .enabled_combinations()
            .map(|index| (index, self.upper_confidence_bound(index)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
        calabash_assert_simple!(best.is_some(), "no combination is enabled");
        best.unwrap()
    }

    fn upper_confidence_bound(&self, index: usize) -> f64 {
        let plays = self.num_plays[index] as f64;
        let exploitation = self.total_reward[index] / plays;
        let exploration = (2.0 * (self.total_plays as f64).ln() / plays).sqrt();
        exploitation + exploration
    }

    pub(crate) fn update_stats(
        &mut self,
        combination: usize,
        stats: &NeighbourhoodStats,
        improvement: i32,
    ) {
        self.total_plays += 1;
        self.num_plays[combination] += 1;
        if stats.solution_found {
            let reward = (improvement.max(0) as f64 / self.objective_range).min(1.0);
            self.total_reward[combination] += reward;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::SolverCore;
    use crate::optimisation::Neighbourhood;

    fn container(num: usize) -> NeighbourhoodContainer {
        let mut core = SolverCore::new();
        let vars: Vec<_> = (0..num).map(|_| core.new_discrete(0, 1)).collect();
        let neighbourhoods = (0..num)
            .map(|index| Neighbourhood {
                name: format!("nh{index}"),
                members: vec![index],
                shadows: vec![],
                deviation: core.new_discrete(0, 1),
            })
            .collect();
        NeighbourhoodContainer::new(vars, neighbourhoods, (0..num).map(|i| vec![i]).collect())
            .unwrap()
    }

    fn outcome(solution_found: bool) -> NeighbourhoodStats {
        NeighbourhoodStats {
            new_value: 0,
            time_taken: Duration::from_millis(1),
            solution_found,
            timeout_reached: false,
            highest_neighbourhood_size: 1,
        }
    }

    #[test]
    fn untried_arms_are_chosen_first() {
        let nhc = container(3);
        let mut ucb = UcbSelection::new(3, 100);

        assert_eq!(0, ucb.select(&nhc));
        ucb.update_stats(0, &outcome(false), 0);
        assert_eq!(1, ucb.select(&nhc));
        ucb.update_stats(1, &outcome(false), 0);
        assert_eq!(2, ucb.select(&nhc));
    }

    #[test]
    fn rewarding_arms_win_once_all_are_tried() {
        let nhc = container(2);
        let mut ucb = UcbSelection::new(2, 10);

        ucb.update_stats(0, &outcome(true), 10);
        ucb.update_stats(1, &outcome(false), 0);

        assert_eq!(0, ucb.select(&nhc));
    }
}
