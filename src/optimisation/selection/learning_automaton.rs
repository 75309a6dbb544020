use crate::basic_types::Random;
use crate::calabash_assert_moderate;
use crate::optimisation::NeighbourhoodContainer;

/// Linear reward-penalty learning automaton over the combinations.
///
/// A probability vector is maintained; a success shifts mass toward the chosen arm, a failure
/// pushes it away. The update rates come from the configuration.
#[derive(Debug)]
pub(crate) struct LearningAutomatonSelection {
    probabilities: Vec<f64>,
    reward_rate: f64,
    penalty_rate: f64,
}

impl LearningAutomatonSelection {
    pub(crate) fn new(num_combinations: usize, reward_rate: f64, penalty_rate: f64) -> Self {
        LearningAutomatonSelection {
            probabilities: vec![1.0 / num_combinations as f64; num_combinations],
            reward_rate,
            penalty_rate,
        }
    }

    pub(crate) fn select(&mut self, nhc: &NeighbourhoodContainer, rng: &mut dyn Random) -> usize {
        let enabled: Vec<usize> = nhc.enabled_combinations().collect();
        calabash_assert_moderate!(!enabled.is_empty(), "no combination is enabled");

        let total: f64 = enabled.iter().map(|&index| self.probabilities[index]).sum();
        let mut spin = rng.generate_f64() * total;
        for &index in &enabled {
            spin -= self.probabilities[index];
            if spin <= 0.0 {
                return index;
            }
        }
        *enabled.last().unwrap()
    }

    pub(crate) fn update_stats(&mut self, combination: usize, improvement: i32) {
        let num_arms = self.probabilities.len();
        if improvement > 0 {
            let rate = self.reward_rate;
            for (index, probability) in self.probabilities.iter_mut().enumerate() {
                if index == combination {
                    *probability += rate * (1.0 - *probability);
                } else {
                    *probability *= 1.0 - rate;
                }
            }
        } else if num_arms > 1 {
            let rate = self.penalty_rate;
            for (index, probability) in self.probabilities.iter_mut().enumerate() {
                if index == combination {
                    *probability *= 1.0 - rate;
                } else {
                    *probability = rate / (num_arms as f64 - 1.0) + (1.0 - rate) * *probability;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_shifts_mass_toward_the_chosen_arm() {
        let mut automaton = LearningAutomatonSelection::new(2, 0.5, 0.5);

        automaton.update_stats(0, 5);

        assert!(automaton.probabilities[0] > automaton.probabilities[1]);
        let total: f64 = automaton.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn failure_shifts_mass_away_from_the_chosen_arm() {
        let mut automaton = LearningAutomatonSelection::new(2, 0.5, 0.5);

        automaton.update_stats(0, 0);

        assert!(automaton.probabilities[0] < automaton.probabilities[1]);
        let total: f64 = automaton.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
