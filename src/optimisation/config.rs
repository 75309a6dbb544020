use std::time::Duration;

use thiserror::Error;

/// Which outer search drives the optimisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStrategyKind {
    HillClimbing,
    LateAcceptanceHillClimbing,
    SimulatedAnnealing,
    MetaWithHillClimbing,
    MetaWithLateAcceptanceHillClimbing,
    MetaWithSimulatedAnnealing,
}

/// How the next neighbourhood combination is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionStrategyKind {
    Random,
    Ucb,
    LearningAutomaton,
    Interactive,
}

/// The tunables of the neighbourhood search controller.
///
/// Read-only during search. Validated once up front; an invalid configuration never reaches the
/// engine.
#[derive(Clone, Debug)]
pub struct NhConfig {
    /// Wall-clock budget per inner search iteration.
    pub iteration_search_time: Duration,
    pub initial_backtrack_limit: u64,
    pub backtrack_limit_multiplier: f64,
    pub backtrack_limit_increment: f64,
    pub hole_puncher_initial_backtrack_limit: u64,
    pub hole_puncher_backtrack_limit_multiplier: f64,
    /// When true the backtrack limit is the authoritative per-iteration budget; otherwise the
    /// iteration time is.
    pub backtrack_instead_of_time_limit: bool,
    pub hill_climber_initial_local_max_probability: f64,
    pub hill_climber_probability_increment_multiplier: f64,
    /// The hill climber never declares a local optimum before this many non-improving rounds.
    pub hill_climber_min_iterations_at_peak: u64,
    /// When true the backtrack limit only grows after an iteration without a solution.
    pub increase_backtrack_only_on_failure: bool,
    pub search_strategy: SearchStrategyKind,
    pub selection_strategy: SelectionStrategyKind,
    /// Learning-automaton update rates; only read when that selection strategy is configured.
    pub learning_automaton_reward_rate: f64,
    pub learning_automaton_penalty_rate: f64,
    /// Overall wall-clock budget for the whole optimisation run; unlimited when absent.
    pub total_time_limit: Option<Duration>,
}

impl Default for NhConfig {
    fn default() -> Self {
        NhConfig {
            iteration_search_time: Duration::from_millis(500),
            initial_backtrack_limit: 100,
            backtrack_limit_multiplier: 1.5,
            backtrack_limit_increment: 0.0,
            hole_puncher_initial_backtrack_limit: 100,
            hole_puncher_backtrack_limit_multiplier: 2.0,
            backtrack_instead_of_time_limit: false,
            hill_climber_initial_local_max_probability: 0.1,
            hill_climber_probability_increment_multiplier: 1.0,
            hill_climber_min_iterations_at_peak: 4,
            increase_backtrack_only_on_failure: false,
            search_strategy: SearchStrategyKind::MetaWithHillClimbing,
            selection_strategy: SelectionStrategyKind::Ucb,
            learning_automaton_reward_rate: 0.1,
            learning_automaton_penalty_rate: 0.1,
            total_time_limit: None,
        }
    }
}

impl NhConfig {
    /// Check every tunable before search begins.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self.search_strategy {
            SearchStrategyKind::HillClimbing | SearchStrategyKind::MetaWithHillClimbing => {}
            // Declared in the configuration surface but without an implementation behind them;
            // constructing them silently would be worse than refusing.
            other => return Err(ConfigurationError::UnsupportedSearchStrategy(other)),
        }

        if self.iteration_search_time.is_zero() {
            return Err(ConfigurationError::ZeroIterationTime);
        }
        for (name, value) in [
            (
                "hillClimberInitialLocalMaxProbability",
                self.hill_climber_initial_local_max_probability,
            ),
            (
                "learningAutomatonRewardRate",
                self.learning_automaton_reward_rate,
            ),
            (
                "learningAutomatonPenaltyRate",
                self.learning_automaton_penalty_rate,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::InvalidProbability { name, value });
            }
        }
        for (name, value) in [
            (
                "backtrackLimitMultiplier",
                self.backtrack_limit_multiplier,
            ),
            (
                "holePuncherBacktrackLimitMultiplier",
                self.hole_puncher_backtrack_limit_multiplier,
            ),
        ] {
            if value < 1.0 {
                return Err(ConfigurationError::ShrinkingMultiplier { name, value });
            }
        }
        if self.backtrack_limit_increment < 0.0 {
            return Err(ConfigurationError::ShrinkingMultiplier {
                name: "backtrackLimitIncrement",
                value: self.backtrack_limit_increment,
            });
        }
        if self.hill_climber_probability_increment_multiplier < 0.0 {
            return Err(ConfigurationError::ShrinkingMultiplier {
                name: "hillClimberProbabilityIncrementMultiplier",
                value: self.hill_climber_probability_increment_multiplier,
            });
        }

        Ok(())
    }
}

/// A problem with the tunables or the neighbourhood structure, surfaced before search begins.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigurationError {
    #[error(
        "search strategy {0:?} is declared but has no implementation; \
         use HillClimbing or MetaWithHillClimbing"
    )]
    UnsupportedSearchStrategy(SearchStrategyKind),
    #[error("iterationSearchTime must be positive")]
    ZeroIterationTime,
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("{name} would shrink the budget over time, got {value}")]
    ShrinkingMultiplier { name: &'static str, value: f64 },
    #[error("neighbourhood container: {0}")]
    InvalidNeighbourhoods(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_default_configuration_is_valid() {
        assert_eq!(Ok(()), NhConfig::default().validate());
    }

    #[test]
    fn declared_but_unimplemented_strategies_are_rejected() {
        for strategy in [
            SearchStrategyKind::LateAcceptanceHillClimbing,
            SearchStrategyKind::SimulatedAnnealing,
            SearchStrategyKind::MetaWithLateAcceptanceHillClimbing,
            SearchStrategyKind::MetaWithSimulatedAnnealing,
        ] {
            let config = NhConfig {
                search_strategy: strategy,
                ..Default::default()
            };
            assert_eq!(
                Err(ConfigurationError::UnsupportedSearchStrategy(strategy)),
                config.validate()
            );
        }
    }

    #[test]
    fn out_of_range_probabilities_are_rejected() {
        let config = NhConfig {
            hill_climber_initial_local_max_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn shrinking_backtrack_multipliers_are_rejected() {
        let config = NhConfig {
            backtrack_limit_multiplier: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ShrinkingMultiplier { .. })
        ));
    }
}
