//! Neighbourhood-combination selection strategies.
//!
//! The strategy set is closed and chosen from the configuration, so dispatch is a tagged variant
//! at the controller boundary rather than a trait object.

mod interactive;
mod learning_automaton;
mod random_choice;
mod ucb;

pub(crate) use interactive::InteractiveSelection;
pub(crate) use learning_automaton::LearningAutomatonSelection;
pub(crate) use random_choice::RandomSelection;
pub(crate) use ucb::UcbSelection;

use super::NeighbourhoodContainer;
use super::NeighbourhoodStats;
use super::NhConfig;
use super::SelectionStrategyKind;
use crate::basic_types::Random;

/// The configured strategy for picking the combination each iteration activates.
#[derive(Debug)]
pub(crate) enum SelectionStrategy {
    Random(RandomSelection),
    Ucb(UcbSelection),
    LearningAutomaton(LearningAutomatonSelection),
    Interactive(InteractiveSelection),
}

impl SelectionStrategy {
    /// `objective_range` is the width of the initial objective domain, used to normalise
    /// improvement rewards.
    pub(crate) fn from_config(
        config: &NhConfig,
        num_combinations: usize,
        objective_range: i32,
    ) -> Self {
        match config.selection_strategy {
            SelectionStrategyKind::Random => SelectionStrategy::Random(RandomSelection),
            SelectionStrategyKind::Ucb => {
                SelectionStrategy::Ucb(UcbSelection::new(num_combinations, objective_range))
            }
            SelectionStrategyKind::LearningAutomaton => {
                SelectionStrategy::LearningAutomaton(LearningAutomatonSelection::new(
                    num_combinations,
                    config.learning_automaton_reward_rate,
                    config.learning_automaton_penalty_rate,
                ))
            }
            SelectionStrategyKind::Interactive => {
                SelectionStrategy::Interactive(InteractiveSelection)
            }
        }
    }

    /// Choose the combination to activate next among the enabled ones.
    pub(crate) fn select(&mut self, nhc: &NeighbourhoodContainer, rng: &mut dyn Random) -> usize {
        match self {
            SelectionStrategy::Random(s) => s.select(nhc, rng),
            SelectionStrategy::Ucb(s) => s.select(nhc),
            SelectionStrategy::LearningAutomaton(s) => s.select(nhc, rng),
            SelectionStrategy::Interactive(s) => s.select(nhc),
        }
    }

    /// Feed back the outcome of the activated combination; `improvement` is how far the found
    /// solution beat the incumbent (zero when it did not).
    pub(crate) fn update_stats(
        &mut self,
        combination: usize,
        stats: &NeighbourhoodStats,
        improvement: i32,
    ) {
        match self {
            SelectionStrategy::Random(_) => {}
            SelectionStrategy::Ucb(s) => s.update_stats(combination, stats, improvement),
            SelectionStrategy::LearningAutomaton(s) => s.update_stats(combination, improvement),
            SelectionStrategy::Interactive(s) => s.update_stats(combination, stats),
        }
    }
}
