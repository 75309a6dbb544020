use log::debug;
use log::info;

use super::hill_climber::HillClimber;
use super::incrementer::ExponentialIncrementer;
use super::runner::Incumbent;
use super::runner::NhContext;
use super::NeighbourhoodStats;
use super::SearchParams;

/// What one hole-punching round achieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HolePunchOutcome {
    Improved,
    NoImprovement,
    /// The random-restart fallback proved nothing better exists (or was cancelled).
    SpaceExhausted,
}

/// The hole puncher: wraps the hill climber and escapes its local optima by forcing
/// progressively larger deviations from the incumbent.
pub(crate) struct MetaSearch {
    climber: HillClimber,
    min_neighbourhood_size: i32,
    neighbourhood_size_offset: i32,
    backtrack_limit: ExponentialIncrementer,
    pub(crate) best: Incumbent,
}

impl MetaSearch {
    pub(crate) fn new(
        climber: HillClimber,
        initial: Incumbent,
        initial_backtrack_limit: u64,
        backtrack_limit_multiplier: f64,
    ) -> Self {
        MetaSearch {
            climber,
            min_neighbourhood_size: 1,
            neighbourhood_size_offset: 0,
            // The hole puncher's own incrementer carries no additive component.
            backtrack_limit: ExponentialIncrementer::new(
                initial_backtrack_limit,
                backtrack_limit_multiplier,
                0.0,
            ),
            best: initial,
        }
    }

    pub(crate) fn run(&mut self, ctx: &mut NhContext<'_>, initial: Incumbent) {
        self.climber.run(ctx, initial);
        self.best = self.climber.best.clone();
        self.reset_neighbourhood_size();

        while !ctx.termination.should_stop() {
            if self.punch_hole(ctx) == HolePunchOutcome::SpaceExhausted {
                return;
            }
        }
    }

    /// One round of the hole puncher: explore the combinations that admit the current hole size,
    /// re-climb from anything strictly better, and grow the hole when nothing escaped.
    pub(crate) fn punch_hole(&mut self, ctx: &mut NhContext<'_>) -> HolePunchOutcome {
        let available = self.find_active_combinations(ctx);
        if available.is_empty() {
            // No deviation domain admits any hole size; diversify from scratch.
            match ctx.random_climb(&self.best) {
                Some(better) => {
                    ctx.tighten_objective_bound(better.value);
                    self.best = better;
                    self.reset_neighbourhood_size();
                    return HolePunchOutcome::Improved;
                }
                None => {
                    // Either cancelled or the restart search exhausted the space: the incumbent
                    // is optimal.
                    info!("random restart exhausted the search space");
                    return HolePunchOutcome::SpaceExhausted;
                }
            }
        }

        for combination in available {
            if ctx.termination.should_stop() {
                return HolePunchOutcome::NoImprovement;
            }

            let (stats, solution) = self.run_exploration(ctx, combination);
            let Some(start) = solution.filter(|_| stats.solution_found) else {
                continue;
            };

            // The exploratory find beats the incumbent; climb from there.
            debug!(
                "exploration at size {} found {}, re-entering the climber",
                self.current_neighbourhood_size(),
                start.value
            );
            self.climber.run(ctx, start);
            if self.climber.best.value > self.best.value {
                self.best = self.climber.best.clone();
                self.reset_neighbourhood_size();
                return HolePunchOutcome::Improved;
            }
        }

        // The hole was not deep enough to escape the basin.
        self.min_neighbourhood_size *= 2;
        HolePunchOutcome::NoImprovement
    }

    fn run_exploration(
        &mut self,
        ctx: &mut NhContext<'_>,
        combination: usize,
    ) -> (NeighbourhoodStats, Option<Incumbent>) {
        ctx.stats
            .start_exploration(self.current_neighbourhood_size());

        let params = SearchParams {
            combination,
            time_limit: ctx.config.iteration_search_time,
            backtrack_limit: self.backtrack_limit.value(),
            backtrack_instead_of_time_limit: ctx.config.backtrack_instead_of_time_limit,
            neighbourhood_size: self.current_neighbourhood_size(),
            exploration: true,
        };
        let (stats, solution) = ctx.search_neighbourhoods(&params, &self.best, true);
        ctx.stats
            .report_iteration(ctx.nhc.combination(combination), &stats);
        if !stats.solution_found {
            self.backtrack_limit.increase();
        }
        (stats, solution)
    }

    fn reset_neighbourhood_size(&mut self) {
        self.min_neighbourhood_size = 1;
        self.neighbourhood_size_offset = 0;
    }

    fn current_neighbourhood_size(&self) -> i32 {
        self.min_neighbourhood_size + self.neighbourhood_size_offset
    }

    /// The enabled combinations whose deviation domain admits the current hole size, searching
    /// upward through the sizes while none does. The result comes back in random order.
    fn find_active_combinations(&mut self, ctx: &mut NhContext<'_>) -> Vec<usize> {
        let max_size = ctx.nhc.max_neighbourhood_size();
        let mut active: Vec<usize> = Vec::new();
        while self.current_neighbourhood_size() <= max_size {
            active = ctx
                .nhc
                .enabled_combinations()
                .filter(|&index| {
                    ctx.nhc
                        .combination_deviation(index)
                        .in_domain(ctx.core.store(), self.current_neighbourhood_size())
                })
                .collect();
            if !active.is_empty() {
                break;
            }
            self.neighbourhood_size_offset += 1;
        }

        ctx.rng.shuffle_usizes(&mut active);
        active
    }

    #[cfg(test)]
    pub(crate) fn min_neighbourhood_size(&self) -> i32 {
        self.min_neighbourhood_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Solution;
    use crate::basic_types::TestRandom;
    use crate::engine::termination::Indefinite;
    use crate::optimisation::test_model::two_block_sum;
    use crate::optimisation::NeighbourhoodSearchStats;
    use crate::optimisation::NhConfig;
    use crate::optimisation::SelectionStrategy;
    use crate::optimisation::SelectionStrategyKind;

    #[test]
    fn failed_sweeps_double_the_hole_size() {
        let mut model = two_block_sum();
        let _ = model.core.propagate();
        // Drive the model to its optimum so every exploration must come up empty.
        let _ = model.objective.set_min(model.core.store_mut(), 12);
        let _ = model.core.propagate();
        let incumbent = Incumbent {
            solution: Solution::from_store(model.core.store()),
            value: 12,
        };

        let config = NhConfig {
            selection_strategy: SelectionStrategyKind::Random,
            ..Default::default()
        };
        let selection = SelectionStrategy::from_config(&config, model.nhc.num_combinations(), 12);
        let mut meta = MetaSearch::new(
            HillClimber::new(selection, incumbent.clone()),
            incumbent.clone(),
            config.hole_puncher_initial_backtrack_limit,
            config.hole_puncher_backtrack_limit_multiplier,
        );

        let mut stats = NeighbourhoodSearchStats::new(2, (0, 12), 2);
        // One shuffle draw per sweep over the two active combinations.
        let mut rng = TestRandom {
            usizes: vec![0, 0],
            ..Default::default()
        };
        let mut termination = Indefinite;
        let mut ctx = NhContext {
            core: &mut model.core,
            nhc: &model.nhc,
            objective: &model.objective,
            base_order: &model.base_order,
            config: &config,
            rng: &mut rng,
            termination: &mut termination,
            stats: &mut stats,
        };

        assert_eq!(1, meta.min_neighbourhood_size());

        // Both combinations admit size 1; both explorations fail, so the hole doubles.
        assert_eq!(HolePunchOutcome::NoImprovement, meta.punch_hole(&mut ctx));
        assert_eq!(2, meta.min_neighbourhood_size());

        // Size 2 fails the same way.
        assert_eq!(HolePunchOutcome::NoImprovement, meta.punch_hole(&mut ctx));
        assert_eq!(4, meta.min_neighbourhood_size());

        // No deviation domain admits size 4, and the random restart proves the incumbent
        // optimal.
        assert_eq!(HolePunchOutcome::SpaceExhausted, meta.punch_hole(&mut ctx));
        assert_eq!(12, meta.best.value);
    }
}
