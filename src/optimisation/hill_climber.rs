use log::debug;

use super::incrementer::ExponentialIncrementer;
use super::runner::Incumbent;
use super::runner::NhContext;
use super::selection::SelectionStrategy;
use super::NeighbourhoodStats;
use super::SearchParams;

/// The inner hill climber: repeatedly activates a combination chosen by the selection strategy,
/// moves the incumbent on improvement, and declares a local optimum probabilistically after
/// enough non-improving rounds.
pub(crate) struct HillClimber {
    selection: SelectionStrategy,
    pub(crate) best: Incumbent,
}

impl HillClimber {
    pub(crate) fn new(selection: SelectionStrategy, initial: Incumbent) -> Self {
        HillClimber {
            selection,
            best: initial,
        }
    }

    /// Climb from `initial` until a local optimum is declared or the run is cancelled. The best
    /// solution found is left in `self.best`.
    pub(crate) fn run(&mut self, ctx: &mut NhContext<'_>, initial: Incumbent) {
        let config = ctx.config;
        let num_combinations = ctx.nhc.num_combinations();

        let mut iterations_at_peak: u64 = 0;
        let mut local_max_probability = config.hill_climber_initial_local_max_probability;
        let mut backtrack_limit = ExponentialIncrementer::new(
            config.initial_backtrack_limit,
            config.backtrack_limit_multiplier,
            config.backtrack_limit_increment,
        );
        let mut highest_sizes: Vec<i32> = vec![1; num_combinations];
        let iterations_at_start = ctx.stats.num_iterations;

        self.best = initial;
        ctx.tighten_objective_bound(self.best.value);

        loop {
            if ctx.termination.should_stop() {
                return;
            }

            let (combination, stats, solution) =
                self.run_neighbourhood(ctx, &mut backtrack_limit, &highest_sizes);

            if !config.increase_backtrack_only_on_failure || !stats.solution_found {
                backtrack_limit.increase();
            }

            if stats.solution_found && stats.new_value > self.best.value {
                self.handle_better_solution(
                    ctx,
                    solution.expect("an improving solution was found"),
                    &mut iterations_at_peak,
                    &mut local_max_probability,
                    &mut highest_sizes,
                );
            } else {
                highest_sizes[combination] = stats.highest_neighbourhood_size;
                local_max_probability += (1.0 / num_combinations as f64)
                    * config.hill_climber_probability_increment_multiplier;
                iterations_at_peak += 1;
                if iterations_at_peak > config.hill_climber_min_iterations_at_peak
                    && ctx.rng.generate_f64() < local_max_probability
                {
                    ctx.stats.notify_end_climb();
                    debug!(
                        "hill climb ended after {} iterations",
                        ctx.stats.num_iterations - iterations_at_start
                    );
                    return;
                }
            }
        }
    }

    fn run_neighbourhood(
        &mut self,
        ctx: &mut NhContext<'_>,
        backtrack_limit: &mut ExponentialIncrementer,
        highest_sizes: &[i32],
    ) -> (usize, NeighbourhoodStats, Option<Incumbent>) {
        let combination = self.selection.select(ctx.nhc, ctx.rng);
        let params = SearchParams {
            combination,
            time_limit: ctx.config.iteration_search_time,
            backtrack_limit: backtrack_limit.value(),
            backtrack_instead_of_time_limit: ctx.config.backtrack_instead_of_time_limit,
            neighbourhood_size: highest_sizes[combination],
            exploration: false,
        };

        let (stats, solution) = ctx.search_neighbourhoods(&params, &self.best, false);
        ctx.stats
            .report_iteration(ctx.nhc.combination(combination), &stats);
        let improvement = if stats.solution_found {
            (stats.new_value - self.best.value).max(0)
        } else {
            0
        };
        self.selection.update_stats(combination, &stats, improvement);

        (combination, stats, solution)
    }

    /// Move the incumbent, reset the peak bookkeeping (the caller's vectors, not copies), and
    /// make the improvement permanent by raising the objective bound.
    fn handle_better_solution(
        &mut self,
        ctx: &mut NhContext<'_>,
        solution: Incumbent,
        iterations_at_peak: &mut u64,
        local_max_probability: &mut f64,
        highest_sizes: &mut Vec<i32>,
    ) {
        *iterations_at_peak = 0;
        *local_max_probability = ctx.config.hill_climber_initial_local_max_probability;
        highest_sizes.fill(1);
        self.best = solution;
        ctx.tighten_objective_bound(self.best.value);
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

    fn config() -> NhConfig {
        NhConfig {
            selection_strategy: SelectionStrategyKind::Random,
            hill_climber_initial_local_max_probability: 1.0,
            hill_climber_min_iterations_at_peak: 1,
            ..Default::default()
        }
    }

    #[test]
    fn the_climber_walks_both_blocks_to_the_optimum() {
        let mut model = two_block_sum();
        let _ = model.core.propagate();
        let initial = Incumbent {
            solution: Solution::from_store(model.core.store()),
            value: 0,
        };

        let config = config();
        let mut stats = NeighbourhoodSearchStats::new(2, (0, 12), 2);
        // Alternate the two combinations, then fail twice at the peak and give up.
        let mut rng = TestRandom {
            usizes: vec![0, 1, 0, 1, 0, 0],
            f64s: vec![0.0],
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

        let selection = SelectionStrategy::from_config(&config, 2, 12);
        let mut climber = HillClimber::new(selection, initial.clone());
        climber.run(&mut ctx, initial);

        assert_eq!(12, climber.best.value);
        for var in model.nhc.primary_variables() {
            assert_eq!(3, climber.best.solution.value_of(var));
        }
        assert_eq!(6, stats.num_iterations);
    }

    #[test]
    fn a_plateau_ends_the_climb_after_the_minimum_peak_iterations() {
        let mut model = two_block_sum();
        let _ = model.core.propagate();
        // Start at the optimum: every iteration plateaus.
        let _ = model.objective.set_min(model.core.store_mut(), 12);
        let _ = model.core.propagate();
        let initial = Incumbent {
            solution: Solution::from_store(model.core.store()),
            value: 12,
        };

        let config = NhConfig {
            hill_climber_min_iterations_at_peak: 3,
            ..config()
        };
        let mut stats = NeighbourhoodSearchStats::new(2, (0, 12), 2);
        let mut rng = TestRandom {
            usizes: vec![0; 4],
            f64s: vec![0.5],
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

        let selection = SelectionStrategy::from_config(&config, 2, 12);
        let mut climber = HillClimber::new(selection, initial.clone());
        climber.run(&mut ctx, initial);

        // With the local-max probability pinned at 1.0, the climb ends on the first iteration
        // past the minimum.
        assert_eq!(
            config.hill_climber_min_iterations_at_peak + 1,
            stats.num_iterations
        );
        assert_eq!(12, climber.best.value);
    }
}
