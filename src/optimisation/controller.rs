use log::info;
use log::warn;

use super::hill_climber::HillClimber;
use super::meta_search::MetaSearch;
use super::runner::Incumbent;
use super::runner::NhContext;
use super::selection::SelectionStrategy;
use super::ConfigurationError;
use super::NeighbourhoodContainer;
use super::NeighbourhoodSearchStats;
use super::NhConfig;
use super::SearchStrategyKind;
use crate::basic_types::Random;
use crate::basic_types::Solution;
use crate::branching::SearchOrder;
use crate::engine::termination::Indefinite;
use crate::engine::termination::TerminationCondition;
use crate::engine::termination::TimeBudget;
use crate::engine::variables::VarRef;
use crate::engine::SolverCore;

/// The result of one optimisation run.
#[derive(Debug)]
pub struct OptimisationOutcome {
    pub best_solution: Solution,
    pub best_value: i32,
    pub stats: NeighbourhoodSearchStats,
}

/// Drives an optimisation run: owns the engine, the neighbourhood structure, and the incumbent,
/// and dispatches to the configured search strategy.
///
/// The objective is maximised; minimise by handing over a negated objective handle.
pub struct NeighbourhoodSearchController {
    core: SolverCore,
    nhc: NeighbourhoodContainer,
    objective: VarRef,
    base_order: SearchOrder,
    config: NhConfig,
    rng: Box<dyn Random>,
}

impl NeighbourhoodSearchController {
    /// Validates the configuration; an unusable configuration never starts a search.
    pub fn new(
        core: SolverCore,
        nhc: NeighbourhoodContainer,
        objective: VarRef,
        base_order: SearchOrder,
        config: NhConfig,
        rng: Box<dyn Random>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        if matches!(
            config.search_strategy,
            SearchStrategyKind::MetaWithHillClimbing
        ) && config.total_time_limit.is_none()
        {
            warn!(
                "the hole puncher runs until its budget is spent; without totalTimeLimit it only \
                 stops through an external termination condition"
            );
        }

        Ok(NeighbourhoodSearchController {
            core,
            nhc,
            objective,
            base_order,
            config,
            rng,
        })
    }

    pub fn core(&self) -> &SolverCore {
        &self.core
    }

    /// Improve on an initial feasible solution, running until the configured total budget is
    /// spent (or a local optimum is reached, for the plain hill climber).
    pub fn run_optimisation(
        &mut self,
        initial_solution: Solution,
        initial_value: i32,
    ) -> OptimisationOutcome {
        let mut termination: Box<dyn TerminationCondition> = match self.config.total_time_limit {
            Some(limit) => Box::new(TimeBudget::starting_now(limit)),
            None => Box::new(Indefinite),
        };
        self.run_optimisation_until(initial_solution, initial_value, &mut *termination)
    }

    /// As [`run_optimisation`](Self::run_optimisation), with an explicit termination condition
    /// (combined budgets, an external stop flag).
    pub fn run_optimisation_until(
        &mut self,
        initial_solution: Solution,
        initial_value: i32,
        termination: &mut dyn TerminationCondition,
    ) -> OptimisationOutcome {
        let objective_range = (
            self.objective.initial_min(self.core.store()),
            self.objective.initial_max(self.core.store()),
        );
        let mut stats = NeighbourhoodSearchStats::new(
            self.nhc.neighbourhoods().len(),
            objective_range,
            self.nhc.max_neighbourhood_size(),
        );
        stats.start_timer();
        stats.set_value_of_initial_solution(initial_value);

        let selection = SelectionStrategy::from_config(
            &self.config,
            self.nhc.num_combinations(),
            objective_range.1 - objective_range.0,
        );
        let initial = Incumbent {
            solution: initial_solution,
            value: initial_value,
        };

        let best = {
            let mut ctx = NhContext {
                core: &mut self.core,
                nhc: &self.nhc,
                objective: &self.objective,
                base_order: &self.base_order,
                config: &self.config,
                rng: &mut *self.rng,
                termination,
                stats: &mut stats,
            };

            match self.config.search_strategy {
                SearchStrategyKind::HillClimbing => {
                    let mut climber = HillClimber::new(selection, initial.clone());
                    climber.run(&mut ctx, initial);
                    climber.best
                }
                SearchStrategyKind::MetaWithHillClimbing => {
                    let climber = HillClimber::new(selection, initial.clone());
                    let mut meta = MetaSearch::new(
                        climber,
                        initial.clone(),
                        ctx.config.hole_puncher_initial_backtrack_limit,
                        ctx.config.hole_puncher_backtrack_limit_multiplier,
                    );
                    meta.run(&mut ctx, initial);
                    meta.best
                }
                // Rejected by validation before a controller can exist.
                other => unreachable!("strategy {other:?} was accepted by validation"),
            }
        };

        stats.log_statistics();
        if crate::statistics::should_log_statistics() {
            use std::io::Write;

            let mut report = Vec::new();
            if stats.write_report(&mut report, &self.nhc).is_ok() {
                let _ = std::io::stderr().write_all(&report);
            }
        }
        info!(
            "optimisation finished: best value {} after {} iterations",
            best.value, stats.num_iterations
        );

        OptimisationOutcome {
            best_solution: best.solution,
            best_value: best.value,
            stats,
        }
    }
}
