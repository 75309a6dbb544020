use log::trace;

use super::NeighbourhoodContainer;
use super::NeighbourhoodSearchStats;
use super::NeighbourhoodStats;
use super::NhConfig;
use super::SearchParams;
use crate::basic_types::Random;
use crate::basic_types::Solution;
use crate::basic_types::Stopwatch;
use crate::branching::SearchOrder;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::VarRef;
use crate::engine::EmptyDomain;
use crate::engine::SearchBudget;
use crate::engine::SearchManager;
use crate::engine::SearchStatus;
use crate::engine::SearchStep;
use crate::engine::SolverCore;

/// The best feasible assignment found so far, held outside the search tree.
#[derive(Clone, Debug)]
pub struct Incumbent {
    pub solution: Solution,
    pub value: i32,
}

/// Everything one optimisation run threads through its layers: the engine, the neighbourhood
/// structure, the configuration, and the mutable run-wide state (randomness, cancellation,
/// statistics).
pub(crate) struct NhContext<'a> {
    pub(crate) core: &'a mut SolverCore,
    pub(crate) nhc: &'a NeighbourhoodContainer,
    pub(crate) objective: &'a VarRef,
    pub(crate) base_order: &'a SearchOrder,
    pub(crate) config: &'a NhConfig,
    pub(crate) rng: &'a mut dyn Random,
    pub(crate) termination: &'a mut dyn TerminationCondition,
    pub(crate) stats: &'a mut NeighbourhoodSearchStats,
}

impl NhContext<'_> {
    /// Run one inner neighbourhood search as described by `params`.
    ///
    /// The combination's outside variables are frozen to the incumbent, the deviation variable is
    /// fixed to the current size, and the base search runs under the per-iteration budget. In
    /// hill-climbing mode the size escalates through the deviation domain while nothing is found
    /// and budget remains; exploration probes exactly one size.
    ///
    /// Every domain change happens under a checkpoint that is restored before returning.
    pub(crate) fn search_neighbourhoods(
        &mut self,
        params: &SearchParams,
        incumbent: &Incumbent,
        require_strict_improvement: bool,
    ) -> (NeighbourhoodStats, Option<Incumbent>) {
        let stopwatch = Stopwatch::starting_now();
        let deviation = self.nhc.combination_deviation(params.combination).clone();
        let max_size = deviation.max(self.core.store());
        let lower_bound_exclusive = if require_strict_improvement {
            incumbent.value
        } else {
            incumbent.value - 1
        };

        let mut size = params.neighbourhood_size.max(1);
        let mut highest_size = size;
        let mut backtracks_used = 0;
        let mut timeout_reached = false;
        let mut found: Option<Incumbent> = None;

        while size <= max_size {
            highest_size = highest_size.max(size);

            if !deviation.in_domain(self.core.store(), size) {
                if params.exploration {
                    break;
                }
                size += 1;
                continue;
            }

            let Some(budget) = remaining_budget(params, &stopwatch, backtracks_used) else {
                timeout_reached = true;
                break;
            };

            self.core.push_checkpoint();
            match self.activate(params, incumbent, &deviation, size) {
                Err(EmptyDomain) => {
                    // This size admits no move at all.
                    self.core.restore_to_last_checkpoint();
                }
                Ok(()) => {
                    let mut captured: Option<Incumbent> = None;
                    let stats = &mut *self.stats;
                    let outcome = SearchManager::new(
                        &mut *self.core,
                        self.base_order,
                        &mut *self.rng,
                        &mut *self.termination,
                    )
                    .with_budget(budget)
                    .with_objective(self.objective.clone(), Some(lower_bound_exclusive))
                    .solve(&mut |solution, objective_value| {
                        let value = objective_value.expect("the inner search optimises");
                        stats.found_solution(value);
                        captured = Some(Incumbent {
                            solution: solution.clone(),
                            value,
                        });
                        SearchStep::Stop
                    });
                    backtracks_used += outcome.num_backtracks;
                    self.core.restore_to_last_checkpoint();

                    if captured.is_some() {
                        found = captured;
                        break;
                    }
                    if outcome.status != SearchStatus::Exhausted {
                        timeout_reached = true;
                        break;
                    }
                }
            }

            if params.exploration {
                break;
            }
            size += 1;
        }

        trace!(
            "neighbourhood search on combination {} up to size {highest_size}: found={}, \
             timeout={timeout_reached}",
            params.combination,
            found.is_some(),
        );

        let stats = NeighbourhoodStats {
            new_value: found.as_ref().map_or(incumbent.value, |inc| inc.value),
            time_taken: stopwatch.elapsed(),
            solution_found: found.is_some(),
            timeout_reached,
            highest_neighbourhood_size: highest_size,
        };
        (stats, found)
    }

    /// Freeze everything outside the active combination onto the incumbent, pin the active
    /// neighbourhoods' shadow variables to the incumbent's image, fix the deviation to `size`,
    /// and propagate.
    fn activate(
        &mut self,
        params: &SearchParams,
        incumbent: &Incumbent,
        deviation: &VarRef,
        size: i32,
    ) -> Result<(), EmptyDomain> {
        for (index, var) in self.nhc.primary_variables().iter().enumerate() {
            if !self.nhc.is_in_combination(params.combination, index) {
                var.assign(self.core.store_mut(), incumbent.solution.value_of(var))?;
            }
        }
        for &nh in self.nhc.combination(params.combination) {
            let neighbourhood = &self.nhc.neighbourhoods()[nh];
            for (&member, shadow) in neighbourhood
                .members
                .iter()
                .zip(neighbourhood.shadows.iter())
            {
                let member_var = &self.nhc.primary_variables()[member];
                shadow.assign(
                    self.core.store_mut(),
                    incumbent.solution.value_of(member_var),
                )?;
            }
        }
        deviation.assign(self.core.store_mut(), size)?;
        self.core.propagate()
    }

    /// A plain search over the base order with randomised value selection, stopping at the first
    /// solution strictly better than the incumbent. Used by the hole puncher's random-restart
    /// fallback.
    pub(crate) fn random_climb(&mut self, incumbent: &Incumbent) -> Option<Incumbent> {
        let order = SearchOrder::uniform(
            self.base_order
                .variables
                .iter()
                .map(|entry| entry.var.clone()),
            crate::branching::ValueSelector::InDomainRandom,
        );

        let mut captured: Option<Incumbent> = None;
        let stats = &mut *self.stats;
        let _ = SearchManager::new(
            &mut *self.core,
            &order,
            &mut *self.rng,
            &mut *self.termination,
        )
        .with_objective(self.objective.clone(), Some(incumbent.value))
        .solve(&mut |solution, objective_value| {
            let value = objective_value.expect("the inner search optimises");
            stats.found_solution(value);
            captured = Some(Incumbent {
                solution: solution.clone(),
                value,
            });
            SearchStep::Stop
        });
        captured
    }

    /// Permanently raise the objective lower bound to the incumbent value (outside any
    /// checkpoint, so it survives every later restore).
    pub(crate) fn tighten_objective_bound(&mut self, value: i32) {
        if self.objective.set_min(self.core.store_mut(), value).is_err() {
            // The bound is the value of a feasible solution, so it can only wipe out if the
            // objective was narrowed elsewhere; nothing better exists then.
            log::warn!("objective bound {value} is outside the objective domain");
            return;
        }
        if self.core.propagate().is_err() {
            log::warn!("objective bound {value} is globally infeasible");
        }
    }
}

fn remaining_budget(
    params: &SearchParams,
    stopwatch: &Stopwatch,
    backtracks_used: u64,
) -> Option<SearchBudget> {
    if params.backtrack_instead_of_time_limit {
        let remaining = params.backtrack_limit.saturating_sub(backtracks_used);
        (remaining > 0).then_some(SearchBudget {
            backtracks: Some(remaining),
            ..Default::default()
        })
    } else {
        let remaining = params.time_limit.checked_sub(stopwatch.elapsed())?;
        Some(SearchBudget {
            time: Some(remaining),
            ..Default::default()
        })
    }
}
