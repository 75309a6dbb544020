use std::time::Duration;

use log::debug;

use crate::basic_types::Random;
use crate::basic_types::Solution;
use crate::basic_types::Stopwatch;
use crate::branching::SearchOrder;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::VarRef;
use crate::engine::EmptyDomain;
use crate::engine::SolverCore;

/// Why a search returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    /// The subtree was fully explored (every solution, if any, was reported) or the solution
    /// callback asked to stop.
    Exhausted,
    /// The wall-clock budget of this search ran out.
    TimedOut,
    /// The backtrack budget of this search ran out.
    BacktrackLimitReached,
    /// The decision budget of this search ran out.
    DecisionLimitReached,
    /// The external termination condition tripped.
    Stopped,
}

impl SearchStatus {
    /// Whether the search ended because some budget ran out rather than by exploring everything.
    pub fn budget_exhausted(&self) -> bool {
        !matches!(self, SearchStatus::Exhausted)
    }
}

/// The result record of one search run.
#[derive(Clone, Copy, Debug)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub num_decisions: u64,
    pub num_backtracks: u64,
    pub num_solutions: u64,
    /// The objective value of the best solution reported during this run, when optimising.
    pub best_objective: Option<i32>,
}

/// The per-search budgets; all are optional and checked at every decision.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchBudget {
    pub time: Option<Duration>,
    pub backtracks: Option<u64>,
    pub decisions: Option<u64>,
}

/// What the solution callback wants the search to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStep {
    Continue,
    Stop,
}

enum Interrupt {
    TimedOut,
    BacktrackLimit,
    DecisionLimit,
    Stopped,
}

/// A depth-first chronologically-backtracking search over a [`SolverCore`].
///
/// Branching is binary: a value is tentatively assigned under a fresh checkpoint, and on failure
/// the checkpoint is restored and the value removed from the domain. When optimising (toward
/// larger objective values) every reported solution raises the exclusive lower bound, so later
/// solutions strictly improve; subtrees whose objective upper bound cannot beat the incumbent are
/// pruned.
pub struct SearchManager<'a> {
    core: &'a mut SolverCore,
    order: &'a SearchOrder,
    rng: &'a mut dyn Random,
    termination: &'a mut dyn TerminationCondition,
    budget: SearchBudget,
    objective: Option<VarRef>,
    best_objective: Option<i32>,
    stopwatch: Stopwatch,
    num_decisions: u64,
    num_backtracks: u64,
    num_solutions: u64,
}

impl<'a> SearchManager<'a> {
    pub fn new(
        core: &'a mut SolverCore,
        order: &'a SearchOrder,
        rng: &'a mut dyn Random,
        termination: &'a mut dyn TerminationCondition,
    ) -> Self {
        SearchManager {
            core,
            order,
            rng,
            termination,
            budget: SearchBudget::default(),
            objective: None,
            best_objective: None,
            stopwatch: Stopwatch::starting_now(),
            num_decisions: 0,
            num_backtracks: 0,
            num_solutions: 0,
        }
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Optimise `objective` (maximisation). Solutions with value `<= lower_bound_exclusive` are
    /// pruned from the start; pass the incumbent value to demand strict improvement.
    pub fn with_objective(mut self, objective: VarRef, lower_bound_exclusive: Option<i32>) -> Self {
        self.objective = Some(objective);
        self.best_objective = lower_bound_exclusive;
        self
    }

    /// Run the search. The callback receives every solution together with its objective value (if
    /// optimising) and decides whether to continue.
    pub fn solve(
        mut self,
        on_solution: &mut dyn FnMut(&Solution, Option<i32>) -> SearchStep,
    ) -> SearchOutcome {
        self.stopwatch.reset();
        let base_checkpoint = self.core.checkpoint_count();

        let status = match self.core.propagate() {
            Err(EmptyDomain) => SearchStatus::Exhausted,
            Ok(()) => {
                if self.dominated_by_incumbent() {
                    SearchStatus::Exhausted
                } else {
                    match self.branch(on_solution) {
                        Ok(_) => SearchStatus::Exhausted,
                        Err(Interrupt::TimedOut) => SearchStatus::TimedOut,
                        Err(Interrupt::BacktrackLimit) => SearchStatus::BacktrackLimitReached,
                        Err(Interrupt::DecisionLimit) => SearchStatus::DecisionLimitReached,
                        Err(Interrupt::Stopped) => SearchStatus::Stopped,
                    }
                }
            }
        };

        self.core.rewind_to_checkpoint(base_checkpoint);
        debug!(
            "search finished: {status:?}, {} decisions, {} backtracks, {} solutions",
            self.num_decisions, self.num_backtracks, self.num_solutions
        );

        SearchOutcome {
            status,
            num_decisions: self.num_decisions,
            num_backtracks: self.num_backtracks,
            num_solutions: self.num_solutions,
            best_objective: (self.num_solutions > 0)
                .then_some(self.best_objective)
                .flatten(),
        }
    }

    /// Whether the current subtree cannot contain anything better than the incumbent.
    fn dominated_by_incumbent(&self) -> bool {
        match (&self.objective, self.best_objective) {
            (Some(objective), Some(bound)) => objective.max(self.core.store()) <= bound,
            _ => false,
        }
    }

    fn check_budgets(&mut self) -> Result<(), Interrupt> {
        if self.termination.should_stop() {
            return Err(Interrupt::Stopped);
        }
        if let Some(time) = self.budget.time {
            if self.stopwatch.elapsed() >= time {
                return Err(Interrupt::TimedOut);
            }
        }
        if let Some(backtracks) = self.budget.backtracks {
            if self.num_backtracks >= backtracks {
                return Err(Interrupt::BacktrackLimit);
            }
        }
        if let Some(decisions) = self.budget.decisions {
            if self.num_decisions >= decisions {
                return Err(Interrupt::DecisionLimit);
            }
        }
        Ok(())
    }

    /// Precondition: propagation is at fixpoint and the subtree is not dominated.
    fn branch(
        &mut self,
        on_solution: &mut dyn FnMut(&Solution, Option<i32>) -> SearchStep,
    ) -> Result<SearchStep, Interrupt> {
        let store = self.core.store();
        let Some(entry) = self
            .order
            .variables
            .iter()
            .find(|entry| !entry.var.is_assigned(store))
        else {
            return Ok(self.emit_solution(on_solution));
        };
        let var = entry.var.clone();
        let selector = entry.selector;

        loop {
            self.check_budgets()?;

            let value = selector.select(self.core.store(), &var, self.rng);
            self.num_decisions += 1;
            self.termination.decision_has_been_made();

            self.core.push_checkpoint();
            var.unchecked_assign(self.core.store_mut(), value);
            let step = match self.core.propagate() {
                Ok(()) if self.dominated_by_incumbent() => SearchStep::Continue,
                Ok(()) => self.branch(on_solution)?,
                Err(EmptyDomain) => SearchStep::Continue,
            };
            self.core.restore_to_last_checkpoint();
            self.num_backtracks += 1;
            self.termination.backtrack_has_happened();

            if step == SearchStep::Stop {
                return Ok(SearchStep::Stop);
            }
            // Budget check on the backtrack boundary; without it an unwind cascade could overrun
            // the backtrack budget by the depth of the branching stack. An interrupt raised here
            // unwinds through the callers' `?`; `solve` rewinds the checkpoints they left behind.
            self.check_budgets()?;

            // The right branch: the value is no longer a candidate here.
            if var.remove(self.core.store_mut(), value).is_err() {
                return Ok(SearchStep::Continue);
            }
            if self.core.propagate().is_err() {
                return Ok(SearchStep::Continue);
            }
            if self.dominated_by_incumbent() {
                return Ok(SearchStep::Continue);
            }
            if var.is_assigned(self.core.store()) {
                return self.branch(on_solution);
            }
        }
    }

    fn emit_solution(
        &mut self,
        on_solution: &mut dyn FnMut(&Solution, Option<i32>) -> SearchStep,
    ) -> SearchStep {
        self.num_solutions += 1;
        let store = self.core.store();
        let solution = Solution::from_store(store);
        let objective_value = self.objective.as_ref().map(|objective| {
            // An unassigned objective reports the value it is guaranteed to reach.
            objective.min(store)
        });

        if let Some(value) = objective_value {
            if self.best_objective.map_or(true, |best| value > best) {
                self.best_objective = Some(value);
            }
        }

        on_solution(&solution, objective_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::engine::termination::Indefinite;
    use crate::propagators::NotEqualPropagator;

    #[test]
    fn two_variables_not_equal_has_six_solutions_in_lexicographic_order() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(1, 3);
        let y = core.new_discrete(1, 3);
        let _ = core.add_propagator(NotEqualPropagator::new(x.clone(), y.clone()));

        let order = SearchOrder::ascending([x.clone(), y.clone()]);
        let mut rng = TestRandom::default();
        let mut termination = Indefinite;

        let mut solutions = Vec::new();
        let outcome = SearchManager::new(&mut core, &order, &mut rng, &mut termination).solve(
            &mut |solution, _| {
                solutions.push((solution.value_of(&x), solution.value_of(&y)));
                SearchStep::Continue
            },
        );

        assert_eq!(SearchStatus::Exhausted, outcome.status);
        assert_eq!(6, outcome.num_solutions);
        assert_eq!((1, 2), solutions[0]);
        assert_eq!(
            vec![(1, 2), (1, 3), (2, 1), (2, 3), (3, 1), (3, 2)],
            solutions
        );
    }

    #[test]
    fn the_first_solution_can_stop_the_search() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(1, 3);
        let y = core.new_discrete(1, 3);
        let _ = core.add_propagator(NotEqualPropagator::new(x.clone(), y.clone()));

        let order = SearchOrder::ascending([x, y]);
        let mut rng = TestRandom::default();
        let mut termination = Indefinite;

        let outcome = SearchManager::new(&mut core, &order, &mut rng, &mut termination)
            .solve(&mut |_, _| SearchStep::Stop);

        assert_eq!(SearchStatus::Exhausted, outcome.status);
        assert_eq!(1, outcome.num_solutions);
    }

    #[test]
    fn an_infeasible_model_reports_no_solutions() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(1, 1);
        let y = core.new_discrete(1, 1);
        let _ = core.add_propagator(NotEqualPropagator::new(x, y));

        let order = SearchOrder::default();
        let mut rng = TestRandom::default();
        let mut termination = Indefinite;

        let outcome = SearchManager::new(&mut core, &order, &mut rng, &mut termination)
            .solve(&mut |_, _| SearchStep::Continue);

        assert_eq!(SearchStatus::Exhausted, outcome.status);
        assert_eq!(0, outcome.num_solutions);
    }

    #[test]
    fn the_backtrack_budget_interrupts_the_search() {
        let mut core = SolverCore::new();
        let vars: Vec<_> = (0..6).map(|_| core.new_discrete(0, 5)).collect();
        for i in 0..vars.len() {
            for j in i + 1..vars.len() {
                let _ = core.add_propagator(NotEqualPropagator::new(
                    vars[i].clone(),
                    vars[j].clone(),
                ));
            }
        }

        let order = SearchOrder::ascending(vars);
        let mut rng = TestRandom::default();
        let mut termination = Indefinite;

        let outcome = SearchManager::new(&mut core, &order, &mut rng, &mut termination)
            .with_budget(SearchBudget {
                backtracks: Some(3),
                ..Default::default()
            })
            .solve(&mut |_, _| SearchStep::Continue);

        assert_eq!(SearchStatus::BacktrackLimitReached, outcome.status);
        assert!(outcome.num_backtracks <= 4);
        assert_eq!(0, core.checkpoint_count(), "the search unwinds fully");
    }

    #[test]
    fn optimisation_reports_strictly_improving_solutions() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(0, 4);
        let y = core.new_discrete(0, 4);
        let objective = core.new_discrete(0, 8);
        let _ = core.add_propagator(crate::propagators::LinearEqualPropagator::new(
            vec![x.clone(), y.clone(), objective.negated()],
            0,
        ));

        let order = SearchOrder::ascending([x, y]);
        let mut rng = TestRandom::default();
        let mut termination = Indefinite;

        let mut reported = Vec::new();
        let outcome = SearchManager::new(&mut core, &order, &mut rng, &mut termination)
            .with_objective(objective, None)
            .solve(&mut |_, value| {
                reported.push(value.unwrap());
                SearchStep::Continue
            });

        assert_eq!(SearchStatus::Exhausted, outcome.status);
        assert_eq!(Some(8), outcome.best_objective);
        assert!(reported.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(8, *reported.last().unwrap());
    }
}
