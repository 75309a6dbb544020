use std::time::Duration;

use calabash_solver::basic_types::TestRandom;
use calabash_solver::branching::SearchOrder;
use calabash_solver::engine::termination::Indefinite;
use calabash_solver::engine::SearchBudget;
use calabash_solver::engine::SearchManager;
use calabash_solver::engine::SearchStatus;
use calabash_solver::engine::SearchStep;
use calabash_solver::engine::SolverCore;
use calabash_solver::propagators::LinearEqualPropagator;
use calabash_solver::propagators::NotEqualPropagator;
use calabash_solver::VarRef;

#[test]
fn two_not_equal_variables_enumerate_six_solutions() {
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
    assert_eq!(Some(&(1, 2)), solutions.first());
    assert_eq!(6, solutions.len());
}

#[test]
fn bounds_propagation_assigns_the_sum() {
    let mut core = SolverCore::new();
    let x = core.new_bounds(0, 10);
    let y = core.new_bounds(0, 10);
    let z = core.new_bounds(0, 10);
    let _ = core.add_propagator(LinearEqualPropagator::new(
        vec![x.clone(), y.clone(), z.negated()],
        0,
    ));
    let _ = core.propagate();

    let _ = x.assign(core.store_mut(), 5);
    let _ = y.assign(core.store_mut(), 5);
    assert_eq!(Ok(()), core.propagate());

    assert_eq!(Some(10), z.assigned_value(core.store()));
}

fn domain_snapshot(core: &SolverCore, vars: &[VarRef]) -> Vec<Vec<i32>> {
    vars.iter()
        .map(|var| {
            (var.min(core.store())..=var.max(core.store()))
                .filter(|&value| var.in_domain(core.store(), value))
                .collect()
        })
        .collect()
}

#[test]
fn restoring_the_first_checkpoint_is_independent_of_propagation_order() {
    let mut core = SolverCore::new();
    let x = core.new_discrete(0, 10);
    let y = core.new_discrete(0, 10);
    let z = core.new_sparse(vec![0, 2, 4, 6, 8, 10]);
    let _ = core.add_propagator(LinearEqualPropagator::new(
        vec![x.clone(), y.clone(), z.negated()],
        0,
    ));
    let _ = core.propagate();
    let vars = [x.clone(), y.clone(), z.clone()];
    let baseline = domain_snapshot(&core, &vars);

    // First run: propagate after every mutation.
    core.push_checkpoint();
    let _ = x.set_min(core.store_mut(), 3);
    let _ = core.propagate();
    let _ = y.remove(core.store_mut(), 5);
    let _ = core.propagate();
    let _ = z.set_max(core.store_mut(), 8);
    let _ = core.propagate();
    core.restore_to_last_checkpoint();
    assert_eq!(baseline, domain_snapshot(&core, &vars));

    // Second run: same mutations, propagation only at the end.
    core.push_checkpoint();
    let _ = x.set_min(core.store_mut(), 3);
    let _ = y.remove(core.store_mut(), 5);
    let _ = z.set_max(core.store_mut(), 8);
    let _ = core.propagate();
    core.restore_to_last_checkpoint();
    assert_eq!(baseline, domain_snapshot(&core, &vars));
}

#[test]
fn assign_propagate_restore_round_trips() {
    let mut core = SolverCore::new();
    let x = core.new_discrete(0, 5);
    let y = core.new_discrete(0, 5);
    let _ = core.add_propagator(NotEqualPropagator::new(x.clone(), y.clone()));
    let _ = core.propagate();
    let vars = [x.clone(), y.clone()];
    let baseline = domain_snapshot(&core, &vars);

    core.push_checkpoint();
    let _ = x.assign(core.store_mut(), 2);
    let _ = core.propagate();
    assert!(!y.in_domain(core.store(), 2));
    core.restore_to_last_checkpoint();

    assert_eq!(baseline, domain_snapshot(&core, &vars));
}

#[test]
fn mapper_stacks_unwind_in_exactly_their_depth() {
    let mut core = SolverCore::new();
    let base = core.new_discrete(0, 10);
    let mappers = 4;
    let view = base.shifted(1).scaled(2).negated().shifted(-3);

    let mut handle = view;
    for _ in 0..mappers {
        assert!(!handle.mapper_stack().is_empty());
        handle = handle.pop_one_mapper();
    }
    assert!(handle.mapper_stack().is_empty());
    assert_eq!(base.base_var(), handle.base_var());
}

#[test]
fn the_search_honours_its_budgets() {
    fn hard_model() -> (SolverCore, SearchOrder) {
        let mut core = SolverCore::new();
        let vars: Vec<VarRef> = (0..10).map(|_| core.new_discrete(0, 8)).collect();
        for i in 0..vars.len() {
            for j in i + 1..vars.len() {
                let _ = core.add_propagator(NotEqualPropagator::new(
                    vars[i].clone(),
                    vars[j].clone(),
                ));
            }
        }
        let order = SearchOrder::ascending(vars);
        (core, order)
    }

    // Wall-clock budget.
    let (mut core, order) = hard_model();
    let mut rng = TestRandom::default();
    let mut termination = Indefinite;
    let started = std::time::Instant::now();
    let outcome = SearchManager::new(&mut core, &order, &mut rng, &mut termination)
        .with_budget(SearchBudget {
            time: Some(Duration::from_millis(100)),
            ..Default::default()
        })
        .solve(&mut |_, _| SearchStep::Continue);
    assert_eq!(SearchStatus::TimedOut, outcome.status);
    assert!(started.elapsed() < Duration::from_secs(2));

    // Backtrack budget.
    let (mut core, order) = hard_model();
    let mut rng = TestRandom::default();
    let mut termination = Indefinite;
    let outcome = SearchManager::new(&mut core, &order, &mut rng, &mut termination)
        .with_budget(SearchBudget {
            backtracks: Some(20),
            ..Default::default()
        })
        .solve(&mut |_, _| SearchStep::Continue);
    assert_eq!(SearchStatus::BacktrackLimitReached, outcome.status);
    assert!(outcome.num_backtracks <= 21);
    assert_eq!(0, core.checkpoint_count());
}
