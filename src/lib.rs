//! # Calabash
//! Calabash is a finite-domain constraint solver built around two pieces: a backtracking search
//! engine over a uniform variable substrate, and a neighbourhood-based local search layer for
//! optimisation problems.
//!
//! The engine side provides four domain varieties (boolean, bounds, sparse-bounds, discrete)
//! behind one tagged handle type, event-driven propagation through dynamic triggers, and a trail
//! with stack-of-checkpoints semantics. The optimisation side provides a hill climber, a
//! hole-punching meta search, and adaptive neighbourhood selection (random, UCB bandit, learning
//! automaton, interactive).
//!
//! # Solving a satisfaction problem
//! ```rust
//! use calabash_solver::basic_types::TestRandom;
//! use calabash_solver::branching::SearchOrder;
//! use calabash_solver::engine::termination::Indefinite;
//! use calabash_solver::engine::SearchManager;
//! use calabash_solver::engine::SearchStep;
//! use calabash_solver::engine::SolverCore;
//! use calabash_solver::propagators::NotEqualPropagator;
//!
//! let mut core = SolverCore::new();
//! let x = core.new_discrete(1, 3);
//! let y = core.new_discrete(1, 3);
//! let _ = core.add_propagator(NotEqualPropagator::new(x.clone(), y.clone()));
//!
//! let order = SearchOrder::ascending([x.clone(), y.clone()]);
//! let mut rng = TestRandom::default();
//! let mut termination = Indefinite;
//!
//! let mut first = None;
//! let _ = SearchManager::new(&mut core, &order, &mut rng, &mut termination).solve(
//!     &mut |solution, _| {
//!         first = Some((solution.value_of(&x), solution.value_of(&y)));
//!         SearchStep::Stop
//!     },
//! );
//! assert_eq!(Some((1, 2)), first);
//! ```
//!
//! # Optimising with neighbourhood search
//! The optimisation entry point is
//! [`NeighbourhoodSearchController::run_optimisation`](optimisation::NeighbourhoodSearchController::run_optimisation):
//! it consumes an initial feasible solution and iterates toward improvement, freezing everything
//! outside the chosen neighbourhood combination onto the incumbent and bounding the move size
//! through each neighbourhood's deviation variable. The objective is maximised; minimise by
//! passing a [negated](engine::variables::VarRef::negated) objective handle.

pub mod asserts;
pub mod basic_types;
pub mod branching;
pub mod containers;
pub mod engine;
pub mod optimisation;
pub mod propagators;
pub mod statistics;

pub use basic_types::Solution;
pub use engine::variables::VarRef;
pub use engine::DomainStore;
pub use engine::EmptyDomain;
pub use engine::SolverCore;
pub use optimisation::NeighbourhoodSearchController;
pub use optimisation::NhConfig;
