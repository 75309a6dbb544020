//! A small optimisation model shared by the unit tests of the search layers.
//!
//! Four primary variables in `[0, 3]` whose sum is the (maximised) objective, split into two
//! neighbourhoods of two variables each, with shadow variables and a Hamming deviation
//! constraint per neighbourhood.

use crate::branching::SearchOrder;
use crate::branching::ValueSelector;
use crate::engine::variables::VarRef;
use crate::engine::SolverCore;
use crate::optimisation::Neighbourhood;
use crate::optimisation::NeighbourhoodContainer;
use crate::propagators::HammingDistancePropagator;
use crate::propagators::LinearEqualPropagator;

pub(crate) struct TestModel {
    pub(crate) core: SolverCore,
    pub(crate) nhc: NeighbourhoodContainer,
    pub(crate) objective: VarRef,
    pub(crate) base_order: SearchOrder,
}

pub(crate) fn two_block_sum() -> TestModel {
    let mut core = SolverCore::new();
    let primary: Vec<VarRef> = (0..4).map(|_| core.new_discrete(0, 3)).collect();
    let objective = core.new_discrete(0, 12);

    let mut sum_terms = primary.clone();
    sum_terms.push(objective.negated());
    let _ = core.add_propagator(LinearEqualPropagator::new(sum_terms, 0));

    let mut neighbourhoods = Vec::new();
    for (name, members) in [("left", [0usize, 1]), ("right", [2, 3])] {
        let shadows: Vec<VarRef> = (0..members.len()).map(|_| core.new_discrete(0, 3)).collect();
        let deviation = core.new_discrete(0, members.len() as i32);
        let _ = core.add_propagator(HammingDistancePropagator::new(
            members.iter().map(|&m| primary[m].clone()).collect(),
            shadows.clone(),
            deviation.clone(),
        ));
        neighbourhoods.push(Neighbourhood {
            name: name.into(),
            members: members.to_vec(),
            shadows,
            deviation,
        });
    }

    let nhc =
        NeighbourhoodContainer::new(primary.clone(), neighbourhoods, vec![vec![0], vec![1]])
            .unwrap();
    let base_order = SearchOrder::uniform(primary, ValueSelector::InDomainMax);

    TestModel {
        core,
        nhc,
        objective,
        base_order,
    }
}
