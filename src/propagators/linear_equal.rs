use enumset::enum_set;

use crate::engine::notifications::DomainEvent;
use crate::engine::propagation::InitialisationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::variables::VarRef;
use crate::engine::EmptyDomain;

/// Bounds-consistent propagator for `sum(terms) = rhs`.
///
/// Terms with coefficients are expressed through scaled or negated handles, so `x + y = z` is
/// posted as `[x, y, z.negated()]` with right-hand side 0.
#[derive(Debug)]
pub struct LinearEqualPropagator {
    terms: Box<[VarRef]>,
    rhs: i32,
}

impl LinearEqualPropagator {
    pub fn new(terms: Vec<VarRef>, rhs: i32) -> Self {
        LinearEqualPropagator {
            terms: terms.into_boxed_slice(),
            rhs,
        }
    }

    fn clamp(bound: i64) -> i32 {
        bound.clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

impl Propagator for LinearEqualPropagator {
    fn name(&self) -> &str {
        "LinearEq"
    }

    fn initialise(&mut self, context: &mut InitialisationContext<'_>) {
        for (index, term) in self.terms.iter().enumerate() {
            context.register(
                term,
                LocalId::from(index as u32),
                enum_set!(DomainEvent::BoundsChange | DomainEvent::Assign),
            );
        }
    }

    fn propagate(&mut self, mut context: PropagationContextMut<'_>) -> Result<(), EmptyDomain> {
        let min_sum: i64 = self
            .terms
            .iter()
            .map(|term| context.min(term) as i64)
            .sum();
        let max_sum: i64 = self
            .terms
            .iter()
            .map(|term| context.max(term) as i64)
            .sum();

        for term in self.terms.iter() {
            let term_min = context.min(term) as i64;
            let term_max = context.max(term) as i64;

            // term >= rhs - (sum of the other maxima), term <= rhs - (sum of the other minima)
            let lower = self.rhs as i64 - (max_sum - term_max);
            let upper = self.rhs as i64 - (min_sum - term_min);
            context.set_min(term, Self::clamp(lower))?;
            context.set_max(term, Self::clamp(upper))?;
        }

        Ok(())
    }
}
