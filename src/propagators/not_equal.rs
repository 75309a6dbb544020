use enumset::enum_set;

use crate::engine::notifications::DomainEvent;
use crate::engine::propagation::InitialisationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::variables::VarRef;
use crate::engine::EmptyDomain;

/// Propagator for the binary constraint `x != y`.
///
/// Only wakes up on assignments: once one side is fixed, its value is removed from the other
/// side's domain.
#[derive(Debug)]
pub struct NotEqualPropagator {
    x: VarRef,
    y: VarRef,
}

impl NotEqualPropagator {
    pub fn new(x: VarRef, y: VarRef) -> Self {
        NotEqualPropagator { x, y }
    }
}

impl Propagator for NotEqualPropagator {
    fn name(&self) -> &str {
        "NotEqual"
    }

    fn initialise(&mut self, context: &mut InitialisationContext<'_>) {
        context.register(&self.x, LocalId::from(0), enum_set!(DomainEvent::Assign));
        context.register(&self.y, LocalId::from(1), enum_set!(DomainEvent::Assign));
    }

    fn propagate(&mut self, mut context: PropagationContextMut<'_>) -> Result<(), EmptyDomain> {
        if let Some(value) = context.assigned_value(&self.x) {
            context.remove(&self.y, value)?;
        }
        if let Some(value) = context.assigned_value(&self.y) {
            context.remove(&self.x, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolverCore;

    #[test]
    fn assigning_one_side_prunes_the_other() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(1, 3);
        let y = core.new_discrete(1, 3);
        let _ = core.add_propagator(NotEqualPropagator::new(x.clone(), y.clone()));
        let _ = core.propagate();

        let _ = x.assign(core.store_mut(), 2);
        assert_eq!(Ok(()), core.propagate());

        assert!(!y.in_domain(core.store(), 2));
        assert_eq!(2, y.dom_size(core.store()));
    }

    #[test]
    fn equal_singletons_wipe_out() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(2, 2);
        let y = core.new_discrete(2, 2);
        let _ = core.add_propagator(NotEqualPropagator::new(x, y));

        assert_eq!(Err(EmptyDomain), core.propagate());
    }

    #[test]
    fn the_constraint_works_through_views() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(0, 5);
        let y = core.new_discrete(0, 5);
        // x != 4 - y, i.e. x + y != 4
        let view = y.negated().shifted(4);
        let _ = core.add_propagator(NotEqualPropagator::new(x.clone(), view));
        let _ = core.propagate();

        let _ = y.assign(core.store_mut(), 1);
        assert_eq!(Ok(()), core.propagate());

        // view = 4 - y = 3, so x loses 3.
        assert!(!x.in_domain(core.store(), 3));
    }
}
