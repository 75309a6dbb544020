use enumset::enum_set;

use crate::calabash_assert_simple;
use crate::engine::notifications::DomainDelta;
use crate::engine::notifications::DomainEvent;
use crate::engine::propagation::EnqueueDecision;
use crate::engine::propagation::InitialisationContext;
use crate::engine::propagation::LocalId;
use crate::engine::propagation::NotificationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::trailed::TrailedInt;
use crate::engine::variables::VarRef;
use crate::engine::EmptyDomain;

/// Ties a deviation variable to the number of pairs `(var, reference)` whose sides take
/// different values.
///
/// This is the constraint behind a neighbourhood's deviation variable: the reference variables
/// carry the incumbent's image (the search layer pins them at the start of each activation), and
/// the deviation then bounds how many of the neighbourhood's variables a move may alter.
///
/// The counts of definitely-different and definitely-equal pairs are maintained incrementally in
/// backtrackable integers from the assignment notifications.
#[derive(Debug)]
pub struct HammingDistancePropagator {
    pairs: Box<[(VarRef, VarRef)]>,
    deviation: VarRef,
    /// Count of pairs with both sides assigned, to different values.
    num_different: TrailedInt,
    /// Count of pairs with both sides assigned, to the same value.
    num_same: TrailedInt,
    /// Per-pair flag marking pairs already counted; both sides of a pair fire an assignment
    /// event, and the counts must move exactly once.
    counted: Vec<TrailedInt>,
}

impl HammingDistancePropagator {
    pub fn new(vars: Vec<VarRef>, references: Vec<VarRef>, deviation: VarRef) -> Self {
        calabash_assert_simple!(
            vars.len() == references.len(),
            "one reference variable per variable"
        );
        HammingDistancePropagator {
            pairs: vars.into_iter().zip(references).collect(),
            deviation,
            num_different: TrailedInt::default(),
            num_same: TrailedInt::default(),
            counted: Vec::new(),
        }
    }

    /// Local id of the deviation variable; pair sides use `2 * index` and `2 * index + 1`.
    fn deviation_local_id(&self) -> LocalId {
        LocalId::from(2 * self.pairs.len() as u32)
    }

    fn pair_state(
        var: Option<i32>,
        reference: Option<i32>,
    ) -> PairState {
        match (var, reference) {
            (Some(a), Some(b)) if a == b => PairState::Same,
            (Some(_), Some(_)) => PairState::Different,
            _ => PairState::Open,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PairState {
    Same,
    Different,
    Open,
}

impl Propagator for HammingDistancePropagator {
    fn name(&self) -> &str {
        "HammingDistance"
    }

    fn initialise(&mut self, context: &mut InitialisationContext<'_>) {
        let mut num_different = 0;
        let mut num_same = 0;
        for (index, (var, reference)) in self.pairs.iter().enumerate() {
            context.register(
                var,
                LocalId::from(2 * index as u32),
                enum_set!(DomainEvent::Assign),
            );
            context.register(
                reference,
                LocalId::from(2 * index as u32 + 1),
                enum_set!(DomainEvent::Assign),
            );
            let state =
                Self::pair_state(context.assigned_value(var), context.assigned_value(reference));
            match state {
                PairState::Same => num_same += 1,
                PairState::Different => num_different += 1,
                PairState::Open => {}
            }
            self.counted
                .push(context.new_trailed_int((state != PairState::Open) as i64));
        }
        context.register(
            &self.deviation,
            self.deviation_local_id(),
            enum_set!(DomainEvent::BoundsChange | DomainEvent::Assign),
        );

        self.num_different = context.new_trailed_int(num_different);
        self.num_same = context.new_trailed_int(num_same);
    }

    fn notify(
        &mut self,
        mut context: NotificationContext<'_>,
        local_id: LocalId,
        _event: DomainEvent,
        _delta: DomainDelta,
    ) -> EnqueueDecision {
        if local_id != self.deviation_local_id() {
            let index = local_id.unpack() as usize / 2;
            if context.read_trailed(self.counted[index]) != 0 {
                // The other side's event already accounted for this pair.
                return EnqueueDecision::Skip;
            }
            // One side of a pair was just assigned; if that closed the pair, count it.
            let (var, reference) = &self.pairs[index];
            match Self::pair_state(context.assigned_value(var), context.assigned_value(reference))
            {
                PairState::Same => context.add_assign_trailed(self.num_same, 1),
                PairState::Different => context.add_assign_trailed(self.num_different, 1),
                PairState::Open => return EnqueueDecision::Skip,
            }
            context.assign_trailed(self.counted[index], 1);
        }
        EnqueueDecision::Enqueue
    }

    fn propagate(&mut self, mut context: PropagationContextMut<'_>) -> Result<(), EmptyDomain> {
        let num_different = context.read_trailed(self.num_different) as i32;
        let num_same = context.read_trailed(self.num_same) as i32;
        // Every pair not pinned to equality can still end up different.
        let max_possible = self.pairs.len() as i32 - num_same;

        context.set_min(&self.deviation, num_different)?;
        context.set_max(&self.deviation, max_possible)?;

        if context.max(&self.deviation) == num_different {
            // The distance budget is spent: every open pair must close as equal.
            for (var, reference) in self.pairs.iter() {
                match (context.assigned_value(var), context.assigned_value(reference)) {
                    (Some(a), Some(b)) if a != b => {}
                    (Some(value), None) => context.assign(reference, value)?,
                    (None, Some(value)) => context.assign(var, value)?,
                    _ => {}
                }
            }
        } else if context.min(&self.deviation) == max_possible {
            // Every pair that can still differ has to.
            for (var, reference) in self.pairs.iter() {
                match (context.assigned_value(var), context.assigned_value(reference)) {
                    (Some(value), None) => context.remove(reference, value)?,
                    (None, Some(value)) => context.remove(var, value)?,
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SolverCore;

    fn setup(core: &mut SolverCore, n: usize) -> (Vec<VarRef>, Vec<VarRef>, VarRef) {
        let vars: Vec<_> = (0..n).map(|_| core.new_discrete(0, 4)).collect();
        let references: Vec<_> = (0..n).map(|_| core.new_discrete(0, 4)).collect();
        let deviation = core.new_discrete(0, n as i32);
        let _ = core.add_propagator(HammingDistancePropagator::new(
            vars.clone(),
            references.clone(),
            deviation.clone(),
        ));
        (vars, references, deviation)
    }

    fn pin_references(core: &mut SolverCore, references: &[VarRef], values: &[i32]) {
        for (reference, &value) in references.iter().zip(values) {
            let _ = reference.assign(core.store_mut(), value);
        }
        let _ = core.propagate();
    }

    #[test]
    fn differing_assignments_raise_the_deviation_minimum() {
        let mut core = SolverCore::new();
        let (vars, references, deviation) = setup(&mut core, 3);
        pin_references(&mut core, &references, &[1, 1, 1]);

        let _ = vars[0].assign(core.store_mut(), 3);
        let _ = vars[1].assign(core.store_mut(), 2);
        assert_eq!(Ok(()), core.propagate());

        assert_eq!(2, deviation.min(core.store()));
    }

    #[test]
    fn a_zero_deviation_freezes_the_variables_to_the_references() {
        let mut core = SolverCore::new();
        let (vars, references, deviation) = setup(&mut core, 3);
        pin_references(&mut core, &references, &[1, 2, 3]);

        let _ = deviation.assign(core.store_mut(), 0);
        assert_eq!(Ok(()), core.propagate());

        assert_eq!(Some(1), vars[0].assigned_value(core.store()));
        assert_eq!(Some(2), vars[1].assigned_value(core.store()));
        assert_eq!(Some(3), vars[2].assigned_value(core.store()));
    }

    #[test]
    fn a_saturated_deviation_forces_differences() {
        let mut core = SolverCore::new();
        let (vars, references, deviation) = setup(&mut core, 3);
        pin_references(&mut core, &references, &[1, 2, 3]);

        let _ = deviation.set_min(core.store_mut(), 3);
        assert_eq!(Ok(()), core.propagate());

        assert!(!vars[0].in_domain(core.store(), 1));
        assert!(!vars[1].in_domain(core.store(), 2));
        assert!(!vars[2].in_domain(core.store(), 3));
    }

    #[test]
    fn too_many_differences_wipe_out() {
        let mut core = SolverCore::new();
        let (vars, references, deviation) = setup(&mut core, 2);
        pin_references(&mut core, &references, &[1, 1]);

        let _ = deviation.assign(core.store_mut(), 0);
        assert_eq!(Ok(()), core.propagate());

        // Both variables are pinned to 1 now; 2 has left their domains.
        assert_eq!(Err(EmptyDomain), vars[0].assign(core.store_mut(), 2));
    }

    #[test]
    fn the_counters_rewind_with_the_trail() {
        let mut core = SolverCore::new();
        let (vars, references, deviation) = setup(&mut core, 3);
        pin_references(&mut core, &references, &[1, 1, 1]);

        core.push_checkpoint();
        let _ = vars[0].assign(core.store_mut(), 0);
        let _ = core.propagate();
        assert_eq!(1, deviation.min(core.store()));

        core.restore_to_last_checkpoint();
        let _ = core.propagate();
        assert_eq!(0, deviation.min(core.store()));
    }

    #[test]
    fn unpinned_references_leave_the_deviation_loose() {
        let mut core = SolverCore::new();
        let (vars, _, deviation) = setup(&mut core, 3);
        let _ = core.propagate();

        let _ = vars[0].assign(core.store_mut(), 3);
        assert_eq!(Ok(()), core.propagate());

        // With the references unassigned nothing is known about the distance.
        assert_eq!(0, deviation.min(core.store()));
        assert_eq!(3, deviation.max(core.store()));
    }
}
