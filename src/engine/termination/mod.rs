//! A [`TerminationCondition`] is polled by the search between decisions and at propagation
//! boundaries. It indicates when the search should stop even though no conclusion has been
//! reached; the per-iteration budgets of the neighbourhood layer are enforced separately by the
//! search manager itself.

mod backtrack_budget;
mod combinator;
mod indefinite;
mod stop_flag;
mod time_budget;

pub use backtrack_budget::BacktrackBudget;
pub use combinator::Combinator;
pub use indefinite::Indefinite;
pub use stop_flag::StopFlag;
pub use time_budget::TimeBudget;

/// The central trait that defines a termination condition; it determines when the search should
/// give up.
pub trait TerminationCondition {
    /// Returns `true` when the search should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;

    /// Invoked whenever the search takes a decision, for budget-counting conditions.
    fn decision_has_been_made(&mut self) {}

    /// Invoked whenever the search backtracks, for budget-counting conditions.
    fn backtrack_has_happened(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }

    fn decision_has_been_made(&mut self) {
        if let Some(t) = self {
            t.decision_has_been_made()
        }
    }

    fn backtrack_has_happened(&mut self) {
        if let Some(t) = self {
            t.backtrack_has_happened()
        }
    }
}

impl<T: TerminationCondition + ?Sized> TerminationCondition for &mut T {
    fn should_stop(&mut self) -> bool {
        (**self).should_stop()
    }

    fn decision_has_been_made(&mut self) {
        (**self).decision_has_been_made()
    }

    fn backtrack_has_happened(&mut self) {
        (**self).backtrack_has_happened()
    }
}
