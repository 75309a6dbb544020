use crate::basic_types::Random;
use crate::calabash_assert_moderate;
use crate::engine::variables::VarRef;
use crate::engine::DomainStore;

/// Decides which value of a branching variable to try next.
///
/// The selected value is assigned on the left branch and removed from the domain on the right
/// branch, so for interval-only representations the selector sticks to the bounds; removing an
/// interior value there would violate the variety's contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueSelector {
    /// Ascending order: always the domain minimum.
    InDomainMin,
    /// Descending order: always the domain maximum.
    InDomainMax,
    /// A uniformly random in-domain value (one of the two bounds for interval-only variables).
    InDomainRandom,
    /// The given value while it is still available, then the domain minimum. Used to bias a
    /// neighbourhood search toward the incumbent.
    Preferred(i32),
}

impl ValueSelector {
    /// The value to branch on; the variable must not be assigned yet.
    pub fn select(&self, store: &DomainStore, var: &VarRef, rng: &mut dyn Random) -> i32 {
        calabash_assert_moderate!(!var.is_assigned(store));

        match *self {
            ValueSelector::InDomainMin => var.min(store),
            ValueSelector::InDomainMax => var.max(store),
            ValueSelector::InDomainRandom => {
                if var.is_interval_only(store) {
                    if rng.generate_bool(0.5) {
                        var.min(store)
                    } else {
                        var.max(store)
                    }
                } else {
                    let index = rng.generate_usize_in_range(0..var.dom_size(store));
                    (var.min(store)..=var.max(store))
                        .filter(|&value| var.in_domain(store, value))
                        .nth(index)
                        .expect("dom_size in-domain values exist between the bounds")
                }
            }
            ValueSelector::Preferred(value) => {
                let fits_representation =
                    !var.is_interval_only(store) || value == var.min(store) || value == var.max(store);
                if fits_representation && var.in_domain(store, value) {
                    value
                } else {
                    var.min(store)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::engine::SolverCore;

    #[test]
    fn preferred_values_are_selected_while_available() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(0, 10);
        let mut rng = TestRandom::default();

        let selector = ValueSelector::Preferred(7);
        assert_eq!(7, selector.select(core.store(), &x, &mut rng));

        let _ = x.remove(core.store_mut(), 7);
        assert_eq!(0, selector.select(core.store(), &x, &mut rng));
    }

    #[test]
    fn random_selection_on_interval_only_variables_stays_at_the_bounds() {
        let mut core = SolverCore::new();
        let x = core.new_bounds(3, 9);
        let mut rng = TestRandom {
            bools: vec![true, false],
            ..Default::default()
        };

        let selector = ValueSelector::InDomainRandom;
        assert_eq!(3, selector.select(core.store(), &x, &mut rng));
        assert_eq!(9, selector.select(core.store(), &x, &mut rng));
    }

    #[test]
    fn random_selection_skips_holes() {
        let mut core = SolverCore::new();
        let x = core.new_discrete(0, 4);
        let _ = x.remove(core.store_mut(), 1);

        // Domain is {0, 2, 3, 4}; index 1 is the value 2.
        let mut rng = TestRandom {
            usizes: vec![1],
            ..Default::default()
        };
        assert_eq!(2, ValueSelector::InDomainRandom.select(core.store(), &x, &mut rng));
    }
}
