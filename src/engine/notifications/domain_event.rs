use std::fmt::Display;

use enumset::EnumSetType;

/// The kinds of events a domain mutation can generate.
///
/// A tightened bound fires [`BoundsChange`](DomainEvent::BoundsChange) together with
/// [`DomainChange`](DomainEvent::DomainChange); punching a hole fires
/// [`Removal`](DomainEvent::Removal) together with [`DomainChange`](DomainEvent::DomainChange);
/// collapsing to a single value additionally fires [`Assign`](DomainEvent::Assign). Removal
/// subscriptions may carry a value filter so a trigger only fires for one particular value.
#[derive(Debug, EnumSetType, Hash)]
pub enum DomainEvent {
    /// The domain collapsed to a single value.
    Assign,
    /// The lower or upper bound tightened.
    BoundsChange,
    /// Any value left the domain.
    DomainChange,
    /// A specific inner value was removed.
    Removal,
}

impl Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::Assign => write!(f, "[Event:Assign]"),
            DomainEvent::BoundsChange => write!(f, "[Event:Bounds]"),
            DomainEvent::DomainChange => write!(f, "[Event:Domain]"),
            DomainEvent::Removal => write!(f, "[Event:Remove]"),
        }
    }
}

/// An opaque record of what a single mutation did to a domain.
///
/// Produced by the mutators; a propagator that holds a mapped handle projects the delta into its
/// own view with [`VarRef::domain_change`](crate::engine::variables::VarRef::domain_change)
/// before interpreting it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DomainDelta {
    lower_shift: i32,
    upper_shift: i32,
    removed: Option<i32>,
}

impl DomainDelta {
    /// A delta for a bound tightening: the lower bound rose by `lower_shift` and the upper bound
    /// fell by `upper_shift` (both non-negative).
    pub(crate) fn bounds(lower_shift: i32, upper_shift: i32) -> Self {
        DomainDelta {
            lower_shift,
            upper_shift,
            removed: None,
        }
    }

    /// A delta for the removal of a single inner value.
    pub(crate) fn removal(value: i32) -> Self {
        DomainDelta {
            lower_shift: 0,
            upper_shift: 0,
            removed: Some(value),
        }
    }

    /// How much the lower bound rose.
    pub fn lower_shift(&self) -> i32 {
        self.lower_shift
    }

    /// How much the upper bound fell.
    pub fn upper_shift(&self) -> i32 {
        self.upper_shift
    }

    /// The removed value, for removal deltas.
    pub fn removed_value(&self) -> Option<i32> {
        self.removed
    }

    /// Swap the roles of the two bound shifts; used when projecting through an order-reversing
    /// mapper.
    pub(crate) fn flipped(self) -> Self {
        DomainDelta {
            lower_shift: self.upper_shift,
            upper_shift: self.lower_shift,
            removed: self.removed,
        }
    }

    pub(crate) fn scaled(self, magnitude: i32, map_removed: impl Fn(i32) -> i32) -> Self {
        DomainDelta {
            lower_shift: self.lower_shift * magnitude,
            upper_shift: self.upper_shift * magnitude,
            removed: self.removed.map(map_removed),
        }
    }
}
