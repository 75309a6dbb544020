use enumset::EnumSet;

use super::DomainDelta;
use super::DomainEvent;
use crate::containers::KeyedVec;
use crate::engine::variables::VarId;

/// Collects the events generated by domain mutations until the engine drains them to fire
/// triggers.
///
/// [`DomainEvent::Assign`] and [`DomainEvent::DomainChange`] carry no payload, so repeats within
/// one round coalesce. Bound and removal events carry a [`DomainDelta`] and are kept in order,
/// one entry per mutation.
#[derive(Default, Clone, Debug)]
pub(crate) struct EventSink {
    present: KeyedVec<VarId, EnumSet<DomainEvent>>,
    events: Vec<(VarId, DomainEvent, DomainDelta)>,
}

impl EventSink {
    pub(crate) fn grow(&mut self) {
        let _ = self.present.push(EnumSet::new());
    }

    pub(crate) fn event_occurred(&mut self, var: VarId, event: DomainEvent, delta: DomainDelta) {
        match event {
            DomainEvent::Assign | DomainEvent::DomainChange => {
                if self.present[var].insert(event) {
                    self.events.push((var, event, delta));
                }
            }
            DomainEvent::BoundsChange | DomainEvent::Removal => {
                self.events.push((var, event, delta));
            }
        }
    }

    pub(crate) fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Take the accumulated events, leaving the sink empty.
    pub(crate) fn drain(&mut self) -> Vec<(VarId, DomainEvent, DomainDelta)> {
        for &(var, event, _) in &self.events {
            let _ = self.present[var].remove(event);
        }
        std::mem::take(&mut self.events)
    }

    pub(crate) fn clear(&mut self) {
        let _ = self.drain();
    }
}
