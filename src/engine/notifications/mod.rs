//! Event types, the per-mutation event sink, and the dynamic trigger lists.

mod domain_event;
mod event_sink;
mod watch_list;

pub use domain_event::DomainDelta;
pub use domain_event::DomainEvent;
pub(crate) use event_sink::EventSink;
pub(crate) use watch_list::WatchList;
pub use watch_list::Watchers;
