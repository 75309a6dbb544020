use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::TerminationCondition;

/// A [`TerminationCondition`] driven by an externally-set flag, for cooperative cancellation from
/// outside the search (another thread, a signal handler).
///
/// The search itself stays single-threaded; the flag is the only crossing point.
#[derive(Clone, Debug, Default)]
pub struct StopFlag {
    flag: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        StopFlag::default()
    }

    /// The handle to hand to whoever may request cancellation.
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    pub fn trip(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl TerminationCondition for StopFlag {
    fn should_stop(&mut self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
