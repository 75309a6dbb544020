use std::time::Duration;
use std::time::Instant;

/// Tracks the elapsed time since creation or the last call to [`Stopwatch::reset()`].
#[derive(Debug, Copy, Clone)]
pub struct Stopwatch {
    time_start: Instant,
}

impl Stopwatch {
    /// Create a new stopwatch which starts keeping track of time immediately.
    pub fn starting_now() -> Stopwatch {
        Stopwatch {
            time_start: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.time_start = Instant::now();
    }

    pub fn elapsed(&self) -> Duration {
        self.time_start.elapsed()
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}
