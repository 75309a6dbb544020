use std::time::Duration;

/// The per-iteration bundle handed to the inner neighbourhood search.
#[derive(Clone, Copy, Debug)]
pub struct SearchParams {
    /// The combination to activate.
    pub combination: usize,
    /// Per-iteration wall-clock budget.
    pub time_limit: Duration,
    /// Per-iteration backtrack budget.
    pub backtrack_limit: u64,
    /// Which of the two budgets is authoritative; the other is not enforced.
    pub backtrack_instead_of_time_limit: bool,
    /// The neighbourhood size to search at (the starting size in hill-climbing mode).
    pub neighbourhood_size: i32,
    /// Exploration probes exactly `neighbourhood_size`; the hill-climbing mode escalates from it
    /// while the deviation domain and the budget allow.
    pub exploration: bool,
}
