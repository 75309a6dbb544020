use std::io::Write;
use std::time::Duration;

use itertools::Itertools;

use super::NeighbourhoodContainer;
use crate::basic_types::Stopwatch;
use crate::statistics::log_statistic;

/// Result record of one inner neighbourhood search.
#[derive(Clone, Copy, Debug)]
pub struct NeighbourhoodStats {
    /// The objective value of the found solution; the incumbent value when none was found.
    pub new_value: i32,
    pub time_taken: Duration,
    pub solution_found: bool,
    /// Whether the authoritative per-iteration budget ran out.
    pub timeout_reached: bool,
    /// The largest neighbourhood size the search reached.
    pub highest_neighbourhood_size: i32,
}

/// One diversification phase of the hole puncher.
#[derive(Clone, Copy, Debug)]
pub struct ExplorationPhase {
    pub neighbourhood_size: i32,
    pub start_ms: u64,
    pub end_ms: u64,
}

/// The statistics record of one optimisation run.
///
/// Counters are per neighbourhood; the exploration arrays are per neighbourhood size. The
/// exploring flag carries phase-end attribution: when a new exploration begins before the
/// previous one recorded a find, the previous phase is closed at that moment.
#[derive(Debug)]
pub struct NeighbourhoodSearchStats {
    pub num_iterations: u64,
    num_activations: Vec<u64>,
    total_time: Vec<Duration>,
    num_positive_solutions: Vec<u64>,
    num_negative_solutions: Vec<u64>,
    num_no_solutions: Vec<u64>,
    num_timeouts: Vec<u64>,
    /// Improving solutions as `(objective value, elapsed ms)`.
    best_solutions: Vec<(i32, u64)>,
    num_better_solutions_from_exploration: u64,

    size_activations: Vec<u64>,
    size_successes: Vec<u64>,
    size_exploration_time: Vec<Duration>,
    exploration_phases: Vec<ExplorationPhase>,

    initial_objective_range: (i32, i32),
    value_of_initial_solution: i32,
    last_objective_value: i32,
    best_objective_value: i32,
    time_to_best_ms: u64,

    timer: Stopwatch,
    exploration_timer: Stopwatch,
    currently_exploring: bool,
    current_neighbourhood_size: i32,
}

impl NeighbourhoodSearchStats {
    pub fn new(
        num_neighbourhoods: usize,
        initial_objective_range: (i32, i32),
        max_neighbourhood_size: i32,
    ) -> Self {
        let sizes = max_neighbourhood_size.max(0) as usize;
        NeighbourhoodSearchStats {
            num_iterations: 0,
            num_activations: vec![0; num_neighbourhoods],
            total_time: vec![Duration::ZERO; num_neighbourhoods],
            num_positive_solutions: vec![0; num_neighbourhoods],
            num_negative_solutions: vec![0; num_neighbourhoods],
            num_no_solutions: vec![0; num_neighbourhoods],
            num_timeouts: vec![0; num_neighbourhoods],
            best_solutions: Vec::new(),
            num_better_solutions_from_exploration: 0,
            size_activations: vec![0; sizes],
            size_successes: vec![0; sizes],
            size_exploration_time: vec![Duration::ZERO; sizes],
            exploration_phases: Vec::new(),
            initial_objective_range,
            value_of_initial_solution: initial_objective_range.0,
            last_objective_value: initial_objective_range.0,
            best_objective_value: initial_objective_range.0,
            time_to_best_ms: 0,
            timer: Stopwatch::starting_now(),
            exploration_timer: Stopwatch::starting_now(),
            currently_exploring: false,
            current_neighbourhood_size: 0,
        }
    }

    pub fn start_timer(&mut self) {
        self.timer.reset();
    }

    pub fn total_time_ms(&self) -> u64 {
        self.timer.elapsed_millis()
    }

    pub fn best_objective_value(&self) -> i32 {
        self.best_objective_value
    }

    pub fn best_solutions(&self) -> &[(i32, u64)] {
        &self.best_solutions
    }

    pub fn exploration_phases(&self) -> &[ExplorationPhase] {
        &self.exploration_phases
    }

    pub fn set_value_of_initial_solution(&mut self, value: i32) {
        self.value_of_initial_solution = value;
        self.last_objective_value = value;
        self.best_objective_value = value;
        self.time_to_best_ms = self.total_time_ms();
    }

    /// Account one inner search against every neighbourhood the combination activated.
    pub fn report_iteration(&mut self, activated: &[usize], stats: &NeighbourhoodStats) {
        self.num_iterations += 1;
        for &nh in activated {
            self.num_activations[nh] += 1;
            self.total_time[nh] += stats.time_taken;
            self.num_timeouts[nh] += stats.timeout_reached as u64;
            if stats.solution_found {
                if stats.new_value > self.last_objective_value {
                    self.num_positive_solutions[nh] += 1;
                } else {
                    self.num_negative_solutions[nh] += 1;
                }
                self.last_objective_value = stats.new_value;
            } else {
                self.num_no_solutions[nh] += 1;
            }

            if self.last_objective_value > self.best_objective_value {
                self.best_objective_value = self.last_objective_value;
                self.time_to_best_ms = self.total_time_ms();
                self.best_solutions
                    .push((self.best_objective_value, self.time_to_best_ms));
            }
        }
    }

    /// Begin a diversification phase at `neighbourhood_size`; closes a still-open previous phase.
    pub fn start_exploration(&mut self, neighbourhood_size: i32) {
        assert!(
            neighbourhood_size >= 1 && neighbourhood_size as usize <= self.size_activations.len(),
            "contract violation: exploration size {neighbourhood_size} outside [1, {}]",
            self.size_activations.len()
        );

        if self.currently_exploring {
            self.close_exploration_phase();
        }
        self.currently_exploring = true;
        self.exploration_timer.reset();
        self.current_neighbourhood_size = neighbourhood_size;
        self.size_activations[neighbourhood_size as usize - 1] += 1;
        let now = self.total_time_ms();
        self.exploration_phases.push(ExplorationPhase {
            neighbourhood_size,
            start_ms: now,
            end_ms: now,
        });
    }

    /// A solution was reported by the inner search; attribute it to the open exploration phase
    /// when it beats the incumbent.
    pub fn found_solution(&mut self, value: i32) {
        if self.currently_exploring && value > self.best_objective_value {
            self.size_successes[self.current_neighbourhood_size as usize - 1] += 1;
            self.num_better_solutions_from_exploration += 1;
            self.close_exploration_phase();
        }
    }

    /// The hill climber declared a local optimum.
    pub fn notify_end_climb(&mut self) {
        if self.currently_exploring {
            self.close_exploration_phase();
        }
    }

    fn close_exploration_phase(&mut self) {
        self.size_exploration_time[self.current_neighbourhood_size as usize - 1] +=
            self.exploration_timer.elapsed();
        let total_time_ms = self.total_time_ms();
        if let Some(phase) = self.exploration_phases.last_mut() {
            phase.end_ms = total_time_ms;
        }
        self.currently_exploring = false;
    }

    /// Mirror the headline numbers through the statistic log.
    pub fn log_statistics(&self) {
        log_statistic("numberIterations", self.num_iterations);
        log_statistic("initialSolutionValue", self.value_of_initial_solution);
        log_statistic("bestSolutionValue", self.best_objective_value);
        log_statistic("timeToBestSolutionMs", self.time_to_best_ms);
        log_statistic("totalTimeMs", self.total_time_ms());
        log_statistic(
            "numberExplorationPhases",
            self.exploration_phases.len(),
        );
        log_statistic(
            "betterSolutionsFromExploration",
            self.num_better_solutions_from_exploration,
        );
    }

    /// Render the full human-readable report.
    pub fn write_report(
        &self,
        writer: &mut impl Write,
        nhc: &NeighbourhoodContainer,
    ) -> std::io::Result<()> {
        const INDENT: &str = "    ";

        writeln!(writer, "Search stats:")?;
        writeln!(writer, "Number iterations: {}", self.num_iterations)?;
        writeln!(
            writer,
            "Initial objective range: [{}, {}]",
            self.initial_objective_range.0, self.initial_objective_range.1
        )?;
        writeln!(
            writer,
            "Most recent objective value: {}",
            self.last_objective_value
        )?;
        writeln!(
            writer,
            "Best objective value: {}",
            self.best_objective_value
        )?;
        writeln!(
            writer,
            "Time till best solution: {} (ms)",
            self.time_to_best_ms
        )?;
        writeln!(writer, "Total time: {} (ms)", self.total_time_ms())?;

        for (index, neighbourhood) in nhc.neighbourhoods().iter().enumerate() {
            let activations = self.num_activations[index];
            let average_ms = if activations > 0 {
                self.total_time[index].as_millis() as u64 / activations
            } else {
                0
            };
            writeln!(writer, "Neighbourhood: {}", neighbourhood.name)?;
            writeln!(writer, "{INDENT}Number activations: {activations}")?;
            writeln!(
                writer,
                "{INDENT}Total time: {} (ms)",
                self.total_time[index].as_millis()
            )?;
            writeln!(writer, "{INDENT}Average time per activation: {average_ms} (ms)")?;
            writeln!(
                writer,
                "{INDENT}Number positive solutions: {}",
                self.num_positive_solutions[index]
            )?;
            writeln!(
                writer,
                "{INDENT}Number negative solutions: {}",
                self.num_negative_solutions[index]
            )?;
            writeln!(
                writer,
                "{INDENT}Number no solutions: {}",
                self.num_no_solutions[index]
            )?;
            writeln!(writer, "{INDENT}Number timeouts: {}", self.num_timeouts[index])?;
        }

        writeln!(writer, "History of best solutions found:")?;
        writeln!(
            writer,
            "{}",
            self.best_solutions
                .iter()
                .map(|(value, time)| format!("Value: {value} Time: {time}"))
                .join("\n")
        )?;

        writeln!(writer, "Stats of explorations:")?;
        for index in 0..self.size_activations.len() {
            writeln!(writer, "Neighbourhood size {}:", index + 1)?;
            writeln!(writer, "{INDENT}Activations: {}", self.size_activations[index])?;
            writeln!(writer, "{INDENT}Successes: {}", self.size_successes[index])?;
            writeln!(
                writer,
                "{INDENT}Time spent: {} (ms)",
                self.size_exploration_time[index].as_millis()
            )?;
        }

        writeln!(writer, "Exploration phases:")?;
        for (index, phase) in self.exploration_phases.iter().enumerate() {
            writeln!(writer, "Phase {}", index + 1)?;
            writeln!(writer, "{INDENT}Start time: {} (ms)", phase.start_ms)?;
            writeln!(writer, "{INDENT}End time: {} (ms)", phase.end_ms)?;
            writeln!(
                writer,
                "{INDENT}Neighbourhood size: {}",
                phase.neighbourhood_size
            )?;
        }

        Ok(())
    }
}
