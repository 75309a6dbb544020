use std::io::BufRead;
use std::io::Write;

use log::warn;

use crate::optimisation::NeighbourhoodContainer;
use crate::optimisation::NeighbourhoodStats;

/// Asks an external collaborator which combination to activate.
///
/// Prompts on stderr and reads the answer from stdin; outcomes are echoed back after every
/// iteration so the collaborator can steer.
#[derive(Debug, Default)]
pub(crate) struct InteractiveSelection;

impl InteractiveSelection {
    pub(crate) fn select(&mut self, nhc: &NeighbourhoodContainer) -> usize {
        let stdin = std::io::stdin();
        loop {
            eprint!(
                "choose a combination to activate [0..{}): ",
                nhc.num_combinations()
            );
            let _ = std::io::stderr().flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => {
                    let fallback = nhc
                        .enabled_combinations()
                        .next()
                        .expect("no combination is enabled");
                    warn!("no interactive input available, activating combination {fallback}");
                    return fallback;
                }
                Ok(_) => {}
            }

            match line.trim().parse::<usize>() {
                Ok(choice)
                    if choice < nhc.num_combinations() && nhc.is_combination_enabled(choice) =>
                {
                    return choice;
                }
                _ => eprintln!("not an enabled combination: {}", line.trim()),
            }
        }
    }

    pub(crate) fn update_stats(&mut self, combination: usize, stats: &NeighbourhoodStats) {
        eprintln!(
            "combination {combination}: solutionFound={} newValue={} timeTaken={}ms timeout={}",
            stats.solution_found,
            stats.new_value,
            stats.time_taken.as_millis(),
            stats.timeout_reached,
        );
    }
}
