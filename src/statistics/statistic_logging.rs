//! Logging of statistics with a configurable prefix and closing line.
//!
//! The solver emits its headline numbers through [`log_statistic`]; nothing is written unless the
//! embedding driver configured the logging first, so library users who only consume the returned
//! statistics record pay nothing.

use std::fmt::Display;
use std::io::stdout;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::RwLock;

use convert_case::Case;
use convert_case::Casing;
use log::debug;

/// The options for statistic logging: the prefix put before every line, an optional closing line,
/// and an optional casing applied to statistic names.
pub struct StatisticOptions {
    statistic_prefix: &'static str,
    after_statistics: Option<&'static str>,
    statistics_casing: Option<Case>,
    statistics_writer: Box<dyn Write + Send + Sync>,
}

static STATISTIC_OPTIONS: OnceLock<RwLock<StatisticOptions>> = OnceLock::new();

/// Configure the logging of statistics; statistics are only written once this has been called.
///
/// Lines are written in the form `{PREFIX} {NAME}={VALUE}`.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        RwLock::from(StatisticOptions {
            statistic_prefix: prefix,
            after_statistics: after,
            statistics_casing: casing,
            statistics_writer: writer.unwrap_or(Box::new(stdout())),
        })
    });
}

/// Log one statistic, if logging has been configured.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(statistic_options_lock) = STATISTIC_OPTIONS.get() {
        if let Ok(mut statistic_options) = statistic_options_lock.write() {
            let name = if let Some(casing) = &statistic_options.statistics_casing {
                name.to_string().to_case(*casing)
            } else {
                name.to_string()
            };
            let prefix = statistic_options.statistic_prefix;
            if let Err(e) = writeln!(
                statistic_options.statistics_writer,
                "{prefix} {name}={value}"
            ) {
                debug!("could not write statistic: {e}");
            }
        }
    }
}

/// Log the closing line, if one was configured.
pub fn log_statistic_postfix() {
    if let Some(statistic_options_lock) = STATISTIC_OPTIONS.get() {
        if let Ok(mut statistic_options) = statistic_options_lock.write() {
            if let Some(postfix) = statistic_options.after_statistics {
                if let Err(e) = writeln!(statistic_options.statistics_writer, "{postfix}") {
                    debug!("could not write statistic: {e}");
                }
            }
        }
    }
}

/// Whether statistics will be written.
pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}
