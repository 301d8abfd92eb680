//! Side-by-side execution of generated programs.
//!
//! Every program runs as a function and at module level under two
//! interpreters. The driver records exception names, return values, yielded
//! items and the `log` trace; any difference between the two is reported.

mod driver;
mod executor;
mod known_failures;
mod observation;

pub use driver::{BatchResult, DRIVER, PreparedProgram, parse_observations, run_batch};
pub use executor::{DEFAULT_BATCH_SIZE, Divergence, SbsReport, SideBySide};
pub use known_failures::KnownFailures;
pub use observation::{FunctionOutcome, Observation, SAME, TopLevelOutcome, missing_sink};
