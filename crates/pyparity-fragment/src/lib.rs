//! Python program fragments produced by the combinatorial generator.
//!
//! A [`Fragment`] is a tree of statements. Each node knows how to render
//! itself through a [`SourceWriter`], emitting the `log` side channel that
//! the side-by-side executor reads back after a run.

mod fragment;
mod writer;

pub use fragment::{ControlSink, Fragment, FragmentKind};
pub use writer::{LogTag, SourceWriter};

/// Name of the module-global string every rendered construct appends to.
pub const LOG_VARIABLE: &str = "log";

/// Helper called in exception-observing positions; defined by the driver.
pub const DUMP_EXC_INFO: &str = "dump_exc_info";
