//! Attribute-tree differences between two interpreters, and the baseline
//! files that pin them down.

mod differ;
mod manifest;
mod report;
mod session;
mod store;

pub use differ::{Delta, diff};
pub use manifest::{DEFAULT_ABSENT, DEFAULT_TRACKED, MANIFEST_FILE, Manifest, ReflectOverrides};
pub use report::{Report, Unavailable, header_name, significant_lines};
pub use session::{CheckSummary, ModuleDiff, ModuleVerdict};
pub use store::{BaselineStore, Verdict};
