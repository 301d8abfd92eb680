//! Exhaustive enumeration of control-flow programs under a depth bound.

mod construct;
mod context;
mod enumerate;
mod sweep;

pub use construct::{Construct, Slots};
pub use context::{Candidate, GenerationContext, admissible};
pub use enumerate::Enumerator;
pub use sweep::{GeneratedProgram, Sweep, TestIndex};
