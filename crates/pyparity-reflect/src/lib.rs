//! Out-of-process reflection of a module's attribute tree.
//!
//! A walker script runs inside the interpreter being inspected and prints
//! every attribute it reaches, one per line, indented two spaces per level.
//! [`Listing`] parses that text back into `(depth, name)` records.

mod listing;
mod identify;
mod walker;

pub use listing::{Listing, Record};
pub use identify::{Implementation, identify_implementation, is_importable};
pub use walker::{
    DEFAULT_MAX_DEPTH, IGNORED_PATHS, LEAF_METHODS, NOISE_NAMES, PINNED_ATTRIBUTES, PINNED_PREFIX,
    ReflectOptions, Reflection, TYPES_ONLY, reflect, walker_script,
};
