//! Conformance tooling for alternative Python implementations: exhaustive
//! side-by-side program runs and module attribute baselines.

pub use pyparity_diff as diff;
pub use pyparity_error as error;
pub use pyparity_fragment as fragment;
pub use pyparity_gen as generate;
pub use pyparity_interp as interp;
pub use pyparity_reflect as reflect;
pub use pyparity_sbs as sbs;

pub use pyparity_error::{ParityError, ParseError, Result};
