use std::fmt;

use log::debug;
use pyparity_error::{ParityError, Result};
use pyparity_interp::Interpreter;

const IMPLEMENTATION: &str = r#"
import sys
implementation = getattr(sys, 'implementation', None)
name = implementation.name if implementation is not None else sys.subversion[0].lower()
sys.stdout.write('%s %s\n' % (name, sys.version.split()[0]))
"#;

const IMPORTABLE: &str = "import sys; __import__(sys.argv[1])";

/// `sys.implementation.name` and the version string of an interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

pub fn identify_implementation(interpreter: &Interpreter) -> Result<Implementation> {
    let line = interpreter.query(IMPLEMENTATION)?;
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(version), None) => Ok(Implementation {
            name: name.to_string(),
            version: version.to_string(),
        }),
        _ => Err(ParityError::Protocol {
            program: interpreter.display_name(),
            message: format!("unexpected implementation line {line:?}"),
        }),
    }
}

/// Whether `module` imports cleanly under `interpreter`.
pub fn is_importable(interpreter: &Interpreter, module: &str) -> Result<bool> {
    let output = interpreter.run_script(IMPORTABLE, [module], None)?;
    if output.timed_out {
        return Err(ParityError::Protocol {
            program: interpreter.display_name(),
            message: format!(
                "timed out importing {module} after {}s",
                interpreter.timeout().as_secs()
            ),
        });
    }
    debug!(
        "{module} importable under {}: {}",
        interpreter.display_name(),
        output.success()
    );
    Ok(output.success())
}
