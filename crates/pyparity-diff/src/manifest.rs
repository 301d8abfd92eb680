use std::fs;
use std::io;
use std::path::Path;

use pyparity_error::{ParityError, ParseError, Result};
use pyparity_reflect::{ReflectOptions, TYPES_ONLY};
use serde::Deserialize;

pub const MANIFEST_FILE: &str = "manifest.toml";

/// Modules verified when the manifest does not name any.
pub const DEFAULT_TRACKED: &[&str] = &[
    TYPES_ONLY,
    "builtins",
    "_ast",
    "_bisect",
    "_codecs",
    "_collections",
    "_csv",
    "_functools",
    "_heapq",
    "_json",
    "_locale",
    "_random",
    "_sre",
    "_struct",
    "_warnings",
    "_weakref",
    "array",
    "binascii",
    "cmath",
    "datetime",
    "errno",
    "gc",
    "itertools",
    "marshal",
    "math",
    "operator",
    "signal",
    "sys",
    "time",
    "zlib",
];

/// Modules the subject is not expected to import yet.
pub const DEFAULT_ABSENT: &[&str] = &["_curses", "_multiprocessing", "_tkinter", "audioop", "readline"];

/// Adjustments to [`ReflectOptions`] read from `[reflect]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReflectOverrides {
    pub max_depth: Option<usize>,
    /// Names suppressed in addition to the built-in noise list.
    pub noise: Vec<String>,
}

/// `manifest.toml` in the baseline directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    pub tracked: Vec<String>,
    pub absent: Vec<String>,
    pub reflect: ReflectOverrides,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            tracked: DEFAULT_TRACKED.iter().map(|name| name.to_string()).collect(),
            absent: DEFAULT_ABSENT.iter().map(|name| name.to_string()).collect(),
            reflect: ReflectOverrides::default(),
        }
    }
}

impl Manifest {
    /// Reads `<dir>/manifest.toml`, falling back to the defaults when the
    /// file does not exist.
    pub fn load(dir: &Path) -> Result<Manifest> {
        let path = dir.join(MANIFEST_FILE);
        match fs::read_to_string(&path) {
            Ok(source) => {
                let manifest = Manifest::parse(&source)
                    .map_err(|error| ParityError::parse(path.display().to_string(), error))?;
                manifest.validate()?;
                Ok(manifest)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Manifest::default()),
            Err(err) => Err(ParityError::io(path, err)),
        }
    }

    pub fn parse(source: &str) -> std::result::Result<Manifest, ParseError> {
        toml::from_str(source).map_err(|err| {
            let error = ParseError::new(err.message());
            match err.span() {
                Some(span) => {
                    let (line, column) = line_col(source, span.start);
                    error.at(source, line, column)
                }
                None => error,
            }
        })
    }

    /// A module is either tracked or known to be absent, never both.
    pub fn validate(&self) -> Result<()> {
        match self.tracked.iter().find(|module| self.absent.contains(module)) {
            Some(module) => Err(ParityError::Config(format!(
                "{module} is listed as both tracked and absent"
            ))),
            None => Ok(()),
        }
    }

    pub fn reflect_options(&self) -> ReflectOptions {
        let mut options = ReflectOptions::default();
        if let Some(max_depth) = self.reflect.max_depth {
            options.max_depth = max_depth;
        }
        options.noise.extend(self.reflect.noise.iter().cloned());
        options
    }
}

fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before.chars().count(), |newline| before[newline + 1..].chars().count())
        + 1;
    (line, column)
}
