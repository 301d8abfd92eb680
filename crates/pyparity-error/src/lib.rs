use std::fmt;
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A 1-based line/column position inside a parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub location: Option<Location>,
    pub line_text: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            line_text: None,
        }
    }

    /// Attaches a location and the offending line of `source`.
    pub fn at(mut self, source: &str, line: usize, column: usize) -> Self {
        self.location = Some(Location { line, column });
        self.line_text = line_text(source, line);
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (line {}, column {})", location.line, location.column)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Error)]
pub enum ParityError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}", format_parse_error(.error, .origin).trim_end())]
    Parse { origin: String, error: ParseError },
    #[error("unexpected output from {program}: {message}")]
    Protocol { program: String, message: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl ParityError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ParityError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(origin: impl Into<String>, error: ParseError) -> Self {
        ParityError::Parse {
            origin: origin.into(),
            error,
        }
    }
}

pub type Result<T, E = ParityError> = std::result::Result<T, E>;

pub fn format_parse_error(err: &ParseError, origin: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(&mut out, "error: {}", err.message);
    if let Some(location) = &err.location {
        let _ = writeln!(
            &mut out,
            "--> {}:{}:{}",
            origin, location.line, location.column
        );
        if let Some(line) = &err.line_text {
            let _ = writeln!(&mut out, " |");
            let _ = writeln!(&mut out, "{:>4} | {}", location.line, line);
            let mut caret = String::new();
            let col = location.column.saturating_sub(1);
            caret.push_str(&" ".repeat(col));
            caret.push('^');
            let _ = writeln!(&mut out, " | {}", caret);
        }
    }
    out
}

/// Converts a pest failure into a located [`ParseError`].
pub fn parse_error_from_pest<R: pest::RuleType>(err: pest::error::Error<R>, source: &str) -> ParseError {
    use pest::error::LineColLocation;
    let (line, column) = match err.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    ParseError::new(err.variant.message().into_owned()).at(source, line, column)
}

pub fn line_text(source: &str, line: usize) -> Option<String> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line - 1).map(|s| s.to_string())
}
