use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use pest::Parser;
use pest_derive::Parser;
use pyparity_error::{ParityError, ParseError, Result, parse_error_from_pest};
use pyparity_gen::TestIndex;

#[derive(Parser)]
#[grammar = "known_failures.pest"]
struct KnownFailuresParser;

/// Test indices to skip. Keyed by position in the sweep, so a list only
/// makes sense for the roots and depth range it was recorded against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownFailures {
    indices: BTreeSet<TestIndex>,
}

impl KnownFailures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut pairs = KnownFailuresParser::parse(Rule::file, source)
            .map_err(|err| parse_error_from_pest(err, source))?;
        let file = pairs
            .next()
            .ok_or_else(|| ParseError::new("missing known-failure list"))?;
        let mut indices = BTreeSet::new();
        for pair in file.into_inner() {
            if pair.as_rule() != Rule::index {
                continue;
            }
            let (line, column) = pair.line_col();
            let index = pair.as_str().parse::<TestIndex>().map_err(|err| {
                ParseError::new(format!("invalid test index: {err}")).at(source, line, column)
            })?;
            indices.insert(index);
        }
        Ok(Self { indices })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|err| ParityError::io(path, err))?;
        Self::parse(&source).map_err(|err| ParityError::parse(path.display().to_string(), err))
    }

    pub fn contains(&self, index: TestIndex) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TestIndex> + '_ {
        self.indices.iter().copied()
    }
}

impl FromIterator<TestIndex> for KnownFailures {
    fn from_iter<I: IntoIterator<Item = TestIndex>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}
