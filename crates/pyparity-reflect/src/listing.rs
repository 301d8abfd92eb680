use std::collections::BTreeSet;

use pyparity_error::ParseError;

const INDENT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    pub depth: usize,
    pub name: String,
}

impl Record {
    pub fn new(depth: usize, name: impl Into<String>) -> Self {
        Self {
            depth,
            name: name.into(),
        }
    }
}

/// Depth-first, pre-order attribute tree rooted at a module name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    records: Vec<Record>,
}

impl Listing {
    /// Builds a listing from records, checking that the first sits at depth 0
    /// and no record is more than one level below its predecessor.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ParseError> {
        let mut previous: Option<usize> = None;
        for (position, record) in records.iter().enumerate() {
            let limit = previous.map_or(0, |depth| depth + 1);
            if record.depth > limit {
                return Err(ParseError::new(format!(
                    "record {} ('{}') skips a nesting level",
                    position + 1,
                    record.name
                )));
            }
            previous = Some(record.depth);
        }
        Ok(Self { records })
    }

    /// Parses walker output. Blank lines are skipped; indentation must be a
    /// multiple of two spaces.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut records = Vec::new();
        let mut previous: Option<usize> = None;
        for (number, line) in text.lines().enumerate() {
            let line_number = number + 1;
            if line.trim().is_empty() {
                continue;
            }
            let spaces = line.len() - line.trim_start_matches(' ').len();
            if spaces % INDENT != 0 {
                return Err(ParseError::new("indentation is not a multiple of two spaces")
                    .at(text, line_number, spaces + 1));
            }
            let depth = spaces / INDENT;
            let limit = previous.map_or(0, |depth| depth + 1);
            if depth > limit {
                return Err(
                    ParseError::new(format!("expected at most {limit} levels of indentation"))
                        .at(text, line_number, spaces + 1),
                );
            }
            let name = line[spaces..].trim_end();
            if name.starts_with(char::is_whitespace) {
                return Err(ParseError::new("unexpected whitespace in indentation")
                    .at(text, line_number, spaces + 1));
            }
            records.push(Record::new(depth, name));
            previous = Some(depth);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn root(&self) -> Option<&str> {
        self.records.first().map(|record| record.name.as_str())
    }

    /// True when the record at `position` has no children.
    pub fn is_leaf(&self, position: usize) -> bool {
        match (self.records.get(position), self.records.get(position + 1)) {
            (Some(record), Some(next)) => next.depth <= record.depth,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// The same tree with every group of siblings sorted by name.
    pub fn canonicalize(&self) -> Listing {
        let mut records = Vec::with_capacity(self.records.len());
        sort_siblings(&self.records, &mut records);
        Listing { records }
    }

    pub fn is_canonical(&self) -> bool {
        self.canonicalize() == *self
    }

    /// Dotted path of every record, the root included.
    pub fn paths(&self) -> BTreeSet<String> {
        let mut stack: Vec<&str> = Vec::new();
        let mut paths = BTreeSet::new();
        for record in &self.records {
            stack.truncate(record.depth);
            stack.push(&record.name);
            paths.insert(stack.join("."));
        }
        paths
    }

    /// The walker's textual form.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&" ".repeat(record.depth * INDENT));
            out.push_str(&record.name);
            out.push('\n');
        }
        out
    }
}

/// `records` is a run of siblings (at the depth of its first record) each
/// followed by its subtree.
fn sort_siblings(records: &[Record], out: &mut Vec<Record>) {
    let Some(first) = records.first() else {
        return;
    };
    let depth = first.depth;
    let mut groups: Vec<&[Record]> = Vec::new();
    let mut start = 0;
    for (position, record) in records.iter().enumerate().skip(1) {
        if record.depth <= depth {
            groups.push(&records[start..position]);
            start = position;
        }
    }
    groups.push(&records[start..]);
    groups.sort_by(|a, b| a[0].name.cmp(&b[0].name));
    for group in groups {
        out.push(group[0].clone());
        sort_siblings(&group[1..], out);
    }
}
