use std::fmt::Write as _;

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use pyparity_error::{ParseError, parse_error_from_pest};
use pyparity_reflect::Implementation;

use crate::differ::Delta;

#[derive(Parser)]
#[grammar = "baseline.pest"]
struct BaselineParser;

const ENTRY_INDENT: &str = "    ";

/// One side could not be reflected; recorded instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unavailable {
    pub label: String,
    pub reason: String,
}

impl Unavailable {
    /// Folds `reason` onto one line. A `#` would start a comment, so it is
    /// written as the escape `\x23`; nothing else is dropped.
    pub fn new(label: &str, reason: &str) -> Self {
        let reason = reason
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .replace('#', "\\x23");
        Self {
            label: header_name(label),
            reason,
        }
    }
}

/// An implementation name as report headers carry it: whitespace folded to
/// single spaces, `:` and `#` replaced by `_`.
pub fn header_name(name: &str) -> String {
    let name = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace([':', '#'], "_");
    if name.is_empty() {
        "unknown".to_string()
    } else {
        name
    }
}

/// Everything a baseline file records about one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub module: String,
    pub implementation: Implementation,
    pub unavailable: Vec<Unavailable>,
    /// `extra` should be removed from the implementation, `missing` still
    /// needs implementing.
    pub delta: Delta,
}

impl Report {
    pub fn title(&self) -> String {
        format!(
            "Implement rest of {} module ({} {})",
            self.module, self.implementation.name, self.implementation.version
        )
    }

    pub fn serialize(&self) -> String {
        let name = &self.implementation.name;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title());
        out.push('\n');
        if !self.unavailable.is_empty() {
            for marker in &self.unavailable {
                let _ = writeln!(
                    out,
                    "Module {} could not be reflected by {}: {}",
                    self.module, marker.label, marker.reason
                );
            }
            out.push('\n');
        }
        let _ = writeln!(
            out,
            "Complete list of module attributes {name} is still missing implementations for:"
        );
        for path in &self.delta.missing {
            let _ = writeln!(out, "{ENTRY_INDENT}{path}");
        }
        out.push('\n');
        let _ = writeln!(
            out,
            "Complete list of module attributes that should be removed from {name}:"
        );
        for path in &self.delta.extra {
            let _ = writeln!(out, "{ENTRY_INDENT}{path}");
        }
        out
    }

    pub fn parse(source: &str) -> Result<Report, ParseError> {
        let mut pairs = BaselineParser::parse(Rule::file, source)
            .map_err(|err| parse_error_from_pest(err, source))?;
        let file = pairs
            .next()
            .ok_or_else(|| ParseError::new("missing baseline root"))?;

        let mut module = None;
        let mut implementation = None;
        let mut unavailable = Vec::new();
        let mut delta = Delta::default();
        for pair in file.into_inner() {
            match pair.as_rule() {
                Rule::title => {
                    let mut inner = pair.into_inner();
                    let (Some(m), Some(name), Some(version)) =
                        (inner.next(), inner.next(), inner.next())
                    else {
                        return Err(ParseError::new("incomplete title line"));
                    };
                    module = Some(m.as_str().to_string());
                    implementation = Some(Implementation {
                        name: name.as_str().to_string(),
                        version: version.as_str().trim_end().to_string(),
                    });
                }
                Rule::marker => {
                    let mut inner = pair.into_inner().skip(1);
                    let (Some(label), Some(reason)) = (inner.next(), inner.next()) else {
                        return Err(ParseError::new("incomplete unavailability marker"));
                    };
                    unavailable.push(Unavailable {
                        label: label.as_str().to_string(),
                        reason: reason.as_str().trim_end().to_string(),
                    });
                }
                Rule::missing_section => delta.missing.extend(entries(pair)),
                Rule::extra_section => delta.extra.extend(entries(pair)),
                _ => {}
            }
        }

        match (module, implementation) {
            (Some(module), Some(implementation)) => Ok(Report {
                module,
                implementation,
                unavailable,
                delta,
            }),
            _ => Err(ParseError::new("baseline has no title line")),
        }
    }
}

fn entries(section: Pair<'_, Rule>) -> Vec<String> {
    section
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::entry)
        .flat_map(|entry| entry.into_inner())
        .filter(|pair| pair.as_rule() == Rule::path)
        .map(|path| path.as_str().to_string())
        .collect()
}

/// Lines that matter when comparing against a baseline: comments removed,
/// whitespace trimmed, blank lines dropped.
pub fn significant_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| match line.find('#') {
            Some(comment) => &line[..comment],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
