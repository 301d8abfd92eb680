use pyparity_gen::TestIndex;
use serde::{Deserialize, Serialize};

/// Marker every comparable line starts with.
pub const SAME: &str = "same";

/// Outcome of calling `test<N>()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionOutcome {
    /// Class name of the exception raised by definition or call, if any.
    pub exception: Option<String>,
    /// `repr` of the return value when the call returned normally.
    pub value: Option<String>,
    pub generator: bool,
    pub yielded: Vec<String>,
    pub log: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLevelOutcome {
    pub exception: Option<String>,
    pub log: String,
}

/// Everything one interpreter reported about one program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub index: TestIndex,
    pub function: FunctionOutcome,
    pub top_level: TopLevelOutcome,
}

impl Observation {
    /// Comparison lines: source, exception-or-value, log, yielded items,
    /// then the same for the top-level run.
    pub fn sink_lines(&self, source: &str) -> Vec<String> {
        let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
        let function = &self.function;
        match (&function.exception, &function.value) {
            (Some(exception), _) => lines.push(format!("{SAME} exception {exception}")),
            (None, _) if function.generator => lines.push(format!("{SAME} generator")),
            (None, Some(value)) => lines.push(format!("{SAME} value {value}")),
            (None, None) => lines.push(format!("{SAME} value")),
        }
        lines.push(format!("{SAME} log {}", function.log));
        for item in &function.yielded {
            lines.push(format!("{SAME} yield {item}"));
        }
        let top_level = &self.top_level;
        if let Some(exception) = &top_level.exception {
            lines.push(format!("{SAME} top-level exception {exception}"));
        }
        lines.push(format!("{SAME} top-level log {}", top_level.log));
        lines
    }
}

/// Sink for a program one side never reported on.
pub fn missing_sink(source: &str, reason: &str) -> Vec<String> {
    let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
    lines.push(format!("{SAME} no observation ({reason})"));
    lines
}
