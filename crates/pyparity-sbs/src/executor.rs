use std::fmt::Write as _;

use log::info;
use pyparity_error::Result;
use pyparity_gen::{GeneratedProgram, TestIndex};
use pyparity_interp::Interpreter;
use serde::Serialize;
use similar::TextDiff;

use crate::driver::{BatchResult, PreparedProgram, run_batch};
use crate::known_failures::KnownFailures;
use crate::observation::missing_sink;

pub const DEFAULT_BATCH_SIZE: usize = 250;

/// A program whose sinks differ between the two interpreters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub index: TestIndex,
    pub depth_bound: usize,
    pub source: String,
    pub reference: Vec<String>,
    pub subject: Vec<String>,
}

impl Divergence {
    pub fn unified_diff(&self) -> String {
        let reference = join_lines(&self.reference);
        let subject = join_lines(&self.subject);
        TextDiff::from_lines(&reference, &subject)
            .unified_diff()
            .context_radius(3)
            .header("reference", "subject")
            .to_string()
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        let _ = writeln!(text, "{line}");
    }
    text
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SbsReport {
    pub executed: usize,
    pub skipped: usize,
    pub divergences: Vec<Divergence>,
}

impl SbsReport {
    pub fn passed(&self) -> bool {
        self.divergences.is_empty()
    }
}

/// Runs generated programs under a reference and a subject interpreter and
/// compares what each observed.
pub struct SideBySide<'a> {
    reference: &'a Interpreter,
    subject: &'a Interpreter,
    known_failures: KnownFailures,
    batch_size: usize,
}

impl<'a> SideBySide<'a> {
    pub fn new(reference: &'a Interpreter, subject: &'a Interpreter) -> Self {
        Self {
            reference,
            subject,
            known_failures: KnownFailures::new(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_known_failures(mut self, known_failures: KnownFailures) -> Self {
        self.known_failures = known_failures;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn run(&self, programs: impl IntoIterator<Item = GeneratedProgram>) -> Result<SbsReport> {
        let mut report = SbsReport::default();
        let mut batch = Vec::with_capacity(self.batch_size);
        for program in programs {
            if self.known_failures.contains(program.index) {
                report.skipped += 1;
                continue;
            }
            batch.push(PreparedProgram::new(program));
            if batch.len() == self.batch_size {
                self.run_one_batch(&batch, &mut report)?;
                batch.clear();
            }
        }
        if !batch.is_empty() {
            self.run_one_batch(&batch, &mut report)?;
        }
        Ok(report)
    }

    fn run_one_batch(&self, batch: &[PreparedProgram], report: &mut SbsReport) -> Result<()> {
        let (first, last) = match (batch.first(), batch.last()) {
            (Some(first), Some(last)) => (first.program.index, last.program.index),
            _ => return Ok(()),
        };
        info!("running tests {first}..={last}");
        let reference = run_batch(self.reference, batch)?;
        let subject = run_batch(self.subject, batch)?;
        for prepared in batch {
            report.executed += 1;
            let reference_sink = sink(&reference, prepared);
            let subject_sink = sink(&subject, prepared);
            if reference_sink != subject_sink {
                report.divergences.push(Divergence {
                    index: prepared.program.index,
                    depth_bound: prepared.program.depth_bound,
                    source: prepared.function.clone(),
                    reference: reference_sink,
                    subject: subject_sink,
                });
            }
        }
        Ok(())
    }
}

fn sink(result: &BatchResult, prepared: &PreparedProgram) -> Vec<String> {
    match result.observations.get(&prepared.program.index) {
        Some(observation) => observation.sink_lines(&prepared.function),
        None => {
            let reason = result
                .failures
                .get(&prepared.program.index)
                .map_or("no observation reported", String::as_str);
            missing_sink(&prepared.function, reason)
        }
    }
}
