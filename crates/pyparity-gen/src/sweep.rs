use std::ops::RangeInclusive;

use log::debug;
use pyparity_fragment::{Fragment, LOG_VARIABLE, SourceWriter};

use crate::construct::Construct;
use crate::context::GenerationContext;
use crate::enumerate::Enumerator;

/// 1-based position of a program in its sweep.
pub type TestIndex = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProgram {
    pub index: TestIndex,
    pub depth_bound: usize,
    pub fragment: Fragment,
}

impl GeneratedProgram {
    pub fn function_name(&self) -> String {
        format!("test{}", self.index)
    }

    /// The fragment wrapped in `def test<N>():`, with `log` declared global.
    pub fn function_source(&self) -> String {
        let mut writer = SourceWriter::new();
        writer.write_line(&format!("def {}():", self.function_name()));
        writer.indent += 1;
        writer.write_line(&format!("global {LOG_VARIABLE}"));
        writer.write_fragment(&self.fragment);
        writer.finish()
    }

    pub fn top_level_source(&self) -> String {
        let mut writer = SourceWriter::new();
        writer.write_fragment(&self.fragment);
        writer.finish()
    }
}

/// Every program for each depth bound in turn, and within a bound for each
/// root in turn.
pub struct Sweep {
    roots: Vec<Construct>,
    bounds: RangeInclusive<usize>,
    bound: Option<usize>,
    root: usize,
    current: Option<Enumerator>,
    yield_state: u32,
    next_index: TestIndex,
}

impl Sweep {
    pub fn new(roots: Vec<Construct>, bounds: RangeInclusive<usize>) -> Self {
        let bound = if bounds.is_empty() || roots.is_empty() {
            None
        } else {
            Some(*bounds.start())
        };
        Self {
            roots,
            bounds,
            bound,
            root: 0,
            current: None,
            yield_state: 0,
            next_index: 1,
        }
    }

    fn advance(&mut self) -> bool {
        let Some(bound) = self.bound else {
            return false;
        };
        if let Some(done) = self.current.take() {
            self.yield_state = done.into_context().yield_state;
            self.root += 1;
            if self.root == self.roots.len() {
                self.root = 0;
                if bound == *self.bounds.end() {
                    self.bound = None;
                    return false;
                }
                self.bound = Some(bound + 1);
            }
        }
        let Some(bound) = self.bound else {
            return false;
        };
        let root = self.roots[self.root];
        debug!("enumerating {root} at depth bound {bound}");
        let ctx = GenerationContext::new(bound).with_yield_state(self.yield_state);
        self.current = Some(Enumerator::new(root, ctx));
        true
    }
}

impl Iterator for Sweep {
    type Item = GeneratedProgram;

    fn next(&mut self) -> Option<GeneratedProgram> {
        loop {
            if let Some(enumerator) = self.current.as_mut() {
                if let Some(fragment) = enumerator.next() {
                    let depth_bound = enumerator.context().max_depth;
                    let index = self.next_index;
                    self.next_index += 1;
                    return Some(GeneratedProgram {
                        index,
                        depth_bound,
                        fragment,
                    });
                }
            }
            if !self.advance() {
                return None;
            }
        }
    }
}
