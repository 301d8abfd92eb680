use std::collections::BTreeSet;

use pyparity_reflect::{Listing, Record};

/// Paths present on one side only. `extra` is in A and not B, `missing` is
/// in B and not A.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub extra: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.extra.is_empty() && self.missing.is_empty()
    }

    /// The delta of the reversed comparison.
    pub fn swap(self) -> Delta {
        Delta {
            extra: self.missing,
            missing: self.extra,
        }
    }
}

/// Per-side ancestor segments, one per depth.
#[derive(Default)]
struct PathStack {
    segments: Vec<String>,
}

impl PathStack {
    fn enter(&mut self, depth: usize, segment: String) -> String {
        self.segments.truncate(depth);
        self.segments.push(segment);
        self.segments.join(".")
    }
}

/// Walks two listings in lockstep and collects the paths found on only one
/// side. Both listings are canonicalized first.
pub fn diff(a: &Listing, b: &Listing) -> Delta {
    let a = a.canonicalize();
    let b = b.canonicalize();
    let (a, b) = (a.records(), b.records());
    let mut delta = Delta::default();
    let mut stack_a = PathStack::default();
    let mut stack_b = PathStack::default();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        let (ra, rb) = (&a[i], &b[j]);
        if ra.depth == rb.depth {
            if ra.depth == 0 || ra.name == rb.name {
                let segment = shared_segment(ra, rb);
                stack_a.enter(ra.depth, segment.clone());
                stack_b.enter(rb.depth, segment);
                i += 1;
                j += 1;
            } else if ra.name < rb.name {
                delta.extra.insert(stack_a.enter(ra.depth, ra.name.clone()));
                i += 1;
            } else {
                delta.missing.insert(stack_b.enter(rb.depth, rb.name.clone()));
                j += 1;
            }
        } else if ra.depth > rb.depth {
            while i < a.len() && a[i].depth > rb.depth {
                delta.extra.insert(stack_a.enter(a[i].depth, a[i].name.clone()));
                i += 1;
            }
        } else {
            while j < b.len() && b[j].depth > ra.depth {
                delta.missing.insert(stack_b.enter(b[j].depth, b[j].name.clone()));
                j += 1;
            }
        }
    }
    for record in &a[i..] {
        delta.extra.insert(stack_a.enter(record.depth, record.name.clone()));
    }
    for record in &b[j..] {
        delta.missing.insert(stack_b.enter(record.depth, record.name.clone()));
    }
    delta
}

/// Segment used on both sides for a matched pair. Roots always pair up, so
/// differing root names are joined, in sorted order.
fn shared_segment(a: &Record, b: &Record) -> String {
    if a.name == b.name {
        a.name.clone()
    } else if a.name < b.name {
        format!("{}/{}", a.name, b.name)
    } else {
        format!("{}/{}", b.name, a.name)
    }
}
