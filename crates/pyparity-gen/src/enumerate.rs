use pyparity_fragment::Fragment;

use crate::construct::Construct;
use crate::context::{Candidate, GenerationContext, admissible};

/// Demand-driven walk of every program rooted at one construct.
///
/// Each frame on the stack is a construct that has been entered and is
/// handing out bodies. A body produced by the top frame is wrapped by every
/// frame below it on the way out, so `next()` yields complete trees.
pub struct Enumerator {
    ctx: GenerationContext,
    stack: Vec<Frame>,
}

struct Frame {
    construct: Construct,
    phase: Phase,
}

#[derive(Clone, Copy)]
enum Phase {
    Cutoff,
    Bodies { next: usize },
    Leaves { next: usize },
}

enum Step {
    Descend(Construct),
    Emit(Fragment),
    Exhausted,
}

impl Enumerator {
    pub fn new(root: Construct, ctx: GenerationContext) -> Self {
        let mut enumerator = Self {
            ctx,
            stack: Vec::new(),
        };
        enumerator.push(root);
        enumerator
    }

    /// Context after the last program; carries `yield_state` forward.
    pub fn into_context(self) -> GenerationContext {
        self.ctx
    }

    pub fn context(&self) -> &GenerationContext {
        &self.ctx
    }

    fn push(&mut self, construct: Construct) {
        self.ctx.enter(construct);
        let phase = if self.ctx.cut_off() {
            Phase::Cutoff
        } else {
            Phase::Bodies { next: 0 }
        };
        self.stack.push(Frame { construct, phase });
    }

    fn pop(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.ctx.leave(frame.construct);
        }
    }

    fn step(&mut self) -> Option<Step> {
        let ctx = &self.ctx;
        let frame = self.stack.last_mut()?;
        loop {
            match frame.phase {
                Phase::Cutoff => {
                    frame.phase = Phase::Leaves { next: 0 };
                    return Some(Step::Emit(Fragment::Pass));
                }
                Phase::Bodies { next } => {
                    let Some(candidate) = Candidate::BODIES.get(next).copied() else {
                        frame.phase = Phase::Leaves { next: 0 };
                        continue;
                    };
                    frame.phase = Phase::Bodies { next: next + 1 };
                    if !admissible(candidate, ctx) {
                        continue;
                    }
                    return Some(match candidate {
                        Candidate::Construct(construct) => Step::Descend(construct),
                        Candidate::Break => Step::Emit(Fragment::Break),
                        Candidate::Continue => Step::Emit(Fragment::Continue),
                        Candidate::Raise | Candidate::Return | Candidate::Yield => continue,
                    });
                }
                Phase::Leaves { next } => {
                    let Some(candidate) = Candidate::LEAVES.get(next).copied() else {
                        return Some(Step::Exhausted);
                    };
                    frame.phase = Phase::Leaves { next: next + 1 };
                    if !admissible(candidate, ctx) {
                        continue;
                    }
                    let value = ctx.yield_state;
                    return Some(Step::Emit(match candidate {
                        Candidate::Raise => Fragment::Raise(value.to_string()),
                        Candidate::Return => Fragment::Return(value),
                        Candidate::Yield => Fragment::Yield(value),
                        Candidate::Construct(_) | Candidate::Break | Candidate::Continue => {
                            continue;
                        }
                    }));
                }
            }
        }
    }

    fn wrap(&self, body: Fragment) -> Fragment {
        self.stack
            .iter()
            .rev()
            .fold(body, |inner, frame| frame.construct.build(inner))
    }
}

impl Iterator for Enumerator {
    type Item = Fragment;

    fn next(&mut self) -> Option<Fragment> {
        loop {
            match self.step()? {
                Step::Descend(construct) => self.push(construct),
                Step::Emit(body) => return Some(self.wrap(body)),
                Step::Exhausted => self.pop(),
            }
        }
    }
}
