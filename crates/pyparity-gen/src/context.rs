use crate::construct::Construct;

/// Traversal state threaded through enumeration.
///
/// `yield_state` only ever grows; it supplies the literal carried by the
/// `raise`/`return`/`yield` leaves and survives across the enumerators of a
/// sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub depth: usize,
    pub max_depth: usize,
    pub loops: usize,
    pub finallies: usize,
    pub try_or_catch: usize,
    pub yield_state: u32,
}

impl GenerationContext {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
            loops: 0,
            finallies: 0,
            try_or_catch: 0,
            yield_state: 0,
        }
    }

    pub fn with_yield_state(mut self, yield_state: u32) -> Self {
        self.yield_state = yield_state;
        self
    }

    pub fn enter(&mut self, construct: Construct) {
        self.yield_state += 1;
        self.depth += 1;
        if construct.is_loop() {
            self.loops += 1;
        }
        if construct.is_finally() {
            self.finallies += 1;
        }
        if construct.is_try_or_catch() {
            self.try_or_catch += 1;
        }
    }

    pub fn leave(&mut self, construct: Construct) {
        self.depth -= 1;
        if construct.is_loop() {
            self.loops -= 1;
        }
        if construct.is_finally() {
            self.finallies -= 1;
        }
        if construct.is_try_or_catch() {
            self.try_or_catch -= 1;
        }
    }

    /// Past the bound, a construct's only body is `pass`.
    pub fn cut_off(&self) -> bool {
        self.depth > self.max_depth
    }
}

/// Anything that can fill a body slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Candidate {
    Construct(Construct),
    Break,
    Continue,
    Raise,
    Return,
    Yield,
}

impl Candidate {
    /// Bodies tried before the leaves, in declaration order.
    pub const BODIES: [Candidate; 14] = [
        Candidate::Construct(Construct::ALL[0]),
        Candidate::Construct(Construct::ALL[1]),
        Candidate::Construct(Construct::ALL[2]),
        Candidate::Construct(Construct::ALL[3]),
        Candidate::Construct(Construct::ALL[4]),
        Candidate::Construct(Construct::ALL[5]),
        Candidate::Construct(Construct::ALL[6]),
        Candidate::Construct(Construct::ALL[7]),
        Candidate::Construct(Construct::ALL[8]),
        Candidate::Construct(Construct::ALL[9]),
        Candidate::Construct(Construct::ALL[10]),
        Candidate::Construct(Construct::ALL[11]),
        Candidate::Break,
        Candidate::Continue,
    ];

    /// Trailing leaves of every body list.
    pub const LEAVES: [Candidate; 3] = [Candidate::Raise, Candidate::Return, Candidate::Yield];
}

/// Whether `candidate` may appear as a body under `ctx`.
pub fn admissible(candidate: Candidate, ctx: &GenerationContext) -> bool {
    match candidate {
        Candidate::Break => ctx.loops > 0,
        Candidate::Continue => ctx.loops > 0 && ctx.finallies == 0,
        Candidate::Yield => ctx.finallies == 0,
        Candidate::Construct(_) | Candidate::Raise | Candidate::Return => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::Slots;

    #[test]
    fn break_needs_an_enclosing_loop() {
        let mut ctx = GenerationContext::new(2);
        assert!(!admissible(Candidate::Break, &ctx));
        ctx.enter(Construct::While);
        assert!(admissible(Candidate::Break, &ctx));
        assert!(admissible(Candidate::Continue, &ctx));
    }

    #[test]
    fn finally_blocks_continue_and_yield() {
        let mut ctx = GenerationContext::new(2);
        ctx.enter(Construct::For);
        ctx.enter(Construct::TryFinally(Slots::Both));
        assert!(admissible(Candidate::Break, &ctx));
        assert!(!admissible(Candidate::Continue, &ctx));
        assert!(!admissible(Candidate::Yield, &ctx));
        ctx.leave(Construct::TryFinally(Slots::Both));
        assert!(admissible(Candidate::Continue, &ctx));
        assert!(admissible(Candidate::Yield, &ctx));
    }

    #[test]
    fn leaving_restores_counters_but_not_yield_state() {
        let mut ctx = GenerationContext::new(1);
        ctx.enter(Construct::TryExceptElse);
        ctx.leave(Construct::TryExceptElse);
        assert_eq!(ctx.depth, 0);
        assert_eq!(ctx.try_or_catch, 0);
        assert_eq!(ctx.yield_state, 1);
    }
}
