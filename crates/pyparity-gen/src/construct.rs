use std::fmt;
use std::str::FromStr;

use pyparity_fragment::Fragment;

/// Which slots of a two-slot construct receive the generated body. The
/// other slot gets `pass`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slots {
    Second,
    First,
    Both,
}

/// A compound statement the generator can nest bodies into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    For,
    While,
    TryExcept(Slots),
    TryFinally(Slots),
    /// `try: pass` with the body in both `except` and `else`.
    TryExceptElse,
    IfFalse,
    IfTrue,
    Def,
}

impl Construct {
    /// Declaration order; enumeration visits bodies in this order.
    pub const ALL: [Construct; 12] = [
        Construct::For,
        Construct::While,
        Construct::TryExcept(Slots::Second),
        Construct::TryExcept(Slots::First),
        Construct::TryExcept(Slots::Both),
        Construct::TryFinally(Slots::Second),
        Construct::TryFinally(Slots::First),
        Construct::TryFinally(Slots::Both),
        Construct::TryExceptElse,
        Construct::IfFalse,
        Construct::IfTrue,
        Construct::Def,
    ];

    pub fn is_loop(self) -> bool {
        matches!(self, Construct::For | Construct::While)
    }

    pub fn is_finally(self) -> bool {
        matches!(self, Construct::TryFinally(_))
    }

    pub fn is_try_or_catch(self) -> bool {
        matches!(self, Construct::TryExcept(_) | Construct::TryExceptElse)
    }

    /// Places `body` into this construct's slots.
    pub fn build(self, body: Fragment) -> Fragment {
        match self {
            Construct::For => Fragment::for_loop(body),
            Construct::While => Fragment::while_loop(body),
            Construct::TryExcept(slots) => {
                let (first, second) = fill(slots, body);
                Fragment::try_except(first, second)
            }
            Construct::TryFinally(slots) => {
                let (first, second) = fill(slots, body);
                Fragment::try_finally(first, second)
            }
            Construct::TryExceptElse => {
                Fragment::try_except_else(Fragment::Pass, body.clone(), body)
            }
            Construct::IfFalse => Fragment::if_const(false, body),
            Construct::IfTrue => Fragment::if_const(true, body),
            Construct::Def => Fragment::def(body),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Construct::For => "for",
            Construct::While => "while",
            Construct::TryExcept(Slots::Second) => "try-except-1",
            Construct::TryExcept(Slots::First) => "try-except-2",
            Construct::TryExcept(Slots::Both) => "try-except-3",
            Construct::TryFinally(Slots::Second) => "try-finally-1",
            Construct::TryFinally(Slots::First) => "try-finally-2",
            Construct::TryFinally(Slots::Both) => "try-finally-3",
            Construct::TryExceptElse => "try-except-else",
            Construct::IfFalse => "if-false",
            Construct::IfTrue => "if-true",
            Construct::Def => "def",
        }
    }
}

fn fill(slots: Slots, body: Fragment) -> (Fragment, Fragment) {
    match slots {
        Slots::Second => (Fragment::Pass, body),
        Slots::First => (body, Fragment::Pass),
        Slots::Both => (body.clone(), body),
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Construct {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Construct::ALL
            .into_iter()
            .find(|construct| construct.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Construct::ALL.iter().map(|c| c.name()).collect();
                format!("unknown construct '{s}' (expected one of: {})", names.join(", "))
            })
    }
}
