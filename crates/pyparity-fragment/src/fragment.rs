use std::fmt;

/// How control statically leaves a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSink {
    Normal,
    Break,
    Continue,
    Return,
    Raise,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
    TryFinally {
        body: Box<Fragment>,
        finally: Box<Fragment>,
    },
    TryExcept {
        body: Box<Fragment>,
        handler: Box<Fragment>,
    },
    TryExceptElse {
        body: Box<Fragment>,
        handler: Box<Fragment>,
        orelse: Box<Fragment>,
    },
    For {
        body: Box<Fragment>,
    },
    While {
        body: Box<Fragment>,
    },
    If {
        condition: bool,
        body: Box<Fragment>,
    },
    Pass,
    Break,
    Continue,
    Return(u32),
    Yield(u32),
    Raise(String),
    Def {
        body: Box<Fragment>,
    },
}

/// Payload-free discriminant of a [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    TryFinally,
    TryExcept,
    TryExceptElse,
    For,
    While,
    IfTrue,
    IfFalse,
    Pass,
    Break,
    Continue,
    Return,
    Yield,
    Raise,
    Def,
}

impl Fragment {
    pub fn try_finally(body: Fragment, finally: Fragment) -> Self {
        Fragment::TryFinally {
            body: Box::new(body),
            finally: Box::new(finally),
        }
    }

    pub fn try_except(body: Fragment, handler: Fragment) -> Self {
        Fragment::TryExcept {
            body: Box::new(body),
            handler: Box::new(handler),
        }
    }

    pub fn try_except_else(body: Fragment, handler: Fragment, orelse: Fragment) -> Self {
        Fragment::TryExceptElse {
            body: Box::new(body),
            handler: Box::new(handler),
            orelse: Box::new(orelse),
        }
    }

    pub fn for_loop(body: Fragment) -> Self {
        Fragment::For {
            body: Box::new(body),
        }
    }

    pub fn while_loop(body: Fragment) -> Self {
        Fragment::While {
            body: Box::new(body),
        }
    }

    pub fn if_const(condition: bool, body: Fragment) -> Self {
        Fragment::If {
            condition,
            body: Box::new(body),
        }
    }

    pub fn def(body: Fragment) -> Self {
        Fragment::Def {
            body: Box::new(body),
        }
    }

    pub fn kind(&self) -> FragmentKind {
        match self {
            Fragment::TryFinally { .. } => FragmentKind::TryFinally,
            Fragment::TryExcept { .. } => FragmentKind::TryExcept,
            Fragment::TryExceptElse { .. } => FragmentKind::TryExceptElse,
            Fragment::For { .. } => FragmentKind::For,
            Fragment::While { .. } => FragmentKind::While,
            Fragment::If {
                condition: true, ..
            } => FragmentKind::IfTrue,
            Fragment::If {
                condition: false, ..
            } => FragmentKind::IfFalse,
            Fragment::Pass => FragmentKind::Pass,
            Fragment::Break => FragmentKind::Break,
            Fragment::Continue => FragmentKind::Continue,
            Fragment::Return(_) => FragmentKind::Return,
            Fragment::Yield(_) => FragmentKind::Yield,
            Fragment::Raise(_) => FragmentKind::Raise,
            Fragment::Def { .. } => FragmentKind::Def,
        }
    }

    /// Child bodies in rendering order.
    pub fn children(&self) -> Vec<&Fragment> {
        match self {
            Fragment::TryFinally { body, finally } => vec![&**body, &**finally],
            Fragment::TryExcept { body, handler } => vec![&**body, &**handler],
            Fragment::TryExceptElse {
                body,
                handler,
                orelse,
            } => vec![&**body, &**handler, &**orelse],
            Fragment::For { body }
            | Fragment::While { body }
            | Fragment::If { body, .. }
            | Fragment::Def { body } => vec![&**body],
            Fragment::Pass
            | Fragment::Break
            | Fragment::Continue
            | Fragment::Return(_)
            | Fragment::Yield(_)
            | Fragment::Raise(_) => Vec::new(),
        }
    }

    /// True iff some path through this fragment yields from the enclosing
    /// frame. A `yield` inside a nested `def` belongs to that function.
    pub fn may_suspend(&self) -> bool {
        match self {
            Fragment::Yield(_) => true,
            Fragment::Def { .. } => false,
            Fragment::If {
                condition: false, ..
            } => false,
            Fragment::TryExcept { body, handler } => {
                body.may_suspend() || (body.may_raise() && handler.may_suspend())
            }
            Fragment::TryExceptElse {
                body,
                handler,
                orelse,
            } => {
                body.may_suspend()
                    || (body.may_raise() && handler.may_suspend())
                    || (body.control_sink() == ControlSink::Normal && orelse.may_suspend())
            }
            other => other.children().into_iter().any(Fragment::may_suspend),
        }
    }

    fn may_raise(&self) -> bool {
        self.control_sink() == ControlSink::Raise
    }

    pub fn control_sink(&self) -> ControlSink {
        match self {
            Fragment::Pass | Fragment::Yield(_) => ControlSink::Normal,
            Fragment::Break => ControlSink::Break,
            Fragment::Continue => ControlSink::Continue,
            Fragment::Return(_) => ControlSink::Return,
            Fragment::Raise(_) => ControlSink::Raise,
            Fragment::For { body } | Fragment::While { body } => match body.control_sink() {
                sink @ (ControlSink::Return | ControlSink::Raise) => sink,
                ControlSink::Normal | ControlSink::Break | ControlSink::Continue => {
                    ControlSink::Normal
                }
            },
            Fragment::If {
                condition: true,
                body,
            } => body.control_sink(),
            Fragment::If {
                condition: false, ..
            } => ControlSink::Normal,
            Fragment::TryExcept { body, handler } => match body.control_sink() {
                ControlSink::Raise => handler.control_sink(),
                sink => sink,
            },
            Fragment::TryExceptElse {
                body,
                handler,
                orelse,
            } => match body.control_sink() {
                ControlSink::Raise => handler.control_sink(),
                ControlSink::Normal => orelse.control_sink(),
                sink => sink,
            },
            Fragment::TryFinally { body, finally } => match finally.control_sink() {
                ControlSink::Normal => body.control_sink(),
                sink => sink,
            },
            Fragment::Def { body } => match body.control_sink() {
                ControlSink::Raise if !body.may_suspend() => ControlSink::Raise,
                _ => ControlSink::Normal,
            },
        }
    }

    /// Visits every fragment in pre-order, passing the chain of ancestors.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Fragment, &[&'a Fragment])) {
        let mut ancestors = Vec::new();
        self.walk_inner(&mut ancestors, visit);
    }

    fn walk_inner<'a>(
        &'a self,
        ancestors: &mut Vec<&'a Fragment>,
        visit: &mut impl FnMut(&'a Fragment, &[&'a Fragment]),
    ) {
        visit(self, ancestors);
        ancestors.push(self);
        for child in self.children() {
            child.walk_inner(ancestors, visit);
        }
        ancestors.pop();
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::TryFinally { body, finally } => write!(f, "TryFinally({body}, {finally})"),
            Fragment::TryExcept { body, handler } => write!(f, "TryExcept({body}, {handler})"),
            Fragment::TryExceptElse {
                body,
                handler,
                orelse,
            } => write!(f, "TryExceptElse({body}, {handler}, {orelse})"),
            Fragment::For { body } => write!(f, "For({body})"),
            Fragment::While { body } => write!(f, "While({body})"),
            Fragment::If { condition, body } => {
                let name = if *condition { "IfTrue" } else { "IfFalse" };
                write!(f, "{name}({body})")
            }
            Fragment::Pass => write!(f, "Pass"),
            Fragment::Break => write!(f, "Break"),
            Fragment::Continue => write!(f, "Continue"),
            Fragment::Return(value) => write!(f, "Return({value})"),
            Fragment::Yield(value) => write!(f, "Yield({value})"),
            Fragment::Raise(message) => write!(f, "Raise({message:?})"),
            Fragment::Def { body } => write!(f, "Def({body})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loops_absorb_break_and_continue() {
        assert_eq!(
            Fragment::for_loop(Fragment::Break).control_sink(),
            ControlSink::Normal
        );
        assert_eq!(
            Fragment::while_loop(Fragment::Continue).control_sink(),
            ControlSink::Normal
        );
        assert_eq!(
            Fragment::for_loop(Fragment::Return(3)).control_sink(),
            ControlSink::Return
        );
    }

    #[test]
    fn finally_sink_overrides_body() {
        let fragment = Fragment::try_finally(Fragment::Raise("1".into()), Fragment::Return(2));
        assert_eq!(fragment.control_sink(), ControlSink::Return);

        let fragment = Fragment::try_finally(Fragment::Raise("1".into()), Fragment::Pass);
        assert_eq!(fragment.control_sink(), ControlSink::Raise);
    }

    #[test]
    fn handler_only_matters_when_body_raises() {
        let caught = Fragment::try_except(Fragment::Raise("1".into()), Fragment::Pass);
        assert_eq!(caught.control_sink(), ControlSink::Normal);

        let untouched = Fragment::try_except(Fragment::Pass, Fragment::Raise("1".into()));
        assert_eq!(untouched.control_sink(), ControlSink::Normal);
        assert!(!Fragment::try_except(Fragment::Pass, Fragment::Yield(1)).may_suspend());
        assert!(
            Fragment::try_except(Fragment::Raise("1".into()), Fragment::Yield(1)).may_suspend()
        );
    }

    #[test]
    fn else_body_runs_after_normal_try() {
        let fragment =
            Fragment::try_except_else(Fragment::Pass, Fragment::Yield(4), Fragment::Yield(4));
        assert!(fragment.may_suspend());
        assert_eq!(fragment.control_sink(), ControlSink::Normal);
    }

    #[test]
    fn nested_def_does_not_suspend_enclosing_frame() {
        let fragment = Fragment::def(Fragment::Yield(1));
        assert!(!fragment.may_suspend());
        assert_eq!(fragment.control_sink(), ControlSink::Normal);

        let raising = Fragment::def(Fragment::Raise("2".into()));
        assert_eq!(raising.control_sink(), ControlSink::Raise);
    }

    #[test]
    fn if_false_body_is_dead() {
        let fragment = Fragment::if_const(false, Fragment::Yield(1));
        assert!(!fragment.may_suspend());
        assert_eq!(fragment.kind(), FragmentKind::IfFalse);
        assert!(Fragment::if_const(true, Fragment::Yield(1)).may_suspend());
    }

    #[test]
    fn display_is_compact() {
        let fragment = Fragment::try_finally(Fragment::Pass, Fragment::for_loop(Fragment::Break));
        assert_eq!(fragment.to_string(), "TryFinally(Pass, For(Break))");
    }
}
