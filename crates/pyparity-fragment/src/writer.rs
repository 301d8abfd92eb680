use std::fmt::Write as _;

use crate::fragment::Fragment;
use crate::{DUMP_EXC_INFO, LOG_VARIABLE};

/// Canonical tags appended to `log` as constructs are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Try,
    Except,
    Else,
    Finally,
    PreLoop,
    InLoop,
    PreIf,
    DeadBranch,
    LiveBranch,
    Pass,
    Break,
    Continue,
    Return,
    Yield,
    Raise,
    PreDefine,
}

impl LogTag {
    pub fn as_str(self) -> &'static str {
        match self {
            LogTag::Try => "try",
            LogTag::Except => "except",
            LogTag::Else => "else",
            LogTag::Finally => "finally",
            LogTag::PreLoop => "preloop",
            LogTag::InLoop => "inloop",
            LogTag::PreIf => "preif",
            LogTag::DeadBranch => "huh?",
            LogTag::LiveBranch => "true!",
            LogTag::Pass => "pass",
            LogTag::Break => "break",
            LogTag::Continue => "continue",
            LogTag::Return => "return",
            LogTag::Yield => "yield",
            LogTag::Raise => "raise",
            LogTag::PreDefine => "predefine",
        }
    }
}

/// Append-only Python source sink.
///
/// `unique` mints the suffix of synthesized `whilevar`/`func` names. It
/// starts at zero for every writer, so identifiers depend only on the
/// rendered tree.
pub struct SourceWriter {
    output: String,
    pub indent: usize,
    unique: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        Self::with_indent(0)
    }

    pub fn with_indent(indent: usize) -> Self {
        Self {
            output: String::new(),
            indent,
            unique: 0,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    pub fn write_line(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        let _ = writeln!(self.output, "{}", line);
    }

    pub fn write_fragment(&mut self, fragment: &Fragment) {
        match fragment {
            Fragment::TryFinally { body, finally } => {
                self.write_line("try:");
                self.write_suite(&[LogTag::Try], false, body);
                self.write_line("finally:");
                self.write_suite(&[LogTag::Finally], true, finally);
            }
            Fragment::TryExcept { body, handler } => {
                self.write_line("try:");
                self.write_suite(&[LogTag::Try], false, body);
                self.write_line("except:");
                self.write_suite(&[LogTag::Except], true, handler);
            }
            Fragment::TryExceptElse {
                body,
                handler,
                orelse,
            } => {
                self.write_line("try:");
                self.write_suite(&[LogTag::Try], false, body);
                self.write_line("except:");
                self.write_suite(&[LogTag::Except], true, handler);
                self.write_line("else:");
                self.write_suite(&[LogTag::Else], true, orelse);
            }
            Fragment::For { body } => {
                self.write_log(LogTag::PreLoop);
                self.write_line(&format!("for x{} in range(3):", self.indent));
                self.write_suite(&[LogTag::InLoop], false, body);
            }
            Fragment::While { body } => {
                let var = format!("whilevar{}_{}", self.indent, self.unique);
                self.unique += 1;
                self.write_log(LogTag::PreLoop);
                self.write_line(&format!("{var} = 0"));
                self.write_line(&format!("while {var} < 3:"));
                self.indent += 1;
                self.write_line(&format!("{var} += 1"));
                self.write_log(LogTag::InLoop);
                self.write_fragment(body);
                self.indent -= 1;
            }
            Fragment::If { condition, body } => {
                self.write_log(LogTag::PreIf);
                if *condition {
                    self.write_line("if True:");
                    self.write_suite(&[LogTag::LiveBranch], false, body);
                } else {
                    self.write_line("if False:");
                    self.write_suite(&[LogTag::DeadBranch], false, body);
                }
            }
            Fragment::Pass => {
                self.write_log(LogTag::Pass);
                self.write_line("pass");
            }
            Fragment::Break => {
                self.write_log(LogTag::Break);
                self.write_line("break");
            }
            Fragment::Continue => {
                self.write_log(LogTag::Continue);
                self.write_line("continue");
            }
            Fragment::Return(value) => {
                self.write_log(LogTag::Return);
                self.write_line(&format!("return {value}"));
            }
            Fragment::Yield(value) => {
                self.write_log(LogTag::Yield);
                self.write_line(&format!("yield {value}"));
            }
            Fragment::Raise(message) => {
                self.write_log(LogTag::Raise);
                self.write_line(&format!("raise Exception({})", quote(message)));
            }
            Fragment::Def { body } => {
                let name = format!("func{}_{}", self.indent, self.unique);
                self.unique += 1;
                self.write_log(LogTag::PreDefine);
                self.write_line(&format!("def {name}():"));
                self.indent += 1;
                self.write_line(&format!("global {LOG_VARIABLE}"));
                self.write_fragment(body);
                self.indent -= 1;
                self.write_line(&format!("{name}()"));
            }
        }
    }

    fn write_suite(&mut self, tags: &[LogTag], observe_exception: bool, body: &Fragment) {
        self.indent += 1;
        for tag in tags {
            self.write_log(*tag);
        }
        if observe_exception {
            self.write_line(&format!("{LOG_VARIABLE}+={DUMP_EXC_INFO}()"));
        }
        self.write_fragment(body);
        self.indent -= 1;
    }

    fn write_log(&mut self, tag: LogTag) {
        self.write_line(&format!("{LOG_VARIABLE}+=\"{}\"", tag.as_str()));
    }
}

impl Default for SourceWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
