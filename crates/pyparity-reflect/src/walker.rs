use log::{debug, info};
use pyparity_error::{ParityError, Result};
use pyparity_interp::{Interpreter, list_literal, string_literal};

use crate::listing::Listing;

pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Pseudo-module holding the builtin types.
pub const TYPES_ONLY: &str = "types_only";

/// Attributes listed but never descended into; following them floods the
/// listing with interpreter internals.
pub const NOISE_NAMES: &[&str] = &[
    "__builtins__",
    "_Printer__setup",
    "im_class",
    "_Printer__name",
    "func_code",
    "func_dict",
    "func_globals",
];

/// Method-like names shared by every str and number; leaves past level two.
pub const LEAF_METHODS: &[&str] = &[
    "capitalize",
    "center",
    "count",
    "decode",
    "encode",
    "endswith",
    "expandtabs",
    "find",
    "index",
    "isalnum",
    "isalpha",
    "isdigit",
    "islower",
    "isspace",
    "istitle",
    "isupper",
    "join",
    "ljust",
    "lower",
    "lstrip",
    "partition",
    "replace",
    "rfind",
    "rindex",
    "rjust",
    "rpartition",
    "rsplit",
    "rstrip",
    "split",
    "splitlines",
    "startswith",
    "strip",
    "swapcase",
    "title",
    "translate",
    "upper",
    "zfill",
    "denominator",
    "numerator",
    "imag",
    "conjugate",
    "real",
];

/// Dotted paths that are listed but never reflected into.
pub const IGNORED_PATHS: &[&str] = &["builtins.print", "__builtin__.print"];

/// Under any path starting with this prefix, the attributes below are leaves.
pub const PINNED_PREFIX: &str = "datetime";
pub const PINNED_ATTRIBUTES: &[&str] = &["min", "max", "resolution"];

const UNAVAILABLE_MARKER: &str = "!unavailable";
const UNAVAILABLE_EXIT: i32 = 3;

const WALKER: &str = r#"
import sys

MODULE = sys.argv[1]
MAX_DEPTH = int(sys.argv[2])
NOISE = set(@NOISE@)
LEAF_METHODS = set(@LEAF_METHODS@)
IGNORED = set(@IGNORED@)
PINNED_PREFIX = @PINNED_PREFIX@
PINNED = set(@PINNED@)
TYPES_ONLY = @TYPES_ONLY@

lines = []


def types_only():
    import types
    try:
        import builtins
    except ImportError:
        import __builtin__ as builtins
    holder = types.ModuleType(TYPES_ONLY)
    for key in dir(builtins):
        value = getattr(builtins, key)
        if isinstance(value, type) and not issubclass(value, BaseException):
            setattr(holder, key, value)
    return holder


def load(name):
    if name == TYPES_ONLY:
        return types_only()
    module = __import__(name)
    for part in name.split('.')[1:]:
        module = getattr(module, part)
    return module


def is_dunder(name):
    return name.startswith('__') and name.endswith('__')


def walk(path, value, level, on_path):
    try:
        names = sorted(dir(value))
    except Exception:
        return
    for name in names:
        lines.append('  ' * (level + 1) + name)
        dotted = path + '.' + name
        if dotted in IGNORED or is_dunder(name) or name in NOISE:
            continue
        if name in LEAF_METHODS and level > 2:
            continue
        if path.startswith(PINNED_PREFIX) and name in PINNED:
            continue
        if level + 1 >= MAX_DEPTH:
            continue
        try:
            child = getattr(value, name)
        except Exception:
            continue
        if id(child) in on_path or type(child) is type(sys):
            continue
        on_path.add(id(child))
        walk(dotted, child, level + 1, on_path)
        on_path.discard(id(child))


try:
    root = load(MODULE)
except Exception:
    sys.stdout.write('@MARKER@ %s\n' % sys.exc_info()[0].__name__)
    sys.exit(@EXIT@)

lines.append(MODULE)
walk(MODULE, root, 0, set([id(root)]))
sys.stdout.write('\n'.join(lines) + '\n')
"#;

/// Knobs for the walker; the defaults follow the suppression lists above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectOptions {
    pub max_depth: usize,
    pub noise: Vec<String>,
    pub leaf_methods: Vec<String>,
    pub ignored: Vec<String>,
}

impl Default for ReflectOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            noise: owned(NOISE_NAMES),
            leaf_methods: owned(LEAF_METHODS),
            ignored: owned(IGNORED_PATHS),
        }
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reflection {
    Listed(Listing),
    Unavailable { reason: String },
}

impl Reflection {
    pub fn listing(&self) -> Option<&Listing> {
        match self {
            Reflection::Listed(listing) => Some(listing),
            Reflection::Unavailable { .. } => None,
        }
    }
}

/// The walker with the suppression lists of `options` filled in.
pub fn walker_script(options: &ReflectOptions) -> String {
    WALKER
        .replace("@NOISE@", &list_literal(&options.noise))
        .replace("@LEAF_METHODS@", &list_literal(&options.leaf_methods))
        .replace("@IGNORED@", &list_literal(&options.ignored))
        .replace("@PINNED_PREFIX@", &string_literal(PINNED_PREFIX))
        .replace("@PINNED@", &list_literal(PINNED_ATTRIBUTES))
        .replace("@TYPES_ONLY@", &string_literal(TYPES_ONLY))
        .replace("@MARKER@", UNAVAILABLE_MARKER)
        .replace("@EXIT@", &UNAVAILABLE_EXIT.to_string())
}

/// Lists `module` as seen by `interpreter`.
///
/// A module that cannot be imported, or an interpreter that cannot be run,
/// yields [`Reflection::Unavailable`]. Output that is not a well-formed
/// listing is an error.
pub fn reflect(
    interpreter: &Interpreter,
    module: &str,
    options: &ReflectOptions,
) -> Result<Reflection> {
    info!("reflecting {module} under {}", interpreter.display_name());
    let script = walker_script(options);
    let output = match interpreter.run_script(
        &script,
        [module.to_string(), options.max_depth.to_string()],
        None,
    ) {
        Ok(output) => output,
        Err(err @ ParityError::Spawn { .. }) => {
            return Ok(Reflection::Unavailable {
                reason: err.to_string(),
            });
        }
        Err(err) => return Err(err),
    };

    if !output.success() {
        let reason = output
            .stdout
            .lines()
            .find_map(|line| line.strip_prefix(UNAVAILABLE_MARKER))
            .map(|kind| kind.trim().to_string())
            .filter(|kind| !kind.is_empty())
            .unwrap_or_else(|| output.failure_reason());
        debug!("{module} unavailable: {reason}");
        return Ok(Reflection::Unavailable { reason });
    }

    let listing = Listing::parse(&output.stdout).map_err(|err| {
        ParityError::parse(format!("{module} listing from {}", interpreter.display_name()), err)
    })?;
    if listing.root() != Some(module) {
        return Err(ParityError::Protocol {
            program: interpreter.display_name(),
            message: format!("listing for {module} is rooted at {:?}", listing.root()),
        });
    }
    debug!("{module}: {} attributes", listing.len());
    Ok(Reflection::Listed(listing.canonicalize()))
}
