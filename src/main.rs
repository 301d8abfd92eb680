use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::info;

use pyparity::ParityError;
use pyparity::diff::{BaselineStore, MANIFEST_FILE, Manifest, ModuleDiff, Verdict, header_name};
use pyparity::generate::{Construct, GeneratedProgram, Sweep};
use pyparity::interp::{DEFAULT_TIMEOUT, Interpreter};
use pyparity::sbs::{DEFAULT_BATCH_SIZE, KnownFailures, SideBySide};

#[derive(Parser)]
#[command(
    name = "pyparity",
    about = "Compare an alternative Python implementation against a reference interpreter",
    version
)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print generated programs
    Gen(GenArgs),
    /// Run generated programs under both interpreters and compare traces
    Sbs(SbsArgs),
    /// Generate or verify module attribute baselines
    Modulediff(ModuleDiffArgs),
}

#[derive(Args)]
struct SweepArgs {
    /// Root construct (repeatable); every construct when omitted
    #[arg(long = "root", value_name = "construct")]
    roots: Vec<Construct>,

    /// First depth bound of the sweep
    #[arg(long, default_value_t = 0)]
    min_depth: usize,

    /// Last depth bound of the sweep
    #[arg(long, default_value_t = 2)]
    depth: usize,
}

impl SweepArgs {
    fn sweep(&self) -> Result<Sweep, ParityError> {
        if self.min_depth > self.depth {
            return Err(ParityError::Config(format!(
                "--min-depth {} is greater than --depth {}",
                self.min_depth, self.depth
            )));
        }
        let roots = if self.roots.is_empty() {
            Construct::ALL.to_vec()
        } else {
            self.roots.clone()
        };
        Ok(Sweep::new(roots, self.min_depth..=self.depth))
    }
}

#[derive(Args)]
struct GenArgs {
    #[command(flatten)]
    sweep: SweepArgs,

    /// Print only the program with this test index
    #[arg(long)]
    index: Option<u64>,

    /// Print the top-level flavor instead of the function
    #[arg(long)]
    top_level: bool,

    /// Print the number of programs instead of their source
    #[arg(long, conflicts_with = "index")]
    count: bool,
}

#[derive(Args)]
struct SbsArgs {
    /// Reference interpreter
    reference: PathBuf,

    /// Interpreter under test
    #[arg(long, env = "PYPARITY_SUBJECT", default_value = "python3")]
    subject: PathBuf,

    #[command(flatten)]
    sweep: SweepArgs,

    /// File of test indices expected to diverge
    #[arg(long, value_name = "file")]
    known_failures: Option<PathBuf>,

    /// Programs per interpreter invocation
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Seconds before an interpreter run is killed
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ModuleDiffArgs {
    /// Reference interpreter
    reference: PathBuf,

    /// Modules to regenerate; none means verify every tracked module
    modules: Vec<String>,

    /// Regenerate every tracked module (also spelled `--`)
    #[arg(long, conflicts_with = "modules")]
    all: bool,

    /// Interpreter under test
    #[arg(long, env = "PYPARITY_SUBJECT", default_value = "python3")]
    subject: PathBuf,

    /// Baseline directory
    #[arg(long, default_value = "baselines")]
    baselines: PathBuf,

    /// Name of the implementation under test in report headers
    #[arg(long, value_parser = parse_impl_name)]
    impl_name: Option<String>,

    /// Seconds before an interpreter run is killed
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

/// Names must survive a round trip through a baseline header.
fn parse_impl_name(name: &str) -> Result<String, String> {
    let folded = header_name(name);
    if folded == name {
        Ok(folded)
    } else {
        Err(format!(
            "names hold no ':' or '#' and single spaces only (try \"{folded}\")"
        ))
    }
}

fn main() {
    if let Err(err) = run() {
        if !err.is_empty() {
            eprintln!("{err}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse_from(rewrite_all_marker(std::env::args_os().collect()));
    init_logging(cli.verbose);

    match cli.command {
        Command::Gen(args) => run_gen(&args),
        Command::Sbs(args) => run_sbs(&args),
        Command::Modulediff(args) => run_modulediff(&args),
    }
}

/// `modulediff <reference> --` means "regenerate everything"; clap would
/// otherwise swallow the bare `--`. Only the subcommand position, the first
/// argument after the program name that is not a flag, is considered.
fn rewrite_all_marker(mut argv: Vec<std::ffi::OsString>) -> Vec<std::ffi::OsString> {
    let subcommand = argv
        .iter()
        .skip(1)
        .position(|arg| !arg.to_string_lossy().starts_with('-'))
        .map(|position| position + 1);
    if let Some(command) = subcommand.filter(|&command| argv[command] == "modulediff") {
        if let Some(marker) = argv[command + 1..].iter().position(|arg| arg == "--") {
            argv[command + 1 + marker] = "--all".into();
        }
    }
    argv
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run_gen(args: &GenArgs) -> Result<(), String> {
    let mut programs = args.sweep.sweep().map_err(|err| err.to_string())?;
    if args.count {
        println!("{}", programs.count());
        return Ok(());
    }
    if let Some(index) = args.index {
        let program = programs
            .find(|program| program.index == index)
            .ok_or_else(|| format!("no program with index {index} in this sweep"))?;
        print!("{}", source_of(&program, args.top_level));
        return Ok(());
    }
    for program in programs {
        println!("# test {} (depth bound {})", program.index, program.depth_bound);
        println!("{}", source_of(&program, args.top_level));
    }
    Ok(())
}

fn source_of(program: &GeneratedProgram, top_level: bool) -> String {
    if top_level {
        program.top_level_source()
    } else {
        program.function_source()
    }
}

fn interpreter(program: &Path, timeout: u64) -> Interpreter {
    Interpreter::new(program).with_timeout(Duration::from_secs(timeout))
}

fn run_sbs(args: &SbsArgs) -> Result<(), String> {
    let sweep = args.sweep.sweep().map_err(|err| err.to_string())?;
    let reference = interpreter(&args.reference, args.timeout);
    let subject = interpreter(&args.subject, args.timeout);
    let known_failures = match &args.known_failures {
        Some(path) => KnownFailures::load(path).map_err(|err| err.to_string())?,
        None => KnownFailures::new(),
    };
    if args.batch_size == 0 {
        return Err(ParityError::Config("--batch-size must be at least 1".to_string()).to_string());
    }

    let report = SideBySide::new(&reference, &subject)
        .with_known_failures(known_failures)
        .with_batch_size(args.batch_size)
        .run(sweep)
        .map_err(|err| err.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).map_err(|err| err.to_string())?;
        println!("{json}");
    } else {
        for divergence in &report.divergences {
            println!(
                "test {} (depth bound {}) differs:",
                divergence.index, divergence.depth_bound
            );
            print!("{}", divergence.unified_diff());
            println!();
        }
        println!(
            "{} executed, {} skipped, {} diverged",
            report.executed,
            report.skipped,
            report.divergences.len()
        );
    }

    if report.passed() {
        Ok(())
    } else {
        Err(String::new())
    }
}

fn run_modulediff(args: &ModuleDiffArgs) -> Result<(), String> {
    let manifest = Manifest::load(&args.baselines).map_err(|err| err.to_string())?;
    let reference = interpreter(&args.reference, args.timeout);
    let subject = interpreter(&args.subject, args.timeout);
    let mut session = ModuleDiff::new(&reference, &subject, BaselineStore::new(&args.baselines))
        .with_options(manifest.reflect_options());
    if let Some(name) = &args.impl_name {
        session = session.with_impl_name(name);
    }

    if args.all || !args.modules.is_empty() {
        let modules = if args.all {
            &manifest.tracked
        } else {
            &args.modules
        };
        let written = session.generate(modules).map_err(|err| err.to_string())?;
        info!("wrote {} baselines to {}", written.len(), args.baselines.display());
        return Ok(());
    }

    let summary = session
        .check(&manifest.tracked, &manifest.absent)
        .map_err(|err| err.to_string())?;
    for module in &summary.verdicts {
        match &module.verdict {
            Verdict::Matches => {}
            Verdict::Differs { diff } => {
                println!("Module differs: {}", module.module);
                print!("{diff}");
                println!();
            }
            Verdict::Missing => println!(
                "Module {} has no baseline at {}",
                module.module,
                session.store().path_for(&module.module).display()
            ),
        }
    }
    for module in &summary.newly_importable {
        println!(
            "Module {module} has been implemented.\n\n\
             Move it from `absent` to `tracked` in {} and generate its baseline with:\n\n    \
             pyparity modulediff {} {module}\n",
            args.baselines.join(MANIFEST_FILE).display(),
            args.reference.display(),
        );
    }

    if summary.passed() {
        println!("{} modules match their baselines", summary.verdicts.len());
        Ok(())
    } else {
        Err(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<std::ffi::OsString> {
        args.iter().map(|arg| std::ffi::OsString::from(*arg)).collect()
    }

    #[test]
    fn bare_double_dash_means_all() {
        assert_eq!(
            rewrite_all_marker(argv(&["pyparity", "modulediff", "cpython", "--"])),
            argv(&["pyparity", "modulediff", "cpython", "--all"])
        );
        assert_eq!(
            rewrite_all_marker(argv(&["pyparity", "-v", "modulediff", "cpython", "--"])),
            argv(&["pyparity", "-v", "modulediff", "cpython", "--all"])
        );
        assert_eq!(
            rewrite_all_marker(argv(&["pyparity", "gen", "--"])),
            argv(&["pyparity", "gen", "--"])
        );
    }

    #[test]
    fn reference_named_like_the_subcommand_is_left_alone() {
        let args = argv(&["pyparity", "sbs", "modulediff", "--root", "for", "--", "x"]);
        assert_eq!(rewrite_all_marker(args.clone()), args);
    }

    #[test]
    fn inverted_depth_range_is_a_configuration_error() {
        let sweep = SweepArgs {
            roots: Vec::new(),
            min_depth: 3,
            depth: 1,
        };
        let err = sweep.sweep().err().expect("inverted range rejected");
        assert!(matches!(err, ParityError::Config(_)));
        assert!(err.to_string().contains("--min-depth 3"));
    }

    #[test]
    fn impl_names_must_fit_a_header() {
        assert_eq!(parse_impl_name("Iron Python").unwrap(), "Iron Python");
        assert!(parse_impl_name("iron:python").is_err());
        assert!(parse_impl_name("ipy #3").is_err());
        assert!(parse_impl_name("two  spaces").is_err());
        assert!(parse_impl_name("").is_err());
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
