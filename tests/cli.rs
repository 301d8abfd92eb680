use std::fs;
use std::process::{Command, Output};

fn pyparity(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pyparity"))
        .args(args)
        .env_remove("PYPARITY_SUBJECT")
        .output()
        .expect("run pyparity")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn has_python3() -> bool {
    let available = Command::new("python3")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false);
    if !available {
        eprintln!("python3 not found; skipping");
    }
    available
}

#[test]
fn gen_counts_programs() {
    let output = pyparity(&["gen", "--root", "try-finally-1", "--depth", "0", "--count"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "3");
}

#[test]
fn gen_prints_one_program_by_index() {
    let output = pyparity(&["gen", "--root", "try-finally-1", "--depth", "0", "--index", "1"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("def test1():\n    global log\n    try:\n"), "{text}");

    let top_level = pyparity(&[
        "gen", "--root", "try-finally-1", "--depth", "0", "--index", "1", "--top-level",
    ]);
    assert!(stdout(&top_level).starts_with("try:\n"));
}

#[test]
fn gen_rejects_unknown_indices_and_roots() {
    let output = pyparity(&["gen", "--root", "for", "--depth", "0", "--index", "999"]);
    assert_eq!(output.status.code(), Some(1));

    let output = pyparity(&["gen", "--root", "loop-de-loop"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn gen_rejects_inverted_depth_range() {
    let output = pyparity(&["gen", "--min-depth", "3", "--depth", "1", "--count"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--min-depth"));
}

#[test]
fn sbs_passes_against_itself() {
    if !has_python3() {
        return;
    }
    let output = pyparity(&[
        "sbs", "python3", "--subject", "python3", "--root", "if-true", "--root", "while",
        "--depth", "1",
    ]);
    assert!(
        output.status.success(),
        "{}{}",
        stdout(&output),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains(" 0 diverged"));
}

#[test]
fn sbs_json_reports_divergences() {
    if !has_python3() {
        return;
    }
    let output = pyparity(&[
        "sbs", "python3", "--subject", "false", "--root", "while", "--depth", "0", "--json",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("json report");
    let divergences = report["divergences"].as_array().expect("divergences");
    assert!(!divergences.is_empty());
    assert_eq!(divergences[0]["index"], 1);
}

#[test]
fn modulediff_generates_then_verifies() {
    if !has_python3() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let baselines = dir.path().join("baselines");
    fs::create_dir_all(&baselines).unwrap();
    fs::write(
        baselines.join("manifest.toml"),
        "tracked = [\"math\", \"errno\"]\nabsent = [\"no_such_module_here\"]\n",
    )
    .unwrap();
    let baselines_arg = baselines.to_str().unwrap();

    let generate = pyparity(&[
        "modulediff", "python3", "--subject", "python3", "--baselines", baselines_arg, "--",
    ]);
    assert!(
        generate.status.success(),
        "{}",
        String::from_utf8_lossy(&generate.stderr)
    );
    assert!(baselines.join("math.log").exists());
    assert!(baselines.join("errno.log").exists());

    let check = pyparity(&[
        "modulediff", "python3", "--subject", "python3", "--baselines", baselines_arg,
    ]);
    assert!(check.status.success(), "{}", stdout(&check));
    assert!(stdout(&check).contains("2 modules match their baselines"));

    let math = baselines.join("math.log");
    let edited = fs::read_to_string(&math).unwrap() + "    math.not_really_there\n";
    fs::write(&math, edited).unwrap();
    let check = pyparity(&[
        "modulediff", "python3", "--subject", "python3", "--baselines", baselines_arg,
    ]);
    assert_eq!(check.status.code(), Some(1));
    assert!(stdout(&check).contains("Module differs: math"));
}

#[test]
fn modulediff_regenerates_named_modules_only() {
    if !has_python3() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let baselines_arg = dir.path().to_str().unwrap();
    let output = pyparity(&[
        "modulediff", "python3", "--subject", "python3", "--baselines", baselines_arg,
        "--impl-name", "subject", "errno",
    ]);
    assert!(output.status.success());
    let text = fs::read_to_string(dir.path().join("errno.log")).unwrap();
    assert!(text.starts_with("Implement rest of errno module (subject "), "{text}");
    assert!(!dir.path().join("math.log").exists());
}

#[test]
fn modulediff_impl_names_with_spaces_verify() {
    if !has_python3() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let baselines_arg = dir.path().to_str().unwrap();
    fs::write(dir.path().join("manifest.toml"), "tracked = [\"errno\"]\nabsent = []\n").unwrap();
    let named = |extra: &[&str]| {
        let mut args = vec![
            "modulediff", "python3", "--subject", "python3", "--baselines", baselines_arg,
            "--impl-name", "Iron Python",
        ];
        args.extend_from_slice(extra);
        pyparity(&args)
    };

    let generate = named(&["errno"]);
    assert!(generate.status.success(), "{}", String::from_utf8_lossy(&generate.stderr));
    let text = fs::read_to_string(dir.path().join("errno.log")).unwrap();
    assert!(text.starts_with("Implement rest of errno module (Iron Python "), "{text}");

    let check = named(&[]);
    assert!(check.status.success(), "{}", stdout(&check));

    let rejected = pyparity(&[
        "modulediff", "python3", "--baselines", baselines_arg, "--impl-name", "iron:python",
    ]);
    assert_eq!(rejected.status.code(), Some(2));
}
