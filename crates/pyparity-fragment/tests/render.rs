use std::collections::HashSet;

use pyparity_fragment::{Fragment, LogTag, SourceWriter};

fn render(fragment: &Fragment, indent: usize) -> String {
    let mut writer = SourceWriter::with_indent(indent);
    writer.write_fragment(fragment);
    writer.finish()
}

#[test]
fn renders_try_finally_with_pass_bodies() {
    let source = render(&Fragment::try_finally(Fragment::Pass, Fragment::Pass), 1);
    let expected = concat!(
        "    try:\n",
        "        log+=\"try\"\n",
        "        log+=\"pass\"\n",
        "        pass\n",
        "    finally:\n",
        "        log+=\"finally\"\n",
        "        log+=dump_exc_info()\n",
        "        log+=\"pass\"\n",
        "        pass\n",
    );
    assert_eq!(source, expected);
}

#[test]
fn renders_else_clause_after_handler() {
    let fragment = Fragment::try_except_else(Fragment::Pass, Fragment::Yield(3), Fragment::Yield(3));
    let source = render(&fragment, 0);
    let lines: Vec<&str> = source.lines().collect();
    assert_eq!(lines[0], "try:");
    assert_eq!(lines[4], "except:");
    assert_eq!(lines[5], "    log+=\"except\"");
    assert_eq!(lines[6], "    log+=dump_exc_info()");
    assert_eq!(lines[9], "else:");
    assert_eq!(lines[10], "    log+=\"else\"");
    assert_eq!(lines[11], "    log+=dump_exc_info()");
    assert_eq!(lines[13], "    yield 3");
    assert_eq!(lines.len(), 14);
}

#[test]
fn loop_variables_carry_the_indent_level() {
    let source = render(&Fragment::for_loop(Fragment::Break), 2);
    assert!(source.contains("        for x2 in range(3):\n"));
    assert!(source.contains("            log+=\"inloop\"\n"));
    assert!(source.contains("            break\n"));
}

#[test]
fn while_counter_is_incremented_before_the_body() {
    let source = render(&Fragment::while_loop(Fragment::Continue), 0);
    let expected = concat!(
        "log+=\"preloop\"\n",
        "whilevar0_0 = 0\n",
        "while whilevar0_0 < 3:\n",
        "    whilevar0_0 += 1\n",
        "    log+=\"inloop\"\n",
        "    log+=\"continue\"\n",
        "    continue\n",
    );
    assert_eq!(source, expected);
}

#[test]
fn def_is_called_right_after_its_definition() {
    let source = render(&Fragment::def(Fragment::Return(7)), 1);
    let expected = concat!(
        "    log+=\"predefine\"\n",
        "    def func1_0():\n",
        "        global log\n",
        "        log+=\"return\"\n",
        "        return 7\n",
        "    func1_0()\n",
    );
    assert_eq!(source, expected);
}

#[test]
fn raise_logs_before_raising() {
    let source = render(&Fragment::Raise("12".into()), 0);
    assert_eq!(source, "log+=\"raise\"\nraise Exception(\"12\")\n");
}

#[test]
fn if_branches_log_distinct_tags() {
    let dead = render(&Fragment::if_const(false, Fragment::Pass), 0);
    assert!(dead.contains("if False:\n    log+=\"huh?\"\n"));
    let live = render(&Fragment::if_const(true, Fragment::Pass), 0);
    assert!(live.contains("if True:\n    log+=\"true!\"\n"));
}

#[test]
fn synthesized_names_are_unique_within_a_program() {
    let body = Fragment::while_loop(Fragment::def(Fragment::Pass));
    let fragment = Fragment::try_except(body.clone(), body);
    let source = render(&fragment, 1);

    let mut seen = HashSet::new();
    for line in source.lines() {
        let line = line.trim();
        let name = if let Some(rest) = line.strip_prefix("def ") {
            rest.trim_end_matches("():")
        } else if let Some(rest) = line.strip_suffix(" = 0") {
            rest
        } else {
            continue;
        };
        assert!(seen.insert(name.to_string()), "duplicate identifier {name}");
    }
    assert_eq!(seen.len(), 4);
}

#[test]
fn fresh_writers_restart_the_unique_counter() {
    let fragment = Fragment::while_loop(Fragment::Pass);
    assert_eq!(render(&fragment, 0), render(&fragment, 0));
    assert!(render(&fragment, 0).contains("whilevar0_0"));
}

#[test]
fn every_construct_logs_before_its_statement() {
    for tag in [LogTag::PreLoop, LogTag::PreIf, LogTag::PreDefine] {
        assert!(!tag.as_str().is_empty());
    }
    let fragment = Fragment::try_finally(
        Fragment::for_loop(Fragment::if_const(true, Fragment::Yield(1))),
        Fragment::Pass,
    );
    let source = render(&fragment, 0);
    let statements = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("log+="))
        .count();
    let logs = source
        .lines()
        .filter(|line| line.trim().starts_with("log+=\""))
        .count();
    // try, for, if, yield, finally, pass all log at least once.
    assert!(logs >= 6, "{source}");
    assert!(statements >= 5);
}
