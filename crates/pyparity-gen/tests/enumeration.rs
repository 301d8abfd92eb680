use std::collections::HashSet;

use pyparity_fragment::{Fragment, FragmentKind};
use pyparity_gen::{Construct, GeneratedProgram, Slots, Sweep};

fn sweep(roots: &[Construct], min: usize, max: usize) -> Vec<GeneratedProgram> {
    Sweep::new(roots.to_vec(), min..=max).collect()
}

#[test]
fn shallowest_try_finally_starts_with_pass_bodies() {
    let programs = sweep(&[Construct::TryFinally(Slots::Second)], 0, 0);
    assert_eq!(programs.len(), 3);

    let first = &programs[0];
    assert_eq!(first.index, 1);
    assert_eq!(first.depth_bound, 0);
    assert_eq!(first.fragment, Fragment::try_finally(Fragment::Pass, Fragment::Pass));
    assert_eq!(
        first.function_source(),
        concat!(
            "def test1():\n",
            "    global log\n",
            "    try:\n",
            "        log+=\"try\"\n",
            "        log+=\"pass\"\n",
            "        pass\n",
            "    finally:\n",
            "        log+=\"finally\"\n",
            "        log+=dump_exc_info()\n",
            "        log+=\"pass\"\n",
            "        pass\n",
        )
    );
    assert!(first.top_level_source().starts_with("try:\n"));
}

#[test]
fn else_branch_yield_carries_the_current_counter() {
    let programs = sweep(&[Construct::TryExceptElse], 0, 0);
    assert_eq!(programs.len(), 4);
    assert_eq!(
        programs[3].fragment,
        Fragment::try_except_else(Fragment::Pass, Fragment::Yield(1), Fragment::Yield(1))
    );
    assert!(programs[3].fragment.may_suspend());
}

#[test]
fn one_level_under_a_loop() {
    let programs = sweep(&[Construct::For], 1, 1);
    assert_eq!(programs.len(), 50);

    // The first body is a nested loop cut off to `pass`.
    assert_eq!(
        programs[0].fragment,
        Fragment::for_loop(Fragment::for_loop(Fragment::Pass))
    );
    let kinds: Vec<FragmentKind> = programs
        .iter()
        .filter_map(|p| match &p.fragment {
            Fragment::For { body } => Some(body.kind()),
            _ => None,
        })
        .collect();
    assert!(kinds.contains(&FragmentKind::Break));
    assert!(kinds.contains(&FragmentKind::Continue));
}

#[test]
fn enumeration_is_deterministic() {
    let roots = [Construct::While, Construct::Def];
    assert_eq!(sweep(&roots, 0, 2), sweep(&roots, 0, 2));
}

#[test]
fn indices_continue_across_bounds_and_roots() {
    let roots = [Construct::IfTrue, Construct::TryExcept(Slots::Both)];
    let programs = sweep(&roots, 0, 1);
    for (position, program) in programs.iter().enumerate() {
        assert_eq!(program.index, position as u64 + 1);
    }
    let bounds: Vec<usize> = programs.iter().map(|p| p.depth_bound).collect();
    let mut sorted = bounds.clone();
    sorted.sort();
    assert_eq!(bounds, sorted);
    assert_eq!(bounds.first(), Some(&0));
    assert_eq!(bounds.last(), Some(&1));
}

#[test]
fn yield_state_is_carried_through_the_sweep() {
    let programs = sweep(&[Construct::TryExceptElse], 0, 1);
    let values: Vec<u32> = programs
        .iter()
        .filter_map(|p| match &p.fragment {
            Fragment::TryExceptElse { orelse, .. } => match **orelse {
                Fragment::Return(value) => Some(value),
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert!(values.len() >= 2);
    assert!(values.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn no_continue_below_try_finally() {
    for program in sweep(&[Construct::While, Construct::For], 0, 2) {
        program.fragment.walk(&mut |node, ancestors| {
            if matches!(node, Fragment::Continue) {
                assert!(
                    !ancestors
                        .iter()
                        .any(|a| a.kind() == FragmentKind::TryFinally),
                    "continue under finally in test{}",
                    program.index
                );
                assert!(
                    ancestors
                        .iter()
                        .any(|a| matches!(a.kind(), FragmentKind::For | FragmentKind::While))
                );
            }
        });
    }
}

#[test]
fn break_only_appears_inside_loops() {
    for program in sweep(&[Construct::TryFinally(Slots::Both)], 0, 2) {
        program.fragment.walk(&mut |node, ancestors| {
            if matches!(node, Fragment::Break | Fragment::Continue) {
                assert!(
                    ancestors
                        .iter()
                        .any(|a| matches!(a.kind(), FragmentKind::For | FragmentKind::While))
                );
            }
        });
    }
}

#[test]
fn synthesized_identifiers_never_repeat() {
    for program in sweep(&[Construct::While, Construct::Def], 2, 2) {
        let source = program.function_source();
        let mut seen = HashSet::new();
        for line in source.lines().map(str::trim) {
            let declared = line
                .strip_prefix("def ")
                .map(|rest| rest.trim_end_matches("():"))
                .or_else(|| line.strip_suffix(" = 0"));
            if let Some(name) = declared {
                assert!(
                    seen.insert(name.to_string()),
                    "{name} repeated in test{}",
                    program.index
                );
            }
        }
    }
}

#[test]
fn empty_sweeps_produce_nothing() {
    assert!(sweep(&[], 0, 3).is_empty());
    #[allow(clippy::reversed_empty_ranges)]
    let reversed: Vec<GeneratedProgram> = Sweep::new(vec![Construct::For], 2..=1).collect();
    assert!(reversed.is_empty());
}
