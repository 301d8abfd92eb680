use std::collections::BTreeMap;

use log::debug;
use pyparity_error::{ParityError, Result};
use pyparity_gen::{GeneratedProgram, TestIndex};
use pyparity_interp::Interpreter;
use serde::Serialize;

use crate::observation::{Observation, SAME};

/// Runs a batch of programs read as JSON from stdin, printing one
/// `same <json>` line per program. Both flavours of a program get a fresh
/// namespace holding only `log` and `dump_exc_info`.
pub const DRIVER: &str = r#"
import json
import os
import sys
import types


def dump_exc_info():
    tb = sys.exc_info()[2]
    tb_list = []
    while tb is not None:
        code = tb.tb_frame.f_code
        tb_list.append((tb.tb_lineno, os.path.basename(code.co_filename), code.co_name))
        tb = tb.tb_next
    return str(tb_list)


def exception_name():
    return sys.exc_info()[0].__name__


def fresh_namespace():
    return {'log': '', 'dump_exc_info': dump_exc_info}


def run_function(index, source):
    outcome = {'exception': None, 'value': None, 'generator': False, 'yielded': [], 'log': ''}
    namespace = fresh_namespace()
    try:
        exec(compile(source, '<generated>', 'exec'), namespace)
    except SyntaxError:
        outcome['exception'] = exception_name()
        return outcome
    result = None
    try:
        result = namespace['test%d' % index]()
        if isinstance(result, types.GeneratorType):
            outcome['generator'] = True
            for item in result:
                outcome['yielded'].append(repr(item))
        else:
            outcome['value'] = repr(result)
    except BaseException:
        outcome['exception'] = exception_name()
    if isinstance(result, types.GeneratorType):
        result.close()
    outcome['log'] = namespace['log']
    return outcome


def run_top_level(source):
    outcome = {'exception': None, 'log': ''}
    namespace = fresh_namespace()
    try:
        exec(compile(source, '<generated>', 'exec'), namespace)
    except BaseException:
        outcome['exception'] = exception_name()
    outcome['log'] = namespace['log']
    return outcome


def main():
    request = json.loads(sys.stdin.read())
    for program in request['programs']:
        observation = {
            'index': program['index'],
            'function': run_function(program['index'], program['function']),
            'top_level': run_top_level(program['top_level']),
        }
        sys.stdout.write('same %s\n' % json.dumps(observation, sort_keys=True))
        sys.stdout.flush()


main()
"#;

#[derive(Serialize)]
struct Request<'a> {
    programs: Vec<RequestProgram<'a>>,
}

#[derive(Serialize)]
struct RequestProgram<'a> {
    index: TestIndex,
    function: &'a str,
    top_level: &'a str,
}

/// A program paired with its two rendered flavours.
pub struct PreparedProgram {
    pub program: GeneratedProgram,
    pub function: String,
    pub top_level: String,
}

impl PreparedProgram {
    pub fn new(program: GeneratedProgram) -> Self {
        let function = program.function_source();
        let top_level = program.top_level_source();
        Self {
            program,
            function,
            top_level,
        }
    }
}

/// What one interpreter reported for one batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub observations: BTreeMap<TestIndex, Observation>,
    /// Programs a process stopped on, with the reason it stopped.
    pub failures: BTreeMap<TestIndex, String>,
}

/// Runs `batch` under `interpreter`. When a process stops before reporting
/// every program, the first unreported program is charged with the failure
/// and the remainder runs in a fresh process.
pub fn run_batch(interpreter: &Interpreter, batch: &[PreparedProgram]) -> Result<BatchResult> {
    let mut result = BatchResult::default();
    let mut pending = batch;
    while !pending.is_empty() {
        let (observations, failure) = run_process(interpreter, pending)?;
        result.observations.extend(observations);
        let Some(reason) = failure else { break };
        let Some(stopped) = pending
            .iter()
            .position(|prepared| !result.observations.contains_key(&prepared.program.index))
        else {
            break;
        };
        let index = pending[stopped].program.index;
        debug!(
            "{} stopped on test {index}: {reason}",
            interpreter.display_name()
        );
        result.failures.insert(index, reason);
        pending = &pending[stopped + 1..];
    }
    Ok(result)
}

fn run_process(
    interpreter: &Interpreter,
    batch: &[PreparedProgram],
) -> Result<(BTreeMap<TestIndex, Observation>, Option<String>)> {
    let request = Request {
        programs: batch
            .iter()
            .map(|prepared| RequestProgram {
                index: prepared.program.index,
                function: &prepared.function,
                top_level: &prepared.top_level,
            })
            .collect(),
    };
    let payload = serde_json::to_vec(&request).map_err(|err| {
        ParityError::Invariant(format!("failed to encode batch request: {err}"))
    })?;

    let output = interpreter.run_script(DRIVER, std::iter::empty::<String>(), Some(&payload))?;
    let observations = parse_observations(&interpreter.display_name(), &output.stdout)?;
    let failure = (!output.success()).then(|| output.failure_reason());
    Ok((observations, failure))
}

/// Reads `same <json>` lines; anything else on stdout is ignored.
pub fn parse_observations(program: &str, stdout: &str) -> Result<BTreeMap<TestIndex, Observation>> {
    let mut observations = BTreeMap::new();
    for line in stdout.lines() {
        let Some(json) = line
            .strip_prefix(SAME)
            .and_then(|rest| rest.strip_prefix(' '))
        else {
            continue;
        };
        let observation: Observation =
            serde_json::from_str(json).map_err(|err| ParityError::Protocol {
                program: program.to_string(),
                message: format!("malformed observation: {err}"),
            })?;
        observations.insert(observation.index, observation);
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_observation_lines_and_skips_noise() {
        let stdout = concat!(
            "warming up\n",
            "same {\"function\": {\"exception\": null, \"generator\": false, \"log\": \"pass\", ",
            "\"value\": \"None\", \"yielded\": []}, \"index\": 3, ",
            "\"top_level\": {\"exception\": null, \"log\": \"pass\"}}\n",
        );
        let observations = parse_observations("python3", stdout).unwrap();
        assert_eq!(observations.len(), 1);
        let observation = &observations[&3];
        assert_eq!(observation.function.value.as_deref(), Some("None"));
        assert_eq!(observation.top_level.log, "pass");
    }

    #[test]
    fn malformed_json_is_a_protocol_error() {
        let err = parse_observations("python3", "same {\"index\": \n").unwrap_err();
        assert!(matches!(err, ParityError::Protocol { .. }));
    }
}
