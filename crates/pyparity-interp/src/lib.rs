//! Python interpreters as opaque child processes.
//!
//! Everything the harness learns about an interpreter comes from running
//! `<program> -c <script> [args...]` and reading back UTF-8 text.

mod literal;

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use pyparity_error::{ParityError, Result};

pub use literal::{list_literal, string_literal};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    program: PathBuf,
    timeout: Duration,
}

/// What a finished (or abandoned) child left behind.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: Option<ExitStatus>,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.is_some_and(|status| status.success())
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.and_then(|status| status.code())
    }

    /// One-line account of why the child did not succeed.
    pub fn failure_reason(&self) -> String {
        if self.timed_out {
            return "timed out".to_string();
        }
        let status = match self.exit_code() {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        };
        match self.stderr.lines().rev().find(|line| !line.trim().is_empty()) {
            Some(last) => format!("{status}: {}", last.trim()),
            None => status,
        }
    }
}

impl Interpreter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn display_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Runs `script` with `-c`, feeding `stdin` if given.
    ///
    /// Only a failure to start the process is an error; exit status,
    /// timeouts and output are reported in [`ProcessOutput`].
    pub fn run_script<I, S>(&self, script: &str, args: I, stdin: Option<&[u8]>) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        debug!(
            "running {} -c <script> {}",
            self.display_name(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut child = Command::new(&self.program)
            .arg("-c")
            .arg(script)
            .args(&args)
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ParityError::Spawn {
                program: self.display_name(),
                source,
            })?;

        let writer = match (stdin, child.stdin.take()) {
            (Some(bytes), Some(mut pipe)) => {
                let bytes = bytes.to_vec();
                Some(thread::spawn(move || {
                    // A child that exits early closes the pipe; its status says why.
                    let _ = pipe.write_all(&bytes);
                }))
            }
            _ => None,
        };
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let (status, timed_out) = wait_with_timeout(&mut child, self.timeout);
        if let Some(writer) = writer {
            let _ = writer.join();
        }
        let output = ProcessOutput {
            status,
            timed_out,
            stdout: collect(stdout),
            stderr: collect(stderr),
        };
        if !output.success() {
            debug!("{} {}", self.display_name(), output.failure_reason());
        }
        Ok(output)
    }

    /// Evaluates a short script expected to print one line and exit cleanly.
    pub fn query(&self, script: &str) -> Result<String> {
        let output = self.run_script(script, std::iter::empty::<OsString>(), None)?;
        if !output.success() {
            return Err(ParityError::Protocol {
                program: self.display_name(),
                message: output.failure_reason(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<thread::JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(handle: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> (Option<ExitStatus>, bool) {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return (Some(status), false),
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return (None, true);
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(_) => {
                let _ = child.kill();
                return (child.wait().ok(), false);
            }
        }
    }
}
