//! Command runner — one subprocess per call, bounded by a timeout.
//!
//! A non-zero exit code is returned as a normal [`CommandOutput`]. Only a
//! spawn failure or an expired timeout becomes an [`ExecutionError`]; in the
//! timeout case the child is killed and whatever it printed so far is kept.
//! No retries happen at this layer.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use postbird_core::types::redact_url;

use crate::error::ExecutionError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long to wait for pipe readers after the child is gone. A grandchild
/// (e.g. a credential helper) can hold a pipe open past the parent's exit.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Captured result of one finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// The most useful single-line-ish explanation of a failure: stderr if
    /// the tool wrote any, otherwise stdout, otherwise the exit code.
    pub fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        format!("exit code {}", self.exit_code)
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Executes external commands on behalf of the git layer.
pub trait CommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError> {
        (**self).run(program, args, working_dir, timeout)
    }
}

/// Human-readable command line with credentials scrubbed, for logs and errors.
pub fn display_command(program: &str, args: &[&str]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(program.to_string());
    parts.extend(args.iter().map(|a| redact_url(a)));
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// SystemRunner
// ---------------------------------------------------------------------------

/// Runs commands with `std::process`, non-interactively.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    env: Vec<(String, String)>,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self {
            env: vec![
                // Never block on a credential prompt.
                ("GIT_TERMINAL_PROMPT".to_string(), "0".to_string()),
                ("LC_ALL".to_string(), "C".to_string()),
            ],
        }
    }
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an environment variable for every spawned command.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.env.retain(|(k, _)| *k != key);
        self.env.push((key, value.into()));
        self
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecutionError> {
        let command = display_command(program, args);
        tracing::debug!(%command, cwd = %working_dir.display(), "spawning");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecutionError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = PipeCapture::start(child.stdout.take());
        let stderr = PipeCapture::start(child.stderr.take());
        let deadline = Instant::now() + timeout;

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    tracing::warn!(%command, "timed out after {}s", timeout.as_secs());
                    return Err(ExecutionError::Timeout {
                        command,
                        timeout,
                        stdout: stdout.finish(),
                        stderr: stderr.finish(),
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    return Err(ExecutionError::Wait { command, source });
                }
            }
        };

        let output = CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: stdout.finish(),
            stderr: stderr.finish(),
        };
        tracing::debug!(%command, exit_code = output.exit_code, "finished");
        Ok(output)
    }
}

/// Background reader that accumulates a pipe into a shared buffer so partial
/// output survives a kill.
struct PipeCapture {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl PipeCapture {
    fn start<P: Read + Send + 'static>(pipe: Option<P>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let handle = pipe.map(|mut pipe| {
            let sink = Arc::clone(&buf);
            thread::spawn(move || {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if let Ok(mut b) = sink.lock() {
                                b.extend_from_slice(&chunk[..n]);
                            }
                        }
                    }
                }
            })
        });
        Self { buf, handle }
    }

    fn finish(mut self) -> String {
        if let Some(handle) = self.handle.take() {
            let deadline = Instant::now() + DRAIN_GRACE;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(POLL_INTERVAL);
            }
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
        let bytes = self.buf.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
