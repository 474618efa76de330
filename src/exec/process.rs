// src/exec/process.rs

//! Process executor: run one invocation through the shell with a hard
//! wall-clock timeout.

use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::BoxFuture;
use super::command::Invocation;

/// Exit code reported when no real exit code exists (timeout, spawn error,
/// killed by signal).
pub const FAILURE_EXIT_CODE: i32 = -1;

/// How the process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// The process exited on its own; see `exit_code`.
    Exited,
    /// The timeout expired and the child was killed.
    TimedOut,
    /// The process could not be started or waited on.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    pub status: ExecStatus,
    pub exit_code: i32,
    pub stdout: String,
    /// Captured stderr, or the explanatory message for `TimedOut` / `Error`.
    pub stderr: String,
    pub duration: Duration,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        self.status == ExecStatus::Exited && self.exit_code == 0
    }

    pub fn exited(output: Output, duration: Duration) -> Self {
        Self {
            status: ExecStatus::Exited,
            exit_code: output.status.code().unwrap_or(FAILURE_EXIT_CODE),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration,
        }
    }

    pub fn timed_out(timeout: Duration, duration: Duration) -> Self {
        Self {
            status: ExecStatus::TimedOut,
            exit_code: FAILURE_EXIT_CODE,
            stdout: String::new(),
            stderr: format!("Command timed out after {} seconds", timeout.as_secs()),
            duration,
        }
    }

    pub fn error(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            status: ExecStatus::Error,
            exit_code: FAILURE_EXIT_CODE,
            stdout: String::new(),
            stderr: message.into(),
            duration,
        }
    }
}

/// Trait abstracting how model invocations are executed.
///
/// Production code uses [`ShellExecutor`]; tests provide scripted fakes that
/// never spawn processes.
pub trait ProcessExecutor: Send + Sync {
    /// Run `invocation` to completion or until `timeout` expires.
    ///
    /// Implementations convert every failure into an `ExecOutcome`; the
    /// caller never sees an error.
    fn execute<'a>(
        &'a self,
        invocation: &'a Invocation,
        timeout: Duration,
    ) -> BoxFuture<'a, ExecOutcome>;
}

/// Real executor: `sh -c` (or `cmd /C`) with piped output and kill-on-timeout.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor;

impl ProcessExecutor for ShellExecutor {
    fn execute<'a>(
        &'a self,
        invocation: &'a Invocation,
        timeout: Duration,
    ) -> BoxFuture<'a, ExecOutcome> {
        Box::pin(run_invocation(invocation, timeout))
    }
}

async fn run_invocation(inv: &Invocation, timeout: Duration) -> ExecOutcome {
    info!(
        model = %inv.model,
        cwd = %inv.working_dir.display(),
        cmd = %inv.shell_command,
        timeout_secs = timeout.as_secs(),
        "starting model process"
    );

    let start = Instant::now();
    let outcome = match run_with_timeout(inv, timeout).await {
        Ok(Some(output)) => ExecOutcome::exited(output, start.elapsed()),
        Ok(None) => {
            warn!(model = %inv.model, timeout_secs = timeout.as_secs(), "model process timed out; killed");
            ExecOutcome::timed_out(timeout, start.elapsed())
        }
        Err(err) => {
            let message = format!("{err:#}");
            warn!(model = %inv.model, error = %message, "model process could not run");
            ExecOutcome::error(message, start.elapsed())
        }
    };

    info!(
        model = %inv.model,
        exit_code = outcome.exit_code,
        success = outcome.success(),
        duration_secs = outcome.duration.as_secs_f64(),
        "model process finished"
    );
    outcome
}

/// `Ok(None)` means the timeout fired.
///
/// On unix the shell leads its own process group, so the model and anything
/// it spawned (`conda run`, python workers) are killed together on expiry.
/// `kill_on_drop` still covers the direct child everywhere.
async fn run_with_timeout(inv: &Invocation, timeout: Duration) -> Result<Option<Output>> {
    let mut cmd = shell(&inv.shell_command);
    cmd.current_dir(&inv.working_dir)
        .envs(&inv.env_vars)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .with_context(|| format!("spawning process for model '{}'", inv.model))?;
    let pid = child.id();

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => {
            let output = output
                .with_context(|| format!("waiting for process of model '{}'", inv.model))?;
            debug!(
                model = %inv.model,
                stdout_bytes = output.stdout.len(),
                stderr_bytes = output.stderr.len(),
                "captured model output"
            );
            Ok(Some(output))
        }
        Err(_elapsed) => {
            if let Some(pid) = pid {
                kill_process_group(&inv.model, pid);
            }
            Ok(None)
        }
    }
}

#[cfg(unix)]
fn kill_process_group(model: &str, pid: u32) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(model = %model, pid, "pid out of range; cannot signal process group");
        return;
    };
    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!(model = %model, pgid = raw, "killed process group"),
        // ESRCH: the group already exited.
        Err(err) => debug!(model = %model, pgid = raw, error = %err, "killpg failed"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_model: &str, _pid: u32) {}

/// Build a shell command appropriate for the platform. On unix the shell
/// starts a new process group whose id equals its pid.
fn shell(line: &str) -> Command {
    let mut c = if cfg!(windows) {
        let mut c = std::process::Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = std::process::Command::new("sh");
        c.arg("-c").arg(line);
        c
    };
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        c.process_group(0);
    }
    Command::from(c)
}
