use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use omrbench::exec::{BoxFuture, ExecOutcome, ExecStatus, Invocation, ProcessExecutor};
use omrbench::fs::FileSystem;

/// Directory a scripted file is written into.
#[derive(Debug, Clone, Copy)]
pub enum FakeTarget {
    OutputDir,
    WorkingDir,
}

/// Scripted behaviour for one model.
#[derive(Debug, Clone)]
pub struct FakeRun {
    pub status: ExecStatus,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub files: Vec<(FakeTarget, PathBuf, String)>,
}

impl FakeRun {
    pub fn success() -> Self {
        Self {
            status: ExecStatus::Exited,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            duration: Duration::from_millis(10),
            files: Vec::new(),
        }
    }

    pub fn exit(code: i32, stderr: &str) -> Self {
        Self {
            exit_code: code,
            stderr: stderr.to_string(),
            ..Self::success()
        }
    }

    pub fn timeout(timeout: Duration) -> Self {
        let o = ExecOutcome::timed_out(timeout, timeout);
        Self {
            status: o.status,
            exit_code: o.exit_code,
            stderr: o.stderr,
            duration: o.duration,
            ..Self::success()
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: ExecStatus::Error,
            exit_code: omrbench::exec::FAILURE_EXIT_CODE,
            stderr: message.to_string(),
            ..Self::success()
        }
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.stdout = text.to_string();
        self
    }

    /// Have the fake "model" write `rel` (relative to `target`) before exiting.
    pub fn writes(mut self, target: FakeTarget, rel: &str, content: &str) -> Self {
        self.files.push((target, PathBuf::from(rel), content.to_string()));
        self
    }
}

/// A fake executor that:
/// - records every invocation it receives
/// - replays the scripted `FakeRun` for the invocation's model (plain
///   success when nothing is scripted), writing scripted files through the
///   shared filesystem.
pub struct FakeExecutor {
    fs: Arc<dyn FileSystem>,
    scripts: HashMap<String, FakeRun>,
    executed: Arc<Mutex<Vec<Invocation>>>,
}

impl FakeExecutor {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            scripts: HashMap::new(),
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn script(mut self, model: &str, run: FakeRun) -> Self {
        self.scripts.insert(model.to_string(), run);
        self
    }

    /// Shared handle to the invocation log.
    pub fn executed(&self) -> Arc<Mutex<Vec<Invocation>>> {
        Arc::clone(&self.executed)
    }
}

impl ProcessExecutor for FakeExecutor {
    fn execute<'a>(
        &'a self,
        invocation: &'a Invocation,
        _timeout: Duration,
    ) -> BoxFuture<'a, ExecOutcome> {
        Box::pin(async move {
            self.executed.lock().unwrap().push(invocation.clone());

            let run = self
                .scripts
                .get(&invocation.model)
                .cloned()
                .unwrap_or_else(FakeRun::success);

            for (target, rel, content) in run.files.iter() {
                let root = match target {
                    FakeTarget::OutputDir => &invocation.output_dir,
                    FakeTarget::WorkingDir => &invocation.working_dir,
                };
                self.fs
                    .write(&root.join(rel), content.as_bytes())
                    .expect("fake executor failed to write scripted file");
            }

            ExecOutcome {
                status: run.status,
                exit_code: run.exit_code,
                stdout: run.stdout,
                stderr: run.stderr,
                duration: run.duration,
            }
        })
    }
}
