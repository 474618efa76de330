// src/run/coordinator.rs

//! Run coordinator: drive each requested model through its lifecycle and
//! aggregate the results into a `RunReport`.
//!
//! Models run strictly one after another. A model's failure never stops the
//! batch; only an unknown model id (checked before anything runs) or a
//! failure to create the output root / write the report is fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::console::Reporter;
use crate::errors::Result;
use crate::exec::{
    BuildContext, EnvironmentManager, ExecOutcome, ExecStatus, ProcessExecutor, build,
};
use crate::fs::FileSystem;
use crate::locate::{LocateRequest, locate};
use crate::registry::{ModelSpec, Registry};
use crate::report::{FailureKind, REPORT_FILE_NAME, RunReport, RunResult};
use crate::run::phase::ModelPhase;
use crate::types::Device;

/// Settings shared by every model in a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Root holding each model's working directory.
    pub base_dir: PathBuf,
    /// Root for per-model output directories and the report.
    pub output_root: PathBuf,
    pub device: Device,
    /// Per-model wall-clock limit.
    pub timeout: Duration,
}

/// What a run is about to do; shown in the console banner.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub input: PathBuf,
    pub output_root: PathBuf,
    pub models: Vec<String>,
    pub device: Device,
    pub env_manager: String,
}

pub struct Coordinator {
    registry: Registry,
    env: Arc<dyn EnvironmentManager>,
    executor: Arc<dyn ProcessExecutor>,
    fs: Arc<dyn FileSystem>,
    options: RunOptions,
}

struct PhaseTracker<'a> {
    model: &'a str,
    phase: ModelPhase,
}

impl<'a> PhaseTracker<'a> {
    fn new(model: &'a str) -> Self {
        Self {
            model,
            phase: ModelPhase::Pending,
        }
    }

    fn advance(&mut self, next: ModelPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal transition {} -> {} for {}",
            self.phase,
            next,
            self.model
        );
        debug!(model = %self.model, from = %self.phase, to = %next, "model phase");
        self.phase = next;
    }
}

impl Coordinator {
    pub fn new(
        registry: Registry,
        env: Arc<dyn EnvironmentManager>,
        executor: Arc<dyn ProcessExecutor>,
        fs: Arc<dyn FileSystem>,
        options: RunOptions,
    ) -> Self {
        Self {
            registry,
            env,
            executor,
            fs,
            options,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.options.output_root.join(REPORT_FILE_NAME)
    }

    /// Validate the requested ids and describe the run. Fails with
    /// `UnknownModel` before anything touches the filesystem.
    pub fn plan(&self, input: &Path, requested: Option<&[String]>) -> Result<RunPlan> {
        let specs = self.registry.select(requested)?;
        Ok(RunPlan {
            input: input.to_path_buf(),
            output_root: self.options.output_root.clone(),
            models: specs.iter().map(|s| s.id.clone()).collect(),
            device: self.options.device,
            env_manager: self.env.name().to_string(),
        })
    }

    /// Run every requested model in order and persist the report.
    pub async fn run_all(
        &self,
        input: &Path,
        requested: Option<&[String]>,
        reporter: &mut dyn Reporter,
    ) -> Result<RunReport> {
        let plan = self.plan(input, requested)?;

        self.fs
            .create_dir_all(&self.options.output_root)
            .context("creating output root")?;

        let abs_input = std::path::absolute(input)
            .with_context(|| format!("resolving input path {:?}", input))?;

        info!(
            input = %abs_input.display(),
            models = ?plan.models,
            device = %self.options.device,
            env_manager = %plan.env_manager,
            "starting OMR run"
        );
        reporter.run_started(&plan);

        let mut report = RunReport::new(input.display().to_string(), self.options.device);

        for id in plan.models.iter() {
            let spec = self.registry.get(id)?;
            reporter.model_pending(&spec.id);
            let result = self.run_model(spec, &abs_input, reporter).await;
            reporter.model_finished(&result);
            report.record(result);
        }

        let report_path = self.report_path();
        report.persist(self.fs.as_ref(), &report_path)?;

        info!(
            total = report.summary.total,
            successful = report.summary.successful,
            failed = report.summary.failed,
            skipped = report.summary.skipped,
            report = %report_path.display(),
            "run finished"
        );
        reporter.run_finished(&report, &report_path);

        Ok(report)
    }

    /// Run a single model; every failure is folded into the returned result.
    pub async fn run_model(
        &self,
        spec: &ModelSpec,
        input: &Path,
        reporter: &mut dyn Reporter,
    ) -> RunResult {
        let mut phase = PhaseTracker::new(&spec.id);
        let model_dir = self.options.output_root.join(&spec.id);

        if let Err(err) = self.fs.create_dir_all(&model_dir) {
            phase.advance(ModelPhase::Failed);
            return RunResult::failed(
                &spec.id,
                &spec.output_format,
                FailureKind::ExecutorException,
                format!("{err:#}"),
                Duration::ZERO,
            );
        }

        phase.advance(ModelPhase::CheckingEnv);

        if spec.requires_model {
            phase.advance(ModelPhase::Skipped);
            info!(model = %spec.id, "skipping: pre-trained model file not bundled");
            return RunResult::skipped(
                &spec.id,
                &spec.output_format,
                FailureKind::MissingPrerequisite,
                spec.prerequisite_note(),
            );
        }

        if !self.env.exists(&spec.environment).await {
            phase.advance(ModelPhase::Skipped);
            info!(model = %spec.id, env = %spec.environment, "skipping: environment not found");
            return RunResult::skipped(
                &spec.id,
                &spec.output_format,
                FailureKind::MissingEnvironment,
                format!(
                    "{} environment '{}' not found. Run setup script first.",
                    self.env.name(),
                    spec.environment
                ),
            );
        }

        let ctx = BuildContext {
            base_dir: &self.options.base_dir,
            input,
            output_dir: &model_dir,
            device: self.options.device,
        };
        let invocation = build(spec, &ctx, self.env.as_ref());

        phase.advance(ModelPhase::Running);
        reporter.model_started(spec, &invocation);

        let outcome = self
            .executor
            .execute(&invocation, self.options.timeout)
            .await;

        let result = self.classify(spec, input, &model_dir, &invocation.working_dir, outcome);
        phase.advance(if result.success {
            ModelPhase::Succeeded
        } else {
            ModelPhase::Failed
        });
        result
    }

    fn classify(
        &self,
        spec: &ModelSpec,
        input: &Path,
        model_dir: &Path,
        working_dir: &Path,
        outcome: ExecOutcome,
    ) -> RunResult {
        let ExecOutcome {
            status,
            exit_code,
            stdout,
            stderr,
            duration,
        } = outcome;

        let result = match status {
            ExecStatus::Exited if exit_code == 0 => {
                let input_stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                let request = LocateRequest {
                    output_dir: model_dir,
                    working_dir,
                    pattern: spec.output_pattern.as_deref(),
                    input_stem: &input_stem,
                    stdout: &stdout,
                };
                match locate(self.fs.as_ref(), &request) {
                    Ok(located) => {
                        if located.is_none() {
                            warn!(model = %spec.id, "model exited 0 but no output was located");
                        }
                        RunResult::succeeded(
                            &spec.id,
                            &spec.output_format,
                            located.map(|l| l.path),
                            duration,
                        )
                    }
                    Err(err) => RunResult::failed(
                        &spec.id,
                        &spec.output_format,
                        FailureKind::ExecutorException,
                        format!("{err:#}"),
                        duration,
                    ),
                }
            }
            ExecStatus::Exited => {
                let error = if stderr.is_empty() {
                    "Unknown error".to_string()
                } else {
                    stderr.clone()
                };
                RunResult::failed(
                    &spec.id,
                    &spec.output_format,
                    FailureKind::ProcessFailure,
                    error,
                    duration,
                )
            }
            ExecStatus::TimedOut => RunResult::failed(
                &spec.id,
                &spec.output_format,
                FailureKind::ProcessTimeout,
                format!("Timeout after {} seconds", self.options.timeout.as_secs()),
                duration,
            ),
            ExecStatus::Error => RunResult::failed(
                &spec.id,
                &spec.output_format,
                FailureKind::ExecutorException,
                stderr.clone(),
                duration,
            ),
        };

        result.with_exit_code(exit_code).with_streams(stdout, stderr)
    }
}
