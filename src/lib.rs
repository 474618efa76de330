// src/lib.rs

pub mod cli;
pub mod console;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod locate;
pub mod logging;
pub mod registry;
pub mod report;
pub mod run;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::cli::CliArgs;
use crate::console::{ConsoleReporter, Reporter, write_model_list};
use crate::errors::{OmrError, Result};
use crate::exec::{EnvironmentManager, ProcessExecutor, ShellExecutor, manager_for};
use crate::fs::{FileSystem, RealFileSystem};
use crate::registry::{Registry, resolve_registry};
use crate::run::{Coordinator, RunOptions};

/// How a completed invocation should exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// Listing only, or no model failed (skips do not count).
    Success,
    /// At least one model failed.
    ModelsFailed,
}

impl RunExit {
    pub fn code(&self) -> i32 {
        match self {
            RunExit::Success => 0,
            RunExit::ModelsFailed => 1,
        }
    }
}

/// External capabilities a run needs. Production wiring lives in
/// [`Backends::real`]; tests substitute fakes.
#[derive(Clone)]
pub struct Backends {
    pub env: Arc<dyn EnvironmentManager>,
    pub executor: Arc<dyn ProcessExecutor>,
    pub fs: Arc<dyn FileSystem>,
}

impl Backends {
    pub fn real(args: &CliArgs) -> Self {
        Self {
            env: manager_for(args.env_manager),
            executor: Arc::new(ShellExecutor),
            fs: Arc::new(RealFileSystem),
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - registry loading (built-in or `--registry`)
/// - `--list-models`
/// - input / model validation
/// - the coordinator with real backends and the console reporter
pub async fn run(args: CliArgs) -> Result<RunExit> {
    let registry = resolve_registry(args.registry.as_deref())?;

    if args.list_models {
        let mut out = std::io::stdout();
        write_model_list(&mut out, &registry, !args.no_color)?;
        return Ok(RunExit::Success);
    }

    let backends = Backends::real(&args);
    let mut reporter = ConsoleReporter::stdout(!args.no_color);
    run_with(&args, registry, backends, &mut reporter).await
}

/// Validate inputs and run the selected models with the given backends.
pub async fn run_with(
    args: &CliArgs,
    registry: Registry,
    backends: Backends,
    reporter: &mut dyn Reporter,
) -> Result<RunExit> {
    let input = args
        .input
        .clone()
        .ok_or_else(|| OmrError::ConfigError("--input is required".to_string()))?;

    if !input.exists() {
        return Err(OmrError::InputNotFound(input.display().to_string()));
    }

    let requested = args.requested_models();
    if let Err(err) = registry.select(requested.as_deref()) {
        if let OmrError::UnknownModel(ref id) = err {
            error!(model = %id, "unknown model requested");
            eprintln!("Available models: {}", registry.list_identifiers().join(", "));
        }
        return Err(err);
    }

    let options = RunOptions {
        base_dir: args.base_dir.clone().unwrap_or_else(default_base_dir),
        output_root: args.output.clone(),
        device: args.device,
        timeout: Duration::from_secs(args.timeout),
    };
    debug!(?options, "run options");

    let coordinator = Coordinator::new(
        registry,
        backends.env,
        backends.executor,
        backends.fs,
        options,
    );
    let report = coordinator
        .run_all(&input, requested.as_deref(), reporter)
        .await?;

    Ok(if report.has_failures() {
        RunExit::ModelsFailed
    } else {
        RunExit::Success
    })
}

/// Default model root: the parent of the directory holding this executable.
///
/// Falls back to the current directory when the executable path is unknown.
pub fn default_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
