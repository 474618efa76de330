#![cfg(unix)]

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use common::{ModelSpecBuilder, RegistryBuilder, init_tracing, with_timeout};
use omrbench::cli::CliArgs;
use omrbench::console::{ConsoleReporter, SilentReporter};
use omrbench::errors::OmrError;
use omrbench::exec::{DirectManager, ShellExecutor};
use omrbench::fs::RealFileSystem;
use omrbench::registry::Registry;
use omrbench::report::{REPORT_FILE_NAME, RunReport};
use omrbench::{Backends, RunExit, run_with};
use tempfile::{TempDir, tempdir};

struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    fn new(model_dirs: &[&str]) -> Self {
        let tmp = tempdir().unwrap();
        for dir in model_dirs {
            fs::create_dir_all(tmp.path().join("models").join(dir)).unwrap();
        }
        fs::write(tmp.path().join("score.png"), b"not really a png").unwrap();
        Self { tmp }
    }

    fn path(&self, rel: &str) -> String {
        self.tmp.path().join(rel).display().to_string()
    }

    fn args(&self, extra: &[&str]) -> CliArgs {
        let input = self.path("score.png");
        let output = self.path("results");
        let base = self.path("models");
        let mut argv = vec![
            "omrbench",
            "--input",
            input.as_str(),
            "--output",
            output.as_str(),
            "--base-dir",
            base.as_str(),
            "--env-manager",
            "direct",
        ];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    fn report(&self) -> RunReport {
        let json = fs::read_to_string(self.tmp.path().join("results").join(REPORT_FILE_NAME)).unwrap();
        RunReport::from_json(&json).unwrap()
    }
}

fn backends() -> Backends {
    Backends {
        env: Arc::new(DirectManager),
        executor: Arc::new(ShellExecutor),
        fs: Arc::new(RealFileSystem),
    }
}

fn registry() -> Registry {
    RegistryBuilder::new()
        .with_model(
            ModelSpecBuilder::new("copier", "cp {input} {output_dir}/copy.png")
                .output_format("png")
                .output_pattern("copy.png")
                .build(),
        )
        .with_model(ModelSpecBuilder::new("printer", "echo '**kern'").output_format("kern").build())
        .with_model(
            ModelSpecBuilder::new("midi", "mkdir -p output && echo MThd > output/page.mid")
                .output_format("midi")
                .output_pattern("output/*.mid")
                .build(),
        )
        .with_model(ModelSpecBuilder::new("sleeper", "sleep 3").build())
        .build()
}

#[tokio::test]
async fn all_successful_models_exit_zero() {
    init_tracing();
    let ws = Workspace::new(&["copier", "printer", "midi", "sleeper"]);
    let args = ws.args(&["--models", "copier,printer,midi"]);

    let exit = with_timeout(run_with(&args, registry(), backends(), &mut SilentReporter))
        .await
        .unwrap();
    assert_eq!(exit, RunExit::Success);
    assert_eq!(exit.code(), 0);

    let report = ws.report();
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.successful, 3);

    let results = ws.tmp.path().join("results");
    assert_eq!(
        report.get("copier").unwrap().output.as_deref(),
        Some(results.join("copier/copy.png").as_path())
    );
    assert_eq!(
        fs::read_to_string(results.join("printer/score_output.txt")).unwrap(),
        "**kern\n"
    );
    assert_eq!(
        report.get("midi").unwrap().output.as_deref(),
        Some(results.join("midi/page.mid").as_path())
    );
    assert!(ws.tmp.path().join("models/midi/output/page.mid").is_file());
    assert!(!results.join("sleeper").exists());
}

#[tokio::test]
async fn timeout_fails_model_and_exits_nonzero() {
    let ws = Workspace::new(&["printer", "sleeper"]);
    let args = ws.args(&["--models", "printer,sleeper", "--timeout", "1"]);

    let exit = with_timeout(run_with(&args, registry(), backends(), &mut SilentReporter))
        .await
        .unwrap();
    assert_eq!(exit, RunExit::ModelsFailed);
    assert_eq!(exit.code(), 1);

    let report = ws.report();
    let sleeper = report.get("sleeper").unwrap();
    assert!(!sleeper.success);
    assert_eq!(sleeper.error.as_deref(), Some("Timeout after 1 seconds"));
    assert!(report.get("printer").unwrap().success);
}

#[tokio::test]
async fn missing_working_dir_fails_only_that_model() {
    let ws = Workspace::new(&["printer"]);
    let args = ws.args(&["--models", "copier,printer"]);

    let exit = with_timeout(run_with(&args, registry(), backends(), &mut SilentReporter))
        .await
        .unwrap();
    assert_eq!(exit, RunExit::ModelsFailed);

    let report = ws.report();
    assert!(!report.get("copier").unwrap().success);
    assert!(report.get("printer").unwrap().success);
    assert_eq!(report.summary.failed, 1);
}

#[tokio::test]
async fn unknown_model_is_rejected_before_running() {
    let ws = Workspace::new(&["printer"]);
    let args = ws.args(&["--models", "printer,doesnotexist"]);

    let err = run_with(&args, registry(), backends(), &mut SilentReporter)
        .await
        .unwrap_err();

    assert!(matches!(err, OmrError::UnknownModel(ref id) if id == "doesnotexist"));
    assert!(!ws.tmp.path().join("results").exists());
}

#[tokio::test]
async fn missing_input_is_rejected() {
    let ws = Workspace::new(&[]);
    let missing = ws.path("nope.png");
    let args = CliArgs::try_parse_from(["omrbench", "--input", missing.as_str()]).unwrap();

    let err = run_with(&args, registry(), backends(), &mut SilentReporter)
        .await
        .unwrap_err();

    assert!(matches!(err, OmrError::InputNotFound(ref p) if Path::new(p).ends_with("nope.png")));
}

#[tokio::test]
async fn console_reporter_prints_progress_and_summary() {
    let ws = Workspace::new(&["printer"]);
    let args = ws.args(&["--models", "printer,midi"]);

    let mut reporter = ConsoleReporter::new(Vec::new(), false);
    with_timeout(run_with(&args, registry(), backends(), &mut reporter))
        .await
        .unwrap();

    let text = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(text.contains("printer"));
    assert!(text.contains("midi"));
    assert!(text.contains(REPORT_FILE_NAME));
    assert!(!text.contains("\u{1b}["));
}
