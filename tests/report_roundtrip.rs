use std::path::PathBuf;
use std::time::Duration;

use omrbench::fs::FileSystem;
use omrbench::fs::mock::MockFileSystem;
use omrbench::report::{FailureKind, RunReport, RunResult};
use omrbench::types::Device;
use serde_json::Value;

fn sample_report() -> RunReport {
    let mut report = RunReport::new("/data/score.png", Device::Cuda);
    report.record(
        RunResult::succeeded(
            "homr",
            "musicxml",
            Some(PathBuf::from("/results/homr/score.musicxml")),
            Duration::from_millis(1500),
        )
        .with_streams("log line".to_string(), String::new()),
    );
    report.record(
        RunResult::failed(
            "oemer",
            "musicxml",
            FailureKind::ProcessFailure,
            "CUDA out of memory",
            Duration::from_secs(3),
        )
        .with_exit_code(1),
    );
    report.record(RunResult::skipped(
        "tf-end-to-end",
        "semantic",
        FailureKind::MissingPrerequisite,
        "Requires a pre-trained model",
    ));
    report
}

#[test]
fn report_json_has_documented_shape() {
    let json = sample_report().to_json_pretty().unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["input_image"], "/data/score.png");
    assert_eq!(value["device"], "cuda");
    assert!(value["timestamp"].as_str().unwrap().contains('T'));

    let summary = &value["summary"];
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["successful"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["skipped"], 1);

    let homr = &value["models"]["homr"];
    assert_eq!(homr["success"], true);
    assert_eq!(homr["output"], "/results/homr/score.musicxml");
    assert_eq!(homr["duration"], 1.5);
    assert_eq!(homr["format"], "musicxml");
    assert!(homr.get("error").is_none());
    assert!(homr.get("skipped").is_none());
    assert!(homr.get("stdout").is_none());

    let oemer = &value["models"]["oemer"];
    assert_eq!(oemer["success"], false);
    assert_eq!(oemer["output"], Value::Null);
    assert_eq!(oemer["error"], "CUDA out of memory");
    assert_eq!(oemer["failure"], "process_failure");
    assert_eq!(oemer["exit_code"], 1);

    let tf = &value["models"]["tf-end-to-end"];
    assert_eq!(tf["skipped"], true);
    assert_eq!(tf["duration"], 0.0);
    assert_eq!(tf["failure"], "missing_prerequisite");
}

#[test]
fn persisted_report_reads_back_without_streams() {
    let fs = MockFileSystem::new();
    let report = sample_report();
    let path = PathBuf::from("/results/inference_results.json");

    report.persist(&fs, &path).unwrap();
    let back = RunReport::from_json(&fs.read_to_string(&path).unwrap()).unwrap();

    assert_eq!(back.summary, report.summary);
    assert_eq!(back.timestamp, report.timestamp);
    assert_eq!(back.models.len(), 3);
    assert_eq!(back.get("homr").unwrap().stdout, None);
    assert_eq!(back.get("tf-end-to-end").unwrap().skipped, true);
    assert_eq!(
        back.models.iter().map(|r| r.model.as_str()).collect::<Vec<_>>(),
        vec!["homr", "oemer", "tf-end-to-end"]
    );
}
