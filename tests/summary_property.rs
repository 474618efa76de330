use std::time::Duration;

use omrbench::report::{FailureKind, RunReport, RunResult, RunStatus};
use omrbench::types::Device;
use proptest::prelude::*;

// 0 = success, 1..=5 = one of the failure kinds.
fn outcome_strategy() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..=5, 0..40)
}

fn result_for(i: usize, code: u8) -> RunResult {
    let id = format!("model_{i}");
    let kind = match code {
        0 => return RunResult::succeeded(id, "txt", None, Duration::from_millis(5)),
        1 => FailureKind::MissingEnvironment,
        2 => FailureKind::MissingPrerequisite,
        3 => FailureKind::ProcessFailure,
        4 => FailureKind::ProcessTimeout,
        _ => FailureKind::ExecutorException,
    };
    RunResult::failed(id, "txt", kind, "failed", Duration::from_millis(5))
}

proptest! {
    #[test]
    fn summary_partitions_every_result(codes in outcome_strategy()) {
        let mut report = RunReport::new("score.png", Device::Cpu);
        for (i, code) in codes.iter().enumerate() {
            report.record(result_for(i, *code));

            let s = report.summary;
            prop_assert_eq!(s.total, i + 1);
            prop_assert_eq!(s.successful + s.failed + s.skipped, s.total);
        }

        let expected_skipped = codes.iter().filter(|c| matches!(c, 1 | 2)).count();
        let expected_ok = codes.iter().filter(|c| **c == 0).count();
        prop_assert_eq!(report.summary.skipped, expected_skipped);
        prop_assert_eq!(report.summary.successful, expected_ok);
        prop_assert_eq!(report.has_failures(), report.summary.failed > 0);

        for r in report.models.iter() {
            match r.status() {
                RunStatus::Skipped => prop_assert!(!r.success && r.skipped),
                RunStatus::Succeeded => prop_assert!(r.success && r.error.is_none()),
                RunStatus::Failed => prop_assert!(!r.success && r.error.is_some()),
            }
        }
    }
}
