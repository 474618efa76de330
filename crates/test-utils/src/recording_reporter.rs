use std::path::Path;

use omrbench::console::Reporter;
use omrbench::exec::Invocation;
use omrbench::registry::ModelSpec;
use omrbench::report::{RunReport, RunResult};
use omrbench::run::RunPlan;

/// Reporter that keeps a flat event log, e.g. `"started:homr"`.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<String>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started_models(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.strip_prefix("started:"))
            .map(str::to_string)
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn run_started(&mut self, plan: &RunPlan) {
        self.events.push(format!("run:{}", plan.models.join(",")));
    }

    fn model_pending(&mut self, model: &str) {
        self.events.push(format!("pending:{model}"));
    }

    fn model_started(&mut self, spec: &ModelSpec, _invocation: &Invocation) {
        self.events.push(format!("started:{}", spec.id));
    }

    fn model_finished(&mut self, result: &RunResult) {
        self.events.push(format!("finished:{}", result.model));
    }

    fn run_finished(&mut self, report: &RunReport, _report_path: &Path) {
        self.events
            .push(format!("done:{}", report.summary.total));
    }
}
