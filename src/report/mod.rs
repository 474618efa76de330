// src/report/mod.rs

//! Aggregate report for one invocation of the runner.
//!
//! Written once, at the end of a run, to `<output>/inference_results.json`.

pub mod result;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::Device;

pub use result::{FailureKind, RunResult, RunStatus};

/// File name of the persisted report inside the output root.
pub const REPORT_FILE_NAME: &str = "inference_results.json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a RunResult>) -> Self {
        let mut summary = Summary::default();
        for r in results {
            summary.total += 1;
            match r.status() {
                RunStatus::Succeeded => summary.successful += 1,
                RunStatus::Failed => summary.failed += 1,
                RunStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub input_image: String,
    pub timestamp: DateTime<Local>,
    pub device: Device,

    /// Results in run order, serialized as an object keyed by model id.
    #[serde(serialize_with = "models_as_map", deserialize_with = "models_from_map")]
    pub models: Vec<RunResult>,

    pub summary: Summary,
}

impl RunReport {
    pub fn new(input_image: impl Into<String>, device: Device) -> Self {
        Self {
            input_image: input_image.into(),
            timestamp: Local::now(),
            device,
            models: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Append one model's result; the summary is recomputed so it always
    /// matches the recorded results.
    pub fn record(&mut self, result: RunResult) {
        self.models.push(result);
        self.summary = Summary::from_results(&self.models);
    }

    pub fn get(&self, model: &str) -> Option<&RunResult> {
        self.models.iter().find(|r| r.model == model)
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the report (without captured stdout/stderr) to `path`.
    pub fn persist(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs.write(path, json.as_bytes())?;
        Ok(())
    }
}

fn models_as_map<S>(models: &[RunResult], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(models.len()))?;
    for r in models {
        map.serialize_entry(&r.model, r)?;
    }
    map.end()
}

fn models_from_map<'de, D>(deserializer: D) -> std::result::Result<Vec<RunResult>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedResults;

    impl<'de> Visitor<'de> for OrderedResults {
        type Value = Vec<RunResult>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map from model id to run result")
        }

        fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((id, mut result)) = access.next_entry::<String, RunResult>()? {
                result.model = id;
                out.push(result);
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(OrderedResults)
}
