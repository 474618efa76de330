#![allow(dead_code, unused_imports)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use omrbench::exec::{EnvironmentManager, ProcessExecutor};
use omrbench::fs::FileSystem;
use omrbench::registry::Registry;
use omrbench::run::{Coordinator, RunOptions};
use omrbench::types::Device;

pub use omrbench_test_utils::builders::{ModelSpecBuilder, RegistryBuilder};
pub use omrbench_test_utils::fake_env::FakeEnvironmentManager;
pub use omrbench_test_utils::fake_executor::{FakeExecutor, FakeRun, FakeTarget};
pub use omrbench_test_utils::recording_reporter::RecordingReporter;
pub use omrbench_test_utils::{init_tracing, with_timeout};

pub const BASE_DIR: &str = "/models";
pub const OUTPUT_ROOT: &str = "/results";
pub const INPUT: &str = "/data/score.png";

pub fn options(base_dir: &Path, output_root: &Path, timeout: Duration) -> RunOptions {
    RunOptions {
        base_dir: base_dir.to_path_buf(),
        output_root: output_root.to_path_buf(),
        device: Device::Cpu,
        timeout,
    }
}

/// Coordinator over in-memory paths (`/models`, `/results`).
pub fn mock_coordinator(
    registry: Registry,
    env: FakeEnvironmentManager,
    executor: FakeExecutor,
    fs: Arc<dyn FileSystem>,
) -> Coordinator {
    Coordinator::new(
        registry,
        Arc::new(env) as Arc<dyn EnvironmentManager>,
        Arc::new(executor) as Arc<dyn ProcessExecutor>,
        fs,
        options(
            Path::new(BASE_DIR),
            Path::new(OUTPUT_ROOT),
            Duration::from_secs(5),
        ),
    )
}

pub fn results_dir(model: &str) -> PathBuf {
    Path::new(OUTPUT_ROOT).join(model)
}
