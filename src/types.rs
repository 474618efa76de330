use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Inference device passed through to command templates via `{device}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

impl Default for Device {
    fn default() -> Self {
        Device::Cpu
    }
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda),
            other => Err(format!(
                "invalid device: {other} (expected \"cpu\" or \"cuda\")"
            )),
        }
    }
}

/// Which isolated-environment manager wraps model commands.
///
/// - `Conda` / `Mamba`: probe with `<tool> env list`, activate with
///   `<tool> run -n <env>`.
/// - `Direct`: no isolation; every environment is considered present and
///   commands run as-is in the model's working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvManagerKind {
    Conda,
    Mamba,
    Direct,
}

impl Default for EnvManagerKind {
    fn default() -> Self {
        EnvManagerKind::Conda
    }
}
