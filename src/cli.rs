// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{Device, EnvManagerKind};

/// Command-line arguments for `omrbench`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "omrbench",
    version,
    about = "Run every registered OMR model on the same input image and compare the results.",
    long_about = None,
    after_help = "Examples:\n  omrbench --input score.png --output ./results\n  omrbench --input score.png --models homr,oemer,legato\n  omrbench --input score.png --device cuda\n  omrbench --list-models"
)]
pub struct CliArgs {
    /// Path to the input image.
    #[arg(short, long, value_name = "PATH", required_unless_present = "list_models")]
    pub input: Option<PathBuf>,

    /// Root directory for per-model outputs and the JSON report.
    #[arg(short, long, value_name = "DIR", default_value = "./omr_results")]
    pub output: PathBuf,

    /// Directory containing each model's working directory.
    ///
    /// Default: the parent of the directory holding this executable.
    #[arg(short, long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Comma-separated list of models to run (default: all, in registry order).
    #[arg(short, long, value_name = "LIST", value_delimiter = ',')]
    pub models: Option<Vec<String>>,

    /// Device passed to models that accept `{device}`.
    #[arg(short, long, value_enum, default_value_t = Device::Cpu)]
    pub device: Device,

    /// Per-model wall-clock timeout in seconds.
    #[arg(short, long, value_name = "SECONDS", default_value_t = 300)]
    pub timeout: u64,

    /// List all registered models and exit.
    #[arg(long)]
    pub list_models: bool,

    /// Load the model registry from a TOML file instead of the built-in one.
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Environment manager used to probe and activate model environments.
    #[arg(long, value_enum, default_value_t = EnvManagerKind::Conda)]
    pub env_manager: EnvManagerKind,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `OMRBENCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Disable ANSI colors in console output and logs.
    #[arg(long)]
    pub no_color: bool,
}

impl CliArgs {
    /// Requested model ids with surrounding whitespace and empty entries
    /// removed. A list with nothing left (`-m ""`) means every model.
    pub fn requested_models(&self) -> Option<Vec<String>> {
        let list: Vec<String> = self
            .models
            .as_ref()?
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        (!list.is_empty()).then_some(list)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let args = CliArgs::try_parse_from(["omrbench", "-i", "score.png"]).unwrap();
        assert_eq!(args.output, PathBuf::from("./omr_results"));
        assert_eq!(args.device, Device::Cpu);
        assert_eq!(args.timeout, 300);
        assert_eq!(args.env_manager, EnvManagerKind::Conda);
        assert!(args.models.is_none());
    }

    #[test]
    fn input_is_required_unless_listing() {
        assert!(CliArgs::try_parse_from(["omrbench"]).is_err());
        assert!(CliArgs::try_parse_from(["omrbench", "--list-models"]).is_ok());
    }

    #[test]
    fn models_are_split_and_trimmed() {
        let args = CliArgs::try_parse_from([
            "omrbench", "-i", "x.png", "-m", "homr, oemer,,SMT",
        ])
        .unwrap();
        assert_eq!(
            args.requested_models().unwrap(),
            vec!["homr".to_string(), "oemer".to_string(), "SMT".to_string()]
        );
    }

    #[test]
    fn blank_model_list_selects_everything() {
        for raw in ["", " , ,"] {
            let args = CliArgs::try_parse_from(["omrbench", "-i", "x.png", "-m", raw]).unwrap();
            assert_eq!(args.requested_models(), None, "list {raw:?}");
        }
    }

    #[test]
    fn device_rejects_unknown_values() {
        assert!(CliArgs::try_parse_from(["omrbench", "-i", "x.png", "-d", "tpu"]).is_err());
    }
}
