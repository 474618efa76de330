// src/exec/command.rs

//! Command builder: turn a `ModelSpec` into a concrete shell invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::exec::env::EnvironmentManager;
use crate::registry::{ModelId, ModelSpec};
use crate::types::Device;

/// Per-run values substituted into command templates.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    /// Root holding each model's working directory.
    pub base_dir: &'a Path,
    /// Absolute path of the input image.
    pub input: &'a Path,
    /// The model's own output directory (`<output>/<id>`).
    pub output_dir: &'a Path,
    pub device: Device,
}

/// A fully built model invocation, ready for a `ProcessExecutor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub model: ModelId,
    pub environment: String,
    pub working_dir: PathBuf,
    /// Where the model's artifacts are collected (`<output>/<id>`).
    pub output_dir: PathBuf,
    /// The model command after placeholder substitution (shown to the user).
    pub command: String,
    /// `cd <working_dir> && [activation] <command>`, passed to the shell.
    pub shell_command: String,
    pub env_vars: BTreeMap<String, String>,
}

/// Substitute command placeholders.
///
/// `{model}` and `{vocabulary}` become empty strings; models that need real
/// values are flagged `requires_model` and never reach this point. Unknown
/// placeholders are left untouched.
pub fn substitute(template: &str, ctx: &BuildContext<'_>) -> String {
    template
        .replace("{input}", &ctx.input.to_string_lossy())
        .replace("{output_dir}", &ctx.output_dir.to_string_lossy())
        .replace("{device}", ctx.device.as_str())
        .replace("{model}", "")
        .replace("{vocabulary}", "")
}

pub fn build(
    spec: &ModelSpec,
    ctx: &BuildContext<'_>,
    env: &dyn EnvironmentManager,
) -> Invocation {
    let working_dir = ctx.base_dir.join(&spec.working_dir);
    let command = substitute(&spec.command, ctx);

    let activated = match env.activation_prefix(&spec.environment) {
        Some(prefix) => format!("{prefix} {command}"),
        None => command.clone(),
    };
    let shell_command = format!(
        "cd {} && {}",
        shell_quote(&working_dir.to_string_lossy()),
        activated
    );

    Invocation {
        model: spec.id.clone(),
        environment: spec.environment.clone(),
        working_dir,
        output_dir: ctx.output_dir.to_path_buf(),
        command,
        shell_command,
        env_vars: spec.env_vars.clone(),
    }
}

/// Quote a path for `sh` when it contains anything beyond a safe set.
fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@%".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
