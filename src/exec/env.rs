// src/exec/env.rs

//! Isolated-environment managers.
//!
//! The coordinator only needs two things from an environment manager: "does
//! this environment exist?" and "what prefix activates it for one command?".
//! Everything specific to conda-style CLIs stays in this file.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, warn};

use super::BoxFuture;
use crate::types::EnvManagerKind;

pub trait EnvironmentManager: Send + Sync {
    /// Short name for logs and the run banner.
    fn name(&self) -> &str;

    /// Probe whether `env` exists. Never fails; an unusable manager means
    /// "not present".
    fn exists<'a>(&'a self, env: &'a str) -> BoxFuture<'a, bool>;

    /// Prefix placed before a model command to run it inside `env`, or `None`
    /// when commands run without activation.
    fn activation_prefix(&self, env: &str) -> Option<String>;
}

/// `conda` / `mamba` style manager: `<tool> env list` and `<tool> run -n`.
#[derive(Debug, Clone)]
pub struct CondaManager {
    tool: String,
}

impl CondaManager {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    pub fn conda() -> Self {
        Self::new("conda")
    }

    pub fn mamba() -> Self {
        Self::new("mamba")
    }

    async fn list_environments(&self) -> std::io::Result<String> {
        let output = Command::new(&self.tool)
            .args(["env", "list"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl EnvironmentManager for CondaManager {
    fn name(&self) -> &str {
        &self.tool
    }

    fn exists<'a>(&'a self, env: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            match self.list_environments().await {
                Ok(listing) => {
                    // Substring match against the raw listing, as the tool prints it.
                    let found = listing.contains(env);
                    debug!(tool = %self.tool, env, found, "environment probe");
                    found
                }
                Err(err) => {
                    warn!(tool = %self.tool, env, error = %err, "environment probe failed");
                    false
                }
            }
        })
    }

    fn activation_prefix(&self, env: &str) -> Option<String> {
        Some(format!("{} run -n {}", self.tool, env))
    }
}

/// No isolation: every environment "exists" and commands run unchanged.
#[derive(Debug, Clone, Default)]
pub struct DirectManager;

impl EnvironmentManager for DirectManager {
    fn name(&self) -> &str {
        "direct"
    }

    fn exists<'a>(&'a self, _env: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async { true })
    }

    fn activation_prefix(&self, _env: &str) -> Option<String> {
        None
    }
}

/// Build the manager selected on the command line.
pub fn manager_for(kind: EnvManagerKind) -> Arc<dyn EnvironmentManager> {
    match kind {
        EnvManagerKind::Conda => Arc::new(CondaManager::conda()),
        EnvManagerKind::Mamba => Arc::new(CondaManager::mamba()),
        EnvManagerKind::Direct => Arc::new(DirectManager),
    }
}
