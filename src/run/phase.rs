// src/run/phase.rs

use std::fmt;

/// Lifecycle of one model inside a run.
///
/// ```text
/// Pending -> CheckingEnv -> Skipped
///                        -> Running -> Succeeded | Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelPhase {
    Pending,
    CheckingEnv,
    Skipped,
    Running,
    Succeeded,
    Failed,
}

impl ModelPhase {
    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(&self, next: ModelPhase) -> bool {
        use ModelPhase::*;
        matches!(
            (self, next),
            (Pending, CheckingEnv)
                | (Pending, Failed)
                | (CheckingEnv, Skipped)
                | (CheckingEnv, Running)
                | (Running, Succeeded)
                | (Running, Failed)
        )
    }
}

impl fmt::Display for ModelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelPhase::Pending => "pending",
            ModelPhase::CheckingEnv => "checking_env",
            ModelPhase::Skipped => "skipped",
            ModelPhase::Running => "running",
            ModelPhase::Succeeded => "succeeded",
            ModelPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}
