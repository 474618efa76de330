// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`env`] probes and activates isolated environments (`conda`, `mamba`,
//!   or none).
//! - [`command`] builds the shell invocation for one model.
//! - [`process`] runs an invocation with a timeout via
//!   `tokio::process::Command`.
//!
//! Both seams (`EnvironmentManager`, `ProcessExecutor`) are traits so the
//! coordinator can be driven by fakes in tests.

use std::future::Future;
use std::pin::Pin;

pub mod command;
pub mod env;
pub mod process;

/// Boxed, sendable future returned by the executor traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use command::{BuildContext, Invocation, build, substitute};
pub use env::{CondaManager, DirectManager, EnvironmentManager, manager_for};
pub use process::{ExecOutcome, ExecStatus, FAILURE_EXIT_CODE, ProcessExecutor, ShellExecutor};
