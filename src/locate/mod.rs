// src/locate/mod.rs

//! Output locator: find the artifact a model produced after a successful run.
//!
//! Resolution order:
//! 1. the declared pattern under the model's output directory,
//! 2. the same pattern under the model's working directory (copied into the
//!    output directory when found there),
//! 3. captured stdout written to `<input_stem>_output.txt`.
//!
//! Finding nothing is not an error; the caller decides what that means.

pub mod pattern;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::fs::FileSystem;

pub use pattern::{OutputPattern, is_glob, resolve_in};

/// Inputs for a single locator pass.
#[derive(Debug, Clone, Copy)]
pub struct LocateRequest<'a> {
    pub output_dir: &'a Path,
    pub working_dir: &'a Path,
    pub pattern: Option<&'a str>,
    pub input_stem: &'a str,
    pub stdout: &'a str,
}

/// Where a located artifact came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOrigin {
    /// Already present in the output directory.
    OutputDir,
    /// Found under the working directory and copied into the output directory.
    CopiedFromWorkingDir,
    /// Written from captured stdout.
    Stdout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedOutput {
    pub path: PathBuf,
    pub origin: OutputOrigin,
}

/// File name used when stdout is saved as the model's output.
pub fn stdout_file_name(input_stem: &str) -> String {
    format!("{input_stem}_output.txt")
}

pub fn locate(fs: &dyn FileSystem, req: &LocateRequest<'_>) -> Result<Option<LocatedOutput>> {
    if let Some(raw) = req.pattern {
        let pattern = OutputPattern::expand(raw, req.input_stem);

        if let Some(path) = resolve_in(fs, req.output_dir, &pattern)? {
            debug!(path = %path.display(), "output found in output dir");
            return Ok(Some(LocatedOutput {
                path,
                origin: OutputOrigin::OutputDir,
            }));
        }

        if let Some(found) = resolve_in(fs, req.working_dir, &pattern)? {
            let dest = copy_into(fs, &found, req.output_dir)?;
            debug!(
                from = %found.display(),
                to = %dest.display(),
                "output found in working dir; copied"
            );
            return Ok(Some(LocatedOutput {
                path: dest,
                origin: OutputOrigin::CopiedFromWorkingDir,
            }));
        }
    }

    if !req.stdout.trim().is_empty() {
        let dest = req.output_dir.join(stdout_file_name(req.input_stem));
        fs.write(&dest, req.stdout.as_bytes())
            .with_context(|| format!("saving stdout to {:?}", dest))?;
        debug!(path = %dest.display(), "stdout saved as output");
        return Ok(Some(LocatedOutput {
            path: dest,
            origin: OutputOrigin::Stdout,
        }));
    }

    Ok(None)
}

fn copy_into(fs: &dyn FileSystem, src: &Path, output_dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .with_context(|| format!("located output {:?} has no file name", src))?;
    let dest = output_dir.join(name);
    fs.copy(src, &dest)?;
    Ok(dest)
}
