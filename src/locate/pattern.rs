// src/locate/pattern.rs

//! Resolution of a declared output pattern against one root directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

use crate::fs::FileSystem;

const WILDCARD_CHARS: &[char] = &['*', '?', '['];
const STEM_PLACEHOLDER: &str = "{input_stem}";

/// A declared output pattern with `{input_stem}` filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPattern {
    /// Relative path of exactly one file.
    Literal(String),
    /// Glob relative to the search root. The substituted stem is escaped and
    /// only ever matches itself.
    Glob(String),
}

impl OutputPattern {
    /// Expand `declared` for one input. Literal vs glob is decided on the
    /// declared text, so an input named `score[1].png` stays literal.
    pub fn expand(declared: &str, input_stem: &str) -> Self {
        if is_glob(declared) {
            OutputPattern::Glob(declared.replace(STEM_PLACEHOLDER, &globset::escape(input_stem)))
        } else {
            OutputPattern::Literal(declared.replace(STEM_PLACEHOLDER, input_stem))
        }
    }
}

pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(WILDCARD_CHARS)
}

/// Find the artifact described by `pattern` under `root`.
///
/// Literal patterns are a relative path that must exist as a file. Glob
/// patterns are matched against slash-separated paths relative to `root`;
/// the lexicographically first match wins.
pub fn resolve_in(
    fs: &dyn FileSystem,
    root: &Path,
    pattern: &OutputPattern,
) -> Result<Option<PathBuf>> {
    let glob = match pattern {
        OutputPattern::Literal(rel) => {
            let candidate = root.join(rel);
            return Ok(fs.is_file(&candidate).then_some(candidate));
        }
        OutputPattern::Glob(glob) => glob,
    };

    let matcher = compile(glob)?;
    let (prefix, max_depth) = walk_bounds(glob);
    let start = if prefix.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(&prefix)
    };
    if !fs.is_dir(&start) {
        return Ok(None);
    }

    let mut matches = collect_matching_files(fs, root, &start, max_depth, &matcher)?;
    matches.sort();
    Ok(matches.into_iter().next())
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid output pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}

/// Literal leading directory of a glob, and how many levels below it a
/// match can sit (`None` when `**` makes the depth unbounded).
fn walk_bounds(pattern: &str) -> (PathBuf, Option<usize>) {
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
    let literal = components
        .iter()
        .take_while(|c| !is_glob(c))
        .count()
        // The last component names the file itself.
        .min(components.len().saturating_sub(1));

    let prefix: PathBuf = components[..literal].iter().collect();
    let rest = &components[literal..];
    let depth = if rest.iter().any(|c| c.contains("**")) {
        None
    } else {
        Some(rest.len())
    };
    (prefix, depth)
}

fn collect_matching_files(
    fs: &dyn FileSystem,
    root: &Path,
    start: &Path,
    max_depth: Option<usize>,
    matcher: &GlobMatcher,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![(start.to_path_buf(), 1usize)];

    while let Some((dir, depth)) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                if max_depth.is_none_or(|max| depth < max) {
                    stack.push((path, depth + 1));
                }
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if matcher.is_match(&rel_str) {
                        files.push(path);
                    }
                }
            }
        }
    }

    Ok(files)
}
