// src/watch/patterns.rs

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::TestSection;

/// Compiled watch/exclude globs for build output.
///
/// Patterns are relative to the project root; callers pass root-relative,
/// forward-slash paths such as `"dist/assets/app.js"` into [`matches`].
///
/// [`matches`]: BuildOutputMatcher::matches
#[derive(Clone)]
pub struct BuildOutputMatcher {
    /// `None` means "everything under the root".
    watch_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for BuildOutputMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOutputMatcher")
            .field("watch_all", &self.watch_set.is_none())
            .finish_non_exhaustive()
    }
}

impl BuildOutputMatcher {
    pub fn new(watch: &[String], exclude: &[String]) -> Result<Self> {
        let watch_set = if watch.is_empty() {
            None
        } else {
            Some(build_globset(watch).context("building watch globset")?)
        };
        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };
        Ok(Self {
            watch_set,
            exclude_set,
        })
    }

    pub fn from_config(test: &TestSection) -> Result<Self> {
        Self::new(&test.watch, &test.exclude)
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if rel_path.is_empty() {
            return false;
        }
        let watched = self
            .watch_set
            .as_ref()
            .is_none_or(|set| set.is_match(rel_path));
        let excluded = self
            .exclude_set
            .as_ref()
            .is_some_and(|set| set.is_match(rel_path));
        watched && !excluded
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?);
    }
    Ok(builder.build()?)
}

/// `path` relative to `root` with forward slashes, or `None` if `path` is
/// not under `root`.
pub fn root_relative(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    // Event paths may use a different absolute prefix for the same directory
    // (symlinked temp dirs on macOS).
    let root = root.canonicalize().ok()?;
    let path = path.canonicalize().ok()?;
    let rel = path.strip_prefix(&root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
