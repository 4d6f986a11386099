//! Path filtering applied where native events are emitted.
//!
//! Filtering order:
//! 1. Excluded fragments (build output, VCS directories) - always dropped
//! 2. Extension allow-list - an empty list allows every extension

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Decides which changed paths are worth a reload.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Lowercase extensions without the leading dot.
    extensions: HashSet<String>,
    /// Substrings that exclude a path when present.
    excluded: Vec<String>,
    /// Watched roots; fragments are matched against the path relative to these.
    roots: Vec<PathBuf>,
}

impl EventFilter {
    pub fn new<E, X>(extensions: E, excluded: X) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        X: IntoIterator,
        X::Item: Into<String>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            excluded: excluded
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
            roots: Vec::new(),
        }
    }

    /// Set the roots that excluded fragments are matched relative to.
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.roots = roots.into_iter().collect();
        self
    }

    /// Check whether a change to `path` should reach the debouncer.
    pub fn matches(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        let text = relative.to_string_lossy();

        if self.excluded.iter().any(|fragment| text.contains(fragment.as_str())) {
            return false;
        }

        if self.extensions.is_empty() {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    pub fn extensions(&self) -> &HashSet<String> {
        &self.extensions
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        self.roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
    }
}

/// `".Swift"`, `"swift"` and `"*.swift"` all become `"swift"`.
fn normalize_extension(ext: &str) -> String {
    ext.trim()
        .trim_start_matches('*')
        .trim_start_matches('.')
        .to_ascii_lowercase()
}
