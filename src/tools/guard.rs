//! Path argument policy applied by the handlers.

use std::path::{Path, PathBuf};

use crate::security::{validate_path_argument, Validated};

/// Checks path arguments for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathGuard {
    root: Option<PathBuf>,
}

impl PathGuard {
    /// Confine paths to `root`; relative paths are joined onto it.
    pub fn confined(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Apply the metacharacter filter only and pass the path through as written.
    pub fn characters_only() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn check(&self, path: &str) -> Validated<String> {
        validate_path_argument(path, self.root(), false, false)
    }
}
