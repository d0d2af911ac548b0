//! Argument vector construction.

use shell_escape::escape;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Ordered argument vector for one SDK invocation.
///
/// Static flag tokens go through [`flag`](Self::flag), which only accepts
/// `'static` strings. Anything derived from caller input goes through
/// [`arg`](Self::arg) and must already have passed a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Start a spec with the SDK subcommand.
    pub fn new(subcommand: &'static str) -> Self {
        Self {
            args: vec![subcommand.to_string()],
            working_dir: None,
        }
    }

    pub fn flag(mut self, flag: &'static str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    /// Append `flag` only when `enabled`.
    pub fn flag_if(self, enabled: bool, flag: &'static str) -> Self {
        if enabled {
            self.flag(flag)
        } else {
            self
        }
    }

    /// Append a validated value.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Append `flag value`.
    pub fn option(self, flag: &'static str, value: impl Into<String>) -> Self {
        self.flag(flag).arg(value)
    }

    /// Append `flag value` when a value is present.
    pub fn option_if(self, flag: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.option(flag, v),
            None => self,
        }
    }

    /// Prefer this directory as the content root.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Shell-escaped rendering, for logs only.
    pub fn display(&self) -> String {
        self.args
            .iter()
            .map(|a| escape(Cow::Borrowed(a.as_str())).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_in_order() {
        let spec = CommandSpec::new("init")
            .flag("--pack")
            .option("-n", "MyPack")
            .flag_if(false, "-y")
            .flag_if(true, "-f")
            .option_if("-o", None::<String>)
            .option_if("-p", Some("Other"));

        assert_eq!(
            spec.args(),
            &["init", "--pack", "-n", "MyPack", "-f", "-p", "Other"]
        );
        assert!(spec.working_dir().is_none());
    }

    #[test]
    fn test_display_escapes_payloads() {
        let spec = CommandSpec::new("update-release-notes").option("--text", "fixed it; ok");
        assert_eq!(spec.display(), "update-release-notes --text 'fixed it; ok'");
    }

    #[test]
    fn test_in_dir() {
        let spec = CommandSpec::new("validate").in_dir("/content");
        assert_eq!(spec.working_dir(), Some(Path::new("/content")));
    }
}
