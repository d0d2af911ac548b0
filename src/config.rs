//! Server configuration.
//!
//! Values are layered: command-line flags, then the TOML config file, then
//! environment variables, then built-in defaults. The SDK binary and content
//! root are left unset unless a flag or the file names them, so the runner
//! keeps reading `DEMISTO_SDK_BIN` and `DEMISTO_SDK_CONTENT_PATH` on every
//! invocation.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::runner::{expand_tilde, RunnerConfig, DEFAULT_COMMAND_TIMEOUT};

/// Overrides the pattern index directory.
pub const PATTERN_DB_ENV: &str = "XSIAM_PATTERN_DB";

/// Config file looked up under the user config directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "demisto-mcp/config.toml";

/// How path arguments are checked before they reach the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathPolicy {
    /// Filter metacharacters and confine every path to the content root
    #[default]
    ContentRoot,
    /// Filter metacharacters only
    CharactersOnly,
}

impl std::fmt::Display for PathPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPolicy::ContentRoot => write!(f, "content-root"),
            PathPolicy::CharactersOnly => write!(f, "characters-only"),
        }
    }
}

impl std::str::FromStr for PathPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "content-root" => Ok(PathPolicy::ContentRoot),
            "characters-only" => Ok(PathPolicy::CharactersOnly),
            _ => bail!("Invalid path policy: {s}. Use: content-root, characters-only"),
        }
    }
}

/// `[sdk]` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdkSection {
    pub bin: Option<String>,
    pub content_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub path_policy: Option<PathPolicy>,
}

/// `[search]` section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    pub pattern_db: Option<PathBuf>,
}

/// On-disk configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub sdk: SdkSection,
    #[serde(default)]
    pub search: SearchSection,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub sdk_bin: Option<String>,
    pub content_path: Option<PathBuf>,
    pub pattern_db: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub path_policy: Option<PathPolicy>,
}

/// Fully resolved configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub sdk_bin: Option<String>,
    pub content_path: Option<PathBuf>,
    pub pattern_db: PathBuf,
    pub command_timeout: Duration,
    pub path_policy: PathPolicy,
}

impl ServerConfig {
    /// Resolve configuration from flags, config file, environment and defaults.
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_file {
            Some(path) => ConfigFile::load(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => ConfigFile::load(&path)?,
                None => ConfigFile::default(),
            },
        };
        Self::resolve(overrides, file)
    }

    /// Merge already-parsed layers.
    pub fn resolve(overrides: &ConfigOverrides, file: ConfigFile) -> Result<Self> {
        let timeout_secs = overrides
            .timeout_secs
            .or(file.sdk.timeout_secs)
            .unwrap_or(DEFAULT_COMMAND_TIMEOUT.as_secs());
        if timeout_secs == 0 {
            bail!("Command timeout must be at least 1 second");
        }

        let pattern_db = overrides
            .pattern_db
            .clone()
            .or(file.search.pattern_db)
            .or_else(|| env::var_os(PATTERN_DB_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .unwrap_or_else(default_pattern_db);

        Ok(Self {
            sdk_bin: overrides.sdk_bin.clone().or(file.sdk.bin),
            content_path: overrides
                .content_path
                .clone()
                .or(file.sdk.content_path)
                .map(|p| expand_tilde(&p)),
            pattern_db: expand_tilde(&pattern_db),
            command_timeout: Duration::from_secs(timeout_secs),
            path_policy: overrides
                .path_policy
                .or(file.sdk.path_policy)
                .unwrap_or_default(),
        })
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            sdk_bin: self.sdk_bin.clone(),
            content_path: self.content_path.clone(),
            command_timeout: self.command_timeout,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sdk_bin: None,
            content_path: None,
            pattern_db: default_pattern_db(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            path_policy: PathPolicy::default(),
        }
    }
}

/// `~/.xsiam-patterns/index`
pub fn default_pattern_db() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".xsiam-patterns")
        .join("index")
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn with_pattern_env<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let original = env::var_os(PATTERN_DB_ENV);
        match value {
            Some(v) => env::set_var(PATTERN_DB_ENV, v),
            None => env::remove_var(PATTERN_DB_ENV),
        }
        let result = f();
        match original {
            Some(v) => env::set_var(PATTERN_DB_ENV, v),
            None => env::remove_var(PATTERN_DB_ENV),
        }
        result
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let config = with_pattern_env(None, || {
            ServerConfig::resolve(&ConfigOverrides::default(), ConfigFile::default()).unwrap()
        });
        assert_eq!(config.sdk_bin, None);
        assert_eq!(config.content_path, None);
        assert_eq!(config.command_timeout, Duration::from_secs(300));
        assert_eq!(config.path_policy, PathPolicy::ContentRoot);
        assert_eq!(config.pattern_db, default_pattern_db());
    }

    #[test]
    #[serial]
    fn test_precedence() {
        let file: ConfigFile = toml::from_str(
            r#"
            [sdk]
            bin = "/opt/file/demisto-sdk"
            timeout_secs = 60
            path_policy = "characters-only"

            [search]
            pattern_db = "/var/file-patterns"
            "#,
        )
        .unwrap();

        let overrides = ConfigOverrides {
            sdk_bin: Some("/opt/cli/demisto-sdk".to_string()),
            timeout_secs: Some(10),
            ..Default::default()
        };

        let config = with_pattern_env(Some("/var/env-patterns"), || {
            ServerConfig::resolve(&overrides, file).unwrap()
        });
        assert_eq!(config.sdk_bin.as_deref(), Some("/opt/cli/demisto-sdk"));
        assert_eq!(config.command_timeout, Duration::from_secs(10));
        assert_eq!(config.path_policy, PathPolicy::CharactersOnly);
        assert_eq!(config.pattern_db, PathBuf::from("/var/file-patterns"));
    }

    #[test]
    #[serial]
    fn test_environment_pattern_db() {
        let config = with_pattern_env(Some("/var/env-patterns"), || {
            ServerConfig::resolve(&ConfigOverrides::default(), ConfigFile::default()).unwrap()
        });
        assert_eq!(config.pattern_db, PathBuf::from("/var/env-patterns"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let overrides = ConfigOverrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(ServerConfig::resolve(&overrides, ConfigFile::default()).is_err());
    }

    #[test]
    fn test_load_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[sdk]\ncontent_path = \"/srv/content\"\n").unwrap();

        let file = ConfigFile::load(&path).unwrap();
        assert_eq!(file.sdk.content_path, Some(PathBuf::from("/srv/content")));
        assert!(file.search.pattern_db.is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[sdk]\nshell = true\n").unwrap();

        let err = ConfigFile::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_path_policy_parse() {
        assert_eq!(
            "content-root".parse::<PathPolicy>().unwrap(),
            PathPolicy::ContentRoot
        );
        assert_eq!(
            "Characters-Only".parse::<PathPolicy>().unwrap(),
            PathPolicy::CharactersOnly
        );
        assert!("anything".parse::<PathPolicy>().is_err());
        assert_eq!(PathPolicy::CharactersOnly.to_string(), "characters-only");
    }
}
