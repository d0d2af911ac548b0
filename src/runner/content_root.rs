//! Content root discovery.
//!
//! `demisto-sdk` expects to run inside a content repository layout, which at
//! minimum means a `Packs/` directory. The root is recomputed for every
//! invocation and never cached.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory that marks a content root.
pub const MARKER_DIR: &str = "Packs";

/// Scratch content root, relative to the current directory.
pub const FALLBACK_CONTENT_DIR: &str = "_tmp/demisto-sdk-content";

/// Resolve the content root, creating it where needed.
///
/// Order of preference:
/// 1. `hint`, if it already contains `Packs/`
/// 2. `env_override` (`DEMISTO_SDK_CONTENT_PATH`), creating `Packs/` if needed
/// 3. `cwd`, if it already contains `Packs/`
/// 4. `<cwd>/_tmp/demisto-sdk-content`, created with `Packs/` inside
pub fn resolve_content_root(
    hint: Option<&Path>,
    env_override: Option<&Path>,
    cwd: &Path,
) -> io::Result<PathBuf> {
    if let Some(root) = marked_hint(hint, cwd) {
        debug!(root = %root.display(), "content root from hint");
        return Ok(root);
    }

    if let Some(configured) = non_empty(env_override) {
        let candidate = absolute(&expand_tilde(configured), cwd);
        fs::create_dir_all(candidate.join(MARKER_DIR))?;
        let canonical = candidate.canonicalize()?;
        debug!(root = %canonical.display(), "content root from environment");
        return Ok(canonical);
    }

    if cwd.join(MARKER_DIR).is_dir() {
        debug!(root = %cwd.display(), "content root from working directory");
        return Ok(cwd.to_path_buf());
    }

    let fallback = cwd.join(FALLBACK_CONTENT_DIR);
    fs::create_dir_all(fallback.join(MARKER_DIR))?;
    let canonical = fallback.canonicalize()?;
    debug!(root = %canonical.display(), "using scratch content root");
    Ok(canonical)
}

/// Where [`resolve_content_root`] would settle, without touching the
/// filesystem beyond reading it.
///
/// Roots that do not exist yet come back as absolute, uncanonicalized paths.
pub fn locate_content_root(
    hint: Option<&Path>,
    env_override: Option<&Path>,
    cwd: &Path,
) -> PathBuf {
    if let Some(root) = marked_hint(hint, cwd) {
        return root;
    }

    if let Some(configured) = non_empty(env_override) {
        let candidate = absolute(&expand_tilde(configured), cwd);
        return candidate.canonicalize().unwrap_or(candidate);
    }

    if cwd.join(MARKER_DIR).is_dir() {
        return cwd.to_path_buf();
    }

    let fallback = cwd.join(FALLBACK_CONTENT_DIR);
    fallback.canonicalize().unwrap_or(fallback)
}

/// The canonical hint, if it is already a content root.
fn marked_hint(hint: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    let hint = non_empty(hint)?;
    let canonical = absolute(&expand_tilde(hint), cwd).canonicalize().ok()?;
    canonical.join(MARKER_DIR).is_dir().then_some(canonical)
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn canonical_temp() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().canonicalize().unwrap();
        (temp, path)
    }

    #[test]
    fn test_hint_with_marker_wins() {
        let (_temp, dir) = canonical_temp();
        let hinted = dir.join("repo");
        fs::create_dir_all(hinted.join(MARKER_DIR)).unwrap();
        let env_dir = dir.join("env-root");

        let root = resolve_content_root(Some(&hinted), Some(&env_dir), &dir).unwrap();
        assert_eq!(root, hinted);
        assert!(!env_dir.exists(), "environment root must not be created");
    }

    #[test]
    fn test_hint_without_marker_is_ignored() {
        let (_temp, dir) = canonical_temp();
        let hinted = dir.join("not-a-repo");
        fs::create_dir_all(&hinted).unwrap();
        let env_dir = dir.join("env-root");

        let root = resolve_content_root(Some(&hinted), Some(&env_dir), &dir).unwrap();
        assert_eq!(root, env_dir);
        assert!(env_dir.join(MARKER_DIR).is_dir());
    }

    #[test]
    fn test_environment_root_is_created() {
        let (_temp, dir) = canonical_temp();
        let env_dir = dir.join("a/b/content");

        let root = resolve_content_root(None, Some(&env_dir), &dir).unwrap();
        assert_eq!(root, env_dir);
        assert!(root.join(MARKER_DIR).is_dir());
    }

    #[test]
    fn test_relative_environment_root_uses_cwd() {
        let (_temp, dir) = canonical_temp();
        let root = resolve_content_root(None, Some(Path::new("content")), &dir).unwrap();
        assert_eq!(root, dir.join("content"));
    }

    #[test]
    fn test_cwd_with_marker() {
        let (_temp, dir) = canonical_temp();
        fs::create_dir_all(dir.join(MARKER_DIR)).unwrap();

        let root = resolve_content_root(None, None, &dir).unwrap();
        assert_eq!(root, dir);
        assert!(!dir.join(FALLBACK_CONTENT_DIR).exists());
    }

    #[test]
    fn test_fallback_is_created() {
        let (_temp, dir) = canonical_temp();

        let root = resolve_content_root(None, None, &dir).unwrap();
        assert_eq!(root, dir.join(FALLBACK_CONTENT_DIR));
        assert!(root.join(MARKER_DIR).is_dir());

        let again = resolve_content_root(None, None, &dir).unwrap();
        assert_eq!(root, again);
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let (_temp, dir) = canonical_temp();
        fs::create_dir_all(dir.join(MARKER_DIR)).unwrap();

        let root = resolve_content_root(Some(Path::new("")), Some(Path::new("")), &dir).unwrap();
        assert_eq!(root, dir);
    }

    #[test]
    fn test_locate_creates_nothing() {
        let (_temp, dir) = canonical_temp();
        let env_dir = dir.join("never/created");

        assert_eq!(locate_content_root(None, Some(&env_dir), &dir), env_dir);
        assert!(!dir.join("never").exists());

        assert_eq!(
            locate_content_root(None, None, &dir),
            dir.join(FALLBACK_CONTENT_DIR)
        );
        assert!(!dir.join("_tmp").exists());
    }

    #[test]
    fn test_locate_matches_resolve() {
        let (_temp, dir) = canonical_temp();
        let hinted = dir.join("repo");
        fs::create_dir_all(hinted.join(MARKER_DIR)).unwrap();
        let env_dir = dir.join("env-root");

        for hint in [Some(hinted.as_path()), None] {
            let located = locate_content_root(hint, Some(&env_dir), &dir);
            let resolved = resolve_content_root(hint, Some(&env_dir), &dir).unwrap();
            assert_eq!(located, resolved);
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde(Path::new("rel")), PathBuf::from("rel"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~/content")), home.join("content"));
            assert_eq!(expand_tilde(Path::new("~")), home);
        }
    }
}
