//! Path bounds checking.
//!
//! [`safe_resolve_path`] canonicalizes a path and keeps it inside an allowed
//! root. [`validate_path_argument`] is the stricter entry point used for
//! values that become command-line arguments: it filters characters before
//! any filesystem access happens.

use regex::Regex;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

use super::{Rejection, Validated};

/// Characters allowed in a path argument: alphanumerics, `_`, `-`, `.`, `/`.
const SAFE_PATH_PATTERN: &str = r"^[A-Za-z0-9_\-./]+$";

fn safe_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SAFE_PATH_PATTERN).expect("valid path pattern"))
}

/// Resolve `path` and require that it stays within `allowed_root`.
///
/// Relative paths are joined onto the canonical root. Paths that do not exist
/// yet are resolved through their longest existing ancestor, so a tool output
/// location can be checked before the tool creates it.
///
/// Unless `follow_symlinks` is set, every component of the joined path (before
/// canonicalization, leaf to filesystem root) is inspected and any symbolic
/// link rejects the whole path. Containment is enforced in both modes.
pub fn safe_resolve_path(
    path: impl AsRef<Path>,
    allowed_root: &Path,
    follow_symlinks: bool,
) -> Validated<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() || allowed_root.as_os_str().is_empty() {
        return Err(Rejection::Empty);
    }

    let root = resolve_lenient(allowed_root).map_err(|e| unresolvable(allowed_root, e))?;

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let resolved = resolve_lenient(&joined).map_err(|e| unresolvable(path, e))?;

    if !follow_symlinks {
        if let Some(link) = first_symlink(&joined) {
            warn!(path = %joined.display(), link = %link.display(), "symlink detected in path");
            return Err(Rejection::Symlink(link));
        }
    }

    if !resolved.starts_with(&root) {
        warn!(
            path = %path.display(),
            resolved = %resolved.display(),
            root = %root.display(),
            "path traversal blocked"
        );
        return Err(Rejection::Traversal {
            path: resolved,
            root,
        });
    }

    Ok(resolved)
}

/// Validate a path that will be passed to the SDK as a literal argument.
///
/// The character filter runs first and applies even without a root. A value
/// starting with `-` is refused as well, since the SDK would parse it as an
/// option. With a root the canonical absolute path is returned; without one
/// the input is returned unchanged.
pub fn validate_path_argument(
    path: &str,
    allowed_root: Option<&Path>,
    must_exist: bool,
    follow_symlinks: bool,
) -> Validated<String> {
    if path.is_empty() {
        return Err(Rejection::Empty);
    }

    if !safe_path_regex().is_match(path) || path.starts_with('-') {
        warn!(path, "path contains invalid characters");
        return Err(Rejection::InvalidCharacters(path.to_string()));
    }

    if let Some(root) = allowed_root {
        let resolved = safe_resolve_path(path, root, follow_symlinks)?;
        if must_exist && !resolved.exists() {
            warn!(path = %resolved.display(), "path does not exist");
            return Err(Rejection::NotFound(resolved));
        }
        return resolved
            .into_os_string()
            .into_string()
            .map_err(|raw| Rejection::Unresolvable {
                path: path.to_string(),
                reason: format!("resolved path is not UTF-8: {raw:?}"),
            });
    }

    let candidate = Path::new(path);
    if must_exist && !candidate.exists() {
        warn!(path, "path does not exist");
        return Err(Rejection::NotFound(candidate.to_path_buf()));
    }

    if !follow_symlinks && is_symlink(candidate) {
        warn!(path, "symlink rejected");
        return Err(Rejection::Symlink(candidate.to_path_buf()));
    }

    Ok(path.to_string())
}

/// Canonicalize `path`, tolerating a missing tail.
///
/// The longest existing ancestor is canonicalized (resolving symlinks in the
/// part that exists) and the remaining components are normalized lexically.
fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => return Ok(canonical),
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        Err(_) => {}
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let (ancestor, suffix) = find_existing_ancestor(&absolute).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no existing ancestor directory")
    })?;

    Ok(normalize_path(&ancestor.canonicalize()?.join(suffix)))
}

/// Resolve `.` and `..` purely lexically.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            c => result.push(c),
        }
    }
    result
}

/// Walk up from `path` until an existing ancestor is found.
///
/// Returns `(existing_ancestor, remaining_suffix)`.
fn find_existing_ancestor(path: &Path) -> Option<(PathBuf, PathBuf)> {
    let mut ancestor = path.to_path_buf();
    loop {
        if ancestor.exists() {
            let suffix = path
                .strip_prefix(&ancestor)
                .unwrap_or_else(|_| Path::new(""))
                .to_path_buf();
            return Some((ancestor, suffix));
        }
        if !ancestor.pop() {
            return None;
        }
    }
}

/// First component of `path`, from the leaf upward, that is a symbolic link.
///
/// Uses `symlink_metadata` so dangling links are caught too.
fn first_symlink(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .find(|p| is_symlink(p))
        .map(Path::to_path_buf)
}

fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn unresolvable(path: &Path, err: io::Error) -> Rejection {
    warn!(path = %path.display(), error = %err, "path validation failed");
    Rejection::Unresolvable {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
