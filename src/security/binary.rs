//! Trusted binary resolution.
//!
//! The SDK executable can be overridden through `DEMISTO_SDK_BIN`. Without
//! this gate, anyone able to set that variable could redirect execution to an
//! arbitrary program, so the basename is checked against a fixed allowlist
//! whether a bare name or a full path is supplied.

use std::path::{Path, PathBuf};
use tracing::warn;

use super::{Rejection, Validated};

/// Executable basenames the runner is allowed to invoke.
pub const ALLOWED_SDK_BINARIES: &[&str] = &["demisto-sdk"];

/// Binary used when no override is configured.
pub const DEFAULT_SDK_BINARY: &str = "demisto-sdk";

fn is_allowed(basename: &str) -> bool {
    ALLOWED_SDK_BINARIES.contains(&basename)
}

fn basename(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Validate `binary` and return the absolute path to execute.
///
/// - A bare name must be in [`ALLOWED_SDK_BINARIES`] and is looked up on
///   `PATH`.
/// - A path must still have an allowlisted basename; it is made absolute and
///   must exist as a regular file.
///
/// In both cases the canonical target must also carry an allowlisted
/// basename, so a link named `demisto-sdk` pointing at another program is
/// refused. The path that was found, not its target, is returned.
pub fn validate_sdk_binary(binary: &str) -> Validated<PathBuf> {
    if binary.is_empty() {
        return Err(Rejection::Empty);
    }

    let path = Path::new(binary);
    let is_bare = basename(path) == Some(binary);

    if is_bare {
        if !is_allowed(binary) {
            warn!(binary, "binary name not in allowlist");
            return Err(Rejection::NotInAllowlist(binary.to_string()));
        }
        let found = which::which(binary).map_err(|e| {
            warn!(binary, error = %e, "binary not found in PATH");
            Rejection::BinaryNotFound(binary.to_string())
        })?;
        return check_target(found);
    }

    let name = basename(path).unwrap_or_default();
    if !is_allowed(name) {
        warn!(binary, "binary name not in allowlist");
        return Err(Rejection::NotInAllowlist(name.to_string()));
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| Rejection::Unresolvable {
                path: binary.to_string(),
                reason: e.to_string(),
            })?
            .join(path)
    };

    if !absolute.exists() {
        warn!(binary = %absolute.display(), "binary does not exist");
        return Err(Rejection::NotFound(absolute));
    }
    if !absolute.is_file() {
        warn!(binary = %absolute.display(), "binary is not a file");
        return Err(Rejection::NotAFile(absolute));
    }

    check_target(absolute)
}

/// Re-check the basename of a located binary's canonical target.
fn check_target(found: PathBuf) -> Validated<PathBuf> {
    let canonical = found.canonicalize().map_err(|e| Rejection::Unresolvable {
        path: found.display().to_string(),
        reason: e.to_string(),
    })?;

    match basename(&canonical) {
        Some(name) if is_allowed(name) => Ok(found),
        _ => {
            warn!(
                binary = %found.display(),
                target = %canonical.display(),
                "binary resolves to a program outside the allowlist"
            );
            Err(Rejection::NotInAllowlist(canonical.display().to_string()))
        }
    }
}
