//! Input validation for arguments that end up on a `demisto-sdk` command line.
//!
//! Every string a tool caller supplies passes through exactly one of the
//! validators in this module before it may appear in a [`CommandSpec`].
//! Validators return a [`Rejection`] for bad input instead of failing; the
//! dispatch layer turns rejections into structured results.
//!
//! [`CommandSpec`]: crate::runner::CommandSpec

pub mod binary;
pub mod insecure;
pub mod name;
pub mod path;

use std::path::PathBuf;
use thiserror::Error;

pub use binary::{validate_sdk_binary, ALLOWED_SDK_BINARIES, DEFAULT_SDK_BINARY};
pub use insecure::{check_insecure_flag, ACKNOWLEDGE_FIELD};
pub use name::{opaque_payload, validate_choice, validate_name, MAX_NAME_LENGTH};
pub use path::{safe_resolve_path, validate_path_argument};

/// Result of a validator.
pub type Validated<T> = std::result::Result<T, Rejection>;

/// Reason a validator refused its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("value is empty")]
    Empty,

    #[error("value is too long: {len} characters (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("'{0}' contains invalid characters")]
    InvalidCharacters(String),

    #[error("'{}' resolves outside of '{}'", .path.display(), .root.display())]
    Traversal { path: PathBuf, root: PathBuf },

    #[error("symbolic link in path: {}", .0.display())]
    Symlink(PathBuf),

    #[error("path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("binary '{0}' is not in the allowlist")]
    NotInAllowlist(String),

    #[error("binary '{0}' was not found in PATH")]
    BinaryNotFound(String),

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("'{value}' is not one of: {}", .allowed.join(", "))]
    InvalidChoice { value: String, allowed: Vec<String> },

    #[error("cannot resolve '{path}': {reason}")]
    Unresolvable { path: String, reason: String },
}
