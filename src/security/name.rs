//! Identifier and closed-choice validation.
//!
//! Pack, integration, script, template and command names are interpolated
//! as bare CLI tokens, so they are held to a strict allowlist.

use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use super::{Rejection, Validated};

/// Maximum allowed length for names.
pub const MAX_NAME_LENGTH: usize = 100;

/// Full-string match: alphanumerics, `_` and `-`.
const SAFE_NAME_PATTERN: &str = r"^[A-Za-z0-9_\-]+$";

fn safe_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SAFE_NAME_PATTERN).expect("valid name pattern"))
}

/// Validates a pack/integration/script/template/command name.
///
/// A name is valid if:
/// - It is not empty
/// - It is no longer than `max_length` characters
/// - It contains only ASCII alphanumeric characters, dashes, and underscores
///
/// Valid names are returned unchanged.
///
/// # Examples
///
/// ```
/// use demisto_mcp::security::{validate_name, MAX_NAME_LENGTH};
///
/// assert_eq!(validate_name("HelloWorld", MAX_NAME_LENGTH).unwrap(), "HelloWorld");
/// assert!(validate_name("", MAX_NAME_LENGTH).is_err());
/// assert!(validate_name("../etc/passwd", MAX_NAME_LENGTH).is_err());
/// ```
pub fn validate_name(name: &str, max_length: usize) -> Validated<&str> {
    if name.is_empty() {
        return Err(Rejection::Empty);
    }

    let len = name.chars().count();
    if len > max_length {
        let preview: String = name.chars().take(50).collect();
        warn!(max_length, name = %preview, "name exceeds max length");
        return Err(Rejection::TooLong {
            len,
            max: max_length,
        });
    }

    if !safe_name_regex().is_match(name) {
        warn!(name, "name contains invalid characters");
        return Err(Rejection::InvalidCharacters(name.to_string()));
    }

    Ok(name)
}

/// Accept `value` only if it is one of `allowed` (exact, case-sensitive).
pub fn validate_choice<'a>(value: &'a str, allowed: &[&str]) -> Validated<&'a str> {
    if allowed.contains(&value) {
        return Ok(value);
    }
    warn!(value, ?allowed, "value not in closed choice set");
    Err(Rejection::InvalidChoice {
        value: value.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    })
}

/// Pass-through for fields the SDK treats as data rather than as tokens.
///
/// Release-note bodies, remote command text and the like are forwarded
/// verbatim. Only values that cannot be carried in an argument vector at all
/// (empty, or containing NUL) are refused.
pub fn opaque_payload(value: &str) -> Validated<&str> {
    if value.is_empty() {
        return Err(Rejection::Empty);
    }
    if value.contains('\0') {
        warn!("payload contains a NUL byte");
        return Err(Rejection::InvalidCharacters(value.replace('\0', "\\0")));
    }
    Ok(value)
}
