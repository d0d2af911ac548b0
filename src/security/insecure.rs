//! Acknowledgment gate for disabling TLS verification.

use tracing::warn;

/// Argument name a caller must set to `true` alongside `insecure`.
pub const ACKNOWLEDGE_FIELD: &str = "acknowledge_insecure_risk";

/// Decide whether the `insecure` option may be honored.
///
/// Returns `(can_proceed, message)`. The message is only present when the
/// request is refused. Accepting the risk is logged at warn level.
pub fn check_insecure_flag(insecure: bool, acknowledged: bool) -> (bool, Option<String>) {
    if !insecure {
        return (true, None);
    }

    if !acknowledged {
        return (
            false,
            Some(format!(
                "SECURITY WARNING: The 'insecure' option disables SSL certificate \
                 verification, exposing your API credentials to man-in-the-middle attacks. \
                 To proceed, you must set '{ACKNOWLEDGE_FIELD}': true to confirm \
                 you understand and accept this security risk. \
                 Consider configuring proper SSL certificates instead."
            )),
        );
    }

    warn!("SSL verification disabled by acknowledged request - MITM attack risk");
    (true, None)
}
