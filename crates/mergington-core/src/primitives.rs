//! # Primitives
//!
//! Limits and constants shared by the registry and the auth gate.

/// Maximum length of a student email in bytes (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of an activity name in bytes.
pub const MAX_ACTIVITY_NAME_LENGTH: usize = 128;

/// Default staff token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Token type reported to clients alongside the access token.
pub const TOKEN_TYPE: &str = "bearer";

/// Signature algorithm declared in every token header.
pub const TOKEN_ALGORITHM: &str = "HS256";

/// Check that a student email fits within [`MAX_EMAIL_LENGTH`].
///
/// The format is not checked and no normalization is applied: any string
/// is a roster entry, compared exactly.
#[must_use]
pub fn is_within_email_limit(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH
}
