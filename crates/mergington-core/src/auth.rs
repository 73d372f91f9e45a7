//! # Auth Gate
//!
//! Staff login and bearer-token checks.
//!
//! Authentication is per request, not per session:
//!
//! ```text
//! Unauthenticated --login--> Authenticated(token) --expiry/restart--> Unauthenticated
//! ```
//!
//! Every operation that depends on the clock has an `*_at(now)` form taking
//! Unix seconds; the plain form uses the system clock.

use crate::primitives::{DEFAULT_TOKEN_TTL_SECS, TOKEN_TYPE};
use crate::staff::StaffDirectory;
use crate::token::{Claims, TokenError, TokenSigner};
use crate::{Identity, MergingtonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in seconds. A clock before the epoch reads as 0.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The signed bearer token.
    pub token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Absolute expiry, Unix seconds.
    pub expires_at: u64,
    /// The staff member the token was issued to.
    pub identity: Identity,
}

/// Verifies staff credentials and issues/validates staff tokens.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AuthGate {
    staff: StaffDirectory,
    signer: TokenSigner,
    ttl_secs: u64,
}

impl AuthGate {
    /// Create a gate with the default 24 hour token lifetime.
    #[must_use]
    pub fn new(staff: StaffDirectory, signer: TokenSigner) -> Self {
        Self {
            staff,
            signer,
            ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Override the token lifetime. Zero is clamped to one second.
    #[must_use]
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs.max(1);
        self
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// The staff directory this gate checks against.
    #[must_use]
    pub fn staff(&self) -> &StaffDirectory {
        &self.staff
    }

    /// Log in with the system clock.
    pub fn login(&self, email: &str, password: &str) -> Result<IssuedToken, MergingtonError> {
        self.login_at(email, password, unix_now())
    }

    /// Log in at `now`.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or a wrong password; the two
    /// cases are indistinguishable to the caller.
    pub fn login_at(
        &self,
        email: &str,
        password: &str,
        now: u64,
    ) -> Result<IssuedToken, MergingtonError> {
        let account = self
            .staff
            .verify(email, password)
            .ok_or(MergingtonError::InvalidCredentials)?;

        let identity = account.identity();
        let claims = Claims::new(&identity, now, self.ttl_secs);
        let token = self.signer.sign(&claims)?;

        Ok(IssuedToken {
            token,
            token_type: TOKEN_TYPE,
            expires_at: claims.exp,
            identity,
        })
    }

    /// Decode a token at `now`, keeping the rejection reason.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Identity, TokenError> {
        self.signer.verify(token, now).map(|claims| claims.identity())
    }

    /// Validate an optional bearer token with the system clock.
    #[must_use]
    pub fn validate(&self, token: Option<&str>) -> Option<Identity> {
        self.validate_at(token, unix_now())
    }

    /// Validate an optional bearer token at `now`.
    ///
    /// Missing, malformed, forged, and expired tokens all yield `None`.
    #[must_use]
    pub fn validate_at(&self, token: Option<&str>, now: u64) -> Option<Identity> {
        token.and_then(|t| self.verify_at(t, now).ok())
    }

    /// Require a valid staff token, using the system clock.
    pub fn require_staff(&self, token: Option<&str>) -> Result<Identity, MergingtonError> {
        self.require_staff_at(token, unix_now())
    }

    /// Require a valid staff token at `now`.
    pub fn require_staff_at(
        &self,
        token: Option<&str>,
        now: u64,
    ) -> Result<Identity, MergingtonError> {
        self.validate_at(token, now)
            .ok_or(MergingtonError::AuthenticationRequired)
    }
}

// =============================================================================
// TESTS
// =============================================================================
