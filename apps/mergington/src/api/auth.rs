//! # Authentication Module
//!
//! Bearer-token handling for the HTTP API.
//!
//! Two middleware layers cooperate:
//! - [`identity_middleware`] runs on every request, validates the
//!   `Authorization: Bearer <token>` header if present, and stores the result
//!   as a [`CurrentStaff`] request extension. A bad token is treated exactly
//!   like no token.
//! - [`require_staff_middleware`] guards staff-only routes. It rejects the
//!   request with 401 when no identity was resolved, and otherwise exposes the
//!   [`Identity`] extension to the handler.

use super::{AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use mergington_core::{Identity, MergingtonError, unix_now};

/// The staff identity resolved for the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct CurrentStaff(pub Option<Identity>);

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Missing headers, other schemes,
/// and empty tokens yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolve the bearer token (if any) into a [`CurrentStaff`] extension.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match bearer_token(request.headers()) {
        None => None,
        Some(token) => match state.auth.verify_at(token, unix_now()) {
            Ok(identity) => Some(identity),
            Err(reason) => {
                tracing::debug!(
                    event = "token_rejected",
                    reason = %reason,
                    "Ignoring invalid bearer token"
                );
                None
            }
        },
    };

    request.extensions_mut().insert(CurrentStaff(identity));
    next.run(request).await
}

/// Reject requests without a valid staff token.
pub async fn require_staff_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<CurrentStaff>()
        .and_then(|current| current.0.clone());

    let Some(identity) = identity else {
        tracing::warn!(
            event = "auth_failure",
            reason = "missing_or_invalid_token",
            path = %request.uri().path(),
            "Staff authentication required"
        );
        return Err(MergingtonError::AuthenticationRequired.into());
    };

    tracing::debug!(staff = %identity.email, "Staff request authorized");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// =============================================================================
// TESTS
// =============================================================================
