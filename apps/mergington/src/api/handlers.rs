//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    auth::CurrentStaff,
    error::ApiError,
    types::{
        ActivitiesResponse, EmailQuery, HealthResponse, LoginRequest, LoginResponse,
        MessageResponse,
    },
};
use axum::{
    Extension, Form, Json,
    extract::{
        Path, Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    response::IntoResponse,
};
use mergington_core::{Activity, Identity, MergingtonError};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// ACTIVITY HANDLERS
// =============================================================================

/// List every activity with its roster.
pub async fn list_activities_handler(State(state): State<AppState>) -> Json<ActivitiesResponse> {
    let registry = state.registry.read().await;
    Json(registry.list().clone())
}

/// Fetch a single activity.
pub async fn get_activity_handler(
    State(state): State<AppState>,
    Path(activity_name): Path<String>,
) -> Result<Json<Activity>, ApiError> {
    let registry = state.registry.read().await;
    registry
        .get(&activity_name)
        .cloned()
        .map(Json)
        .ok_or_else(|| MergingtonError::ActivityNotFound(activity_name).into())
}

/// Sign a student up. Open to anyone.
pub async fn signup_handler(
    State(state): State<AppState>,
    Path(activity_name): Path<String>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let query = email_query(query)?;

    // Hold the write lock across check and append.
    let mut registry = state.registry.write().await;
    let message = registry.signup(&activity_name, &query.email)?;

    tracing::info!(
        event = "signup",
        activity = %activity_name,
        email = %query.email,
        "Student signed up"
    );
    Ok(Json(MessageResponse::new(message)))
}

/// Remove a student. Staff only; `require_staff_middleware` supplies the
/// caller's identity.
pub async fn unregister_handler(
    State(state): State<AppState>,
    Extension(staff): Extension<Identity>,
    Path(activity_name): Path<String>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let query = email_query(query)?;

    let mut registry = state.registry.write().await;
    let message = registry.unregister(&activity_name, &query.email, Some(&staff))?;

    tracing::info!(
        event = "unregister",
        activity = %activity_name,
        email = %query.email,
        staff = %staff.email,
        "Student unregistered"
    );
    Ok(Json(MessageResponse::new(message)))
}

/// Unwrap the `?email=` parameter, answering a bad query with a `{detail}` body.
fn email_query(
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<EmailQuery, ApiError> {
    query.map(|Query(q)| q).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected email query");
        ApiError::bad_request("email query parameter is required")
    })
}

// =============================================================================
// AUTH HANDLERS
// =============================================================================

/// Exchange staff credentials for a bearer token.
///
/// Credentials may come from the query string or a urlencoded form body;
/// query values win when both are present.
pub async fn login_handler(
    State(state): State<AppState>,
    Query(query): Query<LoginRequest>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let form = form.map(|Form(f)| f).unwrap_or_default();
    let LoginRequest {
        email: Some(email),
        password: Some(password),
    } = query.or(form)
    else {
        return Err(ApiError::bad_request("email and password are required"));
    };

    match state.auth.login(&email, &password) {
        Ok(issued) => {
            tracing::info!(event = "login", staff = %email, "Staff logged in");
            Ok(Json(LoginResponse::from(issued)))
        }
        Err(err) => {
            tracing::warn!(
                event = "auth_failure",
                reason = "invalid_credentials",
                staff = %email,
                "Login failed"
            );
            Err(err.into())
        }
    }
}

/// Return the identity behind the presented bearer token.
pub async fn me_handler(
    Extension(current): Extension<CurrentStaff>,
) -> Result<Json<Identity>, ApiError> {
    current
        .0
        .map(Json)
        .ok_or_else(|| MergingtonError::NotAuthenticated.into())
}
