//! # Mergington HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /activities` - All activities with their rosters
//! - `GET /activities/{name}` - One activity
//! - `POST /activities/{name}/signup?email=` - Sign a student up
//! - `DELETE /activities/{name}/unregister?email=` - Remove a student (staff only)
//! - `POST /auth/login` - Exchange staff credentials for a bearer token
//! - `GET /auth/me` - Identity behind the presented bearer token
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `MERGINGTON_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)

mod auth;
mod error;
mod handlers;
mod types;

// Re-exports for external use and integration tests (via `mergington::api::*`)
pub use auth::{CurrentStaff, bearer_token};
pub use error::ApiError;
pub use types::{
    ActivitiesResponse, EmailQuery, ErrorResponse, HealthResponse, LoginRequest, LoginResponse,
    MessageResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use mergington_core::{ActivityRegistry, AuthGate, MergingtonError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies are only ever small login forms.
const MAX_BODY_BYTES: usize = 16 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
///
/// The registry sits behind one lock: handlers hold the write side for the
/// whole check-then-mutate step, so concurrent signups and removals are
/// serialized.
#[derive(Clone)]
pub struct AppState {
    /// The activity rosters.
    pub registry: Arc<RwLock<ActivityRegistry>>,
    /// Staff login and token validation. Immutable after startup.
    pub auth: Arc<AuthGate>,
}

impl AppState {
    /// Create new app state.
    #[must_use]
    pub fn new(registry: ActivityRegistry, auth: AuthGate) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            auth: Arc::new(auth),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Browser origins the API answers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

const LOCALHOST_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8000",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8000",
];

fn localhost_origins() -> CorsOrigins {
    CorsOrigins::List(
        LOCALHOST_ORIGINS
            .into_iter()
            .map(HeaderValue::from_static)
            .collect(),
    )
}

/// Interpret `MERGINGTON_CORS_ORIGINS`: `*`, a comma list, or unset for
/// localhost only. Unparseable entries are skipped.
fn parse_cors_origins(raw: Option<&str>) -> CorsOrigins {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return localhost_origins();
    };
    if raw == "*" {
        return CorsOrigins::Any;
    }

    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(e) => {
                tracing::warn!("CORS: skipping invalid origin '{}': {}", o, e);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::warn!("CORS: no usable origins in MERGINGTON_CORS_ORIGINS, using localhost");
        return localhost_origins();
    }
    CorsOrigins::List(origins)
}

fn build_cors_layer() -> CorsLayer {
    let raw = std::env::var("MERGINGTON_CORS_ORIGINS").ok();
    match parse_cors_origins(raw.as_deref()) {
        CorsOrigins::Any => {
            tracing::warn!("CORS: every origin allowed (MERGINGTON_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        CorsOrigins::List(origins) => {
            tracing::info!(origins = origins.len(), "CORS: origin allow-list active");
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Identity - resolves the bearer token, if any
/// 5. Staff gate - staff-only routes only
pub fn create_router(state: AppState) -> Router {
    let staff_routes = Router::new()
        .route(
            "/activities/{activity_name}/unregister",
            delete(handlers::unregister_handler),
        )
        .route_layer(axum_middleware::from_fn(auth::require_staff_middleware));

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/activities", get(handlers::list_activities_handler))
        .route(
            "/activities/{activity_name}",
            get(handlers::get_activity_handler),
        )
        .route(
            "/activities/{activity_name}/signup",
            post(handlers::signup_handler),
        )
        .route("/auth/login", post(handlers::login_handler))
        .route("/auth/me", get(handlers::me_handler))
        .merge(staff_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::identity_middleware,
        ))
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer()),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), MergingtonError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MergingtonError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Mergington HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MergingtonError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

// =============================================================================
// TESTS
// =============================================================================
