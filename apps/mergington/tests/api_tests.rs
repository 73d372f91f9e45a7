//! Integration tests for the Mergington HTTP API.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use mergington::api::{
    ActivitiesResponse, AppState, ErrorResponse, HealthResponse, LoginResponse, MessageResponse,
    create_router,
};
use mergington_core::{
    Activity, ActivityRegistry, AuthGate, CapacityPolicy, Claims, Identity, StaffAccount,
    StaffDirectory, TokenSigner, primitives::MAX_EMAIL_LENGTH, unix_now,
};
use serde_json::json;

const SECRET: &str = "api-test-secret-with-enough-length";
const STAFF_EMAIL: &str = "staff@school.edu";
const STAFF_PASSWORD: &str = "rightpass";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn registry() -> ActivityRegistry {
    let mut registry = ActivityRegistry::new();
    registry
        .insert(
            "Chess Club",
            Activity::new(
                "Learn strategies and compete in chess tournaments",
                "Fridays, 3:30 PM - 5:00 PM",
                12,
            )
            .with_participants(["michael@school.edu", "daniel@school.edu"]),
        )
        .unwrap();
    registry
        .insert(
            "Math Club",
            Activity::new("Solve challenging problems", "Tuesdays, 3:30 PM", 2)
                .with_participants(["james@school.edu", "benjamin@school.edu"]),
        )
        .unwrap();
    registry
}

fn gate() -> AuthGate {
    AuthGate::new(
        StaffDirectory::from_accounts([StaffAccount::new(
            STAFF_EMAIL,
            "Ms. Rivera",
            "teacher",
            STAFF_PASSWORD,
        )]),
        TokenSigner::new(SECRET).unwrap(),
    )
}

/// Create a test server with a fresh registry.
fn create_test_server() -> TestServer {
    let state = AppState::new(registry(), gate());
    TestServer::new(create_router(state)).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    format!("Bearer {}", token).parse::<HeaderValue>().unwrap()
}

async fn login(server: &TestServer) -> String {
    let response = server
        .post("/auth/login")
        .add_query_param("email", STAFF_EMAIL)
        .add_query_param("password", STAFF_PASSWORD)
        .await;
    response.assert_status_ok();
    response.json::<LoginResponse>().access_token
}

async fn participants(server: &TestServer, activity: &str) -> Vec<String> {
    let activities: ActivitiesResponse = server.get("/activities").await.json();
    activities[activity].participants.clone()
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// ACTIVITY LISTING TESTS
// =============================================================================

#[tokio::test]
async fn test_list_activities() {
    let server = create_test_server();

    let response = server.get("/activities").await;

    response.assert_status_ok();
    let activities: ActivitiesResponse = response.json();
    assert_eq!(activities.len(), 2);
    let chess = &activities["Chess Club"];
    assert_eq!(chess.max_participants, 12);
    assert_eq!(chess.schedule, "Fridays, 3:30 PM - 5:00 PM");
    assert_eq!(
        chess.participants,
        vec!["michael@school.edu", "daniel@school.edu"]
    );
}

#[tokio::test]
async fn test_list_activities_wire_shape() {
    let server = create_test_server();

    let body: serde_json::Value = server.get("/activities").await.json();
    let chess = &body["Chess Club"];
    assert!(chess["description"].is_string());
    assert!(chess["participants"].is_array());
    assert_eq!(chess["max_participants"], json!(12));
    assert!(chess.get("name").is_none());
}

#[tokio::test]
async fn test_get_single_activity() {
    let server = create_test_server();

    let response = server.get("/activities/Math%20Club").await;
    response.assert_status_ok();
    let activity: Activity = response.json();
    assert_eq!(activity.max_participants, 2);

    let missing = server.get("/activities/Knitting").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

// =============================================================================
// SIGNUP TESTS
// =============================================================================

#[tokio::test]
async fn test_signup_appends_student() {
    let server = create_test_server();

    let response = server
        .post("/activities/Chess%20Club/signup")
        .add_query_param("email", "x@school.edu")
        .await;

    response.assert_status_ok();
    let body: MessageResponse = response.json();
    assert_eq!(body.message, "Signed up x@school.edu for Chess Club");

    let roster = participants(&server, "Chess Club").await;
    assert_eq!(roster.len(), 3);
    assert_eq!(roster.last().map(String::as_str), Some("x@school.edu"));
}

#[tokio::test]
async fn test_signup_duplicate_returns_400() {
    let server = create_test_server();

    server
        .post("/activities/Chess%20Club/signup")
        .add_query_param("email", "x@school.edu")
        .await
        .assert_status_ok();

    let response = server
        .post("/activities/Chess%20Club/signup")
        .add_query_param("email", "x@school.edu")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Student is already signed up");
    assert_eq!(participants(&server, "Chess Club").await.len(), 3);
}

#[tokio::test]
async fn test_signup_unknown_activity_returns_404() {
    let server = create_test_server();

    let response = server
        .post("/activities/Underwater%20Basket%20Weaving/signup")
        .add_query_param("email", "x@school.edu")
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Activity not found");
}

#[tokio::test]
async fn test_signup_accepts_any_email_string() {
    let server = create_test_server();

    let response = server
        .post("/activities/Chess%20Club/signup")
        .add_query_param("email", "bob")
        .await;

    response.assert_status_ok();
    let body: MessageResponse = response.json();
    assert_eq!(body.message, "Signed up bob for Chess Club");
    assert_eq!(
        participants(&server, "Chess Club").await.last().map(String::as_str),
        Some("bob")
    );
}

#[tokio::test]
async fn test_signup_oversized_email_returns_400() {
    let server = create_test_server();

    let response = server
        .post("/activities/Chess%20Club/signup")
        .add_query_param("email", "a".repeat(MAX_EMAIL_LENGTH + 1))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Email address is too long");
    assert_eq!(participants(&server, "Chess Club").await.len(), 2);
}

#[tokio::test]
async fn test_signup_missing_email_returns_detail_body() {
    let server = create_test_server();

    let response = server.post("/activities/Chess%20Club/signup").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "email query parameter is required");
    assert_eq!(participants(&server, "Chess Club").await.len(), 2);
}

#[tokio::test]
async fn test_unregister_missing_email_returns_detail_body() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = server
        .delete("/activities/Chess%20Club/unregister")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "email query parameter is required");
    assert_eq!(participants(&server, "Chess Club").await.len(), 2);
}

#[tokio::test]
async fn test_signup_past_capacity_is_advisory_by_default() {
    let server = create_test_server();

    let response = server
        .post("/activities/Math%20Club/signup")
        .add_query_param("email", "third@school.edu")
        .await;

    response.assert_status_ok();
    assert_eq!(participants(&server, "Math Club").await.len(), 3);
}

#[tokio::test]
async fn test_signup_past_capacity_when_enforced() {
    let state = AppState::new(registry().with_policy(CapacityPolicy::Enforced), gate());
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server
        .post("/activities/Math%20Club/signup")
        .add_query_param("email", "third@school.edu")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Activity is full");
    assert_eq!(participants(&server, "Math Club").await.len(), 2);
}

// =============================================================================
// LOGIN TESTS
// =============================================================================

#[tokio::test]
async fn test_login_with_query_params() {
    let server = create_test_server();

    let response = server
        .post("/auth/login")
        .add_query_param("email", STAFF_EMAIL)
        .add_query_param("password", STAFF_PASSWORD)
        .await;

    response.assert_status_ok();
    let body: LoginResponse = response.json();
    assert_eq!(body.token_type, "bearer");
    assert_eq!(body.access_token.split('.').count(), 3);
    assert_eq!(
        body.teacher,
        Identity {
            email: STAFF_EMAIL.into(),
            name: "Ms. Rivera".into(),
            role: "teacher".into(),
        }
    );
    assert!(body.expires_at > unix_now());
}

#[tokio::test]
async fn test_login_with_form_body() {
    let server = create_test_server();

    let response = server
        .post("/auth/login")
        .form(&json!({ "email": STAFF_EMAIL, "password": STAFF_PASSWORD }))
        .await;

    response.assert_status_ok();
    let body: LoginResponse = response.json();
    assert_eq!(body.teacher.email, STAFF_EMAIL);
}

#[tokio::test]
async fn test_login_wrong_password_returns_401() {
    let server = create_test_server();

    let response = server
        .post("/auth/login")
        .add_query_param("email", STAFF_EMAIL)
        .add_query_param("password", "wrongpass")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Invalid email or password");
}

#[tokio::test]
async fn test_login_unknown_email_returns_401() {
    let server = create_test_server();

    let response = server
        .post("/auth/login")
        .add_query_param("email", "intruder@school.edu")
        .add_query_param("password", STAFF_PASSWORD)
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_missing_credentials_returns_400() {
    let server = create_test_server();

    let response = server
        .post("/auth/login")
        .add_query_param("email", STAFF_EMAIL)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// CURRENT IDENTITY TESTS
// =============================================================================

#[tokio::test]
async fn test_me_with_valid_token() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = server
        .get("/auth/me")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let identity: Identity = response.json();
    assert_eq!(identity.email, STAFF_EMAIL);
    assert_eq!(identity.name, "Ms. Rivera");
}

#[tokio::test]
async fn test_me_without_token_returns_401() {
    let server = create_test_server();

    let response = server.get("/auth/me").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Not authenticated");
}

#[tokio::test]
async fn test_me_with_garbage_token_returns_401() {
    let server = create_test_server();

    let response = server
        .get("/auth/me")
        .add_header(header::AUTHORIZATION, bearer("definitely.not.valid"))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// UNREGISTER TESTS
// =============================================================================

#[tokio::test]
async fn test_unregister_with_staff_token() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = server
        .delete("/activities/Chess%20Club/unregister")
        .add_query_param("email", "michael@school.edu")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: MessageResponse = response.json();
    assert_eq!(
        body.message,
        "Teacher Ms. Rivera unregistered michael@school.edu from Chess Club"
    );
    assert_eq!(
        participants(&server, "Chess Club").await,
        vec!["daniel@school.edu"]
    );
}

#[tokio::test]
async fn test_unregister_without_token_returns_401() {
    let server = create_test_server();

    let response = server
        .delete("/activities/Chess%20Club/unregister")
        .add_query_param("email", "michael@school.edu")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Teacher authentication required");
    assert_eq!(participants(&server, "Chess Club").await.len(), 2);
}

#[tokio::test]
async fn test_unregister_unknown_activity_without_token_returns_401() {
    let server = create_test_server();

    let response = server
        .delete("/activities/Knitting/unregister")
        .add_query_param("email", "michael@school.edu")
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unregister_with_expired_token_returns_401() {
    let server = create_test_server();
    let now = unix_now();
    let expired = TokenSigner::new(SECRET)
        .unwrap()
        .sign(&Claims {
            sub: STAFF_EMAIL.into(),
            name: "Ms. Rivera".into(),
            role: "teacher".into(),
            iat: now - 25 * 3600,
            exp: now - 3600,
        })
        .unwrap();

    let response = server
        .delete("/activities/Chess%20Club/unregister")
        .add_query_param("email", "michael@school.edu")
        .add_header(header::AUTHORIZATION, bearer(&expired))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(participants(&server, "Chess Club").await.len(), 2);
}

#[tokio::test]
async fn test_unregister_with_forged_token_returns_401() {
    let server = create_test_server();
    let forged = TokenSigner::new("attacker-chosen-secret")
        .unwrap()
        .sign(&Claims::new(
            &Identity {
                email: STAFF_EMAIL.into(),
                name: "Ms. Rivera".into(),
                role: "teacher".into(),
            },
            unix_now(),
            3600,
        ))
        .unwrap();

    let response = server
        .delete("/activities/Chess%20Club/unregister")
        .add_query_param("email", "michael@school.edu")
        .add_header(header::AUTHORIZATION, bearer(&forged))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(participants(&server, "Chess Club").await.len(), 2);
}

#[tokio::test]
async fn test_unregister_not_enrolled_returns_400() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = server
        .delete("/activities/Chess%20Club/unregister")
        .add_query_param("email", "ghost@school.edu")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.detail, "Student is not signed up for this activity");
}

#[tokio::test]
async fn test_unregister_unknown_activity_returns_404() {
    let server = create_test_server();
    let token = login(&server).await;

    let response = server
        .delete("/activities/Knitting/unregister")
        .add_query_param("email", "michael@school.edu")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

// =============================================================================
// FULL SCENARIO
// =============================================================================

#[tokio::test]
async fn test_signup_login_unregister_round_trip() {
    let server = create_test_server();
    let before = participants(&server, "Chess Club").await;

    server
        .post("/activities/Chess%20Club/signup")
        .add_query_param("email", "x@school.edu")
        .await
        .assert_status_ok();
    assert_eq!(participants(&server, "Chess Club").await.len(), 3);

    let duplicate = server
        .post("/activities/Chess%20Club/signup")
        .add_query_param("email", "x@school.edu")
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::BAD_REQUEST);

    let wrong = server
        .post("/auth/login")
        .add_query_param("email", STAFF_EMAIL)
        .add_query_param("password", "wrongpass")
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let token = login(&server).await;
    server
        .delete("/activities/Chess%20Club/unregister")
        .add_query_param("email", "x@school.edu")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status_ok();

    assert_eq!(participants(&server, "Chess Club").await, before);
}

// =============================================================================
// ROUTING TESTS
// =============================================================================

#[tokio::test]
async fn test_404_on_unknown_endpoint() {
    let server = create_test_server();

    let response = server.get("/nonexistent").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_method_not_allowed() {
    let server = create_test_server();

    let response = server.delete("/activities").await;
    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}
