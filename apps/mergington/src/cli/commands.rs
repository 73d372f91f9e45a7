//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, AppState};
use crate::config::ServerConfig;
use mergington_core::{MergingtonError, unix_now};

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    mut config: ServerConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), MergingtonError> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let registry = config.build_registry()?;
    let auth = config.build_auth_gate()?;

    println!("Mergington Activities Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", config.host);
    println!("  Port:       {}", config.port);
    println!("  Activities: {}", registry.len());
    println!("  Staff:      {}", auth.staff().len());
    println!("  Capacity:   {:?}", registry.policy());
    println!("  Token TTL:  {}h", config.token_ttl_hours);
    println!();
    println!("Endpoints:");
    println!("  GET    /activities                    - List activities");
    println!("  POST   /activities/{{name}}/signup      - Sign up a student");
    println!("  DELETE /activities/{{name}}/unregister  - Remove a student (staff)");
    println!("  POST   /auth/login                    - Staff login");
    println!("  GET    /auth/me                       - Current staff identity");
    println!("  GET    /health                        - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let state = AppState::new(registry, auth);
    api::run_server(&config.bind_addr(), state).await
}

// =============================================================================
// ACTIVITIES COMMAND
// =============================================================================

/// Show the activity catalog.
pub fn cmd_activities(config: &ServerConfig, json_mode: bool) -> Result<(), MergingtonError> {
    let registry = config.build_registry()?;

    if json_mode {
        println!("{}", to_pretty_json(registry.list())?);
        return Ok(());
    }

    println!("Mergington Activities");
    println!("=====================");
    for (name, activity) in registry.list() {
        println!();
        println!("{}", name);
        println!("  {}", activity.description);
        println!("  Schedule: {}", activity.schedule);
        println!(
            "  Enrolled: {} / {} ({} spots left)",
            activity.participants.len(),
            activity.max_participants,
            activity.spots_left()
        );
        for email in &activity.participants {
            println!("    - {}", email);
        }
    }

    Ok(())
}

// =============================================================================
// STAFF COMMAND
// =============================================================================

/// Show the staff directory.
pub fn cmd_staff(config: &ServerConfig, json_mode: bool) -> Result<(), MergingtonError> {
    let gate = config.build_auth_gate()?;
    let staff: Vec<_> = gate.staff().iter().map(|a| a.identity()).collect();

    if json_mode {
        println!("{}", to_pretty_json(&staff)?);
        return Ok(());
    }

    println!("Staff Directory ({})", config.staff_file.display());
    println!("===============");
    for identity in &staff {
        println!("{:<32} {:<24} {}", identity.email, identity.name, identity.role);
    }
    println!();
    println!("{} account(s)", staff.len());

    Ok(())
}

// =============================================================================
// TOKEN COMMANDS
// =============================================================================

/// Log in offline and print a bearer token.
pub fn cmd_issue_token(
    config: &ServerConfig,
    json_mode: bool,
    email: &str,
    password: &str,
) -> Result<(), MergingtonError> {
    let gate = config.build_auth_gate()?;
    let issued = gate.login(email, password)?;

    if json_mode {
        let output = serde_json::json!({
            "access_token": issued.token,
            "token_type": issued.token_type,
            "expires_at": issued.expires_at,
            "teacher": issued.identity,
        });
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    println!("{}", issued.token);
    tracing::info!(
        "Token for {} expires at {} (Unix seconds)",
        issued.identity.email,
        issued.expires_at
    );
    Ok(())
}

/// Validate a bearer token and print the identity or the rejection reason.
pub fn cmd_inspect_token(
    config: &ServerConfig,
    json_mode: bool,
    token: &str,
) -> Result<(), MergingtonError> {
    let gate = config.build_auth_gate()?;
    let result = gate.verify_at(token, unix_now());

    if json_mode {
        let output = match &result {
            Ok(identity) => serde_json::json!({ "valid": true, "identity": identity }),
            Err(reason) => serde_json::json!({ "valid": false, "reason": reason.to_string() }),
        };
        println!("{}", to_pretty_json(&output)?);
        return Ok(());
    }

    match result {
        Ok(identity) => {
            println!("Valid token");
            println!("  Email: {}", identity.email);
            println!("  Name:  {}", identity.name);
            println!("  Role:  {}", identity.role);
        }
        Err(reason) => println!("Invalid token: {}", reason),
    }
    Ok(())
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, MergingtonError> {
    serde_json::to_string_pretty(value).map_err(|e| MergingtonError::Serialization(e.to_string()))
}
