//! # Configuration
//!
//! Server settings, layered from lowest to highest precedence:
//!
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config mergington.toml`)
//! 3. Environment variables
//! 4. CLI flags (`server --host/--port`, applied by the CLI)
//!
//! ## Environment Variables
//!
//! - `MERGINGTON_SECRET_KEY`: HMAC secret for staff tokens
//! - `MERGINGTON_TOKEN_TTL_HOURS`: token lifetime in hours (default: 24)
//! - `MERGINGTON_STAFF_FILE`: path to the staff credentials JSON
//! - `MERGINGTON_ACTIVITIES_FILE`: path to a seed catalog JSON
//! - `MERGINGTON_ENFORCE_CAPACITY`: `true` to block signups on full rosters
//!
//! ## Example File
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8000
//! secret_key = "change-me"
//! staff_file = "/etc/mergington/teachers.json"
//! enforce_capacity = false
//! ```

use mergington_core::{
    ActivityRegistry, AuthGate, CapacityPolicy, MergingtonError, StaffDirectory, TokenSigner,
    load_catalog,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Secret used when none is configured. Tokens signed with it are only
/// fit for local development.
pub const DEV_SECRET_KEY: &str = "mergington-dev-secret-change-me";

/// Secrets shorter than this trigger a startup warning.
const MIN_SECRET_LENGTH: usize = 32;

/// Maximum accepted token lifetime: 30 days.
const MAX_TOKEN_TTL_HOURS: u64 = 30 * 24;

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// HMAC secret for staff tokens. `None` falls back to [`DEV_SECRET_KEY`].
    pub secret_key: Option<String>,
    /// Staff token lifetime in hours.
    pub token_ttl_hours: u64,
    /// Staff credentials file.
    pub staff_file: PathBuf,
    /// Seed catalog. `None` uses the built-in activities.
    pub activities_file: Option<PathBuf>,
    /// Block signups once `max_participants` is reached.
    pub enforce_capacity: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            secret_key: None,
            token_ttl_hours: 24,
            staff_file: PathBuf::from("teachers.json"),
            activities_file: None,
            enforce_capacity: false,
        }
    }
}

impl ServerConfig {
    /// Load defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, MergingtonError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    MergingtonError::Io(format!(
                        "Cannot read config '{}': {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, MergingtonError> {
        toml::from_str(text).map_err(|e| MergingtonError::Config(format!("Config file: {}", e)))
    }

    /// Overlay environment variables read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), MergingtonError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(secret) = get("MERGINGTON_SECRET_KEY") {
            self.secret_key = Some(secret);
        }
        if let Some(hours) = get("MERGINGTON_TOKEN_TTL_HOURS") {
            self.token_ttl_hours = hours.trim().parse().map_err(|_| {
                MergingtonError::Config(format!(
                    "MERGINGTON_TOKEN_TTL_HOURS must be a whole number, got '{}'",
                    hours
                ))
            })?;
        }
        if let Some(path) = get("MERGINGTON_STAFF_FILE") {
            self.staff_file = PathBuf::from(path);
        }
        if let Some(path) = get("MERGINGTON_ACTIVITIES_FILE") {
            self.activities_file = Some(PathBuf::from(path));
        }
        if let Some(flag) = get("MERGINGTON_ENFORCE_CAPACITY") {
            self.enforce_capacity = parse_bool(&flag).ok_or_else(|| {
                MergingtonError::Config(format!(
                    "MERGINGTON_ENFORCE_CAPACITY must be true or false, got '{}'",
                    flag
                ))
            })?;
        }
        Ok(())
    }

    /// Reject values no deployment should run with.
    pub fn validate(&self) -> Result<(), MergingtonError> {
        if self.token_ttl_hours == 0 || self.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(MergingtonError::Config(format!(
                "token_ttl_hours must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS, self.token_ttl_hours
            )));
        }
        if self.secret_key.as_deref().is_some_and(str::is_empty) {
            return Err(MergingtonError::Config(
                "secret_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_hours.saturating_mul(3600)
    }

    /// The capacity policy selected by `enforce_capacity`.
    #[must_use]
    pub fn capacity_policy(&self) -> CapacityPolicy {
        if self.enforce_capacity {
            CapacityPolicy::Enforced
        } else {
            CapacityPolicy::Advisory
        }
    }

    /// Build the registry from the configured catalog.
    pub fn build_registry(&self) -> Result<ActivityRegistry, MergingtonError> {
        let registry = match &self.activities_file {
            Some(path) => {
                tracing::info!("Loading activities from {}", path.display());
                ActivityRegistry::from_activities(load_catalog(path)?)?
            }
            None => ActivityRegistry::seeded(),
        };
        Ok(registry.with_policy(self.capacity_policy()))
    }

    /// Build the auth gate from the staff file and secret.
    pub fn build_auth_gate(&self) -> Result<AuthGate, MergingtonError> {
        let staff = StaffDirectory::load(&self.staff_file)?;
        if staff.is_empty() {
            tracing::warn!(
                "Staff file {} has no accounts; nobody can log in",
                self.staff_file.display()
            );
        }

        let secret = match self.secret_key.as_deref() {
            Some(secret) => {
                if secret.len() < MIN_SECRET_LENGTH {
                    tracing::warn!(
                        "Token secret is shorter than {} bytes; use a longer random value",
                        MIN_SECRET_LENGTH
                    );
                }
                secret
            }
            None => {
                tracing::warn!(
                    "⚠️  No token secret configured - using the built-in development secret! \
                     Set MERGINGTON_SECRET_KEY before exposing this server."
                );
                DEV_SECRET_KEY
            }
        };

        let signer = TokenSigner::new(secret)?;
        Ok(AuthGate::new(staff, signer).with_ttl_secs(self.token_ttl_secs()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// =============================================================================
// TESTS
// =============================================================================
