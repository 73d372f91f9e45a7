//! # Core Type Definitions
//!
//! This module contains the shared types of the activities service:
//! - Roster data (`Activity`)
//! - Staff data (`StaffAccount`, `Identity`)
//! - Error types (`MergingtonError`, `ErrorKind`)

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ACTIVITY
// =============================================================================

/// An extracurricular activity and its roster.
///
/// The activity name is the key of the registry map and is not repeated
/// inside the record, so the serialized map reads
/// `{ "<name>": { description, schedule, max_participants, participants } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Free-form description shown to students.
    pub description: String,
    /// Human-readable meeting schedule.
    pub schedule: String,
    /// Advertised capacity. Only enforced under `CapacityPolicy::Enforced`.
    pub max_participants: u32,
    /// Enrolled student emails, in signup order. Never contains duplicates.
    #[serde(default)]
    pub participants: Vec<String>,
}

impl Activity {
    /// Create an activity with an empty roster.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        schedule: impl Into<String>,
        max_participants: u32,
    ) -> Self {
        Self {
            description: description.into(),
            schedule: schedule.into(),
            max_participants,
            participants: Vec::new(),
        }
    }

    /// Builder-style helper to seed the roster.
    #[must_use]
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `email` is on the roster (exact comparison).
    #[must_use]
    pub fn is_enrolled(&self, email: &str) -> bool {
        self.participants.iter().any(|p| p == email)
    }

    /// Whether the roster has reached `max_participants`.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }

    /// Seats left before `max_participants` is reached.
    #[must_use]
    pub fn spots_left(&self) -> usize {
        (self.max_participants as usize).saturating_sub(self.participants.len())
    }
}

// =============================================================================
// STAFF
// =============================================================================

/// A staff member allowed to manage rosters.
///
/// The password is plaintext at rest. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct StaffAccount {
    /// Login email, unique across the directory.
    #[serde(default)]
    pub email: String,
    /// Display name.
    pub name: String,
    /// Free-form role label, e.g. "teacher" or "admin".
    pub role: String,
    /// Plaintext credential.
    pub password: String,
}

impl StaffAccount {
    /// Create a staff account.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            role: role.into(),
            password: password.into(),
        }
    }

    /// The public identity of this account.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
        }
    }
}

impl std::fmt::Debug for StaffAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffAccount")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("role", &self.role)
            .finish()
    }
}

/// The decoded claims of a valid staff token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub name: String,
    pub role: String,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Coarse classification of [`MergingtonError`], used by the HTTP layer to
/// pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing, invalid, or expired credential.
    Unauthorized,
    /// Unknown activity.
    NotFound,
    /// Roster state forbids the change.
    Conflict,
    /// Request input failed validation.
    Invalid,
    /// Configuration, file, or encoding failure on our side.
    Internal,
}

/// Errors that can occur in the activities service.
///
/// Every failure is terminal for the request and leaves roster state
/// unchanged.
#[derive(Debug, Error)]
pub enum MergingtonError {
    /// The named activity is not registered.
    #[error("Activity not found")]
    ActivityNotFound(String),

    /// The student is already on the roster.
    #[error("Student is already signed up")]
    AlreadySignedUp,

    /// The student is not on the roster.
    #[error("Student is not signed up for this activity")]
    NotSignedUp,

    /// The roster is at capacity and capacity is enforced.
    #[error("Activity is full")]
    ActivityFull,

    /// The student email exceeds `MAX_EMAIL_LENGTH`.
    #[error("Email address is too long")]
    EmailTooLong,

    /// Login failed: unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A staff-only operation was called without a valid staff token.
    #[error("Teacher authentication required")]
    AuthenticationRequired,

    /// An identity lookup was made without a valid staff token.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A seed catalog or staff file has invalid content.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Configuration is missing or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl MergingtonError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials | Self::AuthenticationRequired | Self::NotAuthenticated => {
                ErrorKind::Unauthorized
            }
            Self::ActivityNotFound(_) => ErrorKind::NotFound,
            Self::AlreadySignedUp | Self::NotSignedUp | Self::ActivityFull => ErrorKind::Conflict,
            Self::EmailTooLong => ErrorKind::Invalid,
            Self::InvalidCatalog(_) | Self::Config(_) | Self::Serialization(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
