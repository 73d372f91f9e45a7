//! # Activity Registry
//!
//! The single owner of roster state.
//!
//! Enrollment rules:
//! - A student appears at most once per roster
//! - Signup appends, unregister removes; the order of everyone else is kept
//! - Only a staff identity may unregister a student
//! - Capacity is advisory unless the registry runs with
//!   [`CapacityPolicy::Enforced`]
//!
//! The registry is synchronous and not internally locked. Callers that share
//! it across threads wrap it in a single lock and hold the write side for the
//! whole check-then-mutate step.

use crate::catalog::validate_activity;
use crate::primitives::is_within_email_limit;
use crate::{Activity, Identity, MergingtonError};
use std::collections::BTreeMap;

/// Whether `max_participants` blocks signups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityPolicy {
    /// `max_participants` is descriptive only. Signups past it succeed.
    #[default]
    Advisory,
    /// Signups on a full roster fail with [`MergingtonError::ActivityFull`].
    Enforced,
}

/// In-memory activity map keyed by activity name.
#[derive(Debug, Clone, Default)]
pub struct ActivityRegistry {
    activities: BTreeMap<String, Activity>,
    policy: CapacityPolicy,
}

impl ActivityRegistry {
    /// Create an empty registry with advisory capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the built-in catalog.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            activities: crate::catalog::default_catalog(),
            policy: CapacityPolicy::default(),
        }
    }

    /// Create a registry from an existing activity map, validating each entry.
    pub fn from_activities(
        activities: BTreeMap<String, Activity>,
    ) -> Result<Self, MergingtonError> {
        for (name, activity) in &activities {
            validate_activity(name, activity)?;
        }
        Ok(Self {
            activities,
            policy: CapacityPolicy::default(),
        })
    }

    /// Set the capacity policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CapacityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active capacity policy.
    #[must_use]
    pub fn policy(&self) -> CapacityPolicy {
        self.policy
    }

    /// Register a new activity, or replace one with the same name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        activity: Activity,
    ) -> Result<(), MergingtonError> {
        let name = name.into();
        validate_activity(&name, &activity)?;
        self.activities.insert(name, activity);
        Ok(())
    }

    /// Full current state, ordered by activity name.
    #[must_use]
    pub fn list(&self) -> &BTreeMap<String, Activity> {
        &self.activities
    }

    /// Look up one activity.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Activity> {
        self.activities.get(name)
    }

    /// Number of registered activities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Whether no activities are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Enroll `email` in `activity`.
    ///
    /// # Errors
    ///
    /// - `ActivityNotFound` if the activity is not registered
    /// - `EmailTooLong` if the email exceeds `MAX_EMAIL_LENGTH`
    /// - `AlreadySignedUp` if the email is already on the roster
    /// - `ActivityFull` if the roster is full and capacity is enforced
    pub fn signup(&mut self, activity: &str, email: &str) -> Result<String, MergingtonError> {
        let policy = self.policy;
        let entry = self.entry_mut(activity)?;

        if !is_within_email_limit(email) {
            return Err(MergingtonError::EmailTooLong);
        }
        if entry.is_enrolled(email) {
            return Err(MergingtonError::AlreadySignedUp);
        }
        if policy == CapacityPolicy::Enforced && entry.is_full() {
            return Err(MergingtonError::ActivityFull);
        }

        entry.participants.push(email.to_string());
        Ok(format!("Signed up {} for {}", email, activity))
    }

    /// Remove `email` from `activity` on behalf of a staff member.
    ///
    /// The caller check runs first, so an anonymous request learns nothing
    /// about which activities exist.
    ///
    /// # Errors
    ///
    /// - `AuthenticationRequired` if `caller` is `None`
    /// - `ActivityNotFound` if the activity is not registered
    /// - `NotSignedUp` if the email is not on the roster
    pub fn unregister(
        &mut self,
        activity: &str,
        email: &str,
        caller: Option<&Identity>,
    ) -> Result<String, MergingtonError> {
        let staff = caller.ok_or(MergingtonError::AuthenticationRequired)?;
        let entry = self.entry_mut(activity)?;

        let position = entry
            .participants
            .iter()
            .position(|p| p == email)
            .ok_or(MergingtonError::NotSignedUp)?;
        entry.participants.remove(position);

        Ok(format!(
            "Teacher {} unregistered {} from {}",
            staff.name, email, activity
        ))
    }

    fn entry_mut(&mut self, activity: &str) -> Result<&mut Activity, MergingtonError> {
        self.activities
            .get_mut(activity)
            .ok_or_else(|| MergingtonError::ActivityNotFound(activity.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
