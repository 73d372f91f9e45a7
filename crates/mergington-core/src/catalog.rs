//! # Seed Catalog
//!
//! The activities a fresh registry starts with, either built in or read from
//! a JSON file shaped like the `GET /activities` response:
//!
//! ```json
//! {
//!   "Chess Club": {
//!     "description": "Learn strategies and compete in chess tournaments",
//!     "schedule": "Fridays, 3:30 PM - 5:00 PM",
//!     "max_participants": 12,
//!     "participants": ["michael@mergington.edu"]
//!   }
//! }
//! ```

use crate::primitives::{MAX_ACTIVITY_NAME_LENGTH, MAX_EMAIL_LENGTH, is_within_email_limit};
use crate::{Activity, MergingtonError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Maximum catalog file size (1 MB).
const MAX_CATALOG_FILE_SIZE: u64 = 1024 * 1024;

/// The built-in catalog: nine activities with two students each.
#[must_use]
pub fn default_catalog() -> BTreeMap<String, Activity> {
    let seed: [(&str, &str, &str, u32, [&str; 2]); 9] = [
        (
            "Chess Club",
            "Learn strategies and compete in chess tournaments",
            "Fridays, 3:30 PM - 5:00 PM",
            12,
            ["michael@mergington.edu", "daniel@mergington.edu"],
        ),
        (
            "Programming Class",
            "Learn programming fundamentals and build software projects",
            "Tuesdays and Thursdays, 3:30 PM - 4:30 PM",
            20,
            ["emma@mergington.edu", "sophia@mergington.edu"],
        ),
        (
            "Gym Class",
            "Physical education and sports activities",
            "Mondays, Wednesdays, Fridays, 2:00 PM - 3:00 PM",
            30,
            ["john@mergington.edu", "olivia@mergington.edu"],
        ),
        (
            "Soccer Team",
            "Join the school soccer team and compete in matches",
            "Tuesdays and Thursdays, 4:00 PM - 5:30 PM",
            22,
            ["liam@mergington.edu", "noah@mergington.edu"],
        ),
        (
            "Basketball Team",
            "Practice and play basketball with the school team",
            "Wednesdays and Fridays, 3:30 PM - 5:00 PM",
            15,
            ["ava@mergington.edu", "mia@mergington.edu"],
        ),
        (
            "Art Club",
            "Explore your creativity through painting and drawing",
            "Thursdays, 3:30 PM - 5:00 PM",
            15,
            ["amelia@mergington.edu", "harper@mergington.edu"],
        ),
        (
            "Drama Club",
            "Act, direct, and produce plays and performances",
            "Mondays and Wednesdays, 4:00 PM - 5:30 PM",
            20,
            ["ella@mergington.edu", "scarlett@mergington.edu"],
        ),
        (
            "Math Club",
            "Solve challenging problems and participate in math competitions",
            "Tuesdays, 3:30 PM - 4:30 PM",
            10,
            ["james@mergington.edu", "benjamin@mergington.edu"],
        ),
        (
            "Debate Team",
            "Develop public speaking and argumentation skills",
            "Fridays, 4:00 PM - 5:30 PM",
            12,
            ["charlotte@mergington.edu", "henry@mergington.edu"],
        ),
    ];

    seed.into_iter()
        .map(|(name, description, schedule, max, participants)| {
            (
                name.to_string(),
                Activity::new(description, schedule, max).with_participants(participants),
            )
        })
        .collect()
}

/// Parse and validate a catalog from JSON bytes.
pub fn parse_catalog(bytes: &[u8]) -> Result<BTreeMap<String, Activity>, MergingtonError> {
    let catalog: BTreeMap<String, Activity> = serde_json::from_slice(bytes)
        .map_err(|e| MergingtonError::Serialization(format!("Catalog: {}", e)))?;

    for (name, activity) in &catalog {
        validate_activity(name, activity)?;
    }
    Ok(catalog)
}

/// Read, parse, and validate a catalog file.
pub fn load_catalog(path: &Path) -> Result<BTreeMap<String, Activity>, MergingtonError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        MergingtonError::Io(format!("Cannot read catalog '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_CATALOG_FILE_SIZE {
        return Err(MergingtonError::InvalidCatalog(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CATALOG_FILE_SIZE
        )));
    }

    let bytes = std::fs::read(path).map_err(|e| {
        MergingtonError::Io(format!("Cannot read catalog '{}': {}", path.display(), e))
    })?;
    parse_catalog(&bytes)
}

/// Check one catalog entry against the roster invariants.
pub(crate) fn validate_activity(name: &str, activity: &Activity) -> Result<(), MergingtonError> {
    if name.trim().is_empty() {
        return Err(MergingtonError::InvalidCatalog(
            "Activity name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_ACTIVITY_NAME_LENGTH {
        return Err(MergingtonError::InvalidCatalog(format!(
            "Activity name length {} exceeds maximum {} bytes",
            name.len(),
            MAX_ACTIVITY_NAME_LENGTH
        )));
    }
    if activity.max_participants == 0 {
        return Err(MergingtonError::InvalidCatalog(format!(
            "'{}': max_participants must be positive",
            name
        )));
    }

    let mut seen = BTreeSet::new();
    for email in &activity.participants {
        if !is_within_email_limit(email) {
            return Err(MergingtonError::InvalidCatalog(format!(
                "'{}': participant email longer than {} bytes",
                name, MAX_EMAIL_LENGTH
            )));
        }
        if !seen.insert(email.as_str()) {
            return Err(MergingtonError::InvalidCatalog(format!(
                "'{}': duplicate participant '{}'",
                name, email
            )));
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
