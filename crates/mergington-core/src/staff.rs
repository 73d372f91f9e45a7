//! # Staff Directory
//!
//! Staff credentials, loaded once at startup and immutable afterwards.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "teachers": {
//!     "rivera@mergington.edu": {
//!       "name": "Ms. Rivera",
//!       "role": "teacher",
//!       "password": "..."
//!     }
//!   }
//! }
//! ```
//!
//! Passwords are stored and compared as plaintext.

use crate::{MergingtonError, StaffAccount};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use subtle::ConstantTimeEq;

/// Maximum staff file size (1 MB).
const MAX_STAFF_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Deserialize)]
struct StaffFile {
    teachers: BTreeMap<String, StaffAccount>,
}

/// Lookup table of staff accounts keyed by email.
#[derive(Debug, Clone, Default)]
pub struct StaffDirectory {
    accounts: BTreeMap<String, StaffAccount>,
}

impl StaffDirectory {
    /// Create an empty directory. Every login against it fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from accounts. A later duplicate email replaces an
    /// earlier one.
    #[must_use]
    pub fn from_accounts(accounts: impl IntoIterator<Item = StaffAccount>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.email.clone(), account))
                .collect(),
        }
    }

    /// Parse a staff file from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, MergingtonError> {
        let file: StaffFile = serde_json::from_slice(bytes)
            .map_err(|e| MergingtonError::Serialization(format!("Staff file: {}", e)))?;

        let mut accounts = BTreeMap::new();
        for (email, mut account) in file.teachers {
            if email.is_empty() || account.password.is_empty() {
                return Err(MergingtonError::InvalidCatalog(format!(
                    "Staff entry '{}' needs an email and a password",
                    email
                )));
            }
            // The map key is authoritative.
            account.email.clone_from(&email);
            accounts.insert(email, account);
        }
        Ok(Self { accounts })
    }

    /// Read and parse a staff file.
    pub fn load(path: &Path) -> Result<Self, MergingtonError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            MergingtonError::Io(format!(
                "Cannot read staff file '{}': {}",
                path.display(),
                e
            ))
        })?;
        if metadata.len() > MAX_STAFF_FILE_SIZE {
            return Err(MergingtonError::InvalidCatalog(format!(
                "Staff file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_STAFF_FILE_SIZE
            )));
        }

        let bytes = std::fs::read(path).map_err(|e| {
            MergingtonError::Io(format!(
                "Cannot read staff file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&bytes)
    }

    /// Check a login attempt.
    ///
    /// Returns the account when the email is known and the password matches
    /// exactly.
    #[must_use]
    pub fn verify(&self, email: &str, password: &str) -> Option<&StaffAccount> {
        let account = self.accounts.get(email)?;
        passwords_match(password, &account.password).then_some(account)
    }

    /// Look up an account by email.
    #[must_use]
    pub fn get(&self, email: &str) -> Option<&StaffAccount> {
        self.accounts.get(email)
    }

    /// All accounts, ordered by email.
    pub fn iter(&self) -> impl Iterator<Item = &StaffAccount> {
        self.accounts.values()
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the directory has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Constant-time password comparison.
///
/// Both buffers are padded to the same length so `ct_eq` always runs over
/// the same number of bytes; the length check happens after.
fn passwords_match(provided: &str, expected: &str) -> bool {
    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();

    let max_len = provided_bytes.len().max(expected_bytes.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided_bytes.len() == expected_bytes.len()
}

// =============================================================================
// TESTS
// =============================================================================
