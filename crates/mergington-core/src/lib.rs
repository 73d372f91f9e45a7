//! # mergington-core
//!
//! The activity registry and staff authentication gate for the Mergington
//! activities service - THE LOGIC.
//!
//! Two components share the process state:
//! - [`ActivityRegistry`] owns every roster and enforces the enrollment rules
//! - [`AuthGate`] checks staff credentials and issues/validates bearer tokens
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no logging (the app layer owns those concerns)
//! - All state is in memory; nothing is persisted
//! - Time-dependent operations take `now` (Unix seconds) explicitly in their
//!   `*_at` forms so expiry behaviour is reproducible

// =============================================================================
// MODULES
// =============================================================================

pub mod auth;
pub mod catalog;
pub mod primitives;
pub mod registry;
pub mod staff;
pub mod token;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Activity, ErrorKind, Identity, MergingtonError, StaffAccount};

// =============================================================================
// RE-EXPORTS: Components
// =============================================================================

pub use auth::{AuthGate, IssuedToken, unix_now};
pub use catalog::{default_catalog, load_catalog, parse_catalog};
pub use registry::{ActivityRegistry, CapacityPolicy};
pub use staff::StaffDirectory;
pub use token::{Claims, TokenError, TokenSigner};
