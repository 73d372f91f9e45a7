//! # Mergington
//!
//! HTTP API, CLI, and configuration for the Mergington activities service.
//! All roster and authentication rules live in `mergington-core`.

pub mod api;
pub mod cli;
pub mod config;
