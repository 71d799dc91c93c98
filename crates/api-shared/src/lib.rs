//! # API Shared
//!
//! Shared utilities and definitions for the HMS APIs.
//!
//! Contains:
//! - JSON request/response types with OpenAPI schemas ([`dto`])
//! - Shared services like [`HealthService`]
//! - API-key authentication ([`auth`])
//!
//! Used by `api-rest` and the root `hms-run` binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{ApiKeyProvider, AuthError, API_KEY_HEADER};
pub use dto::*;
pub use health::{HealthRes, HealthService};
