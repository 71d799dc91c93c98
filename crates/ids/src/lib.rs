//! Entity identifier utilities.
//!
//! Every stored record in the hospital store carries an opaque identifier of the form
//! `{PREFIX}-{SUFFIX}`:
//!
//! - `PREFIX` is 1 to 8 uppercase ASCII letters naming the entity kind (`P`, `D`, `POST`, ...)
//! - `SUFFIX` is 1 to 16 characters from `0-9` and `A-Z`
//!
//! Examples: `P-001`, `A-7K2Q9Z`, `NTF-00X1AB`.
//!
//! Generated identifiers always use a 6 character random suffix drawn from a v4 UUID.
//! Externally supplied identifiers (CLI arguments, REST path segments, stored JSON) must already
//! be canonical; [`EntityId::parse`] rejects lowercase or otherwise malformed input rather than
//! normalising it.

mod service;

pub use service::{EntityId, GENERATED_SUFFIX_LEN};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type IdResult<T> = Result<T, IdError>;
