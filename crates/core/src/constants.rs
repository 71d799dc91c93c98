//! Constants used throughout the HMS core crate.
//!
//! Storage keys for the entity collections live on [`crate::EntityKind`]; this module keeps
//! the remaining fixed names in one place.

/// Default directory for durable storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "hms_data";

/// Storage key for the per-doctor slot templates.
pub const DOCTOR_SLOTS_KEY: &str = "doctor_slots";

/// File extension used by [`crate::JsonDirStore`] for each key.
pub const STORAGE_FILE_EXTENSION: &str = "json";

/// Department label reported for doctors without a department.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Identifier prefix for post comments.
pub const COMMENT_ID_PREFIX: &str = "C";

/// Number of attempts made to allocate an unused identifier before giving up.
pub const MAX_ID_ATTEMPTS: usize = 16;

/// Default utilisation horizon in days (today included).
pub const UTILIZATION_DAYS: u32 = 7;

/// Longest utilisation horizon a dashboard request may ask for.
pub const MAX_UTILIZATION_DAYS: u32 = 366;
