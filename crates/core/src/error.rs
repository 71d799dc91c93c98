use crate::access::{Capability, Role};
use crate::models::EntityKind;
use chrono::NaiveDate;
use hms_ids::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] hms_types::TextError),
    #[error("invalid identifier: {0}")]
    Id(#[from] hms_ids::IdError),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },
    #[error("{kind} {id} is referenced but does not exist")]
    UnknownReference { kind: EntityKind, id: EntityId },
    #[error("This slot is already booked for the selected doctor ({doctor_id}, {date}, {time})")]
    SlotTaken {
        doctor_id: EntityId,
        date: NaiveDate,
        time: String,
    },
    #[error(
        "cannot delete {kind} {id}: still referenced by {patients} patient(s) and {appointments} appointment(s)"
    )]
    HasDependents {
        kind: EntityKind,
        id: EntityId,
        patients: usize,
        appointments: usize,
    },
    #[error("role {role} is not allowed to {capability}")]
    Forbidden { role: Role, capability: Capability },

    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("failed to read storage key {key}: {source}")]
    StorageRead {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write storage key {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("write failed and restoring {key} also failed: write={write_error}; restore={restore_error}")]
    RollbackFailed {
        key: String,
        #[source]
        write_error: Box<StoreError>,
        restore_error: Box<StoreError>,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
