//! # HMS Core
//!
//! Core business logic for the hospital administration store.
//!
//! This crate contains pure data operations over the shared application state:
//! - The [`EntityStore`]: in-memory collections mirrored to a durable key-value store
//! - The slot availability resolver and the double-booking guard ([`scheduling`])
//! - Dashboard aggregation over appointments, staff and patients ([`dashboard`])
//! - Role and capability checks for identities resolved by an external provider ([`access`])
//!
//! **No API concerns**: HTTP servers, API keys and CLI parsing belong in `api-rest`,
//! `api-shared` and `hms-cli`.

pub mod access;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod queries;
pub mod scheduling;
pub mod seed;
pub mod storage;
pub mod store;

pub use access::{Capability, Identity, IdentityProvider, Role};
pub use config::{CoreConfig, SeedMode};
pub use constants::DEFAULT_DATA_DIR;
pub use error::{StoreError, StoreResult};
pub use models::{
    Appointment, AppointmentStatus, Comment, Doctor, Entity, EntityKind, Notification,
    NotificationDraft, NotificationStatus, Nurse, Patient, PatientStatus, Post, PostDraft, Record,
    TransferRequest, TransferStatus, WaitlistEntry,
};
pub use scheduling::SlotTemplates;
pub use seed::SeedData;
pub use storage::{JsonDirStore, KeyValueStore, MemoryStore};
pub use store::EntityStore;

pub use hms_ids::{EntityId, IdError};
pub use hms_types::{NonEmptyText, PhoneNumber, TextError};
