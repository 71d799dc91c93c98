//! Domain records held by the [`crate::EntityStore`].
//!
//! Every stored record is a [`Record<T>`]: an [`EntityId`] plus the entity's fields, flattened
//! into one JSON object on disk (`{"id": "P-001", "name": "...", ...}`). Foreign keys are always
//! identifiers, never display names.

use crate::{StoreError, StoreResult};
use chrono::NaiveDate;
use hms_ids::EntityId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a closed set of labels with a fixed wire spelling.
///
/// Generates the enum (serialised as its label), `ALL`, `as_str`, `Display`, and a lenient
/// `FromStr` that ignores case, spaces, `-` and `_` so CLI input like `in-treatment` parses.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = $crate::models::normalise_label(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| $crate::models::normalise_label(v.as_str()) == wanted)
                    .ok_or_else(|| {
                        $crate::StoreError::InvalidInput(format!(
                            "unknown {} '{}'",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

mod appointment;
mod community;
mod directory;
mod queues;

pub use appointment::{Appointment, AppointmentStatus};
pub use community::{Comment, Notification, NotificationDraft, NotificationStatus, Post, PostDraft};
pub use directory::{Doctor, Nurse, Patient, PatientStatus};
pub use queues::{TransferRequest, TransferStatus, WaitlistEntry};

/// The kinds of record the store keeps, one collection (and one storage key) each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Patient,
    Doctor,
    Nurse,
    Appointment,
    WaitlistEntry,
    TransferRequest,
    Post,
    Notification,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Patient,
        EntityKind::Doctor,
        EntityKind::Nurse,
        EntityKind::Appointment,
        EntityKind::WaitlistEntry,
        EntityKind::TransferRequest,
        EntityKind::Post,
        EntityKind::Notification,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Patient => "patient",
            EntityKind::Doctor => "doctor",
            EntityKind::Nurse => "nurse",
            EntityKind::Appointment => "appointment",
            EntityKind::WaitlistEntry => "waitlist entry",
            EntityKind::TransferRequest => "transfer request",
            EntityKind::Post => "post",
            EntityKind::Notification => "notification",
        }
    }

    /// Prefix of generated identifiers (`P-7K2Q9Z`).
    pub const fn id_prefix(self) -> &'static str {
        match self {
            EntityKind::Patient => "P",
            EntityKind::Doctor => "D",
            EntityKind::Nurse => "N",
            EntityKind::Appointment => "A",
            EntityKind::WaitlistEntry => "W",
            EntityKind::TransferRequest => "T",
            EntityKind::Post => "POST",
            EntityKind::Notification => "NTF",
        }
    }

    /// Fixed key the collection is stored under.
    pub const fn storage_key(self) -> &'static str {
        match self {
            EntityKind::Patient => "patients",
            EntityKind::Doctor => "doctors",
            EntityKind::Nurse => "nurses",
            EntityKind::Appointment => "appointments",
            EntityKind::WaitlistEntry => "waitlist",
            EntityKind::TransferRequest => "transfers",
            EntityKind::Post => "posts",
            EntityKind::Notification => "notifications",
        }
    }

    /// Queue-like collections show the newest record first; directories append.
    pub const fn newest_first(self) -> bool {
        !matches!(
            self,
            EntityKind::Patient | EntityKind::Doctor | EntityKind::Nurse
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a storable entity.
pub trait Entity: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    const KIND: EntityKind;

    /// Identifiers this record points at, checked for existence on add and edit.
    fn references(&self) -> Vec<(EntityKind, &EntityId)> {
        Vec::new()
    }
}

/// A stored entity: its identifier plus its fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: EntityId,
    #[serde(flatten)]
    pub fields: T,
}

impl<T> Record<T> {
    pub fn new(id: EntityId, fields: T) -> Self {
        Self { id, fields }
    }
}

/// Parses an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_date(input: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|e| {
        StoreError::InvalidInput(format!("date must be YYYY-MM-DD, got '{}': {}", input, e))
    })
}

pub(crate) fn normalise_label(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trims optional free text, mapping blank input to `None`.
pub fn optional_text(input: Option<String>) -> Option<String> {
    input
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
