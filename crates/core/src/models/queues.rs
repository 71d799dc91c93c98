//! Waitlist entries and transfer requests, the two clerk work queues.

use super::{Entity, EntityKind};
use chrono::NaiveDate;
use hms_ids::EntityId;
use hms_types::NonEmptyText;
use serde::{Deserialize, Serialize};

/// A deferred booking intent for a patient in a department.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub patient_id: EntityId,
    pub department: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for WaitlistEntry {
    const KIND: EntityKind = EntityKind::WaitlistEntry;

    fn references(&self) -> Vec<(EntityKind, &EntityId)> {
        vec![(EntityKind::Patient, &self.patient_id)]
    }
}

labelled_enum! {
    /// Transfer requests only move when a clerk acts on them.
    pub enum TransferStatus {
        Pending => "Pending",
        Assigned => "Assigned",
        Approved => "Approved",
        NeedInfo => "Need Info",
    }
}

impl Default for TransferStatus {
    fn default() -> Self {
        TransferStatus::Pending
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub patient_id: EntityId,
    pub from_dept: NonEmptyText,
    pub to_dept: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: TransferStatus,
    #[serde(default)]
    pub assigned_doctor_id: Option<EntityId>,
}

impl Entity for TransferRequest {
    const KIND: EntityKind = EntityKind::TransferRequest;

    fn references(&self) -> Vec<(EntityKind, &EntityId)> {
        let mut refs = vec![(EntityKind::Patient, &self.patient_id)];
        if let Some(doctor_id) = &self.assigned_doctor_id {
            refs.push((EntityKind::Doctor, doctor_id));
        }
        refs
    }
}
