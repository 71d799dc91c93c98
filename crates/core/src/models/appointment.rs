use super::{Entity, EntityKind};
use chrono::NaiveDate;
use hms_ids::EntityId;
use hms_types::NonEmptyText;
use serde::{Deserialize, Serialize};

labelled_enum! {
    pub enum AppointmentStatus {
        Scheduled => "Scheduled",
        Confirmed => "Confirmed",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

/// A booking of one slot label with one doctor on one calendar day.
///
/// `time` is a display label taken from the doctor's slot template (`"10:00 AM"`), not a
/// machine time: two appointments collide only when the labels are identical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub patient_id: EntityId,
    pub doctor_id: EntityId,
    pub date: NaiveDate,
    pub time: NonEmptyText,
    #[serde(default)]
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Cancelled appointments free their slot.
    pub fn holds_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    pub fn is_for(&self, doctor_id: &EntityId, date: NaiveDate) -> bool {
        &self.doctor_id == doctor_id && self.date == date
    }
}

impl Entity for Appointment {
    const KIND: EntityKind = EntityKind::Appointment;

    fn references(&self) -> Vec<(EntityKind, &EntityId)> {
        vec![
            (EntityKind::Patient, &self.patient_id),
            (EntityKind::Doctor, &self.doctor_id),
        ]
    }
}
