//! Patients and staff.

use super::{Entity, EntityKind};
use crate::constants::UNKNOWN_DEPARTMENT;
use chrono::NaiveDate;
use hms_ids::EntityId;
use hms_types::{NonEmptyText, PhoneNumber};
use serde::{Deserialize, Serialize};

labelled_enum! {
    /// Where a patient is in their care pathway.
    pub enum PatientStatus {
        Active => "Active",
        InTreatment => "In Treatment",
        Recovered => "Recovered",
        Discharged => "Discharged",
        Unknown => "Unknown",
    }
}

impl Default for PatientStatus {
    fn default() -> Self {
        PatientStatus::Active
    }
}

impl PatientStatus {
    /// Counted as "under care" on the dashboard.
    pub fn is_under_care(self) -> bool {
        matches!(self, PatientStatus::Active | PatientStatus::InTreatment)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    pub doctor_id: EntityId,
    pub nurse_id: EntityId,
}

impl Entity for Patient {
    const KIND: EntityKind = EntityKind::Patient;

    fn references(&self) -> Vec<(EntityKind, &EntityId)> {
        vec![
            (EntityKind::Doctor, &self.doctor_id),
            (EntityKind::Nurse, &self.nurse_id),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub name: NonEmptyText,
    pub specialization: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
}

impl Doctor {
    /// Department name, or `Unknown` when none is on file.
    pub fn department_label(&self) -> &str {
        self.department
            .as_ref()
            .map(NonEmptyText::as_str)
            .unwrap_or(UNKNOWN_DEPARTMENT)
    }
}

impl Entity for Doctor {
    const KIND: EntityKind = EntityKind::Doctor;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nurse {
    pub name: NonEmptyText,
    pub department: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
}

impl Entity for Nurse {
    const KIND: EntityKind = EntityKind::Nurse;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_deserialises_camel_case_fields() {
        let json = r#"{
            "name": "Ahmad Saleh",
            "dob": "1979-05-12",
            "status": "In Treatment",
            "gender": "Male",
            "phone": "0781234567",
            "doctorId": "D-001",
            "nurseId": "N-001"
        }"#;

        let patient: Patient = serde_json::from_str(json).expect("should parse patient");
        assert_eq!(patient.status, PatientStatus::InTreatment);
        assert_eq!(patient.doctor_id.as_str(), "D-001");
        assert_eq!(patient.phone.unwrap().as_str(), "0781234567");
    }

    #[test]
    fn test_patient_status_defaults_to_active() {
        let json = r#"{"name": "Sara", "doctorId": "D-002", "nurseId": "N-002"}"#;
        let patient: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(patient.status, PatientStatus::Active);
    }

    #[test]
    fn test_patient_rejects_invalid_phone() {
        let json = r#"{"name": "Sara", "phone": "12", "doctorId": "D-002", "nurseId": "N-002"}"#;
        assert!(serde_json::from_str::<Patient>(json).is_err());
    }

    #[test]
    fn test_under_care_statuses() {
        assert!(PatientStatus::Active.is_under_care());
        assert!(PatientStatus::InTreatment.is_under_care());
        assert!(!PatientStatus::Discharged.is_under_care());
        assert!(!PatientStatus::Recovered.is_under_care());
    }

    #[test]
    fn test_doctor_department_label_falls_back_to_unknown() {
        let doctor = Doctor {
            name: NonEmptyText::new("Dr. Test").unwrap(),
            specialization: NonEmptyText::new("Cardiology").unwrap(),
            department: None,
            city: None,
            phone: None,
            dob: None,
        };
        assert_eq!(doctor.department_label(), "Unknown");
    }
}
