//! Initial collections injected into the [`crate::EntityStore`] at startup.
//!
//! A collection whose storage key is absent (first run) or holds malformed data is loaded
//! from here instead.

use crate::constants::DOCTOR_SLOTS_KEY;
use crate::models::{
    Appointment, Doctor, Entity, Notification, Nurse, Patient, Post, Record, TransferRequest,
    WaitlistEntry,
};
use crate::scheduling::SlotTemplates;
use crate::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeedData {
    pub patients: Vec<Record<Patient>>,
    pub doctors: Vec<Record<Doctor>>,
    pub nurses: Vec<Record<Nurse>>,
    pub appointments: Vec<Record<Appointment>>,
    pub waitlist: Vec<Record<WaitlistEntry>>,
    pub transfers: Vec<Record<TransferRequest>>,
    pub posts: Vec<Record<Post>>,
    pub notifications: Vec<Record<Notification>>,
    pub slot_templates: SlotTemplates,
}

impl SeedData {
    /// No records and no slot templates.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The demo roster: two patients, two doctors with slot templates, two nurses, two
    /// appointments, four community posts and three notifications. Queues start empty.
    pub fn demo() -> StoreResult<Self> {
        Ok(Self {
            patients: records(json!([
                {
                    "id": "P-001", "name": "Ahmad Saleh", "dob": "1979-05-12",
                    "status": "In Treatment", "gender": "Male", "phone": "0781234567",
                    "doctorId": "D-001", "nurseId": "N-001"
                },
                {
                    "id": "P-002", "name": "Sara Mahmoud", "dob": "1993-08-21",
                    "status": "Active", "gender": "Female", "phone": "0799876543",
                    "doctorId": "D-002", "nurseId": "N-002"
                }
            ]))?,
            doctors: records(json!([
                {
                    "id": "D-001", "name": "Dr. Omar Khaled", "specialization": "Oncology",
                    "department": "Dermatology", "city": "Amman", "phone": "0781112223",
                    "dob": "1975-03-12"
                },
                {
                    "id": "D-002", "name": "Dr. Lina Yousef", "specialization": "Hematology",
                    "department": "Neurology", "city": "Amman", "phone": "0794445556",
                    "dob": "1980-09-28"
                }
            ]))?,
            nurses: records(json!([
                {
                    "id": "N-001", "name": "Nurse Hanan", "department": "Oncology",
                    "phone": "0782223334", "dob": "1985-06-10"
                },
                {
                    "id": "N-002", "name": "Nurse Rania", "department": "Hematology",
                    "phone": "0795556667", "dob": "1990-12-05"
                }
            ]))?,
            appointments: records(json!([
                {
                    "id": "A-001", "patientId": "P-001", "doctorId": "D-001",
                    "date": "2025-12-20", "time": "10:00 AM", "status": "Scheduled"
                },
                {
                    "id": "A-002", "patientId": "P-002", "doctorId": "D-002",
                    "date": "2025-12-21", "time": "02:00 PM", "status": "Completed"
                }
            ]))?,
            waitlist: Vec::new(),
            transfers: Vec::new(),
            posts: records(json!([
                {
                    "id": "POST-001", "title": "Healthy Smoothie Recipes",
                    "content": "Here are some delicious and healthy smoothies to boost immunity.",
                    "category": "Diet", "createdAt": "2025-12-20T09:00:00Z", "likes": 3
                },
                {
                    "id": "POST-002", "title": "Meditation Tips",
                    "content": "Simple meditation exercises for mental well-being.",
                    "category": "Mental Health", "createdAt": "2025-12-18T09:00:00Z", "likes": 5
                },
                {
                    "id": "POST-003", "title": "Yoga Poses for Beginners",
                    "content": "Learn easy yoga poses you can do at home.",
                    "category": "Exercise", "createdAt": "2025-12-17T09:00:00Z", "likes": 2
                },
                {
                    "id": "POST-004", "title": "Boosting Immunity Naturally",
                    "content": "Tips on natural ways to strengthen your immune system.",
                    "category": "Diet", "createdAt": "2025-12-15T09:00:00Z", "likes": 4
                }
            ]))?,
            notifications: records(json!([
                {
                    "id": "NTF-001", "type": "Override Request", "from": "Nurse A",
                    "to": "Doctor B", "status": "pending",
                    "message": "Request to change medication dosage for patient P-001",
                    "description": "The nurse requests to increase the dosage of Medication A due to low response in patient. Requires doctor approval.",
                    "sentAt": "2025-12-19T08:00:00Z"
                },
                {
                    "id": "NTF-002", "type": "Transfer Request", "from": "Patient C",
                    "to": "Doctor D", "status": "approved",
                    "message": "Request to transfer appointment from 2025-12-21 to 2025-12-23",
                    "description": "Patient wants to move the appointment due to personal reasons. Doctor approved the new date.",
                    "sentAt": "2025-12-18T08:00:00Z"
                },
                {
                    "id": "NTF-003", "type": "Transfer Request", "from": "Patient E",
                    "to": "Doctor F", "status": "rejected",
                    "message": "Request to transfer appointment from 2025-12-22 to 2025-12-24",
                    "description": "Patient requested to move the appointment, but the requested slot is unavailable.",
                    "sentAt": "2025-12-18T08:00:00Z"
                }
            ]))?,
            slot_templates: decode(
                DOCTOR_SLOTS_KEY,
                json!({
                    "D-001": ["09:00 AM", "10:00 AM", "11:00 AM", "02:00 PM", "03:00 PM"],
                    "D-002": ["10:00 AM", "11:00 AM", "01:00 PM", "02:00 PM", "04:00 PM"]
                }),
            )?,
        })
    }
}

fn records<T: Entity>(value: Value) -> StoreResult<Vec<Record<T>>> {
    decode(T::KIND.storage_key(), value)
}

fn decode<V: DeserializeOwned>(key: &str, value: Value) -> StoreResult<V> {
    serde_json::from_value(value).map_err(|source| StoreError::Serialization {
        key: key.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientStatus;
    use hms_ids::EntityId;

    #[test]
    fn test_demo_seed_decodes() {
        let seed = SeedData::demo().expect("demo seed should decode");

        assert_eq!(seed.patients.len(), 2);
        assert_eq!(seed.doctors.len(), 2);
        assert_eq!(seed.nurses.len(), 2);
        assert_eq!(seed.appointments.len(), 2);
        assert_eq!(seed.posts.len(), 4);
        assert_eq!(seed.notifications.len(), 3);
        assert!(seed.waitlist.is_empty());
        assert_eq!(seed.patients[0].fields.status, PatientStatus::InTreatment);
    }

    #[test]
    fn test_demo_seed_references_resolve() {
        let seed = SeedData::demo().unwrap();
        let doctor_ids: Vec<&EntityId> = seed.doctors.iter().map(|d| &d.id).collect();

        for patient in &seed.patients {
            assert!(doctor_ids.contains(&&patient.fields.doctor_id));
        }
        for appt in &seed.appointments {
            assert!(doctor_ids.contains(&&appt.fields.doctor_id));
        }
        for (doctor_id, _) in seed.slot_templates.iter() {
            assert!(doctor_ids.contains(&doctor_id));
        }
    }

    #[test]
    fn test_empty_seed_has_nothing() {
        let seed = SeedData::empty();
        assert!(seed.patients.is_empty());
        assert!(seed.slot_templates.is_empty());
    }
}
