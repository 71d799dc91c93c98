//! Patients, doctors and nurses.

use super::{Batch, EntityStore};
use crate::models::{Doctor, EntityKind, Nurse, Patient, Record};
use crate::{StoreError, StoreResult};
use hms_ids::EntityId;

impl EntityStore {
    pub fn patients(&self) -> &[Record<Patient>] {
        self.patients.records()
    }

    pub fn patient(&self, id: &EntityId) -> StoreResult<&Record<Patient>> {
        self.require(id)
    }

    /// Adds a patient. The assigned doctor and nurse must exist.
    pub fn add_patient(&mut self, fields: Patient) -> StoreResult<Record<Patient>> {
        self.insert(fields)
    }

    pub fn edit_patient(&mut self, id: &EntityId, fields: Patient) -> StoreResult<Record<Patient>> {
        self.replace(id, fields)
    }

    /// Deletes a patient together with their appointments and waitlist entries.
    ///
    /// Transfer requests are kept as a record of past moves.
    pub fn delete_patient(&mut self, id: &EntityId) -> StoreResult<Record<Patient>> {
        let patient = self.require::<Patient>(id)?.clone();

        let (appointments, appointments_removed) = self
            .appointments
            .without_where(|a| &a.fields.patient_id == id);
        let (waitlist, waitlist_removed) =
            self.waitlist.without_where(|w| &w.fields.patient_id == id);

        let mut batch = Batch::new();
        if appointments_removed > 0 {
            batch = batch.stage(appointments);
        }
        if waitlist_removed > 0 {
            batch = batch.stage(waitlist);
        }
        batch = batch.stage(self.patients.without(id));
        self.commit(batch)?;

        tracing::info!(
            id = %id,
            appointments_removed,
            waitlist_removed,
            "patient deleted"
        );
        Ok(patient)
    }

    pub fn doctors(&self) -> &[Record<Doctor>] {
        self.doctors.records()
    }

    pub fn doctor(&self, id: &EntityId) -> StoreResult<&Record<Doctor>> {
        self.require(id)
    }

    pub fn add_doctor(&mut self, fields: Doctor) -> StoreResult<Record<Doctor>> {
        self.insert(fields)
    }

    pub fn edit_doctor(&mut self, id: &EntityId, fields: Doctor) -> StoreResult<Record<Doctor>> {
        self.replace(id, fields)
    }

    /// Deletes a doctor nobody depends on, dropping their slot template too.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HasDependents`] while any patient or appointment still points at
    /// the doctor; nothing is changed in that case.
    pub fn delete_doctor(&mut self, id: &EntityId) -> StoreResult<Record<Doctor>> {
        let doctor = self.require::<Doctor>(id)?.clone();

        let patients = self
            .patients
            .records()
            .iter()
            .filter(|p| &p.fields.doctor_id == id)
            .count();
        let appointments = self
            .appointments
            .records()
            .iter()
            .filter(|a| &a.fields.doctor_id == id)
            .count();
        if patients > 0 || appointments > 0 {
            tracing::warn!(id = %id, patients, appointments, "refused doctor delete");
            return Err(StoreError::HasDependents {
                kind: EntityKind::Doctor,
                id: id.clone(),
                patients,
                appointments,
            });
        }

        let mut batch = Batch::new().stage(self.doctors.without(id));
        if self.slot_templates.get(id).is_some() {
            batch = batch.stage_slot_templates(self.slot_templates.without(id));
        }
        self.commit(batch)?;

        tracing::info!(id = %id, "doctor deleted");
        Ok(doctor)
    }

    pub fn nurses(&self) -> &[Record<Nurse>] {
        self.nurses.records()
    }

    pub fn nurse(&self, id: &EntityId) -> StoreResult<&Record<Nurse>> {
        self.require(id)
    }

    pub fn add_nurse(&mut self, fields: Nurse) -> StoreResult<Record<Nurse>> {
        self.insert(fields)
    }

    pub fn edit_nurse(&mut self, id: &EntityId, fields: Nurse) -> StoreResult<Record<Nurse>> {
        self.replace(id, fields)
    }

    /// Deletes a nurse no patient is assigned to.
    pub fn delete_nurse(&mut self, id: &EntityId) -> StoreResult<Record<Nurse>> {
        let patients = self
            .patients
            .records()
            .iter()
            .filter(|p| &p.fields.nurse_id == id)
            .count();
        if patients > 0 {
            self.require::<Nurse>(id)?;
            tracing::warn!(id = %id, patients, "refused nurse delete");
            return Err(StoreError::HasDependents {
                kind: EntityKind::Nurse,
                id: id.clone(),
                patients,
                appointments: 0,
            });
        }
        self.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{EntityKind, Patient, PatientStatus};
    use crate::store::tests::{demo_store, flaky_demo_store, id};
    use crate::StoreError;
    use hms_types::NonEmptyText;

    fn new_patient(doctor: &str, nurse: &str) -> Patient {
        Patient {
            name: NonEmptyText::new("Omar Nabil").unwrap(),
            dob: None,
            status: PatientStatus::Active,
            gender: None,
            phone: None,
            doctor_id: id(doctor),
            nurse_id: id(nurse),
        }
    }

    #[test]
    fn test_add_patient_appends_with_generated_id() {
        let mut store = demo_store();
        let record = store.add_patient(new_patient("D-001", "N-002")).unwrap();

        assert!(record.id.has_prefix("P"));
        assert_eq!(store.patients().last().unwrap().id, record.id);
    }

    #[test]
    fn test_edit_unknown_patient_is_not_found() {
        let mut store = demo_store();
        let err = store
            .edit_patient(&id("P-404"), new_patient("D-001", "N-001"))
            .expect_err("should be missing");
        assert!(matches!(
            err,
            StoreError::NotFound {
                kind: EntityKind::Patient,
                ..
            }
        ));
    }

    #[test]
    fn test_edit_patient_replaces_in_place() {
        let mut store = demo_store();
        let mut fields = store.patient(&id("P-002")).unwrap().fields.clone();
        fields.status = PatientStatus::Recovered;

        store.edit_patient(&id("P-002"), fields).unwrap();
        assert_eq!(store.patients()[1].fields.status, PatientStatus::Recovered);
    }

    #[test]
    fn test_delete_doctor_with_dependents_is_refused() {
        let mut store = demo_store();
        let doctors_before = store.doctors().to_vec();

        let err = store.delete_doctor(&id("D-001")).expect_err("D-001 has a patient");
        match err {
            StoreError::HasDependents {
                patients,
                appointments,
                ..
            } => {
                assert_eq!(patients, 1);
                assert_eq!(appointments, 1);
            }
            other => panic!("Expected HasDependents, got {other:?}"),
        }
        assert_eq!(store.doctors(), doctors_before.as_slice());
        assert!(store.slot_template(&id("D-001")).is_some());
    }

    #[test]
    fn test_delete_free_doctor_drops_slot_template() {
        let mut store = demo_store();
        store.delete_patient(&id("P-002")).unwrap();

        store.delete_doctor(&id("D-002")).expect("D-002 has no dependents left");
        assert!(store.doctor(&id("D-002")).is_err());
        assert!(store.slot_template(&id("D-002")).is_none());
    }

    #[test]
    fn test_delete_nurse_with_patients_is_refused() {
        let mut store = demo_store();
        let err = store.delete_nurse(&id("N-001")).expect_err("N-001 has a patient");
        assert!(matches!(
            err,
            StoreError::HasDependents {
                kind: EntityKind::Nurse,
                patients: 1,
                ..
            }
        ));
        assert_eq!(store.nurses().len(), 2);
    }

    #[test]
    fn test_delete_unknown_nurse_is_not_found() {
        let mut store = demo_store();
        assert!(matches!(
            store.delete_nurse(&id("N-404")),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_patient_cascades_by_id() {
        let mut store = demo_store();
        store.add_waitlist_entry(crate::models::WaitlistEntry {
            patient_id: id("P-001"),
            department: NonEmptyText::new("Dermatology").unwrap(),
            preferred_date: None,
            notes: None,
        })
        .unwrap();

        store.delete_patient(&id("P-001")).unwrap();

        assert!(store
            .appointments()
            .iter()
            .all(|a| a.fields.patient_id != id("P-001")));
        assert!(store.waitlist().is_empty());
        assert_eq!(store.appointments().len(), 1);
    }

    #[test]
    fn test_delete_patient_rolls_back_when_later_write_fails() {
        let (kv, mut store) = flaky_demo_store();
        store
            .add_waitlist_entry(crate::models::WaitlistEntry {
                patient_id: id("P-001"),
                department: NonEmptyText::new("Dermatology").unwrap(),
                preferred_date: None,
                notes: None,
            })
            .unwrap();
        // patients and appointments are written before waitlist
        kv.fail_writes_to("waitlist");

        let appointments_before = store.appointments().to_vec();
        assert!(store.delete_patient(&id("P-001")).is_err());

        assert_eq!(store.patients().len(), 2);
        assert_eq!(store.appointments(), appointments_before.as_slice());
        assert_eq!(store.waitlist().len(), 1);

        use crate::KeyValueStore;
        assert_eq!(kv.get("patients").unwrap(), None);
        assert_eq!(kv.get("appointments").unwrap(), None);
    }
}
