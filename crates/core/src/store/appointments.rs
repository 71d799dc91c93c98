//! Appointments, slot templates and the booking rules around them.

use super::{Batch, EntityStore};
use crate::constants::UNKNOWN_DEPARTMENT;
use crate::models::{Appointment, AppointmentStatus, Doctor, Record, WaitlistEntry};
use crate::scheduling::{self, SlotTemplates};
use crate::{StoreError, StoreResult};
use chrono::NaiveDate;
use hms_ids::EntityId;
use hms_types::NonEmptyText;

impl EntityStore {
    pub fn appointments(&self) -> &[Record<Appointment>] {
        self.appointments.records()
    }

    pub fn appointment(&self, id: &EntityId) -> StoreResult<&Record<Appointment>> {
        self.require(id)
    }

    /// Books an appointment.
    ///
    /// The patient and doctor must exist and the slot must be free. Any waitlist entries for
    /// the same patient in the doctor's department are cleared in the same write.
    pub fn add_appointment(&mut self, fields: Appointment) -> StoreResult<Record<Appointment>> {
        self.book(fields, None)
    }

    /// Replaces an appointment, re-running the double-booking guard against every other one.
    pub fn edit_appointment(
        &mut self,
        id: &EntityId,
        fields: Appointment,
    ) -> StoreResult<Record<Appointment>> {
        self.require::<Appointment>(id)?;
        self.ensure_references(&fields)?;
        scheduling::guard(self.appointments.records(), Some(id), &fields)?;
        self.replace(id, fields)
    }

    pub fn delete_appointment(&mut self, id: &EntityId) -> StoreResult<Record<Appointment>> {
        self.remove(id)
    }

    /// Changes only the status. Moving a cancelled appointment back to a live status must
    /// find its slot still free.
    pub fn set_appointment_status(
        &mut self,
        id: &EntityId,
        status: AppointmentStatus,
    ) -> StoreResult<Record<Appointment>> {
        let mut candidate = self.require::<Appointment>(id)?.fields.clone();
        candidate.status = status;
        scheduling::guard(self.appointments.records(), Some(id), &candidate)?;
        self.update(id, |appt: &mut Appointment| {
            appt.status = status;
            Ok(())
        })
    }

    /// Cancels an appointment, freeing its slot.
    ///
    /// With `enqueue_waitlist` the patient is also put on the waitlist of the doctor's
    /// department, preferring the cancelled date.
    pub fn cancel_appointment(
        &mut self,
        id: &EntityId,
        enqueue_waitlist: bool,
    ) -> StoreResult<Record<Appointment>> {
        let mut record = self.require::<Appointment>(id)?.clone();
        if record.fields.status == AppointmentStatus::Cancelled {
            return Err(StoreError::InvalidInput(format!(
                "appointment {} is already cancelled",
                id
            )));
        }
        record.fields.status = AppointmentStatus::Cancelled;

        let mut batch = Batch::new().stage(self.appointments.with_replaced(record.clone()));
        if enqueue_waitlist {
            let doctor = self.doctors.get(&record.fields.doctor_id);
            let department = doctor
                .map(|d| d.fields.department_label())
                .unwrap_or(UNKNOWN_DEPARTMENT);
            let doctor_name = doctor
                .map(|d| d.fields.name.as_str())
                .unwrap_or(record.fields.doctor_id.as_str());

            let entry = Record::new(
                self.waitlist.allocate_id()?,
                WaitlistEntry {
                    patient_id: record.fields.patient_id.clone(),
                    department: NonEmptyText::new(department)?,
                    preferred_date: Some(record.fields.date),
                    notes: Some(format!("Cancelled {} {}", doctor_name, record.fields.time)),
                },
            );
            tracing::info!(
                id = %entry.id,
                patient_id = %entry.fields.patient_id,
                "waitlist entry added"
            );
            batch = batch.stage(self.waitlist.with_inserted(entry));
        }
        self.commit(batch)?;

        tracing::info!(id = %id, enqueue_waitlist, "appointment cancelled");
        Ok(record)
    }

    /// Slot templates for every doctor that has one.
    pub fn slot_templates(&self) -> &SlotTemplates {
        &self.slot_templates
    }

    pub fn slot_template(&self, doctor_id: &EntityId) -> Option<&[NonEmptyText]> {
        self.slot_templates.get(doctor_id)
    }

    /// Replaces a doctor's slot template.
    pub fn set_slot_template(
        &mut self,
        doctor_id: &EntityId,
        labels: Vec<NonEmptyText>,
    ) -> StoreResult<()> {
        self.require::<Doctor>(doctor_id)?;
        scheduling::validate_template(&labels)?;

        let next = self.slot_templates.with_template(doctor_id.clone(), labels);
        self.commit(Batch::new().stage_slot_templates(next))?;
        tracing::info!(doctor_id = %doctor_id, "slot template updated");
        Ok(())
    }

    /// Bookable time labels for a doctor on a date, in template order.
    ///
    /// A doctor without a template has no bookable slots.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the doctor does not exist.
    pub fn available_slots(
        &self,
        doctor_id: &EntityId,
        date: NaiveDate,
    ) -> StoreResult<Vec<String>> {
        self.require::<Doctor>(doctor_id)?;
        let Some(template) = self.slot_templates.get(doctor_id) else {
            return Ok(Vec::new());
        };
        Ok(scheduling::available_slots(
            template,
            self.appointments.records(),
            doctor_id,
            date,
        ))
    }

    /// True when `candidate` would take a slot another live appointment already holds.
    pub fn would_clash(&self, candidate_id: Option<&EntityId>, candidate: &Appointment) -> bool {
        scheduling::would_clash(self.appointments.records(), candidate_id, candidate)
    }

    /// Shared booking path for new appointments and waitlist fills.
    pub(super) fn book(
        &mut self,
        fields: Appointment,
        filled_entry: Option<&EntityId>,
    ) -> StoreResult<Record<Appointment>> {
        self.ensure_references(&fields)?;
        scheduling::guard(self.appointments.records(), None, &fields)?;

        let record = Record::new(self.appointments.allocate_id()?, fields);
        let department = self
            .doctors
            .get(&record.fields.doctor_id)
            .map(|d| d.fields.department_label())
            .unwrap_or(UNKNOWN_DEPARTMENT);

        let (waitlist, cleared) = self.waitlist.without_where(|w| {
            Some(&w.id) == filled_entry
                || (w.fields.patient_id == record.fields.patient_id
                    && w.fields.department.as_str().eq_ignore_ascii_case(department))
        });

        let mut batch = Batch::new().stage(self.appointments.with_inserted(record.clone()));
        if cleared > 0 {
            batch = batch.stage(waitlist);
        }
        self.commit(batch)?;

        tracing::info!(
            id = %record.id,
            doctor_id = %record.fields.doctor_id,
            date = %record.fields.date,
            waitlist_cleared = cleared,
            "appointment booked"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Appointment, AppointmentStatus, WaitlistEntry};
    use crate::store::tests::{demo_store, id};
    use crate::StoreError;
    use chrono::NaiveDate;
    use hms_types::NonEmptyText;

    fn dec(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, day).unwrap()
    }

    fn booking(patient: &str, doctor: &str, day: u32, time: &str) -> Appointment {
        Appointment {
            patient_id: id(patient),
            doctor_id: id(doctor),
            date: dec(day),
            time: NonEmptyText::new(time).unwrap(),
            status: AppointmentStatus::Scheduled,
        }
    }

    fn labels(raw: &[&str]) -> Vec<NonEmptyText> {
        raw.iter().map(|s| NonEmptyText::new(s).unwrap()).collect()
    }

    #[test]
    fn test_available_slots_example() {
        let mut store = demo_store();
        store
            .set_slot_template(&id("D-001"), labels(&["09:00", "10:00", "11:00"]))
            .unwrap();
        store.add_appointment(booking("P-002", "D-001", 20, "10:00")).unwrap();

        let slots = store.available_slots(&id("D-001"), dec(20)).unwrap();
        assert_eq!(slots, vec!["09:00", "11:00"]);
    }

    #[test]
    fn test_available_slots_with_demo_template() {
        let store = demo_store();
        let slots = store.available_slots(&id("D-001"), dec(20)).unwrap();
        assert_eq!(slots, vec!["09:00 AM", "11:00 AM", "02:00 PM", "03:00 PM"]);
    }

    #[test]
    fn test_available_slots_unknown_doctor_and_missing_template() {
        let mut store = demo_store();
        assert!(matches!(
            store.available_slots(&id("D-404"), dec(20)),
            Err(StoreError::NotFound { .. })
        ));

        let new_doctor = store
            .add_doctor(store.doctor(&id("D-001")).unwrap().fields.clone())
            .unwrap();
        assert!(store.available_slots(&new_doctor.id, dec(20)).unwrap().is_empty());
    }

    #[test]
    fn test_double_booking_rejected() {
        let mut store = demo_store();
        let before = store.appointments().to_vec();

        let err = store
            .add_appointment(booking("P-002", "D-001", 20, "10:00 AM"))
            .expect_err("slot is taken by A-001");
        assert!(matches!(err, StoreError::SlotTaken { .. }));
        assert_eq!(store.appointments(), before.as_slice());
    }

    #[test]
    fn test_edit_into_taken_slot_rejected() {
        let mut store = demo_store();
        let booked = store
            .add_appointment(booking("P-002", "D-001", 20, "11:00 AM"))
            .unwrap();

        let mut moved = booked.fields.clone();
        moved.time = NonEmptyText::new("10:00 AM").unwrap();
        assert!(matches!(
            store.edit_appointment(&booked.id, moved),
            Err(StoreError::SlotTaken { .. })
        ));

        // editing without moving is not a clash with itself
        let mut same = booked.fields.clone();
        same.status = AppointmentStatus::Confirmed;
        store.edit_appointment(&booked.id, same).unwrap();
    }

    #[test]
    fn test_no_two_live_appointments_share_a_slot() {
        let mut store = demo_store();
        for time in ["09:00 AM", "10:00 AM", "09:00 AM", "11:00 AM", "11:00 AM"] {
            let _ = store.add_appointment(booking("P-002", "D-001", 20, time));
        }

        let live: Vec<_> = store
            .appointments()
            .iter()
            .filter(|a| a.fields.holds_slot() && a.fields.is_for(&id("D-001"), dec(20)))
            .map(|a| a.fields.time.as_str())
            .collect();
        let mut deduped = live.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(live.len(), deduped.len());
        assert_eq!(live.len(), 3);
    }

    #[test]
    fn test_cancel_frees_slot_and_can_enqueue_waitlist() {
        let mut store = demo_store();
        store.cancel_appointment(&id("A-001"), true).unwrap();

        assert_eq!(
            store.appointment(&id("A-001")).unwrap().fields.status,
            AppointmentStatus::Cancelled
        );
        assert_eq!(store.waitlist().len(), 1);
        let entry = &store.waitlist()[0].fields;
        assert_eq!(entry.patient_id, id("P-001"));
        assert_eq!(entry.department.as_str(), "Dermatology");
        assert_eq!(entry.preferred_date, Some(dec(20)));
        assert_eq!(entry.notes.as_deref(), Some("Cancelled Dr. Omar Khaled 10:00 AM"));

        let slots = store.available_slots(&id("D-001"), dec(20)).unwrap();
        assert!(slots.contains(&"10:00 AM".to_string()));

        // booking the same patient in that department clears the entry
        store
            .add_appointment(booking("P-001", "D-001", 22, "09:00 AM"))
            .unwrap();
        assert!(store.waitlist().is_empty());
    }

    #[test]
    fn test_cancel_twice_is_invalid() {
        let mut store = demo_store();
        store.cancel_appointment(&id("A-001"), false).unwrap();
        assert!(store.waitlist().is_empty());
        assert!(matches!(
            store.cancel_appointment(&id("A-001"), true),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_reviving_cancelled_appointment_is_guarded() {
        let mut store = demo_store();
        store.cancel_appointment(&id("A-001"), false).unwrap();
        store
            .add_appointment(booking("P-002", "D-001", 20, "10:00 AM"))
            .unwrap();

        assert!(matches!(
            store.set_appointment_status(&id("A-001"), AppointmentStatus::Scheduled),
            Err(StoreError::SlotTaken { .. })
        ));
    }

    #[test]
    fn test_set_slot_template_validates() {
        let mut store = demo_store();
        assert!(store.set_slot_template(&id("D-001"), Vec::new()).is_err());
        assert!(matches!(
            store.set_slot_template(&id("D-404"), labels(&["09:00"])),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_waitlist_in_other_department_survives_booking() {
        let mut store = demo_store();
        store
            .add_waitlist_entry(WaitlistEntry {
                patient_id: id("P-001"),
                department: NonEmptyText::new("Neurology").unwrap(),
                preferred_date: None,
                notes: None,
            })
            .unwrap();

        store
            .add_appointment(booking("P-001", "D-001", 22, "09:00 AM"))
            .unwrap();
        assert_eq!(store.waitlist().len(), 1);
    }
}
