//! Waitlist and transfer requests.

use super::EntityStore;
use crate::models::{
    Appointment, AppointmentStatus, Doctor, EntityKind, Record, TransferRequest, TransferStatus,
    WaitlistEntry,
};
use crate::{StoreError, StoreResult};
use chrono::NaiveDate;
use hms_ids::EntityId;
use hms_types::NonEmptyText;

impl EntityStore {
    /// Waitlist entries, newest first.
    pub fn waitlist(&self) -> &[Record<WaitlistEntry>] {
        self.waitlist.records()
    }

    pub fn waitlist_entry(&self, id: &EntityId) -> StoreResult<&Record<WaitlistEntry>> {
        self.require(id)
    }

    pub fn add_waitlist_entry(
        &mut self,
        fields: WaitlistEntry,
    ) -> StoreResult<Record<WaitlistEntry>> {
        self.insert(fields)
    }

    pub fn edit_waitlist_entry(
        &mut self,
        id: &EntityId,
        fields: WaitlistEntry,
    ) -> StoreResult<Record<WaitlistEntry>> {
        self.replace(id, fields)
    }

    /// Dismisses an entry without booking it.
    pub fn delete_waitlist_entry(&mut self, id: &EntityId) -> StoreResult<Record<WaitlistEntry>> {
        self.remove(id)
    }

    /// Books the waitlisted patient with `doctor_id` and drops the entry.
    ///
    /// The booking goes through the same guard as [`EntityStore::add_appointment`]; on a clash
    /// the entry stays queued.
    pub fn fill_from_waitlist(
        &mut self,
        entry_id: &EntityId,
        doctor_id: &EntityId,
        date: NaiveDate,
        time: NonEmptyText,
    ) -> StoreResult<Record<Appointment>> {
        let entry = self.require::<WaitlistEntry>(entry_id)?;
        let fields = Appointment {
            patient_id: entry.fields.patient_id.clone(),
            doctor_id: doctor_id.clone(),
            date,
            time,
            status: AppointmentStatus::Scheduled,
        };
        let record = self.book(fields, Some(entry_id))?;
        tracing::info!(entry_id = %entry_id, appointment_id = %record.id, "waitlist entry filled");
        Ok(record)
    }

    /// Transfer requests, newest first.
    pub fn transfers(&self) -> &[Record<TransferRequest>] {
        self.transfers.records()
    }

    pub fn transfer(&self, id: &EntityId) -> StoreResult<&Record<TransferRequest>> {
        self.require(id)
    }

    /// Queues a transfer request. New requests always start `Pending` and unassigned.
    pub fn add_transfer(
        &mut self,
        mut fields: TransferRequest,
    ) -> StoreResult<Record<TransferRequest>> {
        fields.status = TransferStatus::Pending;
        fields.assigned_doctor_id = None;
        self.insert(fields)
    }

    pub fn edit_transfer(
        &mut self,
        id: &EntityId,
        fields: TransferRequest,
    ) -> StoreResult<Record<TransferRequest>> {
        self.replace(id, fields)
    }

    /// Assigns a receiving doctor from the target department.
    ///
    /// A `Pending` request becomes `Assigned`; any other status is left alone.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnknownReference`] if the doctor does not exist.
    /// - [`StoreError::InvalidInput`] if the doctor is not in the request's target department.
    pub fn assign_transfer_doctor(
        &mut self,
        id: &EntityId,
        doctor_id: &EntityId,
    ) -> StoreResult<Record<TransferRequest>> {
        let to_dept = self.require::<TransferRequest>(id)?.fields.to_dept.clone();
        let doctor = self.doctors.get(doctor_id).ok_or_else(|| StoreError::UnknownReference {
            kind: EntityKind::Doctor,
            id: doctor_id.clone(),
        })?;
        if !in_department(&doctor.fields, &to_dept) {
            return Err(StoreError::InvalidInput(format!(
                "doctor {} is in {}, not {}",
                doctor_id,
                doctor.fields.department_label(),
                to_dept
            )));
        }

        self.update(id, |transfer: &mut TransferRequest| {
            transfer.assigned_doctor_id = Some(doctor_id.clone());
            if transfer.status == TransferStatus::Pending {
                transfer.status = TransferStatus::Assigned;
            }
            Ok(())
        })
    }

    pub fn set_transfer_status(
        &mut self,
        id: &EntityId,
        status: TransferStatus,
    ) -> StoreResult<Record<TransferRequest>> {
        self.update(id, |transfer: &mut TransferRequest| {
            transfer.status = status;
            Ok(())
        })
    }

    pub fn delete_transfer(&mut self, id: &EntityId) -> StoreResult<Record<TransferRequest>> {
        self.remove(id)
    }

    /// Doctors a transfer into `department` can be assigned to.
    pub fn doctors_in_department(&self, department: &str) -> Vec<&Record<Doctor>> {
        self.doctors
            .records()
            .iter()
            .filter(|d| d.fields.department_label().eq_ignore_ascii_case(department.trim()))
            .collect()
    }
}

fn in_department(doctor: &Doctor, department: &NonEmptyText) -> bool {
    doctor
        .department_label()
        .eq_ignore_ascii_case(department.as_str())
}
