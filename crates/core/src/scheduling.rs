//! Slot availability and the double-booking guard.
//!
//! A doctor's day is a fixed ordered list of time labels (the slot template). A label is taken
//! on a date when a non-cancelled appointment for that doctor and date carries the identical
//! label. There is no notion of duration or overlap.

use crate::models::{Appointment, Record};
use crate::{StoreError, StoreResult};
use chrono::NaiveDate;
use hms_ids::EntityId;
use hms_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Per-doctor slot templates, keyed by doctor id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotTemplates(BTreeMap<EntityId, Vec<NonEmptyText>>);

impl SlotTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, doctor_id: &EntityId) -> Option<&[NonEmptyText]> {
        self.0.get(doctor_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &[NonEmptyText])> {
        self.0.iter().map(|(id, labels)| (id, labels.as_slice()))
    }

    /// Returns a copy with `doctor_id`'s template replaced.
    pub(crate) fn with_template(&self, doctor_id: EntityId, labels: Vec<NonEmptyText>) -> Self {
        let mut next = self.clone();
        next.0.insert(doctor_id, labels);
        next
    }

    /// Returns a copy without `doctor_id`'s template.
    pub(crate) fn without(&self, doctor_id: &EntityId) -> Self {
        let mut next = self.clone();
        next.0.remove(doctor_id);
        next
    }
}

impl FromIterator<(EntityId, Vec<NonEmptyText>)> for SlotTemplates {
    fn from_iter<I: IntoIterator<Item = (EntityId, Vec<NonEmptyText>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Validates a template: at least one label and no repeats.
pub fn validate_template(labels: &[NonEmptyText]) -> StoreResult<()> {
    if labels.is_empty() {
        return Err(StoreError::InvalidInput(
            "slot template must contain at least one time label".into(),
        ));
    }
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(StoreError::InvalidInput(format!(
                "slot template repeats time label '{}'",
                label
            )));
        }
    }
    Ok(())
}

/// Labels held by non-cancelled appointments for `doctor_id` on `date`.
pub fn taken_labels<'a>(
    appointments: &'a [Record<Appointment>],
    doctor_id: &EntityId,
    date: NaiveDate,
) -> HashSet<&'a str> {
    appointments
        .iter()
        .map(|r| &r.fields)
        .filter(|a| a.holds_slot() && a.is_for(doctor_id, date))
        .map(|a| a.time.as_str())
        .collect()
}

/// Template labels not taken on `date`, in template order.
pub fn available_slots(
    template: &[NonEmptyText],
    appointments: &[Record<Appointment>],
    doctor_id: &EntityId,
    date: NaiveDate,
) -> Vec<String> {
    let taken = taken_labels(appointments, doctor_id, date);
    template
        .iter()
        .filter(|label| !taken.contains(label.as_str()))
        .map(|label| label.as_str().to_owned())
        .collect()
}

/// Finds an accepted appointment the candidate would collide with.
///
/// `candidate_id` is the candidate's own id when editing, so it never clashes with itself.
/// A cancelled candidate holds no slot and never clashes.
pub fn find_clash<'a>(
    appointments: &'a [Record<Appointment>],
    candidate_id: Option<&EntityId>,
    candidate: &Appointment,
) -> Option<&'a Record<Appointment>> {
    if !candidate.holds_slot() {
        return None;
    }
    appointments.iter().find(|existing| {
        Some(&existing.id) != candidate_id
            && existing.fields.holds_slot()
            && existing.fields.is_for(&candidate.doctor_id, candidate.date)
            && existing.fields.time == candidate.time
    })
}

pub fn would_clash(
    appointments: &[Record<Appointment>],
    candidate_id: Option<&EntityId>,
    candidate: &Appointment,
) -> bool {
    find_clash(appointments, candidate_id, candidate).is_some()
}

/// Refuses the candidate with [`StoreError::SlotTaken`] when it would clash.
pub fn guard(
    appointments: &[Record<Appointment>],
    candidate_id: Option<&EntityId>,
    candidate: &Appointment,
) -> StoreResult<()> {
    if let Some(existing) = find_clash(appointments, candidate_id, candidate) {
        tracing::warn!(
            doctor_id = %candidate.doctor_id,
            date = %candidate.date,
            time = %candidate.time,
            existing = %existing.id,
            "refused double booking"
        );
        return Err(StoreError::SlotTaken {
            doctor_id: candidate.doctor_id.clone(),
            date: candidate.date,
            time: candidate.time.as_str().to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;

    fn id(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 20).unwrap()
    }

    fn labels(raw: &[&str]) -> Vec<NonEmptyText> {
        raw.iter().map(|s| NonEmptyText::new(s).unwrap()).collect()
    }

    fn appointment(
        appt_id: &str,
        doctor: &str,
        time: &str,
        status: AppointmentStatus,
    ) -> Record<Appointment> {
        Record::new(
            id(appt_id),
            Appointment {
                patient_id: id("P-001"),
                doctor_id: id(doctor),
                date: date(),
                time: NonEmptyText::new(time).unwrap(),
                status,
            },
        )
    }

    #[test]
    fn test_available_slots_subtracts_taken_labels() {
        let template = labels(&["09:00", "10:00", "11:00"]);
        let appts = vec![appointment("A-001", "D-001", "10:00", AppointmentStatus::Scheduled)];

        let slots = available_slots(&template, &appts, &id("D-001"), date());
        assert_eq!(slots, vec!["09:00", "11:00"]);
    }

    #[test]
    fn test_available_slots_ignores_cancelled_and_other_doctors() {
        let template = labels(&["09:00", "10:00", "11:00"]);
        let appts = vec![
            appointment("A-001", "D-001", "09:00", AppointmentStatus::Cancelled),
            appointment("A-002", "D-002", "10:00", AppointmentStatus::Scheduled),
        ];

        let slots = available_slots(&template, &appts, &id("D-001"), date());
        assert_eq!(slots, vec!["09:00", "10:00", "11:00"]);
    }

    #[test]
    fn test_available_slots_other_date_is_free() {
        let template = labels(&["09:00"]);
        let mut appt = appointment("A-001", "D-001", "09:00", AppointmentStatus::Confirmed);
        appt.fields.date = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();

        let slots = available_slots(&template, &[appt], &id("D-001"), date());
        assert_eq!(slots, vec!["09:00"]);
    }

    #[test]
    fn test_would_clash_same_triple() {
        let appts = vec![appointment("A-001", "D-001", "10:00", AppointmentStatus::Scheduled)];
        let candidate = appointment("A-002", "D-001", "10:00", AppointmentStatus::Scheduled);

        assert!(would_clash(&appts, None, &candidate.fields));
        assert!(matches!(
            guard(&appts, None, &candidate.fields),
            Err(StoreError::SlotTaken { .. })
        ));
    }

    #[test]
    fn test_would_clash_ignores_self_on_edit() {
        let appts = vec![appointment("A-001", "D-001", "10:00", AppointmentStatus::Scheduled)];
        let edited = appts[0].clone();

        assert!(!would_clash(&appts, Some(&edited.id), &edited.fields));
    }

    #[test]
    fn test_cancelled_never_clashes() {
        let appts = vec![
            appointment("A-001", "D-001", "10:00", AppointmentStatus::Cancelled),
            appointment("A-002", "D-001", "11:00", AppointmentStatus::Scheduled),
        ];

        let rebook = appointment("A-003", "D-001", "10:00", AppointmentStatus::Scheduled);
        assert!(!would_clash(&appts, None, &rebook.fields));

        let cancelled = appointment("A-004", "D-001", "11:00", AppointmentStatus::Cancelled);
        assert!(!would_clash(&appts, None, &cancelled.fields));
    }

    #[test]
    fn test_validate_template_rejects_empty_and_duplicates() {
        assert!(validate_template(&[]).is_err());
        assert!(validate_template(&labels(&["09:00", "09:00"])).is_err());
        assert!(validate_template(&labels(&["09:00", "10:00"])).is_ok());
    }

    #[test]
    fn test_slot_templates_serialise_as_plain_map() {
        let templates: SlotTemplates = [(id("D-001"), labels(&["09:00 AM"]))]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&templates).unwrap();
        assert_eq!(json, r#"{"D-001":["09:00 AM"]}"#);
    }
}
