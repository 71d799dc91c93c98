//! Case-insensitive search over the store's collections.
//!
//! A blank query matches everything. Results borrow from the store and keep its order.

use crate::models::{Appointment, Doctor, Notification, Patient, Post, Record};
use crate::dashboard::DoctorFilter;
use crate::EntityStore;
use chrono::NaiveDate;

fn needle(query: &str) -> Option<String> {
    let q = query.trim();
    (!q.is_empty()).then(|| q.to_lowercase())
}

fn has(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Patients whose name or id contains `query`.
pub fn search_patients<'a>(store: &'a EntityStore, query: &str) -> Vec<&'a Record<Patient>> {
    let Some(q) = needle(query) else {
        return store.patients().iter().collect();
    };
    store
        .patients()
        .iter()
        .filter(|p| has(p.fields.name.as_str(), &q) || has(p.id.as_str(), &q))
        .collect()
}

/// Appointments matching `query` on patient name, doctor name or ISO date, optionally pinned
/// to one `date`.
pub fn search_appointments<'a>(
    store: &'a EntityStore,
    query: &str,
    date: Option<NaiveDate>,
) -> Vec<&'a Record<Appointment>> {
    let q = needle(query);
    store
        .appointments()
        .iter()
        .filter(|a| date.map_or(true, |d| a.fields.date == d))
        .filter(|a| {
            let Some(q) = &q else {
                return true;
            };
            let patient = store
                .patient(&a.fields.patient_id)
                .map(|p| p.fields.name.as_str())
                .unwrap_or_default();
            let doctor = store
                .doctor(&a.fields.doctor_id)
                .map(|d| d.fields.name.as_str())
                .unwrap_or_default();
            has(patient, q) || has(doctor, q) || has(&a.fields.date.to_string(), q)
        })
        .collect()
}

pub fn filter_doctors<'a>(
    store: &'a EntityStore,
    filter: &DoctorFilter,
) -> Vec<&'a Record<Doctor>> {
    store
        .doctors()
        .iter()
        .filter(|d| filter.matches(&d.fields))
        .collect()
}

pub fn search_notifications<'a>(
    store: &'a EntityStore,
    query: &str,
) -> Vec<&'a Record<Notification>> {
    let Some(q) = needle(query) else {
        return store.notifications().iter().collect();
    };
    store
        .notifications()
        .iter()
        .filter(|n| {
            let f = &n.fields;
            has(f.kind.as_str(), &q)
                || has(f.from.as_str(), &q)
                || has(f.to.as_str(), &q)
                || has(f.message.as_str(), &q)
                || f.description.as_deref().is_some_and(|d| has(d, &q))
        })
        .collect()
}

pub fn search_posts<'a>(store: &'a EntityStore, query: &str) -> Vec<&'a Record<Post>> {
    let Some(q) = needle(query) else {
        return store.posts().iter().collect();
    };
    store
        .posts()
        .iter()
        .filter(|p| has(p.fields.title.as_str(), &q) || has(p.fields.content.as_str(), &q))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{demo_store, id};

    #[test]
    fn test_search_patients_by_name_or_id() {
        let store = demo_store();
        assert_eq!(search_patients(&store, "sara").len(), 1);
        assert_eq!(search_patients(&store, "p-001")[0].id, id("P-001"));
        assert_eq!(search_patients(&store, "  ").len(), 2);
        assert!(search_patients(&store, "nobody").is_empty());
    }

    #[test]
    fn test_search_appointments_by_doctor_name_and_date() {
        let store = demo_store();
        let by_doctor = search_appointments(&store, "lina", None);
        assert_eq!(by_doctor.len(), 1);
        assert_eq!(by_doctor[0].id, id("A-002"));

        let by_date = search_appointments(&store, "2025-12-20", None);
        assert_eq!(by_date[0].id, id("A-001"));

        let pinned = search_appointments(
            &store,
            "",
            Some(NaiveDate::from_ymd_opt(2025, 12, 21).unwrap()),
        );
        assert_eq!(pinned.len(), 1);
    }

    #[test]
    fn test_filter_doctors_by_city_and_specialization() {
        let store = demo_store();
        let filter = DoctorFilter {
            specialization: Some("onc".into()),
            city: Some("amman".into()),
        };
        let doctors = filter_doctors(&store, &filter);
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].id, id("D-001"));
    }

    #[test]
    fn test_search_notifications_matches_description() {
        let store = demo_store();
        assert_eq!(search_notifications(&store, "personal reasons").len(), 1);
        assert_eq!(search_notifications(&store, "transfer").len(), 2);
    }

    #[test]
    fn test_search_posts_by_title_or_content() {
        let store = demo_store();
        assert_eq!(search_posts(&store, "immun").len(), 2);
        assert_eq!(search_posts(&store, "yoga").len(), 1);
    }
}
