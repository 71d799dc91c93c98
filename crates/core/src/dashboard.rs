//! Dashboard aggregation.
//!
//! Everything here is a pure function of borrowed collections and an explicit `today`, so the
//! same numbers come out of the CLI, the REST service and the tests.

use crate::constants::{MAX_UTILIZATION_DAYS, UNKNOWN_DEPARTMENT};
use crate::models::{Appointment, AppointmentStatus, Doctor, Nurse, Patient, Record};
use crate::scheduling::SlotTemplates;
use crate::{EntityStore, StoreError, StoreResult};
use chrono::{Days, NaiveDate};
use hms_ids::EntityId;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// The date range the dashboard reports on. Both bounds are inclusive calendar days.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeWindow {
    Today,
    #[default]
    Last7Days,
    Last30Days,
    All,
    /// A missing bound leaves that side open.
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl TimeWindow {
    /// Inclusive `(start, end)` bounds relative to `today`; `None` means unbounded.
    pub fn bounds(self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self {
            TimeWindow::Today => (Some(today), Some(today)),
            TimeWindow::Last7Days => (today.checked_sub_days(Days::new(6)), Some(today)),
            TimeWindow::Last30Days => (today.checked_sub_days(Days::new(29)), Some(today)),
            TimeWindow::All => (None, None),
            TimeWindow::Custom { start, end } => (start, end),
        }
    }

    pub fn contains(self, today: NaiveDate, date: NaiveDate) -> bool {
        let (start, end) = self.bounds(today);
        start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
    }

    /// Builds a window from its short name (`today`, `7d`, `30d`, `all`, `custom`).
    ///
    /// `start` and `end` are only read for `custom`.
    pub fn from_parts(
        name: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> StoreResult<Self> {
        let window = name.parse::<TimeWindow>()?;
        Ok(match window {
            TimeWindow::Custom { .. } => TimeWindow::Custom { start, end },
            other => other,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TimeWindow::Today => "today",
            TimeWindow::Last7Days => "7d",
            TimeWindow::Last30Days => "30d",
            TimeWindow::All => "all",
            TimeWindow::Custom { .. } => "custom",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = StoreError;

    /// `custom` parses with both bounds open.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(TimeWindow::Today),
            "7d" => Ok(TimeWindow::Last7Days),
            "30d" => Ok(TimeWindow::Last30Days),
            "all" => Ok(TimeWindow::All),
            "custom" => Ok(TimeWindow::Custom {
                start: None,
                end: None,
            }),
            other => Err(StoreError::InvalidInput(format!(
                "time window must be one of today, 7d, 30d, all, custom; got '{}'",
                other
            ))),
        }
    }
}

/// Restricts the doctor-count fallback of the department breakdown.
///
/// Both fields are case-insensitive substring matches; empty means "any".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoctorFilter {
    pub specialization: Option<String>,
    pub city: Option<String>,
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        fn contains(haystack: Option<&str>, needle: Option<&String>) -> bool {
            let Some(needle) = needle.map(|n| n.trim()).filter(|n| !n.is_empty()) else {
                return true;
            };
            haystack
                .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false)
        }

        contains(
            Some(doctor.specialization.as_str()),
            self.specialization.as_ref(),
        ) && contains(doctor.city.as_deref(), self.city.as_ref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

/// What the department counts were computed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownSource {
    Appointments,
    /// No appointment fell in the window, so doctors per department are shown instead.
    Doctors,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DepartmentBreakdown {
    pub source: BreakdownSource,
    /// Sorted by department name.
    pub counts: Vec<DepartmentCount>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub patients_under_care: usize,
    pub doctors_on_duty: usize,
    pub nurses_assigned: usize,
    pub appointments_today: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayUtilization {
    pub date: NaiveDate,
    pub filled: usize,
    pub total: usize,
    pub percent: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DoctorUtilization {
    pub doctor_id: EntityId,
    pub doctor_name: String,
    pub department: String,
    pub days: Vec<DayUtilization>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub window: String,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub kpis: Kpis,
    pub departments: DepartmentBreakdown,
    pub appointments_in_window: Vec<Record<Appointment>>,
    pub cancelled_in_window: Vec<Record<Appointment>>,
    pub visits_today: Vec<Record<Appointment>>,
    pub utilization: Vec<DoctorUtilization>,
}

pub fn appointments_in_window(
    appointments: &[Record<Appointment>],
    window: TimeWindow,
    today: NaiveDate,
) -> Vec<Record<Appointment>> {
    appointments
        .iter()
        .filter(|a| window.contains(today, a.fields.date))
        .cloned()
        .collect()
}

/// Appointments per department of the booked doctor.
///
/// When no appointment falls in the window the breakdown counts doctors per department
/// (optionally narrowed by `filter`) so the chart is never empty while doctors exist.
pub fn department_breakdown(
    appointments: &[Record<Appointment>],
    doctors: &[Record<Doctor>],
    window: TimeWindow,
    today: NaiveDate,
    filter: &DoctorFilter,
) -> DepartmentBreakdown {
    let departments: HashMap<&EntityId, &str> = doctors
        .iter()
        .map(|d| (&d.id, d.fields.department_label()))
        .collect();

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for appt in appointments
        .iter()
        .filter(|a| window.contains(today, a.fields.date))
    {
        let department = departments
            .get(&appt.fields.doctor_id)
            .copied()
            .unwrap_or(UNKNOWN_DEPARTMENT);
        *counts.entry(department.to_owned()).or_default() += 1;
    }

    if !counts.is_empty() {
        return DepartmentBreakdown {
            source: BreakdownSource::Appointments,
            counts: into_counts(counts),
        };
    }

    for doctor in doctors.iter().filter(|d| filter.matches(&d.fields)) {
        *counts
            .entry(doctor.fields.department_label().to_owned())
            .or_default() += 1;
    }
    DepartmentBreakdown {
        source: BreakdownSource::Doctors,
        counts: into_counts(counts),
    }
}

fn into_counts(counts: BTreeMap<String, usize>) -> Vec<DepartmentCount> {
    counts
        .into_iter()
        .map(|(department, count)| DepartmentCount { department, count })
        .collect()
}

pub fn kpis(
    patients: &[Record<Patient>],
    doctors: &[Record<Doctor>],
    nurses: &[Record<Nurse>],
    appointments: &[Record<Appointment>],
    today: NaiveDate,
) -> Kpis {
    Kpis {
        patients_under_care: patients
            .iter()
            .filter(|p| p.fields.status.is_under_care())
            .count(),
        doctors_on_duty: doctors.len(),
        nurses_assigned: nurses.len(),
        appointments_today: appointments
            .iter()
            .filter(|a| a.fields.date == today)
            .count(),
    }
}

pub fn cancelled_in_window(
    appointments: &[Record<Appointment>],
    window: TimeWindow,
    today: NaiveDate,
) -> Vec<Record<Appointment>> {
    appointments
        .iter()
        .filter(|a| {
            a.fields.status == AppointmentStatus::Cancelled && window.contains(today, a.fields.date)
        })
        .cloned()
        .collect()
}

/// Every appointment on `date`, whatever its status.
pub fn visits_on(
    appointments: &[Record<Appointment>],
    date: NaiveDate,
) -> Vec<Record<Appointment>> {
    appointments
        .iter()
        .filter(|a| a.fields.date == date)
        .cloned()
        .collect()
}

/// Per-doctor booking load for `days` days starting at `today`.
///
/// `total` is the doctor's template size (at least 1, so a doctor without a template still
/// reports a ratio) and `percent` is rounded to the nearest whole number.
pub fn utilization(
    doctors: &[Record<Doctor>],
    appointments: &[Record<Appointment>],
    templates: &SlotTemplates,
    today: NaiveDate,
    days: u32,
) -> Vec<DoctorUtilization> {
    let dates: Vec<NaiveDate> = (0..days)
        .filter_map(|offset| today.checked_add_days(Days::new(u64::from(offset))))
        .collect();

    doctors
        .iter()
        .map(|doctor| {
            let total = templates.get(&doctor.id).map_or(0, <[_]>::len).max(1);
            let days = dates
                .iter()
                .map(|&date| {
                    let filled = appointments
                        .iter()
                        .filter(|a| a.fields.holds_slot() && a.fields.is_for(&doctor.id, date))
                        .count();
                    DayUtilization {
                        date,
                        filled,
                        total,
                        percent: percent(filled, total),
                    }
                })
                .collect();

            DoctorUtilization {
                doctor_id: doctor.id.clone(),
                doctor_name: doctor.fields.name.as_str().to_owned(),
                department: doctor.fields.department_label().to_owned(),
                days,
            }
        })
        .collect()
}

fn percent(filled: usize, total: usize) -> u32 {
    let total = total.max(1);
    // Round half up in integer arithmetic.
    ((filled * 200 + total) / (total * 2)) as u32
}

/// Computes the whole dashboard from the store in one pass.
///
/// # Errors
///
/// Returns [`StoreError::InvalidInput`] if `utilization_days` exceeds
/// [`MAX_UTILIZATION_DAYS`].
pub fn summarize(
    store: &EntityStore,
    today: NaiveDate,
    window: TimeWindow,
    filter: &DoctorFilter,
    utilization_days: u32,
) -> StoreResult<DashboardSummary> {
    if utilization_days > MAX_UTILIZATION_DAYS {
        return Err(StoreError::InvalidInput(format!(
            "utilisation horizon of {} days exceeds the maximum of {}",
            utilization_days, MAX_UTILIZATION_DAYS
        )));
    }

    let appointments = store.appointments();
    let (window_start, window_end) = window.bounds(today);

    Ok(DashboardSummary {
        today,
        window: window.as_str().to_owned(),
        window_start,
        window_end,
        kpis: kpis(
            store.patients(),
            store.doctors(),
            store.nurses(),
            appointments,
            today,
        ),
        departments: department_breakdown(appointments, store.doctors(), window, today, filter),
        appointments_in_window: appointments_in_window(appointments, window, today),
        cancelled_in_window: cancelled_in_window(appointments, window, today),
        visits_today: visits_on(appointments, today),
        utilization: utilization(
            store.doctors(),
            appointments,
            store.slot_templates(),
            today,
            utilization_days,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UTILIZATION_DAYS;
    use crate::store::tests::{demo_store, id};
    use crate::{MemoryStore, SeedData};
    use hms_types::NonEmptyText;
    use std::sync::Arc;

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

    #[test]
    fn test_window_bounds_are_inclusive() {
        let today = dec(20);
        assert!(TimeWindow::Last7Days.contains(today, dec(14)));
        assert!(!TimeWindow::Last7Days.contains(today, dec(13)));
        assert!(TimeWindow::Last7Days.contains(today, today));
        assert!(!TimeWindow::Last7Days.contains(today, dec(21)));
        assert!(TimeWindow::Today.contains(today, today));
        assert!(!TimeWindow::Today.contains(today, dec(19)));
        assert!(TimeWindow::All.contains(today, dec(1)));
    }

    #[test]
    fn test_custom_window_with_open_end() {
        let window = TimeWindow::from_parts("custom", Some(dec(10)), None).unwrap();
        assert!(window.contains(dec(1), dec(31)));
        assert!(!window.contains(dec(1), dec(9)));
    }

    #[test]
    fn test_window_parse_rejects_unknown() {
        assert!("14d".parse::<TimeWindow>().is_err());
        assert_eq!("30D".parse::<TimeWindow>().unwrap(), TimeWindow::Last30Days);
    }

    #[test]
    fn test_department_breakdown_counts_appointments() {
        let store = demo_store();
        let breakdown = department_breakdown(
            store.appointments(),
            store.doctors(),
            TimeWindow::All,
            dec(20),
            &DoctorFilter::default(),
        );

        assert_eq!(breakdown.source, BreakdownSource::Appointments);
        assert_eq!(
            breakdown.counts,
            vec![
                DepartmentCount {
                    department: "Dermatology".into(),
                    count: 1
                },
                DepartmentCount {
                    department: "Neurology".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_department_breakdown_falls_back_to_doctors() {
        let store = demo_store();
        let breakdown = department_breakdown(
            store.appointments(),
            store.doctors(),
            TimeWindow::Today,
            dec(1),
            &DoctorFilter::default(),
        );

        assert_eq!(breakdown.source, BreakdownSource::Doctors);
        assert_eq!(breakdown.counts.len(), 2);
        assert!(breakdown.counts.iter().all(|c| c.count == 1));
    }

    #[test]
    fn test_department_fallback_respects_doctor_filter() {
        let store = demo_store();
        let filter = DoctorFilter {
            specialization: Some("hema".into()),
            city: None,
        };
        let breakdown =
            department_breakdown(&[], store.doctors(), TimeWindow::All, dec(1), &filter);

        assert_eq!(
            breakdown.counts,
            vec![DepartmentCount {
                department: "Neurology".into(),
                count: 1
            }]
        );
    }

    #[test]
    fn test_kpis_count_under_care_and_today() {
        let mut store = demo_store();
        let mut discharged = store.patient(&id("P-002")).unwrap().fields.clone();
        discharged.status = crate::PatientStatus::Discharged;
        store.edit_patient(&id("P-002"), discharged).unwrap();
        store.cancel_appointment(&id("A-001"), false).unwrap();

        let k = kpis(
            store.patients(),
            store.doctors(),
            store.nurses(),
            store.appointments(),
            dec(20),
        );
        assert_eq!(k.patients_under_care, 1);
        assert_eq!(k.doctors_on_duty, 2);
        assert_eq!(k.nurses_assigned, 2);
        // cancelled appointments still count as on the day
        assert_eq!(k.appointments_today, 1);
    }

    #[test]
    fn test_utilization_counts_live_bookings() {
        let mut store = demo_store();
        store.add_appointment(booking("P-002", "D-001", 20, "09:00 AM")).unwrap();
        store.add_appointment(booking("P-002", "D-001", 20, "11:00 AM")).unwrap();
        store.cancel_appointment(&id("A-001"), false).unwrap();

        let rows = utilization(
            store.doctors(),
            store.appointments(),
            store.slot_templates(),
            dec(20),
            UTILIZATION_DAYS,
        );

        let d1 = rows.iter().find(|r| r.doctor_id == id("D-001")).unwrap();
        assert_eq!(d1.days.len(), 7);
        assert_eq!(d1.days[0].date, dec(20));
        assert_eq!(d1.days[0].filled, 2);
        assert_eq!(d1.days[0].total, 5);
        assert_eq!(d1.days[0].percent, 40);
        assert_eq!(d1.days[1].filled, 0);
    }

    #[test]
    fn test_utilization_without_template_uses_total_of_one() {
        let seed = SeedData {
            slot_templates: SlotTemplates::new(),
            ..SeedData::demo().unwrap()
        };
        let store = EntityStore::open(Arc::new(MemoryStore::new()), seed).unwrap();

        let rows = utilization(
            store.doctors(),
            store.appointments(),
            store.slot_templates(),
            dec(20),
            1,
        );
        let d1 = rows.iter().find(|r| r.doctor_id == id("D-001")).unwrap();
        assert_eq!(d1.days[0].total, 1);
        assert_eq!(d1.days[0].percent, 100);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 5), 0);
    }

    #[test]
    fn test_summarize_bundles_alerts() {
        let mut store = demo_store();
        store.cancel_appointment(&id("A-002"), false).unwrap();

        let summary = summarize(
            &store,
            dec(21),
            TimeWindow::Last7Days,
            &DoctorFilter::default(),
            UTILIZATION_DAYS,
        )
        .unwrap();
        assert_eq!(summary.window, "7d");
        assert_eq!(summary.window_start, Some(dec(15)));
        assert_eq!(summary.appointments_in_window.len(), 2);
        assert_eq!(summary.cancelled_in_window.len(), 1);
        assert_eq!(summary.visits_today.len(), 1);
        assert_eq!(summary.utilization.len(), 2);
    }

    #[test]
    fn test_summarize_rejects_oversized_horizon() {
        let store = demo_store();
        let result = summarize(
            &store,
            dec(20),
            TimeWindow::All,
            &DoctorFilter::default(),
            2_000_000,
        );
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));

        let summary = summarize(
            &store,
            dec(20),
            TimeWindow::All,
            &DoctorFilter::default(),
            MAX_UTILIZATION_DAYS,
        )
        .unwrap();
        assert!(summary
            .utilization
            .iter()
            .all(|u| u.days.len() == MAX_UTILIZATION_DAYS as usize));
    }
}
