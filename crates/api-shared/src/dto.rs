//! JSON request and response bodies.
//!
//! Requests carry plain strings; `TryFrom` conversions validate them into core types and
//! report failures as [`StoreError`]s, so the REST layer maps every input problem the same way.
//! Responses are built from stored records with `From`.

use chrono::NaiveDate;
use hms_core::dashboard::{
    DashboardSummary, DayUtilization, DepartmentCount, DoctorFilter, DoctorUtilization, Kpis,
    TimeWindow,
};
use hms_core::models::{optional_text, parse_date};
use hms_core::{
    Appointment, AppointmentStatus, Comment, Doctor, EntityId, NonEmptyText, Notification,
    NotificationDraft, NotificationStatus, Nurse, Patient, PatientStatus, PhoneNumber, Post,
    PostDraft, Record, StoreError, StoreResult, TransferRequest, TransferStatus, WaitlistEntry,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Parses a path or body identifier.
pub fn parse_id(input: &str) -> StoreResult<EntityId> {
    Ok(EntityId::parse(input.trim())?)
}

fn text(input: &str) -> StoreResult<NonEmptyText> {
    Ok(NonEmptyText::new(input)?)
}

fn optional_date(input: Option<String>) -> StoreResult<Option<NaiveDate>> {
    optional_text(input).map(|d| parse_date(&d)).transpose()
}

fn phone(input: Option<String>) -> StoreResult<Option<PhoneNumber>> {
    Ok(PhoneNumber::parse_optional(input.as_deref())?)
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

// ---------------------------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientReq {
    pub name: String,
    /// ISO date (`YYYY-MM-DD`).
    #[serde(default)]
    pub dob: Option<String>,
    /// `Active`, `In Treatment`, `Recovered`, `Discharged` or `Unknown`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub doctor_id: String,
    pub nurse_id: String,
}

impl TryFrom<PatientReq> for Patient {
    type Error = StoreError;

    fn try_from(req: PatientReq) -> StoreResult<Self> {
        Ok(Patient {
            name: text(&req.name)?,
            dob: optional_date(req.dob)?,
            status: optional_text(req.status)
                .map(|s| s.parse::<PatientStatus>())
                .transpose()?
                .unwrap_or_default(),
            gender: optional_text(req.gender),
            phone: phone(req.phone)?,
            doctor_id: parse_id(&req.doctor_id)?,
            nurse_id: parse_id(&req.nurse_id)?,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub dob: Option<String>,
    pub status: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub doctor_id: String,
    pub nurse_id: String,
}

impl From<&Record<Patient>> for PatientRes {
    fn from(r: &Record<Patient>) -> Self {
        let p = &r.fields;
        Self {
            id: r.id.to_string(),
            name: p.name.to_string(),
            dob: format_date(p.dob),
            status: p.status.to_string(),
            gender: p.gender.clone(),
            phone: p.phone.as_ref().map(ToString::to_string),
            doctor_id: p.doctor_id.to_string(),
            nurse_id: p.nurse_id.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorReq {
    pub name: String,
    pub specialization: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
}

impl TryFrom<DoctorReq> for Doctor {
    type Error = StoreError;

    fn try_from(req: DoctorReq) -> StoreResult<Self> {
        Ok(Doctor {
            name: text(&req.name)?,
            specialization: text(&req.specialization)?,
            department: optional_text(req.department)
                .map(|d| text(&d))
                .transpose()?,
            city: optional_text(req.city),
            phone: phone(req.phone)?,
            dob: optional_date(req.dob)?,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorRes {
    pub id: String,
    pub name: String,
    pub specialization: String,
    /// `Unknown` when no department is on file.
    pub department: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
}

impl From<&Record<Doctor>> for DoctorRes {
    fn from(r: &Record<Doctor>) -> Self {
        let d = &r.fields;
        Self {
            id: r.id.to_string(),
            name: d.name.to_string(),
            specialization: d.specialization.to_string(),
            department: d.department_label().to_owned(),
            city: d.city.clone(),
            phone: d.phone.as_ref().map(ToString::to_string),
            dob: format_date(d.dob),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListDoctorsRes {
    pub doctors: Vec<DoctorRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NurseReq {
    pub name: String,
    pub department: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
}

impl TryFrom<NurseReq> for Nurse {
    type Error = StoreError;

    fn try_from(req: NurseReq) -> StoreResult<Self> {
        Ok(Nurse {
            name: text(&req.name)?,
            department: text(&req.department)?,
            phone: phone(req.phone)?,
            dob: optional_date(req.dob)?,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NurseRes {
    pub id: String,
    pub name: String,
    pub department: String,
    pub phone: Option<String>,
    pub dob: Option<String>,
}

impl From<&Record<Nurse>> for NurseRes {
    fn from(r: &Record<Nurse>) -> Self {
        let n = &r.fields;
        Self {
            id: r.id.to_string(),
            name: n.name.to_string(),
            department: n.department.to_string(),
            phone: n.phone.as_ref().map(ToString::to_string),
            dob: format_date(n.dob),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListNursesRes {
    pub nurses: Vec<NurseRes>,
}

// ---------------------------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AppointmentReq {
    pub patient_id: String,
    pub doctor_id: String,
    pub date: String,
    /// A label from the doctor's slot template, e.g. `10:00 AM`.
    pub time: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl TryFrom<AppointmentReq> for Appointment {
    type Error = StoreError;

    fn try_from(req: AppointmentReq) -> StoreResult<Self> {
        Ok(Appointment {
            patient_id: parse_id(&req.patient_id)?,
            doctor_id: parse_id(&req.doctor_id)?,
            date: parse_date(&req.date)?,
            time: text(&req.time)?,
            status: optional_text(req.status)
                .map(|s| s.parse::<AppointmentStatus>())
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AppointmentRes {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub date: String,
    pub time: String,
    pub status: String,
}

impl From<&Record<Appointment>> for AppointmentRes {
    fn from(r: &Record<Appointment>) -> Self {
        let a = &r.fields;
        Self {
            id: r.id.to_string(),
            patient_id: a.patient_id.to_string(),
            doctor_id: a.doctor_id.to_string(),
            date: a.date.to_string(),
            time: a.time.to_string(),
            status: a.status.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListAppointmentsRes {
    pub appointments: Vec<AppointmentRes>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CancelAppointmentReq {
    /// Also put the patient on the waitlist of the doctor's department.
    #[serde(default)]
    pub enqueue_waitlist: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusReq {
    pub status: String,
}

impl StatusReq {
    /// Parses the status into any of the labelled status enums.
    pub fn parse<S>(&self) -> StoreResult<S>
    where
        S: std::str::FromStr<Err = StoreError>,
    {
        self.status.parse::<S>()
    }
}

#[derive(Clone, Debug, Deserialize, IntoParams)]
pub struct SlotsQuery {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailableSlotsRes {
    pub doctor_id: String,
    pub date: String,
    pub slots: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotTemplateReq {
    pub slots: Vec<String>,
}

impl SlotTemplateReq {
    pub fn labels(&self) -> StoreResult<Vec<NonEmptyText>> {
        self.slots.iter().map(|s| text(s)).collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SlotTemplateRes {
    pub doctor_id: String,
    pub slots: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive search text.
    #[serde(default)]
    pub q: Option<String>,
    /// Exact ISO date filter, where supported.
    #[serde(default)]
    pub date: Option<String>,
}

impl SearchQuery {
    pub fn text(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }

    pub fn date(&self) -> StoreResult<Option<NaiveDate>> {
        optional_date(self.date.clone())
    }
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
pub struct DoctorFilterQuery {
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl From<DoctorFilterQuery> for DoctorFilter {
    fn from(q: DoctorFilterQuery) -> Self {
        DoctorFilter {
            specialization: optional_text(q.specialization),
            city: optional_text(q.city),
        }
    }
}

// ---------------------------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct WaitlistReq {
    pub patient_id: String,
    pub department: String,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TryFrom<WaitlistReq> for WaitlistEntry {
    type Error = StoreError;

    fn try_from(req: WaitlistReq) -> StoreResult<Self> {
        Ok(WaitlistEntry {
            patient_id: parse_id(&req.patient_id)?,
            department: text(&req.department)?,
            preferred_date: optional_date(req.preferred_date)?,
            notes: optional_text(req.notes),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct WaitlistRes {
    pub id: String,
    pub patient_id: String,
    pub department: String,
    pub preferred_date: Option<String>,
    pub notes: Option<String>,
}

impl From<&Record<WaitlistEntry>> for WaitlistRes {
    fn from(r: &Record<WaitlistEntry>) -> Self {
        let w = &r.fields;
        Self {
            id: r.id.to_string(),
            patient_id: w.patient_id.to_string(),
            department: w.department.to_string(),
            preferred_date: format_date(w.preferred_date),
            notes: w.notes.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListWaitlistRes {
    pub entries: Vec<WaitlistRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FillWaitlistReq {
    pub doctor_id: String,
    pub date: String,
    pub time: String,
}

impl FillWaitlistReq {
    pub fn parts(&self) -> StoreResult<(EntityId, NaiveDate, NonEmptyText)> {
        Ok((
            parse_id(&self.doctor_id)?,
            parse_date(&self.date)?,
            text(&self.time)?,
        ))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferReq {
    pub patient_id: String,
    pub from_dept: String,
    pub to_dept: String,
    #[serde(default)]
    pub reason: Option<String>,
    /// Ignored on create; new transfers always start `Pending`.
    #[serde(default)]
    pub status: Option<String>,
    /// Ignored on create.
    #[serde(default)]
    pub assigned_doctor_id: Option<String>,
}

impl TryFrom<TransferReq> for TransferRequest {
    type Error = StoreError;

    fn try_from(req: TransferReq) -> StoreResult<Self> {
        Ok(TransferRequest {
            patient_id: parse_id(&req.patient_id)?,
            from_dept: text(&req.from_dept)?,
            to_dept: text(&req.to_dept)?,
            reason: optional_text(req.reason),
            status: optional_text(req.status)
                .map(|s| s.parse::<TransferStatus>())
                .transpose()?
                .unwrap_or_default(),
            assigned_doctor_id: optional_text(req.assigned_doctor_id)
                .map(|id| parse_id(&id))
                .transpose()?,
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TransferRes {
    pub id: String,
    pub patient_id: String,
    pub from_dept: String,
    pub to_dept: String,
    pub reason: Option<String>,
    pub status: String,
    pub assigned_doctor_id: Option<String>,
}

impl From<&Record<TransferRequest>> for TransferRes {
    fn from(r: &Record<TransferRequest>) -> Self {
        let t = &r.fields;
        Self {
            id: r.id.to_string(),
            patient_id: t.patient_id.to_string(),
            from_dept: t.from_dept.to_string(),
            to_dept: t.to_dept.to_string(),
            reason: t.reason.clone(),
            status: t.status.to_string(),
            assigned_doctor_id: t.assigned_doctor_id.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListTransfersRes {
    pub transfers: Vec<TransferRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignTransferReq {
    pub doctor_id: String,
}

// ---------------------------------------------------------------------------------------------
// Community
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PostReq {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub author: Option<String>,
}

impl TryFrom<PostReq> for PostDraft {
    type Error = StoreError;

    fn try_from(req: PostReq) -> StoreResult<Self> {
        Ok(PostDraft {
            title: text(&req.title)?,
            content: text(&req.content)?,
            category: text(&req.category)?,
            author: optional_text(req.author),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentRes {
    pub id: String,
    pub text: String,
    pub author_name: String,
    pub author_role: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl From<&Comment> for CommentRes {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id.to_string(),
            text: c.text.to_string(),
            author_name: c.author_name.to_string(),
            author_role: c.author_role.to_string(),
            timestamp: c.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PostRes {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: Option<String>,
    pub created_at: String,
    pub likes: u32,
    pub comments: Vec<CommentRes>,
}

impl From<&Record<Post>> for PostRes {
    fn from(r: &Record<Post>) -> Self {
        let p = &r.fields;
        Self {
            id: r.id.to_string(),
            title: p.title.to_string(),
            content: p.content.to_string(),
            category: p.category.to_string(),
            author: p.author.clone(),
            created_at: p.created_at.to_rfc3339(),
            likes: p.likes,
            comments: p.comments.iter().map(CommentRes::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPostsRes {
    pub posts: Vec<PostRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentReq {
    pub text: String,
    /// Display name; defaults to the caller's identity.
    #[serde(default)]
    pub author_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationReq {
    #[serde(rename = "type")]
    pub kind: String,
    pub from: String,
    pub to: String,
    pub message: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<NotificationReq> for NotificationDraft {
    type Error = StoreError;

    fn try_from(req: NotificationReq) -> StoreResult<Self> {
        Ok(NotificationDraft {
            kind: text(&req.kind)?,
            from: text(&req.from)?,
            to: text(&req.to)?,
            message: text(&req.message)?,
            description: optional_text(req.description),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationRes {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub from: String,
    pub to: String,
    pub message: String,
    pub description: Option<String>,
    pub status: String,
    pub sent_at: String,
}

impl From<&Record<Notification>> for NotificationRes {
    fn from(r: &Record<Notification>) -> Self {
        let n = &r.fields;
        Self {
            id: r.id.to_string(),
            kind: n.kind.to_string(),
            from: n.from.to_string(),
            to: n.to.to_string(),
            message: n.message.to_string(),
            description: n.description.clone(),
            status: n.status.to_string(),
            sent_at: n.sent_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListNotificationsRes {
    pub notifications: Vec<NotificationRes>,
}

/// Parses a notification review decision (`approved`/`rejected`/`pending`).
pub fn parse_notification_status(req: &StatusReq) -> StoreResult<NotificationStatus> {
    req.parse()
}

// ---------------------------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// `today`, `7d` (default), `30d`, `all` or `custom`.
    #[serde(default)]
    pub window: Option<String>,
    /// Start of a `custom` window.
    #[serde(default)]
    pub start: Option<String>,
    /// End of a `custom` window.
    #[serde(default)]
    pub end: Option<String>,
    /// Overrides the reference day (defaults to the server's local date).
    #[serde(default)]
    pub today: Option<String>,
    /// Specialization filter for the doctor-count fallback.
    #[serde(default)]
    pub specialization: Option<String>,
    /// City filter for the doctor-count fallback.
    #[serde(default)]
    pub city: Option<String>,
    /// Utilisation horizon in days (at most 366).
    #[serde(default)]
    pub days: Option<u32>,
}

impl DashboardQuery {
    pub fn window(&self) -> StoreResult<TimeWindow> {
        let Some(name) = optional_text(self.window.clone()) else {
            return Ok(TimeWindow::default());
        };
        TimeWindow::from_parts(
            &name,
            optional_date(self.start.clone())?,
            optional_date(self.end.clone())?,
        )
    }

    pub fn today(&self) -> StoreResult<Option<NaiveDate>> {
        optional_date(self.today.clone())
    }

    pub fn doctor_filter(&self) -> DoctorFilter {
        DoctorFilter {
            specialization: optional_text(self.specialization.clone()),
            city: optional_text(self.city.clone()),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct KpisRes {
    pub patients_under_care: usize,
    pub doctors_on_duty: usize,
    pub nurses_assigned: usize,
    pub appointments_today: usize,
}

impl From<&Kpis> for KpisRes {
    fn from(k: &Kpis) -> Self {
        Self {
            patients_under_care: k.patients_under_care,
            doctors_on_duty: k.doctors_on_duty,
            nurses_assigned: k.nurses_assigned,
            appointments_today: k.appointments_today,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentCountRes {
    pub department: String,
    pub count: usize,
}

impl From<&DepartmentCount> for DepartmentCountRes {
    fn from(c: &DepartmentCount) -> Self {
        Self {
            department: c.department.clone(),
            count: c.count,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DayUtilizationRes {
    pub date: String,
    pub filled: usize,
    pub total: usize,
    pub percent: u32,
}

impl From<&DayUtilization> for DayUtilizationRes {
    fn from(d: &DayUtilization) -> Self {
        Self {
            date: d.date.to_string(),
            filled: d.filled,
            total: d.total,
            percent: d.percent,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorUtilizationRes {
    pub doctor_id: String,
    pub doctor_name: String,
    pub department: String,
    pub days: Vec<DayUtilizationRes>,
}

impl From<&DoctorUtilization> for DoctorUtilizationRes {
    fn from(u: &DoctorUtilization) -> Self {
        Self {
            doctor_id: u.doctor_id.to_string(),
            doctor_name: u.doctor_name.clone(),
            department: u.department.clone(),
            days: u.days.iter().map(DayUtilizationRes::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardRes {
    pub today: String,
    pub window: String,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    pub kpis: KpisRes,
    /// `appointments`, or `doctors` when the window held no appointments.
    pub department_source: String,
    pub departments: Vec<DepartmentCountRes>,
    pub appointments_in_window: Vec<AppointmentRes>,
    pub cancelled_in_window: Vec<AppointmentRes>,
    pub visits_today: Vec<AppointmentRes>,
    pub utilization: Vec<DoctorUtilizationRes>,
}

impl From<&DashboardSummary> for DashboardRes {
    fn from(s: &DashboardSummary) -> Self {
        let source = match s.departments.source {
            hms_core::dashboard::BreakdownSource::Appointments => "appointments",
            hms_core::dashboard::BreakdownSource::Doctors => "doctors",
        };
        Self {
            today: s.today.to_string(),
            window: s.window.clone(),
            window_start: format_date(s.window_start),
            window_end: format_date(s.window_end),
            kpis: KpisRes::from(&s.kpis),
            department_source: source.to_owned(),
            departments: s
                .departments
                .counts
                .iter()
                .map(DepartmentCountRes::from)
                .collect(),
            appointments_in_window: s
                .appointments_in_window
                .iter()
                .map(AppointmentRes::from)
                .collect(),
            cancelled_in_window: s
                .cancelled_in_window
                .iter()
                .map(AppointmentRes::from)
                .collect(),
            visits_today: s.visits_today.iter().map(AppointmentRes::from).collect(),
            utilization: s
                .utilization
                .iter()
                .map(DoctorUtilizationRes::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_req_converts_with_defaults() {
        let req: PatientReq = serde_json::from_str(
            r#"{"name": " Lama ", "doctor_id": "D-001", "nurse_id": "N-001", "phone": ""}"#,
        )
        .unwrap();

        let patient = Patient::try_from(req).expect("valid request");
        assert_eq!(patient.name.as_str(), "Lama");
        assert_eq!(patient.status, PatientStatus::Active);
        assert_eq!(patient.phone, None);
    }

    #[test]
    fn test_patient_req_rejects_bad_fields() {
        let base = PatientReq {
            name: "Lama".into(),
            dob: None,
            status: None,
            gender: None,
            phone: None,
            doctor_id: "D-001".into(),
            nurse_id: "N-001".into(),
        };

        let blank_name = PatientReq {
            name: "   ".into(),
            ..base.clone()
        };
        assert!(matches!(
            Patient::try_from(blank_name),
            Err(StoreError::Text(_))
        ));

        let bad_id = PatientReq {
            doctor_id: "doctor one".into(),
            ..base.clone()
        };
        assert!(matches!(Patient::try_from(bad_id), Err(StoreError::Id(_))));

        let bad_date = PatientReq {
            dob: Some("12/05/1979".into()),
            ..base
        };
        assert!(matches!(
            Patient::try_from(bad_date),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_appointment_req_parses_status_leniently() {
        let req = AppointmentReq {
            patient_id: "P-001".into(),
            doctor_id: "D-001".into(),
            date: "2025-12-20".into(),
            time: "10:00 AM".into(),
            status: Some("confirmed".into()),
        };
        let appt = Appointment::try_from(req).unwrap();
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
    }

    #[test]
    fn test_dashboard_query_defaults_to_seven_days() {
        let query = DashboardQuery::default();
        assert_eq!(query.window().unwrap(), TimeWindow::Last7Days);

        let custom = DashboardQuery {
            window: Some("custom".into()),
            start: Some("2025-12-01".into()),
            ..Default::default()
        };
        assert_eq!(
            custom.window().unwrap(),
            TimeWindow::Custom {
                start: NaiveDate::from_ymd_opt(2025, 12, 1),
                end: None
            }
        );
    }

    #[test]
    fn test_notification_res_uses_type_key() {
        let record = Record::new(
            parse_id("NTF-001").unwrap(),
            Notification {
                kind: text("Override Request").unwrap(),
                from: text("Nurse A").unwrap(),
                to: text("Doctor B").unwrap(),
                message: text("Dosage").unwrap(),
                description: None,
                status: NotificationStatus::Pending,
                sent_at: chrono::Utc::now(),
            },
        );
        let json = serde_json::to_value(NotificationRes::from(&record)).unwrap();
        assert_eq!(json["type"], "Override Request");
        assert_eq!(json["status"], "pending");
    }
}
