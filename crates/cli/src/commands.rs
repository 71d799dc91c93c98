//! Subcommand definitions and their handlers.
//!
//! Each handler checks the acting identity's capability before mutating, then prints either a
//! one-line summary per record or, with `--json`, the records themselves.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use hms_core::dashboard::{summarize, DoctorFilter, TimeWindow};
use hms_core::models::{optional_text, parse_date};
use hms_core::{
    constants::UTILIZATION_DAYS, queries, Appointment, AppointmentStatus, Capability, Doctor,
    EntityId, EntityStore, Identity, NonEmptyText, NotificationDraft, NotificationStatus, Nurse,
    Patient, PatientStatus, PhoneNumber, PostDraft, Record, StoreError, TransferRequest,
    TransferStatus, WaitlistEntry,
};
use serde::Serialize;

pub(crate) fn date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}

fn id_arg(input: &str) -> Result<EntityId, String> {
    EntityId::parse(input.trim()).map_err(|e| e.to_string())
}

fn text(input: &str) -> Result<NonEmptyText, StoreError> {
    Ok(NonEmptyText::new(input)?)
}

fn phone(input: Option<String>) -> Result<Option<PhoneNumber>, StoreError> {
    Ok(PhoneNumber::parse_optional(input.as_deref())?)
}

pub(crate) struct Output {
    pub json: bool,
}

impl Output {
    fn list<'a, T, F>(&self, items: impl IntoIterator<Item = &'a T>, line: F) -> anyhow::Result<()>
    where
        T: Serialize + 'a,
        F: Fn(&T) -> String,
    {
        let items: Vec<&T> = items.into_iter().collect();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else if items.is_empty() {
            println!("Nothing found.");
        } else {
            for item in items {
                println!("{}", line(item));
            }
        }
        Ok(())
    }

    fn one<T, F>(&self, verb: &str, item: &T, line: F) -> anyhow::Result<()>
    where
        T: Serialize,
        F: Fn(&T) -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(item)?);
        } else if verb.is_empty() {
            println!("{}", line(item));
        } else {
            println!("{} {}", verb, line(item));
        }
        Ok(())
    }
}

fn patient_line(p: &Record<Patient>) -> String {
    format!(
        "{}: {} [{}] doctor {} nurse {}",
        p.id, p.fields.name, p.fields.status, p.fields.doctor_id, p.fields.nurse_id
    )
}

fn doctor_line(d: &Record<Doctor>) -> String {
    format!(
        "{}: {} ({}, {}) {}",
        d.id,
        d.fields.name,
        d.fields.specialization,
        d.fields.department_label(),
        d.fields.city.as_deref().unwrap_or("-")
    )
}

fn nurse_line(n: &Record<Nurse>) -> String {
    format!("{}: {} ({})", n.id, n.fields.name, n.fields.department)
}

fn appointment_line(a: &Record<Appointment>) -> String {
    format!(
        "{}: {} {} patient {} doctor {} [{}]",
        a.id, a.fields.date, a.fields.time, a.fields.patient_id, a.fields.doctor_id, a.fields.status
    )
}

fn waitlist_line(w: &Record<WaitlistEntry>) -> String {
    format!(
        "{}: patient {} in {} (prefers {}) {}",
        w.id,
        w.fields.patient_id,
        w.fields.department,
        w.fields
            .preferred_date
            .map_or_else(|| "any day".to_owned(), |d| d.to_string()),
        w.fields.notes.as_deref().unwrap_or("")
    )
}

fn transfer_line(t: &Record<TransferRequest>) -> String {
    format!(
        "{}: patient {} {} -> {} [{}] assigned {}",
        t.id,
        t.fields.patient_id,
        t.fields.from_dept,
        t.fields.to_dept,
        t.fields.status,
        t.fields
            .assigned_doctor_id
            .as_ref()
            .map_or("-", EntityId::as_str)
    )
}

fn post_line(p: &Record<hms_core::Post>) -> String {
    format!(
        "{}: {} [{}] {} likes, {} comments",
        p.id,
        p.fields.title,
        p.fields.category,
        p.fields.likes,
        p.fields.comments.len()
    )
}

fn notification_line(n: &Record<hms_core::Notification>) -> String {
    format!(
        "{}: {} from {} to {} [{}] {}",
        n.id, n.fields.kind, n.fields.from, n.fields.to, n.fields.status, n.fields.message
    )
}

// ---------------------------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------------------------

#[derive(Args)]
pub(crate) struct PatientFields {
    /// Full name
    #[arg(long)]
    name: Option<String>,
    /// Responsible doctor id
    #[arg(long, value_parser = id_arg)]
    doctor: Option<EntityId>,
    /// Assigned nurse id
    #[arg(long, value_parser = id_arg)]
    nurse: Option<EntityId>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    dob: Option<NaiveDate>,
    /// Active, In Treatment, Recovered, Discharged or Unknown
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl PatientFields {
    /// Applies the given flags over `base`, or builds a new patient when `base` is `None`.
    fn apply(self, base: Option<Patient>) -> Result<Patient, StoreError> {
        let status = self
            .status
            .map(|s| s.parse::<PatientStatus>())
            .transpose()?;
        let phone = phone(self.phone)?;
        let name = self.name.map(|n| text(&n)).transpose()?;

        match base {
            Some(mut p) => {
                if let Some(name) = name {
                    p.name = name;
                }
                if let Some(doctor) = self.doctor {
                    p.doctor_id = doctor;
                }
                if let Some(nurse) = self.nurse {
                    p.nurse_id = nurse;
                }
                if self.dob.is_some() {
                    p.dob = self.dob;
                }
                if let Some(status) = status {
                    p.status = status;
                }
                if let Some(gender) = optional_text(self.gender) {
                    p.gender = Some(gender);
                }
                if phone.is_some() {
                    p.phone = phone;
                }
                Ok(p)
            }
            None => Ok(Patient {
                name: name.ok_or_else(|| missing("--name"))?,
                dob: self.dob,
                status: status.unwrap_or_default(),
                gender: optional_text(self.gender),
                phone,
                doctor_id: self.doctor.ok_or_else(|| missing("--doctor"))?,
                nurse_id: self.nurse.ok_or_else(|| missing("--nurse"))?,
            }),
        }
    }
}

fn missing(flag: &str) -> StoreError {
    StoreError::InvalidInput(format!("{} is required", flag))
}

#[derive(Subcommand)]
pub(crate) enum PatientCmd {
    /// List patients, optionally filtered by name or id
    List {
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Show one patient
    Show {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
    /// Add a patient
    Add(PatientFields),
    /// Change some fields of a patient
    Edit {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        #[command(flatten)]
        fields: PatientFields,
    },
    /// Delete a patient with their appointments and waitlist entries
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn patients(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: PatientCmd,
) -> anyhow::Result<()> {
    match cmd {
        PatientCmd::List { query } => {
            out.list(queries::search_patients(store, &query), patient_line)
        }
        PatientCmd::Show { id } => out.one("", store.patient(&id)?, patient_line),
        PatientCmd::Add(fields) => {
            who.require(Capability::ManageDirectory)?;
            let record = store.add_patient(fields.apply(None)?)?;
            out.one("Added", &record, patient_line)
        }
        PatientCmd::Edit { id, fields } => {
            who.require(Capability::ManageDirectory)?;
            let base = store.patient(&id)?.fields.clone();
            let record = store.edit_patient(&id, fields.apply(Some(base))?)?;
            out.one("Updated", &record, patient_line)
        }
        PatientCmd::Delete { id } => {
            who.require(Capability::ManageDirectory)?;
            let record = store.delete_patient(&id)?;
            out.one("Deleted", &record, patient_line)
        }
    }
}

#[derive(Args)]
pub(crate) struct DoctorFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    specialization: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    dob: Option<NaiveDate>,
}

impl DoctorFields {
    fn apply(self, base: Option<Doctor>) -> Result<Doctor, StoreError> {
        let name = self.name.map(|n| text(&n)).transpose()?;
        let specialization = self.specialization.map(|s| text(&s)).transpose()?;
        let department = optional_text(self.department)
            .map(|d| text(&d))
            .transpose()?;
        let phone = phone(self.phone)?;

        match base {
            Some(mut d) => {
                if let Some(name) = name {
                    d.name = name;
                }
                if let Some(specialization) = specialization {
                    d.specialization = specialization;
                }
                if department.is_some() {
                    d.department = department;
                }
                if let Some(city) = optional_text(self.city) {
                    d.city = Some(city);
                }
                if phone.is_some() {
                    d.phone = phone;
                }
                if self.dob.is_some() {
                    d.dob = self.dob;
                }
                Ok(d)
            }
            None => Ok(Doctor {
                name: name.ok_or_else(|| missing("--name"))?,
                specialization: specialization.ok_or_else(|| missing("--specialization"))?,
                department,
                city: optional_text(self.city),
                phone,
                dob: self.dob,
            }),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum DoctorCmd {
    /// List doctors, optionally filtered by specialization and city
    List {
        #[arg(long)]
        specialization: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    Show {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
    Add(DoctorFields),
    Edit {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        #[command(flatten)]
        fields: DoctorFields,
    },
    /// Delete a doctor no patient or appointment refers to
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn doctors(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: DoctorCmd,
) -> anyhow::Result<()> {
    match cmd {
        DoctorCmd::List {
            specialization,
            city,
        } => {
            let filter = DoctorFilter {
                specialization,
                city,
            };
            out.list(queries::filter_doctors(store, &filter), doctor_line)
        }
        DoctorCmd::Show { id } => out.one("", store.doctor(&id)?, doctor_line),
        DoctorCmd::Add(fields) => {
            who.require(Capability::ManageDirectory)?;
            let record = store.add_doctor(fields.apply(None)?)?;
            out.one("Added", &record, doctor_line)
        }
        DoctorCmd::Edit { id, fields } => {
            who.require(Capability::ManageDirectory)?;
            let base = store.doctor(&id)?.fields.clone();
            let record = store.edit_doctor(&id, fields.apply(Some(base))?)?;
            out.one("Updated", &record, doctor_line)
        }
        DoctorCmd::Delete { id } => {
            who.require(Capability::ManageDirectory)?;
            let record = store.delete_doctor(&id)?;
            out.one("Deleted", &record, doctor_line)
        }
    }
}

#[derive(Args)]
pub(crate) struct NurseFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = date_arg)]
    dob: Option<NaiveDate>,
}

impl NurseFields {
    fn apply(self, base: Option<Nurse>) -> Result<Nurse, StoreError> {
        let name = self.name.map(|n| text(&n)).transpose()?;
        let department = self.department.map(|d| text(&d)).transpose()?;
        let phone = phone(self.phone)?;

        match base {
            Some(mut n) => {
                if let Some(name) = name {
                    n.name = name;
                }
                if let Some(department) = department {
                    n.department = department;
                }
                if phone.is_some() {
                    n.phone = phone;
                }
                if self.dob.is_some() {
                    n.dob = self.dob;
                }
                Ok(n)
            }
            None => Ok(Nurse {
                name: name.ok_or_else(|| missing("--name"))?,
                department: department.ok_or_else(|| missing("--department"))?,
                phone,
                dob: self.dob,
            }),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum NurseCmd {
    List,
    Show {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
    Add(NurseFields),
    Edit {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        #[command(flatten)]
        fields: NurseFields,
    },
    /// Delete a nurse no patient is assigned to
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn nurses(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: NurseCmd,
) -> anyhow::Result<()> {
    match cmd {
        NurseCmd::List => out.list(store.nurses(), nurse_line),
        NurseCmd::Show { id } => out.one("", store.nurse(&id)?, nurse_line),
        NurseCmd::Add(fields) => {
            who.require(Capability::ManageDirectory)?;
            let record = store.add_nurse(fields.apply(None)?)?;
            out.one("Added", &record, nurse_line)
        }
        NurseCmd::Edit { id, fields } => {
            who.require(Capability::ManageDirectory)?;
            let base = store.nurse(&id)?.fields.clone();
            let record = store.edit_nurse(&id, fields.apply(Some(base))?)?;
            out.one("Updated", &record, nurse_line)
        }
        NurseCmd::Delete { id } => {
            who.require(Capability::ManageDirectory)?;
            let record = store.delete_nurse(&id)?;
            out.one("Deleted", &record, nurse_line)
        }
    }
}

// ---------------------------------------------------------------------------------------------
// Scheduling
// ---------------------------------------------------------------------------------------------

#[derive(Subcommand)]
pub(crate) enum AppointmentCmd {
    /// List appointments matching patient name, doctor name or date
    List {
        #[arg(long, default_value = "")]
        query: String,
        /// Only this date (YYYY-MM-DD)
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },
    /// Book a slot from the doctor's template
    Book {
        #[arg(value_parser = id_arg)]
        patient: EntityId,
        #[arg(value_parser = id_arg)]
        doctor: EntityId,
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
        /// Slot label, e.g. "10:00 AM"
        time: String,
    },
    /// Move an appointment to another date or slot
    Reschedule {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
        time: String,
    },
    /// Cancel, optionally queueing the patient on the department waitlist
    Cancel {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        #[arg(long)]
        waitlist: bool,
    },
    /// Set the status (Scheduled, Confirmed, Completed, Cancelled)
    Status {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        status: String,
    },
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn appointments(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: AppointmentCmd,
) -> anyhow::Result<()> {
    match cmd {
        AppointmentCmd::List { query, date } => out.list(
            queries::search_appointments(store, &query, date),
            appointment_line,
        ),
        AppointmentCmd::Book {
            patient,
            doctor,
            date,
            time,
        } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.add_appointment(Appointment {
                patient_id: patient,
                doctor_id: doctor,
                date,
                time: text(&time)?,
                status: AppointmentStatus::Scheduled,
            })?;
            out.one("Booked", &record, appointment_line)
        }
        AppointmentCmd::Reschedule { id, date, time } => {
            who.require(Capability::ManageScheduling)?;
            let mut fields = store.appointment(&id)?.fields.clone();
            fields.date = date;
            fields.time = text(&time)?;
            let record = store.edit_appointment(&id, fields)?;
            out.one("Rescheduled", &record, appointment_line)
        }
        AppointmentCmd::Cancel { id, waitlist } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.cancel_appointment(&id, waitlist)?;
            out.one("Cancelled", &record, appointment_line)
        }
        AppointmentCmd::Status { id, status } => {
            who.require(Capability::ManageScheduling)?;
            let status: AppointmentStatus = status.parse()?;
            let record = store.set_appointment_status(&id, status)?;
            out.one("Updated", &record, appointment_line)
        }
        AppointmentCmd::Delete { id } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.delete_appointment(&id)?;
            out.one("Deleted", &record, appointment_line)
        }
    }
}

pub(crate) fn slots(
    store: &EntityStore,
    out: &Output,
    doctor: &str,
    date: NaiveDate,
) -> anyhow::Result<()> {
    let doctor_id = EntityId::parse(doctor.trim())?;
    let slots = store.available_slots(&doctor_id, date)?;
    if out.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
    } else if slots.is_empty() {
        println!("No free slots for {} on {}.", doctor_id, date);
    } else {
        println!("{}", slots.join(", "));
    }
    Ok(())
}

#[derive(Subcommand)]
pub(crate) enum TemplateCmd {
    Show {
        #[arg(value_parser = id_arg)]
        doctor: EntityId,
    },
    /// Replace the template with the given labels, in order
    Set {
        #[arg(value_parser = id_arg)]
        doctor: EntityId,
        #[arg(required = true)]
        labels: Vec<String>,
    },
}

pub(crate) fn template(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: TemplateCmd,
) -> anyhow::Result<()> {
    let doctor = match cmd {
        TemplateCmd::Show { doctor } => {
            store.doctor(&doctor)?;
            doctor
        }
        TemplateCmd::Set { doctor, labels } => {
            who.require(Capability::ManageScheduling)?;
            let labels = labels
                .iter()
                .map(|l| text(l))
                .collect::<Result<Vec<_>, _>>()?;
            store.set_slot_template(&doctor, labels)?;
            doctor
        }
    };

    let labels: Vec<&str> = store
        .slot_template(&doctor)
        .unwrap_or_default()
        .iter()
        .map(NonEmptyText::as_str)
        .collect();
    if out.json {
        println!("{}", serde_json::to_string_pretty(&labels)?);
    } else {
        println!("{}: {}", doctor, labels.join(", "));
    }
    Ok(())
}

#[derive(Args)]
pub(crate) struct DashboardArgs {
    /// today, 7d, 30d, all or custom
    #[arg(long, default_value = "7d")]
    window: String,
    /// Start of a custom window
    #[arg(long, value_parser = date_arg)]
    start: Option<NaiveDate>,
    /// End of a custom window
    #[arg(long, value_parser = date_arg)]
    end: Option<NaiveDate>,
    /// Reference day (defaults to the local date)
    #[arg(long, value_parser = date_arg)]
    today: Option<NaiveDate>,
    /// Utilisation horizon in days
    #[arg(long, default_value_t = UTILIZATION_DAYS)]
    days: u32,
    /// Narrows the doctor-count fallback
    #[arg(long)]
    specialization: Option<String>,
    /// Narrows the doctor-count fallback
    #[arg(long)]
    city: Option<String>,
}

pub(crate) fn dashboard(
    store: &EntityStore,
    out: &Output,
    args: DashboardArgs,
) -> anyhow::Result<()> {
    let window = TimeWindow::from_parts(&args.window, args.start, args.end)?;
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let filter = DoctorFilter {
        specialization: args.specialization,
        city: args.city,
    };
    let summary = summarize(store, today, window, &filter, args.days)?;

    if out.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let k = &summary.kpis;
    println!("Dashboard for {} (window {})", summary.today, summary.window);
    println!(
        "Patients under care: {}  Doctors: {}  Nurses: {}  Appointments today: {}",
        k.patients_under_care, k.doctors_on_duty, k.nurses_assigned, k.appointments_today
    );
    println!("Departments ({:?}):", summary.departments.source);
    for c in &summary.departments.counts {
        println!("  {}: {}", c.department, c.count);
    }
    println!(
        "Appointments in window: {} ({} cancelled)",
        summary.appointments_in_window.len(),
        summary.cancelled_in_window.len()
    );
    println!("Visits today:");
    for visit in &summary.visits_today {
        println!("  {}", appointment_line(visit));
    }
    println!("Utilisation:");
    for u in &summary.utilization {
        let days: Vec<String> = u
            .days
            .iter()
            .map(|d| format!("{} {}%", d.date.format("%m-%d"), d.percent))
            .collect();
        println!("  {} ({}): {}", u.doctor_name, u.department, days.join("  "));
    }
    Ok(())
}

// ---------------------------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------------------------

#[derive(Subcommand)]
pub(crate) enum WaitlistCmd {
    List,
    Add {
        #[arg(value_parser = id_arg)]
        patient: EntityId,
        department: String,
        /// Preferred date (YYYY-MM-DD)
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Book the waitlisted patient and drop the entry
    Fill {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        #[arg(value_parser = id_arg)]
        doctor: EntityId,
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
        time: String,
    },
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn waitlist(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: WaitlistCmd,
) -> anyhow::Result<()> {
    match cmd {
        WaitlistCmd::List => out.list(store.waitlist(), waitlist_line),
        WaitlistCmd::Add {
            patient,
            department,
            date,
            notes,
        } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.add_waitlist_entry(WaitlistEntry {
                patient_id: patient,
                department: text(&department)?,
                preferred_date: date,
                notes: optional_text(notes),
            })?;
            out.one("Queued", &record, waitlist_line)
        }
        WaitlistCmd::Fill {
            id,
            doctor,
            date,
            time,
        } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.fill_from_waitlist(&id, &doctor, date, text(&time)?)?;
            out.one("Booked", &record, appointment_line)
        }
        WaitlistCmd::Delete { id } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.delete_waitlist_entry(&id)?;
            out.one("Removed", &record, waitlist_line)
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum TransferCmd {
    List,
    /// Request a transfer; it starts Pending
    Add {
        #[arg(value_parser = id_arg)]
        patient: EntityId,
        from: String,
        to: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Assign a doctor from the target department
    Assign {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        #[arg(value_parser = id_arg)]
        doctor: EntityId,
    },
    /// Set the status (Pending, Assigned, Approved, Need Info)
    Status {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        status: String,
    },
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn transfers(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: TransferCmd,
) -> anyhow::Result<()> {
    match cmd {
        TransferCmd::List => out.list(store.transfers(), transfer_line),
        TransferCmd::Add {
            patient,
            from,
            to,
            reason,
        } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.add_transfer(TransferRequest {
                patient_id: patient,
                from_dept: text(&from)?,
                to_dept: text(&to)?,
                reason: optional_text(reason),
                status: TransferStatus::Pending,
                assigned_doctor_id: None,
            })?;
            out.one("Requested", &record, transfer_line)
        }
        TransferCmd::Assign { id, doctor } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.assign_transfer_doctor(&id, &doctor)?;
            out.one("Assigned", &record, transfer_line)
        }
        TransferCmd::Status { id, status } => {
            who.require(Capability::ManageScheduling)?;
            let status: TransferStatus = status.parse()?;
            let record = store.set_transfer_status(&id, status)?;
            out.one("Updated", &record, transfer_line)
        }
        TransferCmd::Delete { id } => {
            who.require(Capability::ManageScheduling)?;
            let record = store.delete_transfer(&id)?;
            out.one("Deleted", &record, transfer_line)
        }
    }
}

// ---------------------------------------------------------------------------------------------
// Community
// ---------------------------------------------------------------------------------------------

#[derive(Subcommand)]
pub(crate) enum PostCmd {
    List {
        #[arg(long, default_value = "")]
        query: String,
    },
    Publish {
        title: String,
        content: String,
        category: String,
        #[arg(long)]
        author: Option<String>,
    },
    Like {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
    Comment {
        #[arg(value_parser = id_arg)]
        id: EntityId,
        text: String,
        /// Display name (defaults to the acting identity)
        #[arg(long)]
        author: Option<String>,
    },
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn posts(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: PostCmd,
) -> anyhow::Result<()> {
    match cmd {
        PostCmd::List { query } => out.list(queries::search_posts(store, &query), post_line),
        PostCmd::Publish {
            title,
            content,
            category,
            author,
        } => {
            who.require(Capability::Publish)?;
            let record = store.publish_post(PostDraft {
                title: text(&title)?,
                content: text(&content)?,
                category: text(&category)?,
                author,
            })?;
            out.one("Published", &record, post_line)
        }
        PostCmd::Like { id } => {
            who.require(Capability::Engage)?;
            let record = store.like_post(&id)?;
            out.one("Liked", &record, post_line)
        }
        PostCmd::Comment {
            id,
            text: body,
            author,
        } => {
            who.require(Capability::Engage)?;
            let author = optional_text(author).unwrap_or_else(|| who.subject.clone());
            let comment = store.comment_on_post(&id, text(&author)?, who.role, text(&body)?)?;
            if out.json {
                println!("{}", serde_json::to_string_pretty(&comment)?);
            } else {
                println!("Commented {} on {}", comment.id, id);
            }
            Ok(())
        }
        PostCmd::Delete { id } => {
            who.require(Capability::Publish)?;
            let record = store.delete_post(&id)?;
            out.one("Deleted", &record, post_line)
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum NotificationCmd {
    List {
        #[arg(long, default_value = "")]
        query: String,
    },
    Send {
        /// Kind, e.g. "Override Request"
        kind: String,
        from: String,
        to: String,
        message: String,
        #[arg(long)]
        description: Option<String>,
    },
    Approve {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
    Reject {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
    Delete {
        #[arg(value_parser = id_arg)]
        id: EntityId,
    },
}

pub(crate) fn notifications(
    store: &mut EntityStore,
    who: &Identity,
    out: &Output,
    cmd: NotificationCmd,
) -> anyhow::Result<()> {
    match cmd {
        NotificationCmd::List { query } => out.list(
            queries::search_notifications(store, &query),
            notification_line,
        ),
        NotificationCmd::Send {
            kind,
            from,
            to,
            message,
            description,
        } => {
            who.require(Capability::Publish)?;
            let record = store.send_notification(NotificationDraft {
                kind: text(&kind)?,
                from: text(&from)?,
                to: text(&to)?,
                message: text(&message)?,
                description,
            })?;
            out.one("Sent", &record, notification_line)
        }
        NotificationCmd::Approve { id } => {
            who.require(Capability::ReviewNotifications)?;
            let record = store.set_notification_status(&id, NotificationStatus::Approved)?;
            out.one("Approved", &record, notification_line)
        }
        NotificationCmd::Reject { id } => {
            who.require(Capability::ReviewNotifications)?;
            let record = store.set_notification_status(&id, NotificationStatus::Rejected)?;
            out.one("Rejected", &record, notification_line)
        }
        NotificationCmd::Delete { id } => {
            who.require(Capability::ReviewNotifications)?;
            let record = store.delete_notification(&id)?;
            out.one("Deleted", &record, notification_line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hms_core::{MemoryStore, Role, SeedData};
    use std::sync::Arc;

    fn store() -> EntityStore {
        EntityStore::open(Arc::new(MemoryStore::new()), SeedData::demo().unwrap()).unwrap()
    }

    fn quiet() -> Output {
        Output { json: true }
    }

    fn id(s: &str) -> EntityId {
        EntityId::parse(s).unwrap()
    }

    #[test]
    fn test_patient_edit_keeps_unspecified_fields() {
        let mut store = store();
        let clerk = Identity::new("desk", Role::Clerk);
        let fields = PatientFields {
            name: None,
            doctor: None,
            nurse: None,
            dob: None,
            status: Some("recovered".into()),
            gender: None,
            phone: None,
        };

        patients(
            &mut store,
            &clerk,
            &quiet(),
            PatientCmd::Edit {
                id: id("P-001"),
                fields,
            },
        )
        .unwrap();

        let patient = store.patient(&id("P-001")).unwrap();
        assert_eq!(patient.fields.status, PatientStatus::Recovered);
        assert_eq!(patient.fields.name.as_str(), "Ahmad Saleh");
        assert_eq!(patient.fields.doctor_id, id("D-001"));
    }

    #[test]
    fn test_new_patient_requires_name_and_staff() {
        let fields = PatientFields {
            name: Some("Lama".into()),
            doctor: None,
            nurse: Some(id("N-001")),
            dob: None,
            status: None,
            gender: None,
            phone: None,
        };
        assert!(matches!(
            fields.apply(None),
            Err(StoreError::InvalidInput(msg)) if msg.contains("--doctor")
        ));
    }

    #[test]
    fn test_nurse_edit_changes_department_only() {
        let mut store = store();
        let clerk = Identity::new("desk", Role::Clerk);
        let fields = NurseFields {
            name: None,
            department: Some("Oncology".into()),
            phone: None,
            dob: None,
        };

        nurses(
            &mut store,
            &clerk,
            &quiet(),
            NurseCmd::Edit {
                id: id("N-001"),
                fields,
            },
        )
        .unwrap();

        let before = SeedData::demo().unwrap();
        let seeded = before.nurses.iter().find(|n| n.id == id("N-001")).unwrap();
        let nurse = store.nurse(&id("N-001")).unwrap();
        assert_eq!(nurse.fields.department.as_str(), "Oncology");
        assert_eq!(nurse.fields.name, seeded.fields.name);
        assert_eq!(nurse.fields.phone, seeded.fields.phone);
    }

    #[test]
    fn test_dashboard_refuses_oversized_horizon() {
        let store = store();
        let args = DashboardArgs {
            window: "all".into(),
            start: None,
            end: None,
            today: NaiveDate::from_ymd_opt(2025, 12, 20),
            days: 1_000_000,
            specialization: None,
            city: None,
        };
        assert!(dashboard(&store, &quiet(), args).is_err());
    }

    #[test]
    fn test_clerk_cannot_send_notification() {
        let mut store = store();
        let clerk = Identity::new("desk", Role::Clerk);
        let result = notifications(
            &mut store,
            &clerk,
            &quiet(),
            NotificationCmd::Send {
                kind: "Override Request".into(),
                from: "Nurse A".into(),
                to: "Doctor B".into(),
                message: "Dosage".into(),
                description: None,
            },
        );

        assert!(result.is_err());
        assert_eq!(store.notifications().len(), 3);
    }

    #[test]
    fn test_template_set_then_book_reduces_slots() {
        let mut store = store();
        let clerk = Identity::new("desk", Role::Clerk);
        template(
            &mut store,
            &clerk,
            &quiet(),
            TemplateCmd::Set {
                doctor: id("D-002"),
                labels: vec!["08:00 AM".into(), "09:00 AM".into()],
            },
        )
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 12, 22).unwrap();
        appointments(
            &mut store,
            &clerk,
            &quiet(),
            AppointmentCmd::Book {
                patient: id("P-002"),
                doctor: id("D-002"),
                date,
                time: "08:00 AM".into(),
            },
        )
        .unwrap();

        assert_eq!(
            store.available_slots(&id("D-002"), date).unwrap(),
            vec!["09:00 AM".to_owned()]
        );
    }
}
