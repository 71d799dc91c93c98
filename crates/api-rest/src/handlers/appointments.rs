//! Appointments, slot templates and the availability resolver.

use crate::{ApiResult, AppState, Caller};
use api_shared::{
    parse_id, AppointmentReq, AppointmentRes, AvailableSlotsRes, CancelAppointmentReq, ErrorRes,
    ListAppointmentsRes, SearchQuery, SlotTemplateReq, SlotTemplateRes, SlotsQuery, StatusReq,
};
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
};
use hms_core::models::parse_date;
use hms_core::{queries, Appointment, AppointmentStatus, Capability};

#[utoipa::path(
    get,
    path = "/appointments",
    params(SearchQuery),
    responses(
        (status = 200, description = "Appointments, newest first", body = ListAppointmentsRes),
        (status = 400, description = "Malformed date filter", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// List appointments matching `q` on patient name, doctor name or date, optionally pinned to
/// one `date`.
#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ListAppointmentsRes>> {
    let date = query.date()?;
    let store = state.store.lock().await;
    let appointments = queries::search_appointments(&store, query.text(), date)
        .into_iter()
        .map(AppointmentRes::from)
        .collect();
    Ok(Json(ListAppointmentsRes { appointments }))
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = AppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentRes),
        (status = 400, description = "Invalid fields or unknown patient/doctor", body = ErrorRes),
        (status = 409, description = "The slot is already booked", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Book an appointment.
///
/// Waitlist entries for the same patient in the doctor's department are cleared.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<AppointmentReq>,
) -> ApiResult<(StatusCode, Json<AppointmentRes>)> {
    caller.require(Capability::ManageScheduling)?;
    let fields = Appointment::try_from(req)?;
    let record = state.store.lock().await.add_appointment(fields)?;
    Ok((StatusCode::CREATED, Json(AppointmentRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The appointment", body = AppointmentRes),
        (status = 404, description = "No such appointment", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<AppointmentRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(AppointmentRes::from(store.appointment(&id)?)))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = AppointmentReq,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentRes),
        (status = 404, description = "No such appointment", body = ErrorRes),
        (status = 409, description = "The new slot is already booked", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<AppointmentReq>,
) -> ApiResult<Json<AppointmentRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let fields = Appointment::try_from(req)?;
    let record = state.store.lock().await.edit_appointment(&id, fields)?;
    Ok(Json(AppointmentRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Appointment removed", body = AppointmentRes),
        (status = 404, description = "No such appointment", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<AppointmentRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_appointment(&id)?;
    Ok(Json(AppointmentRes::from(&record)))
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = CancelAppointmentReq,
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentRes),
        (status = 400, description = "Already cancelled", body = ErrorRes),
        (status = 404, description = "No such appointment", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Cancel an appointment, optionally queueing the patient on the department waitlist.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<CancelAppointmentReq>,
) -> ApiResult<Json<AppointmentRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let record = state
        .store
        .lock()
        .await
        .cancel_appointment(&id, req.enqueue_waitlist)?;
    Ok(Json(AppointmentRes::from(&record)))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}/status",
    params(("id" = String, Path, description = "Appointment id")),
    request_body = StatusReq,
    responses(
        (status = 200, description = "Status changed", body = AppointmentRes),
        (status = 400, description = "Unknown status", body = ErrorRes),
        (status = 409, description = "Reviving would take a booked slot", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn set_appointment_status(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<StatusReq>,
) -> ApiResult<Json<AppointmentRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let status: AppointmentStatus = req.parse()?;
    let record = state
        .store
        .lock()
        .await
        .set_appointment_status(&id, status)?;
    Ok(Json(AppointmentRes::from(&record)))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}/slots",
    params(("id" = String, Path, description = "Doctor id"), SlotsQuery),
    responses(
        (status = 200, description = "Free slot labels in template order", body = AvailableSlotsRes),
        (status = 400, description = "Malformed date", body = ErrorRes),
        (status = 404, description = "No such doctor", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Free slots of a doctor on a date: the template minus live bookings.
#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
    Query(query): Query<SlotsQuery>,
) -> ApiResult<Json<AvailableSlotsRes>> {
    let doctor_id = parse_id(&id)?;
    let date = parse_date(&query.date)?;
    let slots = state.store.lock().await.available_slots(&doctor_id, date)?;
    Ok(Json(AvailableSlotsRes {
        doctor_id: doctor_id.to_string(),
        date: date.to_string(),
        slots,
    }))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}/template",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "The doctor's slot template (empty if none)", body = SlotTemplateRes),
        (status = 404, description = "No such doctor", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_slot_template(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<SlotTemplateRes>> {
    let doctor_id = parse_id(&id)?;
    let store = state.store.lock().await;
    store.doctor(&doctor_id)?;
    let slots = store
        .slot_template(&doctor_id)
        .unwrap_or_default()
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(Json(SlotTemplateRes {
        doctor_id: doctor_id.to_string(),
        slots,
    }))
}

#[utoipa::path(
    put,
    path = "/doctors/{id}/template",
    params(("id" = String, Path, description = "Doctor id")),
    request_body = SlotTemplateReq,
    responses(
        (status = 200, description = "Template replaced", body = SlotTemplateRes),
        (status = 400, description = "Empty or duplicate labels", body = ErrorRes),
        (status = 404, description = "No such doctor", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn set_slot_template(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<SlotTemplateReq>,
) -> ApiResult<Json<SlotTemplateRes>> {
    caller.require(Capability::ManageScheduling)?;
    let doctor_id = parse_id(&id)?;
    let labels = req.labels()?;
    let slots = labels.iter().map(ToString::to_string).collect();
    state
        .store
        .lock()
        .await
        .set_slot_template(&doctor_id, labels)?;
    Ok(Json(SlotTemplateRes {
        doctor_id: doctor_id.to_string(),
        slots,
    }))
}
