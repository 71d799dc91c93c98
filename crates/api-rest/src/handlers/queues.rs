//! Waitlist and transfer requests.

use crate::{ApiResult, AppState, Caller};
use api_shared::{
    parse_id, AppointmentRes, AssignTransferReq, ErrorRes, FillWaitlistReq, ListTransfersRes,
    ListWaitlistRes, StatusReq, TransferReq, TransferRes, WaitlistReq, WaitlistRes,
};
use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
};
use hms_core::{Capability, TransferRequest, TransferStatus, WaitlistEntry};

#[utoipa::path(
    get,
    path = "/waitlist",
    responses(
        (status = 200, description = "Waitlist, newest first", body = ListWaitlistRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn list_waitlist(
    State(state): State<AppState>,
    _caller: Caller,
) -> ApiResult<Json<ListWaitlistRes>> {
    let store = state.store.lock().await;
    let entries = store.waitlist().iter().map(WaitlistRes::from).collect();
    Ok(Json(ListWaitlistRes { entries }))
}

#[utoipa::path(
    post,
    path = "/waitlist",
    request_body = WaitlistReq,
    responses(
        (status = 201, description = "Entry queued", body = WaitlistRes),
        (status = 400, description = "Invalid fields or unknown patient", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn create_waitlist_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<WaitlistReq>,
) -> ApiResult<(StatusCode, Json<WaitlistRes>)> {
    caller.require(Capability::ManageScheduling)?;
    let fields = WaitlistEntry::try_from(req)?;
    let record = state.store.lock().await.add_waitlist_entry(fields)?;
    Ok((StatusCode::CREATED, Json(WaitlistRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/waitlist/{id}",
    params(("id" = String, Path, description = "Waitlist entry id")),
    responses(
        (status = 200, description = "The entry", body = WaitlistRes),
        (status = 404, description = "No such entry", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_waitlist_entry(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<WaitlistRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(WaitlistRes::from(store.waitlist_entry(&id)?)))
}

#[utoipa::path(
    put,
    path = "/waitlist/{id}",
    params(("id" = String, Path, description = "Waitlist entry id")),
    request_body = WaitlistReq,
    responses(
        (status = 200, description = "Entry updated", body = WaitlistRes),
        (status = 404, description = "No such entry", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn update_waitlist_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<WaitlistReq>,
) -> ApiResult<Json<WaitlistRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let fields = WaitlistEntry::try_from(req)?;
    let record = state.store.lock().await.edit_waitlist_entry(&id, fields)?;
    Ok(Json(WaitlistRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/waitlist/{id}",
    params(("id" = String, Path, description = "Waitlist entry id")),
    responses(
        (status = 200, description = "Entry dismissed", body = WaitlistRes),
        (status = 404, description = "No such entry", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_waitlist_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<WaitlistRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_waitlist_entry(&id)?;
    Ok(Json(WaitlistRes::from(&record)))
}

#[utoipa::path(
    post,
    path = "/waitlist/{id}/fill",
    params(("id" = String, Path, description = "Waitlist entry id")),
    request_body = FillWaitlistReq,
    responses(
        (status = 201, description = "Appointment booked and entry removed", body = AppointmentRes),
        (status = 404, description = "No such entry", body = ErrorRes),
        (status = 409, description = "The slot is already booked; the entry stays queued", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Book the waitlisted patient into a slot.
#[axum::debug_handler]
pub async fn fill_waitlist_entry(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<FillWaitlistReq>,
) -> ApiResult<(StatusCode, Json<AppointmentRes>)> {
    caller.require(Capability::ManageScheduling)?;
    let entry_id = parse_id(&id)?;
    let (doctor_id, date, time) = req.parts()?;
    let record = state
        .store
        .lock()
        .await
        .fill_from_waitlist(&entry_id, &doctor_id, date, time)?;
    Ok((StatusCode::CREATED, Json(AppointmentRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/transfers",
    responses(
        (status = 200, description = "Transfer requests, newest first", body = ListTransfersRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn list_transfers(
    State(state): State<AppState>,
    _caller: Caller,
) -> ApiResult<Json<ListTransfersRes>> {
    let store = state.store.lock().await;
    let transfers = store.transfers().iter().map(TransferRes::from).collect();
    Ok(Json(ListTransfersRes { transfers }))
}

#[utoipa::path(
    post,
    path = "/transfers",
    request_body = TransferReq,
    responses(
        (status = 201, description = "Transfer queued as Pending", body = TransferRes),
        (status = 400, description = "Invalid fields or unknown patient", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn create_transfer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<TransferReq>,
) -> ApiResult<(StatusCode, Json<TransferRes>)> {
    caller.require(Capability::ManageScheduling)?;
    let fields = TransferRequest::try_from(req)?;
    let record = state.store.lock().await.add_transfer(fields)?;
    Ok((StatusCode::CREATED, Json(TransferRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/transfers/{id}",
    params(("id" = String, Path, description = "Transfer request id")),
    responses(
        (status = 200, description = "The transfer request", body = TransferRes),
        (status = 404, description = "No such transfer", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_transfer(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<TransferRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(TransferRes::from(store.transfer(&id)?)))
}

#[utoipa::path(
    put,
    path = "/transfers/{id}",
    params(("id" = String, Path, description = "Transfer request id")),
    request_body = TransferReq,
    responses(
        (status = 200, description = "Transfer updated", body = TransferRes),
        (status = 400, description = "Invalid fields or unknown reference", body = ErrorRes),
        (status = 404, description = "No such transfer", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn update_transfer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<TransferReq>,
) -> ApiResult<Json<TransferRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let fields = TransferRequest::try_from(req)?;
    let record = state.store.lock().await.edit_transfer(&id, fields)?;
    Ok(Json(TransferRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/transfers/{id}",
    params(("id" = String, Path, description = "Transfer request id")),
    responses(
        (status = 200, description = "Transfer removed", body = TransferRes),
        (status = 404, description = "No such transfer", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_transfer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<TransferRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_transfer(&id)?;
    Ok(Json(TransferRes::from(&record)))
}

#[utoipa::path(
    post,
    path = "/transfers/{id}/assign",
    params(("id" = String, Path, description = "Transfer request id")),
    request_body = AssignTransferReq,
    responses(
        (status = 200, description = "Doctor assigned", body = TransferRes),
        (status = 400, description = "Unknown doctor or doctor outside the target department", body = ErrorRes),
        (status = 404, description = "No such transfer", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Assign a receiving doctor from the target department. `Pending` becomes `Assigned`.
#[axum::debug_handler]
pub async fn assign_transfer(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<AssignTransferReq>,
) -> ApiResult<Json<TransferRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let doctor_id = parse_id(&req.doctor_id)?;
    let record = state
        .store
        .lock()
        .await
        .assign_transfer_doctor(&id, &doctor_id)?;
    Ok(Json(TransferRes::from(&record)))
}

#[utoipa::path(
    put,
    path = "/transfers/{id}/status",
    params(("id" = String, Path, description = "Transfer request id")),
    request_body = StatusReq,
    responses(
        (status = 200, description = "Status changed", body = TransferRes),
        (status = 400, description = "Unknown status", body = ErrorRes),
        (status = 404, description = "No such transfer", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn set_transfer_status(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<StatusReq>,
) -> ApiResult<Json<TransferRes>> {
    caller.require(Capability::ManageScheduling)?;
    let id = parse_id(&id)?;
    let status: TransferStatus = req.parse()?;
    let record = state.store.lock().await.set_transfer_status(&id, status)?;
    Ok(Json(TransferRes::from(&record)))
}
