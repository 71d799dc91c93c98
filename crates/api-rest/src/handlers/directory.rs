//! Patients, doctors and nurses.

use crate::{ApiResult, AppState, Caller};
use api_shared::{
    parse_id, DoctorFilterQuery, DoctorReq, DoctorRes, ErrorRes, ListDoctorsRes, ListNursesRes,
    ListPatientsRes, NurseReq, NurseRes, PatientReq, PatientRes, SearchQuery,
};
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
};
use hms_core::dashboard::DoctorFilter;
use hms_core::{queries, Capability, Doctor, Nurse, Patient};

#[utoipa::path(
    get,
    path = "/patients",
    params(SearchQuery),
    responses(
        (status = 200, description = "Patients matching the search", body = ListPatientsRes),
        (status = 401, description = "Missing or invalid API key", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// List patients, optionally filtered by `q` on name or id.
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ListPatientsRes>> {
    let store = state.store.lock().await;
    let patients = queries::search_patients(&store, query.text())
        .into_iter()
        .map(PatientRes::from)
        .collect();
    Ok(Json(ListPatientsRes { patients }))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = PatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientRes),
        (status = 400, description = "Invalid fields or unknown doctor/nurse", body = ErrorRes),
        (status = 403, description = "Role may not manage the directory", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<PatientReq>,
) -> ApiResult<(StatusCode, Json<PatientRes>)> {
    caller.require(Capability::ManageDirectory)?;
    let fields = Patient::try_from(req)?;
    let record = state.store.lock().await.add_patient(fields)?;
    Ok((StatusCode::CREATED, Json(PatientRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient", body = PatientRes),
        (status = 404, description = "No such patient", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<PatientRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(PatientRes::from(store.patient(&id)?)))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    request_body = PatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientRes),
        (status = 400, description = "Invalid fields or unknown doctor/nurse", body = ErrorRes),
        (status = 404, description = "No such patient", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<PatientReq>,
) -> ApiResult<Json<PatientRes>> {
    caller.require(Capability::ManageDirectory)?;
    let id = parse_id(&id)?;
    let fields = Patient::try_from(req)?;
    let record = state.store.lock().await.edit_patient(&id, fields)?;
    Ok(Json(PatientRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Patient and their appointments and waitlist entries removed", body = PatientRes),
        (status = 404, description = "No such patient", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Delete a patient together with their appointments and waitlist entries.
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<PatientRes>> {
    caller.require(Capability::ManageDirectory)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_patient(&id)?;
    Ok(Json(PatientRes::from(&record)))
}

#[utoipa::path(
    get,
    path = "/doctors",
    params(DoctorFilterQuery),
    responses(
        (status = 200, description = "Doctors matching the filter", body = ListDoctorsRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<DoctorFilterQuery>,
) -> ApiResult<Json<ListDoctorsRes>> {
    let filter = DoctorFilter::from(query);
    let store = state.store.lock().await;
    let doctors = queries::filter_doctors(&store, &filter)
        .into_iter()
        .map(DoctorRes::from)
        .collect();
    Ok(Json(ListDoctorsRes { doctors }))
}

#[utoipa::path(
    post,
    path = "/doctors",
    request_body = DoctorReq,
    responses(
        (status = 201, description = "Doctor created", body = DoctorRes),
        (status = 400, description = "Invalid fields", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<DoctorReq>,
) -> ApiResult<(StatusCode, Json<DoctorRes>)> {
    caller.require(Capability::ManageDirectory)?;
    let fields = Doctor::try_from(req)?;
    let record = state.store.lock().await.add_doctor(fields)?;
    Ok((StatusCode::CREATED, Json(DoctorRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "The doctor", body = DoctorRes),
        (status = 404, description = "No such doctor", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<DoctorRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(DoctorRes::from(store.doctor(&id)?)))
}

#[utoipa::path(
    put,
    path = "/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    request_body = DoctorReq,
    responses(
        (status = 200, description = "Doctor updated", body = DoctorRes),
        (status = 404, description = "No such doctor", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<DoctorReq>,
) -> ApiResult<Json<DoctorRes>> {
    caller.require(Capability::ManageDirectory)?;
    let id = parse_id(&id)?;
    let fields = Doctor::try_from(req)?;
    let record = state.store.lock().await.edit_doctor(&id, fields)?;
    Ok(Json(DoctorRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor removed", body = DoctorRes),
        (status = 404, description = "No such doctor", body = ErrorRes),
        (status = 409, description = "Patients or appointments still reference the doctor", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<DoctorRes>> {
    caller.require(Capability::ManageDirectory)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_doctor(&id)?;
    Ok(Json(DoctorRes::from(&record)))
}

#[utoipa::path(
    get,
    path = "/nurses",
    responses(
        (status = 200, description = "All nurses", body = ListNursesRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn list_nurses(
    State(state): State<AppState>,
    _caller: Caller,
) -> ApiResult<Json<ListNursesRes>> {
    let store = state.store.lock().await;
    let nurses = store.nurses().iter().map(NurseRes::from).collect();
    Ok(Json(ListNursesRes { nurses }))
}

#[utoipa::path(
    post,
    path = "/nurses",
    request_body = NurseReq,
    responses(
        (status = 201, description = "Nurse created", body = NurseRes),
        (status = 400, description = "Invalid fields", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn create_nurse(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(req): Json<NurseReq>,
) -> ApiResult<(StatusCode, Json<NurseRes>)> {
    caller.require(Capability::ManageDirectory)?;
    let fields = Nurse::try_from(req)?;
    let record = state.store.lock().await.add_nurse(fields)?;
    Ok((StatusCode::CREATED, Json(NurseRes::from(&record))))
}

#[utoipa::path(
    get,
    path = "/nurses/{id}",
    params(("id" = String, Path, description = "Nurse id")),
    responses(
        (status = 200, description = "The nurse", body = NurseRes),
        (status = 404, description = "No such nurse", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn get_nurse(
    State(state): State<AppState>,
    _caller: Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<NurseRes>> {
    let id = parse_id(&id)?;
    let store = state.store.lock().await;
    Ok(Json(NurseRes::from(store.nurse(&id)?)))
}

#[utoipa::path(
    put,
    path = "/nurses/{id}",
    params(("id" = String, Path, description = "Nurse id")),
    request_body = NurseReq,
    responses(
        (status = 200, description = "Nurse updated", body = NurseRes),
        (status = 404, description = "No such nurse", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn update_nurse(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<NurseReq>,
) -> ApiResult<Json<NurseRes>> {
    caller.require(Capability::ManageDirectory)?;
    let id = parse_id(&id)?;
    let fields = Nurse::try_from(req)?;
    let record = state.store.lock().await.edit_nurse(&id, fields)?;
    Ok(Json(NurseRes::from(&record)))
}

#[utoipa::path(
    delete,
    path = "/nurses/{id}",
    params(("id" = String, Path, description = "Nurse id")),
    responses(
        (status = 200, description = "Nurse removed", body = NurseRes),
        (status = 409, description = "Patients still reference the nurse", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
#[axum::debug_handler]
pub async fn delete_nurse(
    State(state): State<AppState>,
    Caller(caller): Caller,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<NurseRes>> {
    caller.require(Capability::ManageDirectory)?;
    let id = parse_id(&id)?;
    let record = state.store.lock().await.delete_nurse(&id)?;
    Ok(Json(NurseRes::from(&record)))
}
