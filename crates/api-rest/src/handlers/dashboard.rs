use crate::{ApiResult, AppState, Caller};
use api_shared::{DashboardQuery, DashboardRes, ErrorRes};
use axum::{
    extract::{Query, State},
    response::Json,
};
use hms_core::constants::UTILIZATION_DAYS;
use hms_core::dashboard::summarize;

#[utoipa::path(
    get,
    path = "/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "KPIs, department breakdown, visits and utilisation", body = DashboardRes),
        (status = 400, description = "Unknown window, malformed date or horizon over the maximum", body = ErrorRes)
    ),
    security(("api_key" = []))
)]
/// Dashboard summary for a time window.
///
/// `today` defaults to the server's local date; the window defaults to the last 7 days.
#[axum::debug_handler]
pub async fn dashboard(
    State(state): State<AppState>,
    _caller: Caller,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardRes>> {
    let window = query.window()?;
    let today = query
        .today()?
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let days = query.days.unwrap_or(UTILIZATION_DAYS);
    let filter = query.doctor_filter();

    let store = state.store.lock().await;
    let summary = summarize(&store, today, window, &filter, days)?;
    Ok(Json(DashboardRes::from(&summary)))
}
