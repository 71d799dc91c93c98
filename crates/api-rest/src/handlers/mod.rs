//! Route handlers, one module per area of the dashboard.

pub mod appointments;
pub mod community;
pub mod dashboard;
pub mod directory;
pub mod queues;

use crate::AppState;
use api_shared::{HealthRes, HealthService};
use axum::extract::State;
use axum::response::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Open to unauthenticated callers so load balancers can probe it.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}
