//! Caller identity for REST handlers.

use crate::error::ApiError;
use crate::AppState;
use api_shared::API_KEY_HEADER;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hms_core::Identity;

/// The authenticated caller, resolved from the `x-api-key` header.
///
/// Every handler except `/health` takes a `Caller`, so an unauthenticated request never reaches
/// the store.
#[derive(Clone, Debug)]
pub struct Caller(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        let identity = state.auth.authenticate(key)?;
        tracing::debug!(subject = %identity.subject, "caller authenticated");
        Ok(Caller(identity))
    }
}
