//! HTTP error mapping for the REST surface.

use api_shared::{AuthError, ErrorRes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hms_core::StoreError;

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::NotConfigured | AuthError::DuplicateKey) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Store(err) => match err {
                StoreError::InvalidInput(_)
                | StoreError::Text(_)
                | StoreError::Id(_)
                | StoreError::UnknownReference { .. } => StatusCode::BAD_REQUEST,
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::SlotTaken { .. } | StoreError::HasDependents { .. } => {
                    StatusCode::CONFLICT
                }
                StoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
                StoreError::DataDirCreation(_)
                | StoreError::StorageRead { .. }
                | StoreError::StorageWrite { .. }
                | StoreError::Serialization { .. }
                | StoreError::RollbackFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal error".to_owned()
        } else {
            self.to_string()
        };
        (status, Json(ErrorRes { error })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use hms_core::{EntityId, EntityKind};

    #[test]
    fn test_store_errors_map_to_statuses() {
        let id = EntityId::parse("D-001").unwrap();
        let cases = [
            (
                StoreError::InvalidInput("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::UnknownReference {
                    kind: EntityKind::Doctor,
                    id: id.clone(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                StoreError::NotFound {
                    kind: EntityKind::Doctor,
                    id: id.clone(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                StoreError::HasDependents {
                    kind: EntityKind::Doctor,
                    id,
                    patients: 1,
                    appointments: 0,
                },
                StatusCode::CONFLICT,
            ),
            (
                StoreError::Forbidden {
                    role: hms_core::Role::Clerk,
                    capability: hms_core::Capability::Publish,
                },
                StatusCode::FORBIDDEN,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(
            ApiError::from(AuthError::MissingKey).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidKey).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_storage_failure_hides_details() {
        let err = ApiError::from(StoreError::StorageWrite {
            key: "patients".into(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
