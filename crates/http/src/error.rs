//! Maps module-level failures onto HTTP status codes: 400 for
//! validation/conflict, 404 for unknown lookups, 500 for internal/state
//! errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gostrike_core::permissions::{PermissionError, StoreError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] PermissionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            // A module-level validation error (name collision, unknown
            // role/player) surfaced through a mutation still reads as a
            // 400/404 to the caller, not a 500 — only an actual DB I/O
            // failure or a closed store is internal.
            ApiError::Internal(PermissionError::Store(StoreError::RoleNameConflict(name))) => {
                (StatusCode::BAD_REQUEST, format!("role {name:?} already exists"))
            }
            ApiError::Internal(PermissionError::Store(StoreError::RoleNotFound(id))) => {
                (StatusCode::NOT_FOUND, format!("role {id} not found"))
            }
            ApiError::Internal(PermissionError::Store(StoreError::PlayerNotFound(steam_id))) => {
                (StatusCode::NOT_FOUND, format!("player {steam_id} not found"))
            }
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn role_name_conflict_is_bad_request_not_internal() {
        let err = ApiError::Internal(PermissionError::Store(StoreError::RoleNameConflict("admin".to_string())));
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn role_not_found_is_404() {
        let err = ApiError::Internal(PermissionError::Store(StoreError::RoleNotFound(7)));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn player_not_found_is_404() {
        let err = ApiError::Internal(PermissionError::Store(StoreError::PlayerNotFound(42)));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn closed_store_is_internal_error() {
        let err = ApiError::Internal(PermissionError::Closed);
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
