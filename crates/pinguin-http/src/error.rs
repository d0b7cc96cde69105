use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinguin_store::StoreError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A facade-level error, carrying the HTTP status it should render as.
/// Built from a `StoreError` (404/409/400) or raised directly by the
/// session/tenant-admin extractors (401/403).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "missing or invalid session".into(),
        }
    }

    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "not an admin of this tenant".into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::NotEditable(_) => StatusCode::CONFLICT,
            StoreError::InPast | StoreError::Invalid(_) | StoreError::DuplicateId(_) => {
                StatusCode::BAD_REQUEST
            }
            StoreError::StaleClaim | StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_editable_maps_to_conflict() {
        let api_error: ApiError = StoreError::NotEditable("n1".into()).into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_maps_to_404() {
        let api_error: ApiError = StoreError::NotFound("n1".into()).into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn in_past_maps_to_400() {
        let api_error: ApiError = StoreError::InPast.into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
    }
}
