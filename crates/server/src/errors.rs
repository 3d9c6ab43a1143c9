use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::ErrorBody;
use models::errors::ModelError;
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// Error response rendered as `{ "code": ..., "message": ... }`.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct JsonApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NotFound", message)
    }

    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "InvalidContent", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal", message)
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::InvalidArgument(msg) => Self::new(StatusCode::BAD_REQUEST, "InvalidArgument", msg),
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => Self::invalid_content(msg),
            ServiceError::Storage(msg) | ServiceError::Model(ModelError::Db(msg)) => {
                error!(error = %msg, "storage operation failed");
                Self::internal(msg)
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.code.to_string(), message: self.message };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_codes() {
        let cases = [
            (ServiceError::invalid_id("x"), StatusCode::BAD_REQUEST, "InvalidArgument"),
            (ServiceError::Validation("status".into()), StatusCode::BAD_REQUEST, "InvalidContent"),
            (ServiceError::Storage("down".into()), StatusCode::INTERNAL_SERVER_ERROR, "Internal"),
            (ServiceError::Model(ModelError::Db("gone".into())), StatusCode::INTERNAL_SERVER_ERROR, "Internal"),
        ];
        for (err, status, code) in cases {
            let api = JsonApiError::from(err);
            assert_eq!((api.status, api.code), (status, code));
        }
    }
}
