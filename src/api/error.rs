//! Mapping of domain outcomes to HTTP error responses.

use crate::users::FieldErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub const INTERNAL_ERROR_MESSAGE: &str = "Sorry, we are having a problem... retry later!";

/// `{code, message}` body shared by success and error responses.
#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub code: u16,
    pub message: String,
}

impl Message {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// `{code, errors}` body for field validation failures.
#[derive(ToSchema, Serialize, Debug)]
pub struct ValidationErrors {
    pub code: u16,
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation failed")]
    Validation(FieldErrors),
    /// Details are logged where the failure happens and never sent to the client.
    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(Message::new(StatusCode::BAD_REQUEST, message)),
            )
                .into_response(),
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrors {
                    code: StatusCode::BAD_REQUEST.as_u16(),
                    errors,
                }),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Message::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE,
                )),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let response = ApiError::Internal.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"code": 500, "message": INTERNAL_ERROR_MESSAGE})
        );
    }

    #[tokio::test]
    async fn validation_error_lists_fields() {
        let mut errors = FieldErrors::default();
        errors.add("password", "min");
        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"code": 400, "errors": {"password": "min"}})
        );
    }

    #[tokio::test]
    async fn bad_request_carries_message() {
        let response = ApiError::BadRequest("nope".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"code": 400, "message": "nope"})
        );
    }
}
