use super::EmailQuery;
use crate::{
    api::error::{ApiError, Message, ValidationErrors},
    users::{Availability, Registrar, RegistrationError, SignupRequest},
};
use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

pub const ACCOUNT_CREATED: &str = "Your account has been successfully created.";
pub const NOT_JSON: &str = "The data you sent is not json formatted.";

#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
pub struct EmailAvailable {
    valid: bool,
    msg: String,
    taken: bool,
}

impl From<Availability> for EmailAvailable {
    fn from(availability: Availability) -> Self {
        let (valid, msg, taken) = match availability {
            Availability::Invalid => (false, "This email is invalid.", false),
            Availability::Taken => (false, "Email has already been taken.", true),
            Availability::Available => (true, "Available!", false),
        };

        Self {
            valid,
            msg: msg.to_string(),
            taken,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = Message),
        (status = 400, description = "Malformed JSON or field validation errors", body = ValidationErrors),
        (status = 500, description = "Hashing or storage failure", body = Message),
    ),
    tag = "users"
)]
#[instrument(skip(registrar, body))]
pub async fn create_user(
    registrar: Extension<Arc<Registrar>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    // decoded whatever the Content-Type says
    let request: SignupRequest = serde_json::from_slice(&body).map_err(|err| {
        debug!("Failed to decode signup body: {}", err);
        ApiError::BadRequest(NOT_JSON.to_string())
    })?;

    let registration = request.validate().map_err(ApiError::Validation)?;
    let email = registration.email.clone();

    registrar.register(registration).await.map_err(|err| {
        let operation = match err {
            RegistrationError::Hashing(_) => "hash_password",
            RegistrationError::Storage(_) => "create_user",
        };
        error!(operation, email = %email, error = %err, "Failed to create user");
        ApiError::Internal
    })?;

    Ok((
        StatusCode::CREATED,
        Json(Message::new(StatusCode::CREATED, ACCOUNT_CREATED)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/email_available",
    params(EmailQuery),
    responses(
        (status = 200, description = "Availability of the email", body = EmailAvailable),
        (status = 500, description = "Storage lookup failure", body = Message),
    ),
    tag = "users"
)]
#[instrument(skip(registrar))]
pub async fn email_available(
    registrar: Extension<Arc<Registrar>>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<EmailAvailable>, ApiError> {
    let availability = registrar
        .check_email_available(&query.email)
        .await
        .map_err(|err| {
            error!(operation = "get_user_by_email", email = %query.email, error = %err, "Failed to look up user");
            ApiError::Internal
        })?;

    Ok(Json(availability.into()))
}
