use super::EmailQuery;
use crate::{
    api::error::{ApiError, Message},
    onboarding::{Onboarding, VerifyOutcome},
};
use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

pub const NOT_JSON: &str = "The data you sent is not valid json format.";
pub const NO_CODE: &str = "This email has no verification code. Try signing up again";

#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(default)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(ToSchema, Serialize, Debug, PartialEq, Eq)]
pub struct CodeCheck {
    valid: bool,
    msg: String,
}

impl CodeCheck {
    fn new(valid: bool, msg: &str) -> Self {
        Self {
            valid,
            msg: msg.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/onboarding/begin_verification",
    params(EmailQuery),
    responses(
        (status = 204, description = "Code issued and delivered out of band"),
        (status = 500, description = "Code could not be stored", body = Message),
    ),
    tag = "onboarding"
)]
#[instrument(skip(onboarding))]
pub async fn begin_verification(
    onboarding: Extension<Arc<Onboarding>>,
    Query(query): Query<EmailQuery>,
) -> Result<StatusCode, ApiError> {
    onboarding
        .begin_verification(&query.email)
        .map_err(|err| {
            error!(operation = "save_code", email = %query.email, error = %err, "Failed to save verification code");
            ApiError::Internal
        })?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/onboarding/verify_code",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Whether the code matched", body = CodeCheck),
        (status = 400, description = "Malformed JSON or no pending code", body = Message),
        (status = 500, description = "Code store failure", body = Message),
    ),
    tag = "onboarding"
)]
#[instrument(skip(onboarding, body))]
pub async fn verify_code(
    onboarding: Extension<Arc<Onboarding>>,
    body: Bytes,
) -> Result<Json<CodeCheck>, ApiError> {
    let request: VerifyCodeRequest = serde_json::from_slice(&body).map_err(|err| {
        debug!("Failed to decode verify_code body: {}", err);
        ApiError::BadRequest(NOT_JSON.to_string())
    })?;

    let outcome = onboarding
        .verify_code(&request.email, &request.code)
        .map_err(|err| {
            error!(operation = "get_code", email = %request.email, error = %err, "Failed to get verification code");
            ApiError::Internal
        })?;

    match outcome {
        VerifyOutcome::NoCode => Err(ApiError::BadRequest(NO_CODE.to_string())),
        VerifyOutcome::Mismatch => Ok(Json(CodeCheck::new(false, "Wrong code"))),
        VerifyOutcome::Matched => Ok(Json(CodeCheck::new(true, "Good code"))),
    }
}
