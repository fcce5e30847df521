use super::{
    error::{Message, ValidationErrors},
    handlers::{
        health,
        onboarding::{self, CodeCheck, VerifyCodeRequest},
        users::{self, EmailAvailable},
    },
};
use crate::users::SignupRequest;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::create_user,
        users::email_available,
        onboarding::begin_verification,
        onboarding::verify_code,
    ),
    components(schemas(
        health::Health,
        SignupRequest,
        Message,
        ValidationErrors,
        EmailAvailable,
        VerifyCodeRequest,
        CodeCheck,
    )),
    tags(
        (name = "users", description = "Signup and email availability"),
        (name = "onboarding", description = "Email verification codes"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// `OpenAPI` document for every routed endpoint.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
