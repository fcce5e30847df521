//! API handlers for the onboarding service.
//!
//! Handlers only translate between HTTP and the domain services; validation,
//! hashing, storage and code bookkeeping live in [`crate::users`] and
//! [`crate::onboarding`].

pub mod health;
pub mod onboarding;
pub mod users;

use serde::Deserialize;
use utoipa::IntoParams;

/// `?email=` query string; a missing parameter reads as the empty string.
#[derive(IntoParams, Deserialize, Debug, Default)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    pub email: String,
}
