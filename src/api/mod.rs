use crate::{onboarding::Onboarding, users::Registrar};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    routing::{get, post},
    Extension, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
mod openapi;

pub use openapi::openapi;

use handlers::{health, onboarding, users};

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_origin: Option<String>,
    pub request_timeout: Duration,
}

/// Routes and shared services, without transport middleware.
#[must_use]
pub fn router(registrar: Arc<Registrar>, onboarding: Arc<Onboarding>) -> Router {
    Router::new()
        .route("/health", get(health::health).options(health::health))
        .route("/api/users", post(users::create_user))
        .route("/api/users/email_available", get(users::email_available))
        .route(
            "/api/onboarding/begin_verification",
            get(onboarding::begin_verification),
        )
        .route("/api/onboarding/verify_code", post(onboarding::verify_code))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .layer(Extension(registrar))
        .layer(Extension(onboarding))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    config: ServerConfig,
    registrar: Arc<Registrar>,
    onboarding: Arc<Onboarding>,
) -> Result<()> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(allow_origin(config.allowed_origin.as_deref())?);

    let app = router(registrar, onboarding).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(TimeoutLayer::new(config.request_timeout))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{}", config.port)).await?;

    info!("Listening on [::]:{}", config.port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Exact CORS origin from a base URL, or any origin when unset.
fn allow_origin(allowed_origin: Option<&str>) -> Result<AllowOrigin> {
    let Some(base_url) = allowed_origin else {
        return Ok(AllowOrigin::any());
    };

    let parsed =
        Url::parse(base_url).with_context(|| format!("Invalid allowed origin: {base_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Allowed origin must include a valid host: {base_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    let value = HeaderValue::from_str(&origin).context("Failed to build origin header")?;

    Ok(AllowOrigin::exact(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_origin_rejects_garbage() {
        assert!(allow_origin(Some("not a url")).is_err());
        assert!(allow_origin(Some("mailto:ops@example.com")).is_err());
    }

    #[test]
    fn allow_origin_accepts_url_and_none() {
        assert!(allow_origin(None).is_ok());
        assert!(allow_origin(Some("https://app.example.com:8443/path")).is_ok());
    }
}
