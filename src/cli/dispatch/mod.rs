use crate::cli::{
    actions::{server::Args, Action},
    commands::{self, accounts, onboarding, storage},
};
use anyhow::{Context, Result};
use std::time::Duration;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(8001);
    let allowed_origin = matches
        .get_one::<String>(commands::ARG_ALLOWED_ORIGIN)
        .filter(|v| !v.trim().is_empty())
        .cloned();
    let request_timeout = matches
        .get_one::<u64>(commands::ARG_REQUEST_TIMEOUT)
        .copied()
        .map(Duration::from_secs)
        .context("missing required argument: --request-timeout")?;

    Ok(Action::Server(Args {
        port,
        allowed_origin,
        request_timeout,
        storage: storage::Options::parse(matches)?,
        accounts: accounts::Options::parse(matches)?,
        onboarding: onboarding::Options::parse(matches),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::Backend;

    #[test]
    fn test_handler_builds_server_action() {
        temp_env::with_vars(
            [
                ("ENROLL_STORAGE", None::<&str>),
                ("ENROLL_ALLOWED_ORIGIN", None),
                ("ENROLL_CONSUME_CODE_ON_SUCCESS", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "enroll",
                    "--port",
                    "9000",
                    "--request-timeout",
                    "5",
                    "--consume-code-on-success",
                ]);

                let Action::Server(args) = handler(&matches).unwrap();
                assert_eq!(args.port, 9000);
                assert_eq!(args.request_timeout, Duration::from_secs(5));
                assert!(args.allowed_origin.is_none());
                assert_eq!(args.storage.backend, Backend::Memory);
                assert!(args.onboarding.consume_code_on_success);
            },
        );
    }
}
