use crate::{
    api::{self, ServerConfig},
    cli::commands::{accounts, onboarding, storage},
    onboarding::{LogCodeSender, MemoryCodeStore, Onboarding},
    storage::{Backend, CsvFileStorage, MemoryStorage, PostgresStorage, UserStorage},
    users::{PasswordHasher, Registrar},
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub allowed_origin: Option<String>,
    pub request_timeout: Duration,
    pub storage: storage::Options,
    pub accounts: accounts::Options,
    pub onboarding: onboarding::Options,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the storage backend cannot be opened or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let user_storage = open_storage(&args.storage).await?;
    let hasher = PasswordHasher::new(args.accounts.bcrypt_cost)?;

    let registrar =
        Registrar::new(user_storage, hasher).with_email_check(args.accounts.email_check);
    let onboarding = Onboarding::new(
        Arc::new(MemoryCodeStore::new()),
        Arc::new(LogCodeSender),
    )
    .with_consume_on_success(args.onboarding.consume_code_on_success);

    let config = ServerConfig {
        port: args.port,
        allowed_origin: args.allowed_origin,
        request_timeout: args.request_timeout,
    };

    api::new(config, Arc::new(registrar), Arc::new(onboarding)).await
}

async fn open_storage(options: &storage::Options) -> Result<Arc<dyn UserStorage>> {
    let user_storage: Arc<dyn UserStorage> = match options.backend {
        Backend::Memory => Arc::new(MemoryStorage::new()),
        Backend::Csv => {
            let path = options
                .csv_path
                .clone()
                .context("missing required argument: --csv-path")?;
            Arc::new(
                CsvFileStorage::open(path.clone())
                    .with_context(|| format!("Could not open {}", path.display()))?,
            )
        }
        Backend::Postgres => {
            let dsn = options
                .dsn
                .as_ref()
                .context("missing required argument: --dsn")?;
            Arc::new(
                PostgresStorage::connect(dsn.expose_secret())
                    .await
                    .context("Could not connect to the database")?,
            )
        }
    };

    Ok(user_storage)
}

fn log_startup_args(args: &Args) {
    let location = match args.storage.backend {
        Backend::Memory => "n/a".to_string(),
        Backend::Csv => args
            .storage
            .csv_path
            .as_ref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string()),
        Backend::Postgres => args
            .storage
            .dsn
            .as_ref()
            .map_or_else(|| "none".to_string(), |dsn| redact_dsn(dsn.expose_secret())),
    };
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("storage", args.storage.backend.to_string()),
        ("location", location),
        ("bcrypt_cost", args.accounts.bcrypt_cost.to_string()),
        ("email_check", args.accounts.email_check.to_string()),
        (
            "consume_code_on_success",
            args.onboarding.consume_code_on_success.to_string(),
        ),
        (
            "allowed_origin",
            args.allowed_origin
                .clone()
                .unwrap_or_else(|| "*".to_string()),
        ),
        (
            "request_timeout",
            format!("{}s", args.request_timeout.as_secs()),
        ),
    ];
    log_entries("Startup configuration", &entries);
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn log_entries(title: &str, entries: &[(&str, String)]) {
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\n{title}:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
