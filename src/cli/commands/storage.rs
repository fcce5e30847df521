use crate::storage::Backend;
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use std::path::PathBuf;

pub const ARG_STORAGE: &str = "storage";
pub const ARG_CSV_PATH: &str = "csv-path";
pub const ARG_DSN: &str = "dsn";

#[derive(Debug)]
pub struct Options {
    pub backend: Backend,
    pub csv_path: Option<PathBuf>,
    pub dsn: Option<SecretString>,
}

impl Options {
    /// Parse storage arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the backend is unknown or its location is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let backend = matches
            .get_one::<String>(ARG_STORAGE)
            .context("missing required argument: --storage")?
            .parse::<Backend>()
            .map_err(|e| anyhow!(e))?;

        let csv_path = matches
            .get_one::<String>(ARG_CSV_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let dsn = matches
            .get_one::<String>(ARG_DSN)
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::from(v.clone()));

        match backend {
            Backend::Csv if csv_path.is_none() => {
                return Err(anyhow!("missing required argument: --{ARG_CSV_PATH}"));
            }
            Backend::Postgres if dsn.is_none() => {
                return Err(anyhow!("missing required argument: --{ARG_DSN}"));
            }
            _ => {}
        }

        Ok(Self {
            backend,
            csv_path,
            dsn,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_STORAGE)
                .long(ARG_STORAGE)
                .help("Storage backend for user records")
                .env("ENROLL_STORAGE")
                .default_value("memory")
                .value_parser(["memory", "csv", "postgres"]),
        )
        .arg(
            Arg::new(ARG_CSV_PATH)
                .long(ARG_CSV_PATH)
                .help("Path of the CSV file used by the csv backend")
                .env("ENROLL_CSV_PATH")
                .required_if_eq(ARG_STORAGE, "csv"),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string used by the postgres backend")
                .env("ENROLL_DSN")
                .required_if_eq(ARG_STORAGE, "postgres"),
        )
}
