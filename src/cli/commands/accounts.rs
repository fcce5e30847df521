use crate::users::{hasher::DEFAULT_COST, EmailCheck};
use anyhow::{anyhow, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";
pub const ARG_EMAIL_CHECK: &str = "email-check";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub bcrypt_cost: u32,
    pub email_check: EmailCheck,
}

impl Options {
    /// Parse account arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the email check mode is unknown.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let bcrypt_cost = matches
            .get_one::<u32>(ARG_BCRYPT_COST)
            .copied()
            .unwrap_or(DEFAULT_COST);

        let email_check = matches
            .get_one::<String>(ARG_EMAIL_CHECK)
            .map_or(Ok(EmailCheck::default()), |v| v.parse::<EmailCheck>())
            .map_err(|e| anyhow!(e))?;

        Ok(Self {
            bcrypt_cost,
            email_check,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt work factor for password hashes")
                .env("ENROLL_BCRYPT_COST")
                .default_value("14")
                .value_parser(clap::value_parser!(u32).range(4..=31)),
        )
        .arg(
            Arg::new(ARG_EMAIL_CHECK)
                .long(ARG_EMAIL_CHECK)
                .help("Format check applied by the email availability endpoint")
                .long_help(
                    "Format check applied by the email availability endpoint. `permissive` accepts any string, `strict` requires a name@domain.tld address.",
                )
                .env("ENROLL_EMAIL_CHECK")
                .default_value("permissive")
                .value_parser(["permissive", "strict"]),
        )
}
