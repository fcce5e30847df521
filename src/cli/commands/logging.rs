use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `ENROLL_LOG_LEVEL`, indexed by verbosity count.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn parse_level(level: &str) -> Result<u8, String> {
    if let Ok(count) = level.parse::<u8>() {
        if usize::from(count) < LEVELS.len() {
            return Ok(count);
        }
    }

    let level = level.trim().to_lowercase();
    LEVELS
        .iter()
        .position(|name| *name == level)
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level, expected one of: {}", LEVELS.join(", ")))
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log verbosity, repeat -v or name a level (default: error)")
            .long_help(
                "Log verbosity: -v warn, -vv info, -vvv debug, -vvvv trace. ENROLL_LOG_LEVEL also accepts the level name. Issued verification codes are logged at every level.",
            )
            .env("ENROLL_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_names_and_counts() {
        assert_eq!(parse_level("error"), Ok(0));
        assert_eq!(parse_level("WARN"), Ok(1));
        assert_eq!(parse_level(" info "), Ok(2));
        assert_eq!(parse_level("trace"), Ok(4));
        assert_eq!(parse_level("3"), Ok(3));
    }

    #[test]
    fn parse_level_rejects_unknown() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("5").is_err());
        assert!(parse_level("").is_err());
    }
}
