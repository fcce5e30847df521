use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_CONSUME_CODE: &str = "consume-code-on-success";

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub consume_code_on_success: bool,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            consume_code_on_success: matches.get_flag(ARG_CONSUME_CODE),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_CONSUME_CODE)
            .long(ARG_CONSUME_CODE)
            .help("Forget a verification code once it has matched")
            .env("ENROLL_CONSUME_CODE_ON_SUCCESS")
            .action(ArgAction::SetTrue),
    )
}
