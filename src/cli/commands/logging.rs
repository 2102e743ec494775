use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_LEVEL: &str = "log-level";

/// Effective log level: an explicit `--log-level` wins, otherwise each `-v`
/// raises the level one step above ERROR.
#[must_use]
pub fn level(matches: &ArgMatches) -> Level {
    if let Some(level) = matches.get_one::<Level>(ARG_LOG_LEVEL) {
        return *level;
    }

    match matches.get_count(ARG_VERBOSITY) {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Raise verbosity: -v WARN, -vv INFO, -vvv DEBUG, -vvvv TRACE")
                .global(true)
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long(ARG_LOG_LEVEL)
                .help("Log level: error, warn, info, debug, trace")
                .env("ACCOUNTS_LOG_LEVEL")
                .global(true)
                .value_parser(|value: &str| value.parse::<Level>().map_err(|e| e.to_string())),
        )
}
