use crate::accounts::session::DEFAULT_SESSION_TTL_SECONDS;
use clap::{Arg, ArgMatches, Command};

pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub ttl_seconds: u64,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the TTL is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);

        if ttl_seconds == 0 {
            return Err(anyhow::anyhow!(
                "--{ARG_SESSION_TTL_SECONDS} must be greater than zero"
            ));
        }

        Ok(Self { ttl_seconds })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_SESSION_TTL_SECONDS)
            .long(ARG_SESSION_TTL_SECONDS)
            .help("Session cookie TTL in seconds")
            .env("ACCOUNTS_SESSION_TTL_SECONDS")
            .default_value("86400")
            .value_parser(clap::value_parser!(u64)),
    )
}
