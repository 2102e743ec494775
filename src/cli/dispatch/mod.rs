use crate::cli::{
    actions::{server::Args, Action},
    commands::{password, session, ARG_DSN, ARG_PORT},
};
use anyhow::Result;

/// Turn parsed arguments into the action to run.
///
/// # Errors
/// Returns an error if a required argument is missing or a value is out of range
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let password = password::Options::parse(matches)?;
    let session = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
        dsn: matches
            .get_one::<String>(ARG_DSN)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        password_length_threshold: password.length_threshold,
        password_pepper: password.pepper,
        session_ttl_seconds: session.ttl_seconds,
    }))
}
