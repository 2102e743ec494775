use crate::accounts::policy::DEFAULT_LENGTH_THRESHOLD;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_PASSWORD_LENGTH_THRESHOLD: &str = "password-length-threshold";
pub const ARG_PASSWORD_PEPPER: &str = "password-pepper";

#[derive(Debug)]
pub struct Options {
    pub length_threshold: usize,
    pub pepper: Option<SecretString>,
}

impl Options {
    /// Parse password policy arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the pepper is present but blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let length_threshold = matches
            .get_one::<usize>(ARG_PASSWORD_LENGTH_THRESHOLD)
            .copied()
            .unwrap_or(DEFAULT_LENGTH_THRESHOLD);

        let pepper = match matches.get_one::<String>(ARG_PASSWORD_PEPPER) {
            Some(pepper) if pepper.trim().is_empty() => {
                return Err(anyhow::anyhow!("--{ARG_PASSWORD_PEPPER} must not be blank"));
            }
            Some(pepper) => Some(SecretString::from(pepper.clone())),
            None => None,
        };

        Ok(Self {
            length_threshold,
            pepper,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PASSWORD_LENGTH_THRESHOLD)
                .long(ARG_PASSWORD_LENGTH_THRESHOLD)
                .help("New passwords must be longer than this many characters")
                .env("ACCOUNTS_PASSWORD_LENGTH_THRESHOLD")
                .default_value("8")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_PEPPER)
                .long(ARG_PASSWORD_PEPPER)
                .help("Server-side secret mixed into password hashes")
                .env("ACCOUNTS_PASSWORD_PEPPER")
                .hide_env_values(true),
        )
}
