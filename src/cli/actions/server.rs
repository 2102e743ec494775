use crate::{
    accounts::{self, policy::PasswordPolicy, session::SessionStore, AccountService},
    cli::telemetry,
    store,
};
use anyhow::Result;
use secrecy::SecretString;
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub password_length_threshold: usize,
    pub password_pepper: Option<SecretString>,
    pub session_ttl_seconds: u64,
}

/// Connect the user store and serve the accounts API until shutdown.
/// # Errors
/// Returns an error if the store cannot be reached or the server fails to start
pub async fn execute(args: Args) -> Result<()> {
    info!("Connecting to user store: {}", store::redact(&args.dsn));

    let user_store = store::connect(&args.dsn).await?;

    let mut policy = PasswordPolicy::new(args.password_length_threshold);
    if let Some(pepper) = args.password_pepper {
        policy = policy.with_pepper(pepper);
    }

    let sessions = SessionStore::new(Duration::from_secs(args.session_ttl_seconds));

    let service = AccountService::new(user_store, policy, sessions);

    let result = accounts::new(args.port, service).await;

    telemetry::shutdown_tracer();

    result
}
