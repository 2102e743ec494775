//! Credential store: persistence for user records.
//!
//! The store is the single point of mutation in the service. Implementations
//! must make the uniqueness check and the insert in [`UserStore::create`] a
//! single atomic step, so two concurrent signups for the same email can never
//! both succeed.

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryStore;
pub use self::postgres::PgStore;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use url::Url;
use uuid::Uuid;

/// A persisted user record.
///
/// `password_hash` never leaves the service; responses are built from
/// [`crate::accounts::UserView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

/// Values required to create a user. `email` must already be normalized.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub password_hash: Option<String>,
}

impl UserPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none()
    }

    fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = Some(name);
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with email {0} already exists")]
    Conflict(String),
    #[error("user {0} not found")]
    NotFound(Uuid),
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Insert a new user, failing with [`StoreError::Conflict`] if the email
    /// is already taken. No record is written on failure.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, StoreError>;

    async fn list_all(&self) -> Result<Vec<User>, StoreError>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release backend resources. Called once on shutdown.
    async fn close(&self) {}
}

/// Open a store from a DSN.
///
/// `memory://` gives a process-local store; `postgres://` and `postgresql://`
/// connect a pool and apply the schema.
///
/// # Errors
/// Returns an error if the DSN is malformed, the scheme is unsupported or the
/// database cannot be reached.
pub async fn connect(dsn: &str) -> Result<Arc<dyn UserStore>> {
    let url = Url::parse(dsn).with_context(|| format!("Invalid DSN: {}", redact(dsn)))?;

    match url.scheme() {
        "memory" => {
            info!("Using in-memory user store");
            Ok(Arc::new(MemoryStore::new()))
        }
        "postgres" | "postgresql" => {
            let store = PgStore::connect(dsn)
                .await
                .context("Failed to connect to database")?;
            store.migrate().await.context("Failed to apply schema")?;
            info!("Connected to {}", redact(dsn));
            Ok(Arc::new(store))
        }
        scheme => Err(anyhow!("unsupported DSN scheme: {scheme}")),
    }
}

/// Strip the password from a DSN before logging it.
#[must_use]
pub fn redact(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<invalid dsn>".to_string(),
    }
}
