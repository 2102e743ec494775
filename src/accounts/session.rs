//! Session tokens backing the authenticated principal.
//!
//! The raw token is only returned to set the cookie; the table is keyed by
//! its SHA-256 hash.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "accounts_session";
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24;

#[derive(Clone, Copy, Debug)]
struct SessionRecord {
    user_id: Uuid,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<Vec<u8>, SessionRecord>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS))
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user_id` and return the raw token. Expired
    /// sessions are swept while the table is locked for the insert.
    ///
    /// # Errors
    /// Returns an error if the system RNG fails.
    pub async fn issue(&self, user_id: Uuid) -> Result<String> {
        let token = generate_session_token()?;
        let now = Instant::now();
        let record = SessionRecord {
            user_id,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, existing| existing.expires_at > now);
        if sessions.len() < before {
            debug!(purged = before - sessions.len(), "expired sessions removed");
        }
        sessions.insert(hash_session_token(&token), record);

        Ok(token)
    }

    /// Resolve a raw token to its user. Expired sessions are removed.
    pub async fn resolve(&self, token: &str) -> Option<Uuid> {
        let key = hash_session_token(token);
        let record = self.sessions.read().await.get(&key).copied()?;

        if Instant::now() >= record.expires_at {
            debug!("session expired");
            self.sessions.write().await.remove(&key);
            return None;
        }

        Some(record.user_id)
    }

    /// Drop a session. Returns whether it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .await
            .remove(&hash_session_token(token))
            .is_some()
    }
}

fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Pull the session token out of a `Cookie` header value.
#[must_use]
pub fn token_from_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

/// `Set-Cookie` value for a freshly issued session.
#[must_use]
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        ttl.as_secs()
    )
}

/// `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issue_and_resolve() {
        let sessions = SessionStore::default();
        let user_id = Uuid::new_v4();
        let token = sessions.issue(user_id).await.unwrap();

        assert_eq!(sessions.resolve(&token).await, Some(user_id));
        assert_eq!(sessions.resolve("not-a-token").await, None);
    }

    #[tokio::test]
    async fn tokens_are_unique_and_not_stored_raw() {
        let sessions = SessionStore::default();
        let user_id = Uuid::new_v4();
        let first = sessions.issue(user_id).await.unwrap();
        let second = sessions.issue(user_id).await.unwrap();
        assert_ne!(first, second);

        let table = sessions.sessions.read().await;
        assert!(!table.contains_key(first.as_bytes()));
        assert!(table.contains_key(&hash_session_token(&first)));
    }

    #[tokio::test]
    async fn expired_session_is_purged() {
        let sessions = SessionStore::new(Duration::ZERO);
        let token = sessions.issue(Uuid::new_v4()).await.unwrap();

        assert_eq!(sessions.resolve(&token).await, None);
        assert!(sessions.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn issue_sweeps_expired_sessions() {
        let sessions = SessionStore::new(Duration::ZERO);
        for _ in 0..1000 {
            sessions.issue(Uuid::new_v4()).await.unwrap();
        }

        assert_eq!(sessions.sessions.read().await.len(), 1);
    }

    #[tokio::test]
    async fn issue_keeps_live_sessions() {
        let sessions = SessionStore::default();
        let user_id = Uuid::new_v4();
        let first = sessions.issue(user_id).await.unwrap();
        for _ in 0..10 {
            sessions.issue(Uuid::new_v4()).await.unwrap();
        }

        assert_eq!(sessions.sessions.read().await.len(), 11);
        assert_eq!(sessions.resolve(&first).await, Some(user_id));
    }

    #[tokio::test]
    async fn revoke_removes_session() {
        let sessions = SessionStore::default();
        let token = sessions.issue(Uuid::new_v4()).await.unwrap();

        assert!(sessions.revoke(&token).await);
        assert!(!sessions.revoke(&token).await);
        assert_eq!(sessions.resolve(&token).await, None);
    }

    #[test]
    fn token_from_cookie_finds_session() {
        assert_eq!(
            token_from_cookie("theme=dark; accounts_session=abc123; lang=en"),
            Some("abc123")
        );
        assert_eq!(token_from_cookie("accounts_session="), None);
        assert_eq!(token_from_cookie("theme=dark"), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc", Duration::from_secs(60));
        assert_eq!(
            cookie,
            "accounts_session=abc; HttpOnly; SameSite=Strict; Path=/; Max-Age=60"
        );
        assert!(expired_session_cookie().ends_with("Max-Age=0"));
    }
}
