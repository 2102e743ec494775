//! # Accounts
//!
//! `accounts` manages user accounts over HTTP: signup, profile updates,
//! password changes and cookie sessions.
//!
//! ## Users
//!
//! - **Email:** trimmed and lowercased before lookup or storage; unique across
//!   all users, enforced atomically by the store.
//! - **Passwords:** stored only as Argon2id PHC strings, optionally peppered
//!   with a server-side secret. Plaintext never leaves the request handler.
//! - **Profile:** only `name` may be changed through the profile endpoint;
//!   identity and credential fields are rejected.
//!
//! ## Password changes
//!
//! Checks run in a fixed order and the first failure wins: old password,
//! confirmation match, then minimum length. The length threshold is
//! exclusive, so the default of 8 requires at least 9 characters.
//!
//! ## Storage
//!
//! The `--dsn` scheme selects the backend: `memory://` keeps users in
//! process, `postgres://` uses `sqlx` and applies `sql/schema.sql` on start.

pub mod accounts;
pub mod cli;
pub mod store;
