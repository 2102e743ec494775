//! Password hashing and strength policy.
//!
//! Digests are Argon2id PHC strings with a per-password random salt. An
//! optional server-side pepper is mixed in as the Argon2 secret.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

/// Passwords must be strictly longer than this many characters.
pub const DEFAULT_LENGTH_THRESHOLD: usize = 8;

#[derive(Debug)]
pub struct PasswordPolicy {
    length_threshold: usize,
    pepper: Option<SecretString>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LENGTH_THRESHOLD)
    }
}

impl PasswordPolicy {
    #[must_use]
    pub const fn new(length_threshold: usize) -> Self {
        Self {
            length_threshold,
            pepper: None,
        }
    }

    #[must_use]
    pub fn with_pepper(mut self, pepper: SecretString) -> Self {
        self.pepper = Some(pepper);
        self
    }

    #[must_use]
    pub const fn length_threshold(&self) -> usize {
        self.length_threshold
    }

    fn argon2(&self) -> Result<Argon2<'_>> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper.expose_secret().as_bytes(),
                Algorithm::Argon2id,
                Version::V0x13,
                Params::default(),
            )
            .map_err(|_| anyhow!("failed to initialize Argon2id")),
            None => Ok(Argon2::default()),
        }
    }

    /// Hash a plaintext password into a PHC string.
    ///
    /// # Errors
    /// Returns an error if Argon2 cannot be initialized or hashing fails.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|_| anyhow!("failed to hash password"))?
            .to_string();
        Ok(hash)
    }

    /// Check a plaintext password against a stored digest. A digest that does
    /// not parse never verifies.
    #[must_use]
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2()
            .is_ok_and(|argon2| argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok())
    }

    #[must_use]
    pub fn meets_minimum_length(&self, plaintext: &str) -> bool {
        plaintext.chars().count() > self.length_threshold
    }
}
