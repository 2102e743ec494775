//! Account service: signup, profile update, password change and login.
//!
//! Flow Overview:
//! 1) Normalize and validate inputs that passed the payload schema.
//! 2) Consult the credential store and the password policy.
//! 3) Apply at most one store mutation per operation.

use super::{
    error::AccountError,
    policy::PasswordPolicy,
    principal::Principal,
    session::SessionStore,
    validation::{normalize_email, normalize_optional, valid_email},
};
use crate::store::{NewUser, User, UserPatch, UserStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
}

pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

/// A started session: the raw token plus the user it belongs to.
#[derive(Debug)]
pub struct Login {
    pub token: String,
    pub user: User,
}

pub struct AccountService {
    store: Arc<dyn UserStore>,
    policy: PasswordPolicy,
    sessions: SessionStore,
}

impl AccountService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, policy: PasswordPolicy, sessions: SessionStore) -> Self {
        Self {
            store,
            policy,
            sessions,
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Register a new user.
    ///
    /// # Errors
    /// [`AccountError::Validation`] for a missing or malformed email or an
    /// empty password, [`AccountError::Conflict`] if the email is taken.
    #[instrument(skip(self, signup))]
    pub async fn signup(&self, signup: Signup) -> Result<User, AccountError> {
        let email = normalize_email(&signup.email);
        if email.is_empty() {
            return Err(AccountError::validation("Missing email"));
        }
        if !valid_email(&email) {
            return Err(AccountError::validation("Invalid email"));
        }
        if signup.password.is_empty() {
            return Err(AccountError::validation("Missing password"));
        }

        // Early out before paying for a hash; create() still enforces uniqueness.
        if self.store.find_by_email(&email).await?.is_some() {
            debug!("signup for existing email rejected");
            return Err(AccountError::Conflict);
        }

        let password_hash = self
            .policy
            .hash(&signup.password)
            .map_err(|err| AccountError::Internal(err.to_string()))?;

        let user = self
            .store
            .create(NewUser {
                email,
                password_hash,
                name: normalize_optional(signup.name),
            })
            .await?;

        info!(user_id = %user.id, "user created");

        Ok(user)
    }

    /// Merge permitted profile fields into the principal's record.
    ///
    /// # Errors
    /// [`AccountError::Validation`] if nothing would change,
    /// [`AccountError::NotFound`] if the principal's record is gone.
    #[instrument(skip(self, patch), fields(user_id = %principal.user_id))]
    pub async fn update_profile(
        &self,
        principal: &Principal,
        patch: ProfilePatch,
    ) -> Result<User, AccountError> {
        let patch = UserPatch {
            name: normalize_optional(patch.name),
            password_hash: None,
        };

        if patch.is_empty() {
            return Err(AccountError::validation("No updates provided"));
        }

        Ok(self.store.update(principal.user_id, patch).await?)
    }

    /// Rotate the principal's password.
    ///
    /// Checks run in order and the first failure wins: current password,
    /// confirmation, length policy.
    ///
    /// # Errors
    /// [`AccountError::AuthMismatch`], [`AccountError::Mismatch`] or
    /// [`AccountError::Weakness`] for the respective failed check.
    #[instrument(skip(self, change), fields(user_id = %principal.user_id))]
    pub async fn change_password(
        &self,
        principal: &Principal,
        change: PasswordChange,
    ) -> Result<(), AccountError> {
        let user = self
            .store
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if !self.policy.verify(&change.old_password, &user.password_hash) {
            return Err(AccountError::AuthMismatch);
        }

        if change.new_password != change.confirm_new_password {
            return Err(AccountError::Mismatch);
        }

        if !self.policy.meets_minimum_length(&change.new_password) {
            return Err(AccountError::Weakness(self.policy.length_threshold()));
        }

        let password_hash = self
            .policy
            .hash(&change.new_password)
            .map_err(|err| AccountError::Internal(err.to_string()))?;

        self.store
            .update(
                user.id,
                UserPatch {
                    name: None,
                    password_hash: Some(password_hash),
                },
            )
            .await?;

        info!("password changed");

        Ok(())
    }

    /// Verify credentials and start a session.
    ///
    /// # Errors
    /// [`AccountError::InvalidCredentials`] for an unknown email or a wrong
    /// password; the two are indistinguishable to the caller.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Login, AccountError> {
        let email = normalize_email(email);
        let Some(user) = self.store.find_by_email(&email).await? else {
            return Err(AccountError::InvalidCredentials);
        };

        if !self.policy.verify(password, &user.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }

        let token = self
            .sessions
            .issue(user.id)
            .await
            .map_err(|err| AccountError::Internal(err.to_string()))?;

        Ok(Login { token, user })
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token).await
    }

    /// Resolve a raw session token to the principal it authenticates.
    ///
    /// # Errors
    /// [`AccountError::Unauthorized`] for unknown or expired sessions and for
    /// sessions whose user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AccountError> {
        let user_id = self
            .sessions
            .resolve(token)
            .await
            .ok_or(AccountError::Unauthorized)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AccountError::Unauthorized)?;

        Ok(Principal::from(&user))
    }

    /// Fetch the principal's current record.
    ///
    /// # Errors
    /// [`AccountError::NotFound`] if the record is gone.
    pub async fn profile(&self, principal: &Principal) -> Result<User, AccountError> {
        self.store
            .find_by_id(principal.user_id)
            .await?
            .ok_or(AccountError::NotFound)
    }
}
