//! Per-operation payload schemas.
//!
//! Every endpoint that accepts a body declares which fields are required,
//! which are optional and which are explicitly disallowed. Anything else is
//! rejected as unknown. All fields are strings.

use super::error::AccountError;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[derive(Debug)]
pub struct Schema {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub disallowed: &'static [&'static str],
}

pub const SIGNUP: Schema = Schema {
    required: &["email", "password"],
    optional: &["name"],
    disallowed: &["id", "password_hash"],
};

pub const PROFILE_UPDATE: Schema = Schema {
    required: &[],
    optional: &["name"],
    disallowed: &["url", "id", "email", "password", "password_hash"],
};

pub const CHANGE_PASSWORD: Schema = Schema {
    required: &["old_password", "new_password", "confirm_new_password"],
    optional: &[],
    disallowed: &[],
};

pub const LOGIN: Schema = Schema {
    required: &["email", "password"],
    optional: &[],
    disallowed: &[],
};

impl Schema {
    fn allows(&self, field: &str) -> bool {
        self.required.contains(&field) || self.optional.contains(&field)
    }

    /// Validate the shape of a JSON payload.
    ///
    /// # Errors
    /// Returns [`AccountError::Validation`] for a missing body, a non-object
    /// body, a disallowed or unknown field, a non-string value, or a required
    /// field that is absent or empty.
    pub fn check<'a>(
        &self,
        payload: Option<&'a Value>,
    ) -> Result<&'a Map<String, Value>, AccountError> {
        let Some(payload) = payload else {
            return Err(AccountError::validation("Missing payload"));
        };
        let Some(fields) = payload.as_object() else {
            return Err(AccountError::validation("Payload must be a JSON object"));
        };

        for (field, value) in fields {
            if self.disallowed.contains(&field.as_str()) {
                return Err(AccountError::validation(format!(
                    "Field `{field}` is not allowed"
                )));
            }
            if !self.allows(field) {
                return Err(AccountError::validation(format!("Unknown field `{field}`")));
            }
            if !value.is_string() && !value.is_null() {
                return Err(AccountError::validation(format!(
                    "Field `{field}` must be a string"
                )));
            }
        }

        for field in self.required {
            let present = fields
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|value| !value.trim().is_empty());
            if !present {
                return Err(AccountError::validation(format!("Missing {field}")));
            }
        }

        Ok(fields)
    }

    /// Validate and deserialize a payload in one step.
    ///
    /// # Errors
    /// See [`Schema::check`].
    pub fn parse<T: DeserializeOwned>(&self, payload: Option<&Value>) -> Result<T, AccountError> {
        let fields = self.check(payload)?;
        serde_json::from_value(Value::Object(fields.clone()))
            .map_err(|err| AccountError::validation(format!("Invalid payload: {err}")))
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Trim an optional display name, treating blank as absent.
#[must_use]
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
