pub mod health;
pub use self::health::health;

pub mod signup;
pub use self::signup::signup;

pub mod profile;
pub use self::profile::{get_profile, update_profile};

pub mod password;
pub use self::password::change_password;

pub mod session;
pub use self::session::{login, logout};


// common types for the handlers
use crate::store::User;
use serde::Serialize;
use utoipa::ToSchema;

/// Public view of a user record. Never carries the password hash.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
        }
    }
}
