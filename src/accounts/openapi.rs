use super::handlers::{health, password, profile, session, signup, UserView};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        signup::signup,
        profile::get_profile,
        profile::update_profile,
        password::change_password,
        session::login,
        session::logout,
    ),
    components(schemas(
        UserView,
        health::Health,
        signup::SignupRequest,
        profile::ProfileUpdateRequest,
        password::ChangePasswordRequest,
        session::LoginRequest,
    )),
    tags(
        (name = "accounts", description = "User registration"),
        (name = "profile", description = "Authenticated profile management"),
        (name = "session", description = "Login and logout"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
