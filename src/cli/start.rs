use crate::cli::{actions::Action, commands, commands::logging, dispatch::handler, telemetry};
use anyhow::Result;

/// Start the CLI
///
/// # Errors
/// Returns an error if telemetry cannot be initialized or the arguments are invalid
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(logging::level(&matches))?;

    let action = handler(&matches)?;

    Ok(action)
}
