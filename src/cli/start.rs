use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch::handler,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;

/// Start the CLI
///
/// # Errors
/// Returns an error if logging cannot be initialized or the arguments do not
/// map to an action.
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();

    let verbosity_level = matches
        .get_one::<u8>(logging::ARG_VERBOSITY)
        .map_or(0, |&v| v);
    let json = matches.get_flag(logging::ARG_LOG_JSON);

    telemetry::init(Some(telemetry::level_from_verbosity(verbosity_level)), json)?;

    handler(&matches)
}
