//! Profile duration validation

use tracing::error;

/// Window applied when the `seconds` parameter is absent.
pub const DEFAULT_PROFILE_SECONDS: i64 = 30;

/// Longest accepted profiling window.
pub const MAX_PROFILE_SECONDS: i64 = 600;

/// Sentinel returned for an unusable `seconds` parameter.
pub const INVALID_PROFILE_SECONDS: i64 = -1;

/// Validate the `seconds` query parameter.
///
/// Absent or empty means the default window. Anything that is not an
/// integer in `[0, MAX_PROFILE_SECONDS]` yields the negative sentinel;
/// callers turn that into a 400 response. Side-effect-free apart from
/// logging.
pub fn parse_profile_seconds(parameter: Option<&str>) -> i64 {
    let parameter = match parameter {
        None => return DEFAULT_PROFILE_SECONDS,
        Some(value) if value.is_empty() => return DEFAULT_PROFILE_SECONDS,
        Some(value) => value,
    };

    match parameter.parse::<i64>() {
        Ok(seconds) if (0..=MAX_PROFILE_SECONDS).contains(&seconds) => seconds,
        Ok(seconds) => {
            error!("invalid profile seconds parameter: {seconds}, out of range");
            INVALID_PROFILE_SECONDS
        }
        Err(parse_error) => {
            error!("invalid profile seconds parameter: {parameter}, {parse_error}");
            INVALID_PROFILE_SECONDS
        }
    }
}
