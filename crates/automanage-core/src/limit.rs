//! Running-time limits

use automanage_util::MILLIS_PER_HOUR;
use std::time::Duration;

/// Whether a resource has been running longer than `hour_limit` hours.
///
/// `running_for` is `None` for a resource that is not running, which is
/// never beyond a limit.
pub fn is_beyond_limit(running_for: Option<Duration>, hour_limit: u32) -> bool {
    match running_for {
        Some(elapsed) => elapsed.as_millis() > u128::from(hour_limit) * u128::from(MILLIS_PER_HOUR),
        None => false,
    }
}
