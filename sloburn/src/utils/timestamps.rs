//! Unix-epoch timestamp helpers.

use chrono::Utc;

/// Returns the current time as UNIX epoch seconds.
///
/// This is the default reporting instant for a pipeline run.
#[must_use]
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
