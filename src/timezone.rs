//! Local time helpers for a canonical timezone name.

use time::{Date, OffsetDateTime};
use time_tz::{OffsetDateTimeExt, Tz};

use crate::Error;

/// The timezone called `canonical_timezone`, or `None` if the name is unknown.
pub fn get_local_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// Get the timezone called `canonical_timezone`, e.g. "Europe/Rome".
///
/// # Errors
/// Returns [Error::InvalidTimezoneError] if the timezone is not a canonical timezone name.
pub fn local_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    get_local_timezone(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
        .inspect_err(|error| tracing::error!("{error}"))
}

/// `timestamp` as a local time, using the offset `timezone` had at that instant.
pub fn to_local(timestamp: OffsetDateTime, timezone: &Tz) -> OffsetDateTime {
    timestamp.to_timezone(timezone)
}

/// Today's date in `timezone`.
pub fn local_today(timezone: &Tz) -> Date {
    to_local(OffsetDateTime::now_utc(), timezone).date()
}
