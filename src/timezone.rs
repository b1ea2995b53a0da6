//! Resolving canonical timezone names, e.g. "Asia/Jakarta", to UTC offsets.

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// Look up a canonical timezone by name.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a canonical timezone.
pub fn find_timezone(canonical_timezone: &str) -> Result<&'static Tz, Error> {
    time_tz::timezones::get_by_name(canonical_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", canonical_timezone);
        Error::InvalidTimezone(canonical_timezone.to_owned())
    })
}

/// The UTC offset in effect in `timezone` at the instant `at`.
pub fn offset_at(timezone: &Tz, at: OffsetDateTime) -> UtcOffset {
    timezone.get_offset_utc(&at).to_utc()
}

/// The UTC offset in effect for `canonical_timezone` at the instant `at`.
///
/// # Errors
/// Returns [Error::InvalidTimezone] if the name is not a canonical timezone.
pub fn get_local_offset(canonical_timezone: &str, at: OffsetDateTime) -> Result<UtcOffset, Error> {
    find_timezone(canonical_timezone).map(|timezone| offset_at(timezone, at))
}
