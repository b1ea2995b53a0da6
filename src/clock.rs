//! The reference clock that every time-relative computation is measured against.

use time::{OffsetDateTime, UtcOffset};
use time_tz::Tz;

use crate::{
    Error,
    timezone::{find_timezone, offset_at},
};

/// A source of "now".
///
/// Aggregations take the reference instant as an argument. Hosts read it from
/// a [Clock] so tests can substitute a [FixedClock].
pub trait Clock {
    /// The current instant, in the local UTC offset.
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Fixed(UtcOffset),
    Named(&'static Tz),
}

/// Reads the system clock and reports it in a fixed UTC offset or in the
/// offset a named timezone has at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    /// A clock reporting times in `offset`.
    pub fn new(offset: UtcOffset) -> Self {
        Self {
            zone: Zone::Fixed(offset),
        }
    }

    /// A clock reporting times in `canonical_timezone`.
    ///
    /// The offset is looked up on every reading, so a long running process
    /// follows daylight saving changes.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the name is not a canonical timezone.
    pub fn for_timezone(canonical_timezone: &str) -> Result<Self, Error> {
        let timezone = find_timezone(canonical_timezone)?;
        Ok(Self {
            zone: Zone::Named(timezone),
        })
    }

    fn offset_at(&self, at: OffsetDateTime) -> UtcOffset {
        match self.zone {
            Zone::Fixed(offset) => offset,
            Zone::Named(timezone) => offset_at(timezone, at),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        now.to_offset(self.offset_at(now))
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
