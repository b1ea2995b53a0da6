//! Reporting periods for the dashboard's summary cards.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime, Time};

use crate::{Error, bucket::DAY_WINDOW, sale::SaleRecord};

/// The reporting window that summary totals are computed over.
///
/// Every window is relative to a reference instant, normally "now", and is
/// evaluated in the reference instant's UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    /// The reference instant's calendar day, midnight to midnight.
    Day,
    /// The seven calendar days ending on the reference instant's day.
    Week,
    /// The reference instant's calendar month.
    #[default]
    Month,
    /// The reference instant's calendar year.
    Year,
    /// No date restriction beyond having a valid creation date.
    All,
}

impl Period {
    /// Whether a sale created at `created_at` falls inside this period.
    ///
    /// A creation time that cannot be expressed in the reference offset,
    /// because it would leave the supported date range, is outside every
    /// period, including [Period::All].
    pub fn contains(self, created_at: OffsetDateTime, reference: OffsetDateTime) -> bool {
        let Some(local) = created_at.checked_to_offset(reference.offset()) else {
            tracing::debug!(%created_at, offset = %reference.offset(), "creation time out of range");
            return false;
        };

        match self {
            Period::Day => {
                let start = reference.replace_time(Time::MIDNIGHT);
                match start.checked_add(Duration::days(1)) {
                    Some(end) => start <= local && local < end,
                    None => start <= local,
                }
            }
            Period::Week => {
                let last = reference.date();
                let first = last
                    .checked_sub(Duration::days(DAY_WINDOW - 1))
                    .unwrap_or(Date::MIN);
                (first..=last).contains(&local.date())
            }
            Period::Month => local.year() == reference.year() && local.month() == reference.month(),
            Period::Year => local.year() == reference.year(),
            Period::All => true,
        }
    }

    /// The name used on the command line and in serialized options.
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "today" | "harian" => Ok(Period::Day),
            "week" | "mingguan" => Ok(Period::Week),
            "month" | "bulanan" => Ok(Period::Month),
            "year" | "tahunan" => Ok(Period::Year),
            "all" => Ok(Period::All),
            _ => Err(Error::InvalidOption(s.to_owned())),
        }
    }
}

/// Keep the records created inside `period`.
///
/// Records without a valid creation date are excluded under every period,
/// including [Period::All]. Components that do not care about the creation
/// date, such as the expiry watch, read the full record set instead.
///
/// Filtering an already filtered set again with the same arguments returns
/// the same set.
pub fn filter_by_period<'a, I>(
    records: I,
    period: Period,
    reference: OffsetDateTime,
) -> Vec<&'a SaleRecord>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    records
        .into_iter()
        .filter(|record| {
            record
                .created_at
                .is_some_and(|created_at| period.contains(created_at, reference))
        })
        .collect()
}
