//! Time-bucketed revenue series for the dashboard chart.
//!
//! Sales are grouped by a display label derived from their creation date
//! (`DD/MM`, `Mar 2024`, `2024`) and their sale amounts summed per label.
//! Because the labels are display strings, putting them back in calendar
//! order is done by [sort_buckets] using the locale's month-name table.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{Error, locale::Locale, sale::SaleRecord};

/// The number of daily buckets shown on the daily chart, ending today.
pub const DAY_WINDOW: i64 = 7;

/// The size of the time window a bucket covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Granularity {
    /// One bucket per calendar day, labelled `DD/MM`.
    Day,
    /// One bucket per calendar month, labelled with the short month name and year.
    #[default]
    Month,
    /// One bucket per calendar year, labelled with the year.
    Year,
}

impl Granularity {
    /// The name used on the command line and in serialized options.
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" | "harian" => Ok(Granularity::Day),
            "month" | "monthly" | "bulanan" => Ok(Granularity::Month),
            "year" | "yearly" | "tahunan" => Ok(Granularity::Year),
            _ => Err(Error::InvalidOption(s.to_owned())),
        }
    }
}

/// A single labelled time window and the revenue that fell inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// The display label, e.g. "05/03" or "Mar 2024".
    pub label: String,
    /// The summed sale amount.
    pub total: i64,
}

/// Buckets in insertion order, with at most one bucket per label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BucketMap {
    buckets: Vec<Bucket>,
}

impl BucketMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zero bucket for `label` unless it already exists.
    fn seed(&mut self, label: String) {
        if self.position(&label).is_none() {
            self.buckets.push(Bucket { label, total: 0 });
        }
    }

    /// Add `amount` to the bucket for `label`, creating it at the end if needed.
    pub fn add(&mut self, label: String, amount: i64) {
        match self.position(&label) {
            Some(index) => {
                let bucket = &mut self.buckets[index];
                bucket.total = bucket.total.saturating_add(amount);
            }
            None => self.buckets.push(Bucket {
                label,
                total: amount,
            }),
        }
    }

    /// The total for `label`, if it has a bucket.
    pub fn get(&self, label: &str) -> Option<i64> {
        self.position(label).map(|index| self.buckets[index].total)
    }

    /// The buckets in order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// The bucket labels in order.
    pub fn labels(&self) -> Vec<String> {
        self.buckets
            .iter()
            .map(|bucket| bucket.label.clone())
            .collect()
    }

    /// The bucket totals in order.
    pub fn values(&self) -> Vec<i64> {
        self.buckets.iter().map(|bucket| bucket.total).collect()
    }

    /// The sum over all buckets, saturating at the bounds of `i64`.
    pub fn total(&self) -> i64 {
        self.buckets
            .iter()
            .fold(0_i64, |total, bucket| total.saturating_add(bucket.total))
    }

    /// The number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether there are no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn position(&self, label: &str) -> Option<usize> {
        self.buckets.iter().position(|bucket| bucket.label == label)
    }
}

/// The label of the bucket that `timestamp` falls into.
///
/// The timestamp is labelled as-is, convert it to the local offset first.
pub fn bucket_key(timestamp: OffsetDateTime, granularity: Granularity, locale: &Locale) -> String {
    match granularity {
        Granularity::Day => day_key(timestamp.date()),
        Granularity::Month => format!(
            "{} {:04}",
            locale.short_month(timestamp.month()),
            timestamp.year()
        ),
        Granularity::Year => format!("{:04}", timestamp.year()),
    }
}

fn day_key(date: Date) -> String {
    format!("{:02}/{:02}", date.day(), date.month() as u8)
}

/// Sum sale amounts per time bucket.
///
/// For [Granularity::Day] the map starts with [DAY_WINDOW] zero buckets,
/// oldest first, ending on the reference instant's day, so the daily chart
/// always has a full week. Monthly and yearly maps only contain buckets that
/// have sales.
///
/// Creation dates are converted to the reference instant's offset before
/// labelling. Records without a valid creation date are skipped.
///
/// Only the bucket totals are independent of input order, the order of
/// buckets created outside the seeded window follows the input. Use
/// [sort_buckets] to put them in calendar order.
pub fn bucketize<'a, I>(
    records: I,
    granularity: Granularity,
    reference: OffsetDateTime,
    locale: &Locale,
) -> BucketMap
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut buckets = BucketMap::new();

    if granularity == Granularity::Day {
        let today = reference.date();
        for days_ago in (0..DAY_WINDOW).rev() {
            if let Some(date) = today.checked_sub(Duration::days(days_ago)) {
                buckets.seed(day_key(date));
            }
        }
    }

    for record in records {
        let Some(created_at) = record.created_at else {
            tracing::debug!("skipping sale {} without a creation time", record.id);
            continue;
        };

        let Some(local) = created_at.checked_to_offset(reference.offset()) else {
            tracing::debug!(
                "skipping sale {} created at {created_at}, out of range in {}",
                record.id,
                reference.offset()
            );
            continue;
        };

        let key = bucket_key(local, granularity, locale);
        buckets.add(key, record.sale_amount);
    }

    buckets
}

/// Put buckets in calendar order.
///
/// Daily buckets are returned unchanged since seeding already put them in
/// order. Monthly labels are ordered by year and then by the month's ordinal
/// in the locale's name table, yearly labels by their numeric value. The sort
/// is stable.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownMonthKey] if a monthly label's month name is not in the
///   locale's table,
/// - or [Error::InvalidBucketKey] if a label does not have the expected shape.
pub fn sort_buckets(
    buckets: BucketMap,
    granularity: Granularity,
    locale: &Locale,
) -> Result<BucketMap, Error> {
    let mut keyed = match granularity {
        Granularity::Day => return Ok(buckets),
        Granularity::Month => buckets
            .buckets
            .into_iter()
            .map(|bucket| Ok((parse_month_key(&bucket.label, locale)?, bucket)))
            .collect::<Result<Vec<_>, Error>>()?,
        Granularity::Year => buckets
            .buckets
            .into_iter()
            .map(|bucket| Ok(((parse_year(&bucket.label)?, 0), bucket)))
            .collect::<Result<Vec<_>, Error>>()?,
    };

    keyed.sort_by_key(|(key, _)| *key);

    Ok(BucketMap {
        buckets: keyed.into_iter().map(|(_, bucket)| bucket).collect(),
    })
}

/// Bucket `records` and sort the result, see [bucketize] and [sort_buckets].
pub fn bucket_series<'a, I>(
    records: I,
    granularity: Granularity,
    reference: OffsetDateTime,
    locale: &Locale,
) -> Result<BucketMap, Error>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let buckets = bucketize(records, granularity, reference, locale);
    sort_buckets(buckets, granularity, locale)
}

fn parse_month_key(label: &str, locale: &Locale) -> Result<(i32, u8), Error> {
    let (month_name, year) = label
        .trim()
        .rsplit_once(' ')
        .ok_or_else(|| Error::InvalidBucketKey(label.to_owned()))?;
    let year = parse_year(year).map_err(|_| Error::InvalidBucketKey(label.to_owned()))?;
    let ordinal = locale
        .month_ordinal(month_name.trim())
        .ok_or_else(|| Error::UnknownMonthKey(label.to_owned()))?;

    Ok((year, ordinal))
}

fn parse_year(label: &str) -> Result<i32, Error> {
    label
        .trim()
        .parse()
        .map_err(|_| Error::InvalidBucketKey(label.to_owned()))
}
