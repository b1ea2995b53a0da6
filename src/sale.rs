//! Sale records, the applications they sell, and subscription durations.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, OffsetDateTime, macros::date};

use crate::{Error, locale::Locale};

/// Alias for the integer type used for sale IDs.
pub type SaleId = i64;
/// Alias for the integer type used for application IDs.
pub type ApplicationId = i64;
/// Alias for the integer type used for the admin that owns a sale.
pub type OwnerId = i64;

/// The end date given to lifetime grants, i.e. subscriptions that never expire.
pub const LIFETIME_END: Date = date!(2099 - 12 - 31);

/// A premium application that can be resold, e.g. "Netflix" or "Spotify".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// The ID of the application.
    pub id: ApplicationId,
    /// The name shown to the admin and used for grouping sales.
    pub display_name: String,
}

/// Resolves application IDs on sale records to display names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    names: HashMap<ApplicationId, String>,
}

impl Catalog {
    /// Build a catalog from the applications known to the record store.
    pub fn new(applications: Vec<Application>) -> Self {
        let names = applications
            .into_iter()
            .map(|application| (application.id, application.display_name))
            .collect();

        Self { names }
    }

    /// The display name for `application_id`, if it refers to a known application.
    pub fn resolve(&self, application_id: Option<ApplicationId>) -> Option<&str> {
        application_id
            .and_then(|id| self.names.get(&id))
            .map(String::as_str)
    }

    /// The category a record is counted under: its application's name, or
    /// the locale's "other" label when the reference is missing or dangling.
    pub fn category_of<'a>(&'a self, record: &SaleRecord, locale: &'a Locale) -> &'a str {
        self.resolve(record.application_id)
            .unwrap_or_else(|| locale.other_label())
    }

    /// The number of applications in the catalog.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the catalog has no applications.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// How long a sold subscription lasts, counted in units of this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DurationKind {
    /// Counted in days.
    Daily,
    /// Counted in weeks.
    Weekly,
    /// Counted in calendar months.
    Monthly,
    /// Counted in calendar years.
    Yearly,
    /// Never expires.
    Lifetime,
}

impl DurationKind {
    /// The name stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Lifetime => "lifetime",
        }
    }
}

impl Display for DurationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationKind {
    type Err = Error;

    /// Accepts the English names and the Indonesian names used by older records.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "harian" => Ok(Self::Daily),
            "weekly" | "mingguan" => Ok(Self::Weekly),
            "monthly" | "bulanan" => Ok(Self::Monthly),
            "yearly" | "tahunan" => Ok(Self::Yearly),
            "lifetime" => Ok(Self::Lifetime),
            _ => Err(Error::InvalidDuration(s.to_owned())),
        }
    }
}

/// Compute the last day of a subscription that starts on `start` and runs
/// for `count` units of `kind`.
///
/// Month and year arithmetic keeps the day of the month; a day that does not
/// exist in the target month rolls over into the next month, so 31 January
/// plus one month is 2 or 3 March.
///
/// Returns `None` for a zero count (except for lifetime grants, which always
/// end on [LIFETIME_END]) or if the result is outside the supported date range.
pub fn compute_period_end(start: Date, kind: DurationKind, count: u32) -> Option<Date> {
    if kind == DurationKind::Lifetime {
        return Some(LIFETIME_END);
    }

    if count == 0 {
        return None;
    }

    let count = i64::from(count);

    match kind {
        DurationKind::Daily => start.checked_add(Duration::days(count)),
        DurationKind::Weekly => start.checked_add(Duration::weeks(count)),
        DurationKind::Monthly => add_months(start, count),
        DurationKind::Yearly => add_months(start, count * 12),
        DurationKind::Lifetime => Some(LIFETIME_END),
    }
}

fn add_months(date: Date, months: i64) -> Option<Date> {
    let month_index = i64::from(date.year()) * 12 + i64::from(date.month() as u8 - 1) + months;
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = Month::try_from(month_index.rem_euclid(12) as u8 + 1).ok()?;

    Date::from_calendar_date(year, month, 1)
        .ok()?
        .checked_add(Duration::days(i64::from(date.day()) - 1))
}

/// A sale exactly as the record store returned it.
///
/// Nothing here has been validated yet, use [crate::normalize] to turn it
/// into a [SaleRecord].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSaleRecord {
    /// The ID of the sale.
    pub id: SaleId,
    /// The application that was sold, if it is still known.
    pub application_id: Option<ApplicationId>,
    /// The buyer's contact number.
    pub buyer_phone: Option<String>,
    /// The number of units sold.
    pub order_count: Option<i64>,
    /// What the reseller paid for the subscription.
    pub cost_amount: Option<i64>,
    /// What the buyer paid for the subscription.
    pub sale_amount: Option<i64>,
    /// The first day of the subscription, as `YYYY-MM-DD`.
    pub period_start: Option<String>,
    /// The last day of the subscription, as `YYYY-MM-DD`.
    pub period_end: Option<String>,
    /// The duration kind name, see [DurationKind].
    pub duration_kind: Option<String>,
    /// The number of duration units.
    pub duration_count: Option<i64>,
    /// When the sale was entered. Missing on legacy records.
    pub created_at: Option<String>,
    /// Free text shown next to the sale.
    pub note: Option<String>,
}

/// One sold subscription, validated and ready for aggregation.
///
/// Amounts are whole Rupiah.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    /// The ID of the sale.
    pub id: SaleId,
    /// The application that was sold. `None` is counted as "other".
    pub application_id: Option<ApplicationId>,
    /// The buyer's contact number, only used for searching.
    pub buyer_phone: String,
    /// The number of units sold.
    pub order_count: u32,
    /// What the reseller paid for the subscription.
    pub cost_amount: i64,
    /// What the buyer paid for the subscription.
    pub sale_amount: i64,
    /// The first day of the subscription.
    pub period_start: Option<Date>,
    /// The last day of the subscription. [LIFETIME_END] for lifetime grants.
    pub period_end: Option<Date>,
    /// How long the subscription was sold for.
    pub duration: Option<(DurationKind, u32)>,
    /// When the sale was entered, or `None` if it was missing or unreadable.
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    /// Free text shown next to the sale.
    pub note: Option<String>,
}

impl SaleRecord {
    /// Whether the record can take part in views keyed on its creation date.
    pub fn has_valid_created_at(&self) -> bool {
        self.created_at.is_some()
    }

    /// The record's contribution to profit.
    pub fn profit(&self) -> i64 {
        self.sale_amount.saturating_sub(self.cost_amount)
    }

    /// Whether the subscription is a lifetime grant.
    pub fn is_lifetime(&self) -> bool {
        self.period_end == Some(LIFETIME_END)
    }
}
