//! Subscriptions that are about to run out, or already have.
//!
//! Expiry is a property of the subscription rather than of when the sale was
//! entered, so these selections read the full record set and ignore the
//! creation date entirely.

use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::sale::SaleRecord;

/// How many days ahead the dashboard looks for expiring subscriptions.
pub const DEFAULT_HORIZON_DAYS: u32 = 5;

/// The instant a subscription ending on `period_end` is considered to expire:
/// the start of that day in `offset`.
pub fn expiry_instant(period_end: Date, offset: UtcOffset) -> OffsetDateTime {
    period_end.midnight().assume_offset(offset)
}

/// Whether `expires_at` lies within `horizon_days` after `reference`, both ends inclusive.
pub fn is_expiring_soon(
    expires_at: OffsetDateTime,
    reference: OffsetDateTime,
    horizon_days: u32,
) -> bool {
    match reference.checked_add(Duration::days(i64::from(horizon_days))) {
        Some(horizon_end) => reference <= expires_at && expires_at <= horizon_end,
        None => reference <= expires_at,
    }
}

/// Select the records whose subscription ends between `reference` and
/// `horizon_days` later, both ends inclusive.
///
/// Records without an end date never match. Lifetime grants end far beyond
/// any realistic horizon.
pub fn find_expiring_soon<'a, I>(
    records: I,
    reference: OffsetDateTime,
    horizon_days: u32,
) -> Vec<&'a SaleRecord>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    records
        .into_iter()
        .filter(|record| {
            record.period_end.is_some_and(|period_end| {
                let expires_at = expiry_instant(period_end, reference.offset());
                is_expiring_soon(expires_at, reference, horizon_days)
            })
        })
        .collect()
}

/// Select the records whose subscription ended strictly before `reference`.
///
/// This never overlaps with [find_expiring_soon] for the same reference.
pub fn find_expired<'a, I>(records: I, reference: OffsetDateTime) -> Vec<&'a SaleRecord>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    records
        .into_iter()
        .filter(|record| {
            record.period_end.is_some_and(|period_end| {
                expiry_instant(period_end, reference.offset()) < reference
            })
        })
        .collect()
}
