//! Validation and cleaning of raw sale records.
//!
//! Normalizing never fails. Bad money fields are clamped, and a timestamp
//! that cannot be read leaves the record without a creation date, which
//! keeps it out of every view keyed on that date without dropping it from
//! the snapshot.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};

use crate::sale::{DurationKind, RawSaleRecord, SaleRecord, compute_period_end};

/// Validate a raw record.
pub fn normalize(raw: RawSaleRecord) -> SaleRecord {
    let created_at = match raw.created_at.as_deref() {
        Some(text) => {
            let parsed = parse_created_at(text);
            if parsed.is_none() {
                tracing::debug!(
                    "sale {} has an unreadable creation time {text:?}, excluding it from date-based views",
                    raw.id
                );
            }
            parsed
        }
        None => {
            tracing::debug!("sale {} has no creation time", raw.id);
            None
        }
    };

    let duration = parse_duration(&raw);
    let period_start = raw.period_start.as_deref().and_then(parse_date);
    let period_end = raw
        .period_end
        .as_deref()
        .and_then(parse_date)
        .or_else(|| {
            let (kind, count) = duration?;
            compute_period_end(period_start?, kind, count)
        });

    SaleRecord {
        id: raw.id,
        application_id: raw.application_id,
        buyer_phone: raw.buyer_phone.unwrap_or_default(),
        order_count: clean_count(raw.id, raw.order_count),
        cost_amount: clean_amount(raw.id, "cost", raw.cost_amount),
        sale_amount: clean_amount(raw.id, "sale", raw.sale_amount),
        period_start,
        period_end,
        duration,
        created_at,
        note: raw.note.filter(|note| !note.trim().is_empty()),
    }
}

/// Validate every record in a batch, keeping their order.
pub fn normalize_all(raw_records: Vec<RawSaleRecord>) -> Vec<SaleRecord> {
    raw_records.into_iter().map(normalize).collect()
}

/// Parse a creation timestamp.
///
/// Accepts RFC 3339 (with either `T` or a space between date and time),
/// SQLite's `YYYY-MM-DD HH:MM:SS` which is taken to be UTC, and a bare
/// `YYYY-MM-DD` which is taken to be midnight UTC.
pub fn parse_created_at(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(timestamp);
    }

    if let Some((date, time)) = text.split_once(' ') {
        if let Ok(timestamp) = OffsetDateTime::parse(&format!("{date}T{time}"), &Rfc3339) {
            return Some(timestamp);
        }
    }

    if let Ok(timestamp) = PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(timestamp.assume_utc());
    }

    parse_date(text).map(|date| date.midnight().assume_utc())
}

fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn parse_duration(raw: &RawSaleRecord) -> Option<(DurationKind, u32)> {
    let kind = raw
        .duration_kind
        .as_deref()?
        .parse::<DurationKind>()
        .inspect_err(|error| tracing::debug!("sale {}: {error}", raw.id))
        .ok()?;
    let count = raw
        .duration_count
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(0);

    Some((kind, count))
}

fn clean_count(id: i64, count: Option<i64>) -> u32 {
    match count {
        Some(count) if count < 0 => {
            tracing::warn!("sale {id} has a negative order count {count}, using 0");
            0
        }
        Some(count) => u32::try_from(count).unwrap_or(u32::MAX),
        None => 0,
    }
}

fn clean_amount(id: i64, field: &str, amount: Option<i64>) -> i64 {
    match amount {
        Some(amount) if amount < 0 => {
            tracing::warn!("sale {id} has a negative {field} amount {amount}, using 0");
            0
        }
        Some(amount) => amount,
        None => 0,
    }
}
