//! The sales history listing: search, the expiring-only toggle and footer totals.

use std::cmp::Ordering;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    expiry::{DEFAULT_HORIZON_DAYS, expiry_instant, is_expiring_soon},
    locale::Locale,
    sale::{Catalog, SaleRecord},
};

/// What the admin asked the history listing for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Case-insensitive text matched against application names and phone numbers.
    pub search: String,
    /// Only list subscriptions that are about to expire.
    pub expiring_only: bool,
    /// How many days ahead counts as "about to expire".
    pub horizon_days: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            expiring_only: false,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

/// One line of the history listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow<'a> {
    /// The sale.
    pub record: &'a SaleRecord,
    /// The application name, or the locale's placeholder.
    pub application_name: &'a str,
    /// Whether the row should be highlighted as about to expire.
    pub expiring_soon: bool,
}

/// Footer totals over the listed rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryTotals {
    /// The sum of order counts.
    pub orders: u64,
    /// The sum of cost amounts.
    pub cost: i64,
    /// The sum of sale amounts.
    pub sale: i64,
}

/// The history listing, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History<'a> {
    /// The matching sales.
    pub rows: Vec<HistoryRow<'a>>,
    /// Totals over `rows`.
    pub totals: HistoryTotals,
}

/// Build the history listing over the full record set.
///
/// Rows are ordered by creation time, newest first. Records without a valid
/// creation time are listed last, in input order.
pub fn build_history<'a>(
    records: &'a [SaleRecord],
    catalog: &'a Catalog,
    query: &HistoryQuery,
    reference: OffsetDateTime,
    locale: &'a Locale,
) -> History<'a> {
    let needle = query.search.trim().to_lowercase();

    let mut rows: Vec<HistoryRow<'a>> = records
        .iter()
        .filter(|record| matches_search(record, catalog, &needle))
        .map(|record| HistoryRow {
            record,
            application_name: catalog
                .resolve(record.application_id)
                .unwrap_or_else(|| locale.empty_placeholder()),
            expiring_soon: record.period_end.is_some_and(|period_end| {
                is_expiring_soon(
                    expiry_instant(period_end, reference.offset()),
                    reference,
                    query.horizon_days,
                )
            }),
        })
        .filter(|row| !query.expiring_only || row.expiring_soon)
        .collect();

    rows.sort_by(|a, b| newest_first(a.record, b.record));

    let totals = rows.iter().fold(HistoryTotals::default(), |totals, row| {
        HistoryTotals {
            orders: totals.orders.saturating_add(u64::from(row.record.order_count)),
            cost: totals.cost.saturating_add(row.record.cost_amount),
            sale: totals.sale.saturating_add(row.record.sale_amount),
        }
    });

    History { rows, totals }
}

/// `needle` must already be lowercase. An empty needle matches everything.
fn matches_search(record: &SaleRecord, catalog: &Catalog, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    let name_matches = catalog
        .resolve(record.application_id)
        .is_some_and(|name| name.to_lowercase().contains(needle));

    name_matches || record.buyer_phone.to_lowercase().contains(needle)
}

fn newest_first(a: &SaleRecord, b: &SaleRecord) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
