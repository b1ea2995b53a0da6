//! Dashboard composition: summary cards, the revenue series and expiry lists.
//!
//! The summary cards and the chart are filtered independently. Cards use
//! [DashboardOptions::card_period], the chart uses
//! [DashboardOptions::chart_period], which by default follows the chart
//! granularity: the daily chart shows the seven days it has buckets for, the
//! monthly and yearly charts show every month or year that has sales.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time, UtcOffset};

use crate::{
    Error,
    bucket::{BucketMap, Granularity, bucket_series},
    expiry::{DEFAULT_HORIZON_DAYS, find_expired, find_expiring_soon},
    locale::Locale,
    period::{Period, filter_by_period},
    sale::{Catalog, SaleRecord},
    summary::{Summary, summarize},
};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// An immutable set of normalized records and the catalog to resolve them.
///
/// Each snapshot gets a unique generation number, which identifies it in
/// the [DashboardCache].
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    records: Vec<SaleRecord>,
    catalog: Catalog,
}

impl Snapshot {
    /// Create a snapshot with a fresh generation number.
    pub fn new(records: Vec<SaleRecord>, catalog: Catalog) -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            records,
            catalog,
        }
    }

    /// The number identifying this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All records, including those without a valid creation date.
    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    /// The application catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// The periods and granularity the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DashboardOptions {
    /// The period the summary cards are computed over.
    pub card_period: Period,
    /// The chart's bucket size.
    pub granularity: Granularity,
    /// The period the chart is computed over. `None` picks the default for
    /// the granularity, see [DashboardOptions::chart_period].
    pub chart_period: Option<Period>,
    /// How many days ahead to look for expiring subscriptions.
    pub horizon_days: u32,
}

impl DashboardOptions {
    /// The period the chart is computed over.
    pub fn chart_period(&self) -> Period {
        self.chart_period.unwrap_or(match self.granularity {
            Granularity::Day => Period::Week,
            Granularity::Month | Granularity::Year => Period::All,
        })
    }
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            card_period: Period::Month,
            granularity: Granularity::Month,
            chart_period: None,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

/// Everything the dashboard displays, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// The period the summary was computed over.
    pub card_period: Period,
    /// The period the series was computed over.
    pub chart_period: Period,
    /// The series' bucket size.
    pub granularity: Granularity,
    /// Totals and the best selling application.
    pub summary: Summary,
    /// Revenue per time bucket, in calendar order.
    pub series: BucketMap,
    /// Subscriptions ending within the horizon.
    pub expiring: Vec<SaleRecord>,
    /// Subscriptions that have already ended.
    pub expired: Vec<SaleRecord>,
}

/// Compute the dashboard for `snapshot` as seen at `reference`.
///
/// # Errors
/// Returns [Error::UnknownMonthKey] if the monthly series cannot be sorted
/// with `locale`'s month-name table.
pub fn build_dashboard(
    snapshot: &Snapshot,
    options: &DashboardOptions,
    reference: OffsetDateTime,
    locale: &Locale,
) -> Result<DashboardView, Error> {
    let records = snapshot.records();
    let chart_period = options.chart_period();

    let card_records = filter_by_period(records, options.card_period, reference);
    let summary = summarize(card_records, snapshot.catalog(), locale);

    let chart_records = filter_by_period(records, chart_period, reference);
    let series = bucket_series(chart_records, options.granularity, reference, locale)?;

    let expiring = find_expiring_soon(records, reference, options.horizon_days)
        .into_iter()
        .cloned()
        .collect();
    let expired = find_expired(records, reference)
        .into_iter()
        .cloned()
        .collect();

    Ok(DashboardView {
        card_period: options.card_period,
        chart_period,
        granularity: options.granularity,
        summary,
        series,
        expiring,
        expired,
    })
}

/// The parts of the reference instant a view depends on.
///
/// Periods, buckets and expiry dates are all whole local days, so any two
/// instants on the same local day give the same view. The one exception is
/// local midnight itself, where a subscription ending that day is still
/// expiring rather than expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    options: DashboardOptions,
    date: Date,
    offset: UtcOffset,
    at_midnight: bool,
}

impl CacheKey {
    fn new(options: DashboardOptions, reference: OffsetDateTime) -> Self {
        Self {
            options,
            date: reference.date(),
            offset: reference.offset(),
            at_midnight: reference.time() == Time::MIDNIGHT,
        }
    }

    fn same_day(&self, other: &CacheKey) -> bool {
        self.date == other.date && self.offset == other.offset
    }
}

/// Remembers dashboard views for the most recent snapshot.
///
/// Views are keyed on the options and the reference instant's local day.
/// Handing the cache a snapshot with a different generation drops every
/// remembered view, and building a view for a new day drops the views for
/// other days.
#[derive(Debug)]
pub struct DashboardCache {
    locale: Locale,
    generation: Option<u64>,
    views: HashMap<CacheKey, DashboardView>,
}

impl DashboardCache {
    /// Create an empty cache that formats labels with `locale`.
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            generation: None,
            views: HashMap::new(),
        }
    }

    /// Return the remembered view or build and remember a new one.
    ///
    /// # Errors
    /// Returns the same errors as [build_dashboard]. Failures are not cached.
    pub fn get_or_build(
        &mut self,
        snapshot: &Snapshot,
        options: &DashboardOptions,
        reference: OffsetDateTime,
    ) -> Result<&DashboardView, Error> {
        if self.generation != Some(snapshot.generation()) {
            self.views.clear();
            self.generation = Some(snapshot.generation());
        }

        let key = CacheKey::new(*options, reference);
        if !self.views.contains_key(&key) {
            self.views.retain(|cached, _| cached.same_day(&key));
        }

        match self.views.entry(key) {
            Entry::Occupied(entry) => {
                tracing::debug!("dashboard cache hit for snapshot {}", snapshot.generation());
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let view = build_dashboard(snapshot, options, reference, &self.locale)?;
                Ok(entry.insert(view))
            }
        }
    }

    /// The number of remembered views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no views are remembered.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::datetime};

    use super::{DashboardCache, DashboardOptions, Snapshot, build_dashboard};
    use crate::{
        bucket::Granularity,
        locale::Locale,
        normalize::normalize_all,
        period::Period,
        sale::{Application, Catalog, RawSaleRecord, SaleRecord},
    };

    fn snapshot() -> Snapshot {
        let records = normalize_all(vec![
            RawSaleRecord {
                id: 1,
                application_id: Some(1),
                cost_amount: Some(60_000),
                sale_amount: Some(100_000),
                period_end: Some("2024-03-18".to_owned()),
                created_at: Some("2024-03-15T09:00:00+07:00".to_owned()),
                ..Default::default()
            },
            RawSaleRecord {
                id: 2,
                application_id: Some(2),
                cost_amount: Some(30_000),
                sale_amount: Some(50_000),
                period_end: Some("2024-03-01".to_owned()),
                created_at: Some("2024-02-04T09:00:00+07:00".to_owned()),
                ..Default::default()
            },
            RawSaleRecord {
                id: 3,
                application_id: Some(1),
                sale_amount: Some(20_000),
                created_at: Some("2023-11-20T09:00:00+07:00".to_owned()),
                ..Default::default()
            },
        ]);
        let catalog = Catalog::new(vec![
            Application {
                id: 1,
                display_name: "Netflix".to_owned(),
            },
            Application {
                id: 2,
                display_name: "Spotify".to_owned(),
            },
        ]);

        Snapshot::new(records, catalog)
    }

    fn ids(records: &[SaleRecord]) -> Vec<i64> {
        records.iter().map(|record| record.id).collect()
    }

    #[test]
    fn chart_period_defaults_follow_granularity() {
        let daily = DashboardOptions {
            granularity: Granularity::Day,
            ..Default::default()
        };
        let yearly = DashboardOptions {
            granularity: Granularity::Year,
            ..Default::default()
        };
        let overridden = DashboardOptions {
            chart_period: Some(Period::Year),
            ..Default::default()
        };

        assert_eq!(daily.chart_period(), Period::Week);
        assert_eq!(yearly.chart_period(), Period::All);
        assert_eq!(overridden.chart_period(), Period::Year);
    }

    #[test]
    fn cards_and_chart_are_filtered_independently() {
        let reference = datetime!(2024-03-15 12:00 +07:00);

        let view = build_dashboard(
            &snapshot(),
            &DashboardOptions::default(),
            reference,
            &Locale::english(),
        )
        .unwrap();

        assert_eq!(view.summary.total_revenue, 100_000);
        assert_eq!(view.summary.total_profit, 40_000);
        assert_eq!(view.summary.top_category.name, "Netflix");
        assert_eq!(view.series.labels(), vec!["Nov 2023", "Feb 2024", "Mar 2024"]);
        assert_eq!(view.series.total(), 170_000);
    }

    #[test]
    fn expiry_lists_ignore_the_card_period() {
        let reference = datetime!(2024-03-15 12:00 +07:00);
        let options = DashboardOptions {
            card_period: Period::Day,
            ..Default::default()
        };

        let view = build_dashboard(&snapshot(), &options, reference, &Locale::english()).unwrap();

        assert_eq!(ids(&view.expiring), vec![1]);
        assert_eq!(ids(&view.expired), vec![2]);
    }

    #[test]
    fn daily_chart_has_a_full_week() {
        let reference = datetime!(2024-03-15 12:00 +07:00);
        let options = DashboardOptions {
            granularity: Granularity::Day,
            ..Default::default()
        };

        let view = build_dashboard(&snapshot(), &options, reference, &Locale::english()).unwrap();

        assert_eq!(view.series.len(), 7);
        assert_eq!(view.series.get("15/03"), Some(100_000));
    }

    #[test]
    fn daily_chart_counts_sales_from_earlier_in_the_week() {
        let mut records = snapshot().records().to_vec();
        records.extend(normalize_all(vec![
            RawSaleRecord {
                id: 4,
                sale_amount: Some(10_000),
                created_at: Some("2024-03-14T10:00:00+07:00".to_owned()),
                ..Default::default()
            },
            RawSaleRecord {
                id: 5,
                sale_amount: Some(20_000),
                created_at: Some("2024-03-12T10:00:00+07:00".to_owned()),
                ..Default::default()
            },
            RawSaleRecord {
                id: 6,
                sale_amount: Some(40_000),
                created_at: Some("2024-03-08T10:00:00+07:00".to_owned()),
                ..Default::default()
            },
        ]));
        let snapshot = Snapshot::new(records, Catalog::default());
        let options = DashboardOptions {
            granularity: Granularity::Day,
            ..Default::default()
        };

        let view = build_dashboard(
            &snapshot,
            &options,
            datetime!(2024-03-15 12:00 +07:00),
            &Locale::english(),
        )
        .unwrap();

        assert_eq!(view.chart_period, Period::Week);
        assert_eq!(view.series.get("14/03"), Some(10_000));
        assert_eq!(view.series.get("12/03"), Some(20_000));
        assert_eq!(view.series.get("15/03"), Some(100_000));
        assert_eq!(view.series.get("08/03"), None);
        assert_eq!(view.series.len(), 7);
        assert_eq!(view.series.total(), 130_000);
    }

    #[test]
    fn cache_keeps_one_view_per_day_as_the_clock_ticks() {
        let start = datetime!(2024-03-15 10:00 +07:00);
        let options = DashboardOptions::default();
        let snapshot = snapshot();
        let mut cache = DashboardCache::new(Locale::english());

        for second in 0..100 {
            let reference = start + Duration::seconds(second);
            cache.get_or_build(&snapshot, &options, reference).unwrap();
        }
        assert_eq!(cache.len(), 1);

        let next_day = datetime!(2024-03-16 10:00 +07:00);
        cache.get_or_build(&snapshot, &options, next_day).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_tells_midnight_apart_from_later_that_day() {
        let snapshot = snapshot();
        let options = DashboardOptions::default();
        let mut cache = DashboardCache::new(Locale::english());

        let midnight = cache
            .get_or_build(&snapshot, &options, datetime!(2024-03-01 00:00 +07:00))
            .unwrap()
            .clone();
        let morning = cache
            .get_or_build(&snapshot, &options, datetime!(2024-03-01 09:00 +07:00))
            .unwrap()
            .clone();

        assert_eq!(cache.len(), 2);
        assert_eq!(ids(&midnight.expiring), vec![2]);
        assert!(midnight.expired.is_empty());
        assert!(morning.expiring.is_empty());
        assert_eq!(ids(&morning.expired), vec![2]);
    }

    #[test]
    fn cache_reuses_views_until_the_snapshot_changes() {
        let reference = datetime!(2024-03-15 12:00 +07:00);
        let options = DashboardOptions::default();
        let first = snapshot();
        let mut cache = DashboardCache::new(Locale::english());

        let revenue = cache
            .get_or_build(&first, &options, reference)
            .unwrap()
            .summary
            .total_revenue;
        cache.get_or_build(&first, &options, reference).unwrap();
        assert_eq!(cache.len(), 1);

        let yearly = DashboardOptions {
            granularity: Granularity::Year,
            ..options
        };
        cache.get_or_build(&first, &yearly, reference).unwrap();
        assert_eq!(cache.len(), 2);

        let second = Snapshot::new(Vec::new(), Catalog::default());
        let view = cache.get_or_build(&second, &options, reference).unwrap();
        assert_eq!(revenue, 100_000);
        assert_eq!(view.summary.total_revenue, 0);
        assert_eq!(cache.len(), 1);
    }
}
