//! Premium recap is the back-office engine for a premium-app subscription
//! reseller.
//!
//! It turns a snapshot of sale records into the numbers an admin dashboard
//! shows: period totals, a time-bucketed revenue series, the best selling
//! application, and the subscriptions that are about to run out.
//!
//! Every aggregation is a pure function of the records, the requested
//! period/granularity and an injected reference instant. Loading records,
//! rendering charts and everything else around the engine is done by
//! collaborators that talk to it through [RecordSource] and plain data.

#![warn(missing_docs)]

mod bucket;
mod charts;
mod clock;
mod config;
mod currency;
mod dashboard;
mod db;
mod expiry;
mod history;
mod locale;
mod logging;
mod normalize;
mod period;
mod report;
mod sale;
mod source;
mod summary;
mod timezone;

pub use bucket::{
    Bucket, BucketMap, DAY_WINDOW, Granularity, bucket_key, bucket_series, bucketize,
    sort_buckets,
};
pub use charts::{order_share_chart, revenue_chart};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{OutputFormat, RecapConfig};
pub use currency::format_rupiah;
pub use dashboard::{
    DashboardCache, DashboardOptions, DashboardView, Snapshot, build_dashboard,
};
pub use db::{
    NewSale, create_application, create_sale, get_all_applications, get_sales_for_owner,
    initialize as initialize_db,
};
pub use expiry::{
    DEFAULT_HORIZON_DAYS, expiry_instant, find_expired, find_expiring_soon, is_expiring_soon,
};
pub use history::{History, HistoryQuery, HistoryRow, HistoryTotals, build_history};
pub use locale::Locale;
pub use logging::init_logging;
pub use normalize::{normalize, normalize_all, parse_created_at};
pub use period::{Period, filter_by_period};
pub use report::{render_history_report, render_text_report};
pub use sale::{
    Application, ApplicationId, Catalog, DurationKind, LIFETIME_END, OwnerId, RawSaleRecord,
    SaleId, SaleRecord, compute_period_end,
};
pub use source::{RecordSource, SqliteRecordSource, load_snapshot};
pub use summary::{CategoryCount, Summary, count_by_category, summarize};
pub use timezone::get_local_offset;

/// The errors that may occur in the application.
///
/// Malformed sale data is not an error: records with unusable timestamps are
/// excluded from date-keyed views and logged instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A month bucket label used a month name that the configured locale
    /// does not know, so it cannot be placed in chronological order.
    #[error("unrecognised month in bucket key \"{0}\"")]
    UnknownMonthKey(String),

    /// A bucket label could not be split into its calendar parts.
    #[error("malformed bucket key \"{0}\"")]
    InvalidBucketKey(String),

    /// The locale identifier does not match any built-in month-name table.
    #[error("unsupported locale \"{0}\"")]
    UnknownLocale(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A period, granularity or output option could not be parsed.
    #[error("invalid option \"{0}\"")]
    InvalidOption(String),

    /// A subscription duration name could not be parsed.
    #[error("invalid subscription duration \"{0}\"")]
    InvalidDuration(String),

    /// The record store could not be reached or returned an error.
    ///
    /// The dashboard never sees this error, [load_snapshot] replaces the
    /// failed fetch with an empty record set.
    #[error("could not fetch records: {0}")]
    UpstreamFetch(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The logging subscriber could not be installed.
    #[error("could not set up logging: {0}")]
    Logging(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
