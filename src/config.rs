//! Runtime configuration for the recap command line tool.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    bucket::Granularity,
    clock::SystemClock,
    dashboard::DashboardOptions,
    expiry::DEFAULT_HORIZON_DAYS,
    history::HistoryQuery,
    locale::Locale,
    period::Period,
    sale::OwnerId,
};

/// How the recap is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A plain text report.
    #[default]
    Text,
    /// The dashboard or history as JSON.
    Json,
    /// ECharts option objects for the revenue and order share charts.
    Chart,
}

/// Summarise premium app sales from a SQLite database.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct RecapConfig {
    /// File path to the application SQLite database.
    #[arg(long)]
    pub db_path: PathBuf,

    /// The admin whose sales are summarised.
    #[arg(long, default_value_t = 1)]
    pub owner_id: OwnerId,

    /// Canonical timezone name used for "today", "this month" and expiry.
    #[arg(long, default_value = "Asia/Jakarta")]
    pub timezone: String,

    /// Locale for month names and labels, e.g. "id-ID" or "en-US".
    #[arg(long, default_value = "id-ID")]
    pub locale: String,

    /// How many days ahead to look for expiring subscriptions.
    #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
    pub horizon_days: u32,

    /// The period the summary totals cover: day, week, month, year or all.
    #[arg(long, default_value_t = Period::Month)]
    pub period: Period,

    /// The revenue chart's bucket size: day, month or year.
    #[arg(long, default_value_t = Granularity::Month)]
    pub granularity: Granularity,

    /// The period the revenue chart covers. Defaults to the last seven days
    /// for the daily chart and to all time otherwise.
    #[arg(long)]
    pub chart_period: Option<Period>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the sales history instead of the dashboard.
    #[arg(long)]
    pub history: bool,

    /// Only list history rows whose application or phone number contains this text.
    #[arg(long)]
    pub search: Option<String>,

    /// Only list history rows that are about to expire.
    #[arg(long)]
    pub expiring_only: bool,

    /// Also write debug logs to this file.
    #[arg(long)]
    pub debug_log: Option<PathBuf>,
}

impl RecapConfig {
    /// The configured locale.
    ///
    /// # Errors
    /// Returns [Error::UnknownLocale] if no built-in locale matches.
    pub fn locale(&self) -> Result<Locale, Error> {
        Locale::from_identifier(&self.locale)
    }

    /// The dashboard options selected on the command line.
    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            card_period: self.period,
            granularity: self.granularity,
            chart_period: self.chart_period,
            horizon_days: self.horizon_days,
        }
    }

    /// The history filters selected on the command line.
    pub fn history_query(&self) -> HistoryQuery {
        HistoryQuery {
            search: self.search.clone().unwrap_or_default(),
            expiring_only: self.expiring_only,
            horizon_days: self.horizon_days,
        }
    }

    /// A clock in the configured timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the timezone name is not recognised.
    pub fn clock(&self) -> Result<SystemClock, Error> {
        SystemClock::for_timezone(&self.timezone)
    }
}
