use std::error::Error;
use std::process::exit;
use std::sync::{Arc, Mutex};

use charming::Chart;
use clap::Parser;
use rusqlite::Connection;
use serde::Serialize;

use premium_recap::{
    Clock, OutputFormat, RecapConfig, SqliteRecordSource, build_dashboard, build_history,
    init_logging, load_snapshot, order_share_chart, render_history_report, render_text_report,
    revenue_chart,
};

#[derive(Serialize)]
struct ChartOptions {
    revenue: Chart,
    orders: Chart,
}

/// Print the sales dashboard or history for one admin.
fn main() -> Result<(), Box<dyn Error>> {
    let config = RecapConfig::parse();

    init_logging(config.debug_log.as_deref())?;

    if !config.db_path.is_file() {
        eprintln!("No database found at {:#?}", config.db_path);
        exit(1);
    }

    let locale = config.locale()?;
    let reference = config.clock()?.now();
    tracing::debug!("using reference instant {reference}");

    let connection = Connection::open(&config.db_path)?;
    let source = SqliteRecordSource::new(Arc::new(Mutex::new(connection)));
    let snapshot = load_snapshot(&source, config.owner_id);
    tracing::info!(
        "loaded {} sales for owner {}",
        snapshot.records().len(),
        config.owner_id
    );

    if config.history {
        let query = config.history_query();
        let history = build_history(
            snapshot.records(),
            snapshot.catalog(),
            &query,
            reference,
            &locale,
        );

        match config.format {
            OutputFormat::Text => print!("{}", render_history_report(&history, &locale)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&history)?),
            OutputFormat::Chart => {
                eprintln!("Chart output is only available for the dashboard.");
                exit(1);
            }
        }

        return Ok(());
    }

    let view = build_dashboard(&snapshot, &config.dashboard_options(), reference, &locale)?;

    match config.format {
        OutputFormat::Text => print!(
            "{}",
            render_text_report(&view, snapshot.catalog(), &locale)
        ),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Chart => {
            let charts = ChartOptions {
                revenue: revenue_chart(&view.series, view.granularity),
                orders: order_share_chart(&view.summary.category_counts),
            };
            println!("{}", serde_json::to_string_pretty(&charts)?);
        }
    }

    Ok(())
}
