//! Plain text rendering of the dashboard and the sales history.

use crate::{
    currency::format_rupiah,
    dashboard::DashboardView,
    history::History,
    locale::Locale,
    sale::{Catalog, SaleRecord},
};

const LABEL_WIDTH: usize = 14;

/// Render the dashboard as a text report.
pub fn render_text_report(view: &DashboardView, catalog: &Catalog, locale: &Locale) -> String {
    let summary = &view.summary;
    let mut lines = vec![
        format!("Summary ({})", view.card_period),
        format!(
            "{:<LABEL_WIDTH$}{}",
            "Revenue",
            format_rupiah(summary.total_revenue)
        ),
        format!("{:<LABEL_WIDTH$}{}", "Cost", format_rupiah(summary.total_cost)),
        format!(
            "{:<LABEL_WIDTH$}{}",
            "Profit",
            format_rupiah(summary.total_profit)
        ),
        format!("{:<LABEL_WIDTH$}{}", "Orders", summary.total_orders),
        format!(
            "{:<LABEL_WIDTH$}{} ({})",
            "Top seller", summary.top_category.name, summary.top_category.count
        ),
    ];

    if !summary.category_counts.is_empty() {
        lines.push(String::new());
        lines.push("Sales by application".to_owned());
        lines.extend(
            summary
                .category_counts
                .iter()
                .map(|category| format!("  {:<LABEL_WIDTH$}{}", category.name, category.count)),
        );
    }

    lines.push(String::new());
    lines.push(format!(
        "Revenue by {} ({})",
        view.granularity, view.chart_period
    ));
    if view.series.is_empty() {
        lines.push(format!("  {}", locale.empty_placeholder()));
    }
    lines.extend(view.series.buckets().iter().map(|bucket| {
        format!(
            "  {:<LABEL_WIDTH$}{}",
            bucket.label,
            format_rupiah(bucket.total)
        )
    }));

    lines.extend(expiry_section("Expiring soon", &view.expiring, catalog, locale));
    lines.extend(expiry_section("Expired", &view.expired, catalog, locale));

    join_lines(lines)
}

fn expiry_section(
    heading: &str,
    records: &[SaleRecord],
    catalog: &Catalog,
    locale: &Locale,
) -> Vec<String> {
    let mut lines = vec![String::new(), format!("{heading} ({})", records.len())];

    lines.extend(records.iter().map(|record| {
        let period_end = record
            .period_end
            .map(|date| date.to_string())
            .unwrap_or_else(|| locale.empty_placeholder().to_owned());
        let name = catalog
            .resolve(record.application_id)
            .unwrap_or_else(|| locale.empty_placeholder());

        format!(
            "  {period_end}  {name:<LABEL_WIDTH$}{}",
            record.buyer_phone
        )
    }));

    lines
}

/// Render the history listing with its footer totals.
pub fn render_history_report(history: &History<'_>, locale: &Locale) -> String {
    let mut lines: Vec<String> = history
        .rows
        .iter()
        .map(|row| {
            let record = row.record;
            let created = record
                .created_at
                .map(|created_at| created_at.date().to_string())
                .unwrap_or_else(|| locale.empty_placeholder().to_owned());
            let marker = if row.expiring_soon { "!" } else { " " };

            format!(
                "{marker} {created:<10}  {:<LABEL_WIDTH$}{:<LABEL_WIDTH$}{:>4}  {:>14}  {:>14}",
                row.application_name,
                record.buyer_phone,
                record.order_count,
                format_rupiah(record.cost_amount),
                format_rupiah(record.sale_amount),
            )
        })
        .collect();

    lines.push(format!(
        "  {:<10}  {:<LABEL_WIDTH$}{:<LABEL_WIDTH$}{:>4}  {:>14}  {:>14}",
        "Total",
        "",
        "",
        history.totals.orders,
        format_rupiah(history.totals.cost),
        format_rupiah(history.totals.sale),
    ));

    join_lines(lines)
}

fn join_lines(lines: Vec<String>) -> String {
    let mut report = lines.join("\n");
    report.push('\n');
    report
}
