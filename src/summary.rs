//! Summary card totals and the best selling application.

use serde::Serialize;

use crate::{
    locale::Locale,
    sale::{Catalog, SaleRecord},
};

/// The number of sales counted under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// The application name, or the locale's "other" label.
    pub name: String,
    /// The number of sale records, not units or revenue.
    pub count: usize,
}

/// Totals for the summary cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// The sum of sale amounts.
    pub total_revenue: i64,
    /// The sum of cost amounts.
    pub total_cost: i64,
    /// Revenue minus cost.
    pub total_profit: i64,
    /// The sum of order counts.
    pub total_orders: u64,
    /// The category with the most sales. Ties go to the category seen first.
    pub top_category: CategoryCount,
    /// Sales per category, in the order each category was first seen.
    pub category_counts: Vec<CategoryCount>,
}

/// Count sales per category, keeping first-seen order.
pub fn count_by_category<'a, I>(
    records: I,
    catalog: &Catalog,
    locale: &Locale,
) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut counts: Vec<CategoryCount> = Vec::new();

    for record in records {
        let name = catalog.category_of(record, locale);
        match counts.iter_mut().find(|category| category.name == name) {
            Some(category) => category.count += 1,
            None => counts.push(CategoryCount {
                name: name.to_owned(),
                count: 1,
            }),
        }
    }

    counts
}

/// Compute the summary card totals for an already period-filtered record set.
///
/// An empty record set has zero totals and a top category named with the
/// locale's empty placeholder and a count of zero.
pub fn summarize<'a, I>(records: I, catalog: &Catalog, locale: &Locale) -> Summary
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let records: Vec<&SaleRecord> = records.into_iter().collect();

    let (total_revenue, total_cost, total_orders) =
        records
            .iter()
            .fold((0_i64, 0_i64, 0_u64), |(revenue, cost, orders), record| {
                (
                    revenue.saturating_add(record.sale_amount),
                    cost.saturating_add(record.cost_amount),
                    orders.saturating_add(u64::from(record.order_count)),
                )
            });

    let category_counts = count_by_category(records.iter().copied(), catalog, locale);
    let top_category = top_category(&category_counts).unwrap_or_else(|| CategoryCount {
        name: locale.empty_placeholder().to_owned(),
        count: 0,
    });

    Summary {
        total_revenue,
        total_cost,
        total_profit: total_revenue.saturating_sub(total_cost),
        total_orders,
        top_category,
        category_counts,
    }
}

fn top_category(counts: &[CategoryCount]) -> Option<CategoryCount> {
    counts
        .iter()
        .fold(None, |best: Option<&CategoryCount>, candidate| match best {
            Some(best) if best.count >= candidate.count => Some(best),
            _ => Some(candidate),
        })
        .cloned()
}
