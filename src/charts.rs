//! ECharts configurations for the revenue series and the order share.
//!
//! Charts are returned as [Chart] values; call `to_string()` for the JSON
//! option object that the frontend hands to `echarts.setOption`.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Line, Pie},
};

use crate::{
    bucket::{BucketMap, Granularity},
    summary::CategoryCount,
};

/// A line chart of revenue per bucket, in the order the buckets are given.
pub fn revenue_chart(series: &BucketMap, granularity: Granularity) -> Chart {
    let title = match granularity {
        Granularity::Day => "Daily revenue",
        Granularity::Month => "Monthly revenue",
        Granularity::Year => "Yearly revenue",
    };
    let values: Vec<f64> = series.values().into_iter().map(|value| value as f64).collect();

    Chart::new()
        .title(Title::new().text(title))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .value_formatter(rupiah_formatter())
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(series.labels()))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(rupiah_formatter())),
        )
        .series(Line::new().name("Revenue").data(values))
}

/// A pie chart of order counts per application.
pub fn order_share_chart(counts: &[CategoryCount]) -> Chart {
    let data: Vec<(f64, &str)> = counts
        .iter()
        .map(|category| (category.count as f64, category.name.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Orders by application"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().left("left").top("bottom"))
        .series(Pie::new().name("Orders").radius("60%").data(data))
}

#[inline]
fn rupiah_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const rupiahFormatter = new Intl.NumberFormat('id-ID', {
              style: 'currency',
              currency: 'IDR',
              maximumFractionDigits: 0
            });
            return (number) ? rupiahFormatter.format(number) : \"-\";",
    )
}
