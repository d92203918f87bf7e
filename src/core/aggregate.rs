use crate::domain::model::{
    CategoryTotal, ChartData, HeatmapData, HourTotal, KpiSummary, SalesRecord, SalesSeries,
};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Headline KPIs for the filtered selection. Empty input yields zeros.
pub fn kpi_summary(records: &[SalesRecord]) -> KpiSummary {
    if records.is_empty() {
        return KpiSummary::default();
    }

    let count = records.len();
    let total_sales: f64 = records.iter().map(|r| r.total).sum();
    let average_rating = records.iter().map(|r| r.rating).sum::<f64>() / count as f64;
    let average_rating = round_to(average_rating, 1);

    KpiSummary {
        record_count: count,
        total_sales: round_to(total_sales, 2),
        average_rating,
        star_count: average_rating.round().max(0.0) as u32,
        average_sale_per_transaction: round_to(total_sales / count as f64, 2),
    }
}

/// Sales summed per product line, ascending by total (the bar chart order).
pub fn sales_by_product_line(records: &[SalesRecord]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.product_line.clone()).or_default() += record.total;
    }

    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(label, total)| CategoryTotal {
            label,
            total: round_to(total, 2),
        })
        .collect();
    result.sort_by(|a, b| {
        a.total
            .partial_cmp(&b.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    result
}

/// Highest-revenue product lines first, truncated to `n`.
pub fn top_product_lines(records: &[SalesRecord], n: usize) -> Vec<CategoryTotal> {
    let mut result = sales_by_product_line(records);
    result.reverse();
    result.truncate(n);
    result
}

/// Sales summed per hour of day, over the hours present in the data.
pub fn sales_by_hour(records: &[SalesRecord]) -> Vec<HourTotal> {
    let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
    for record in records {
        *totals.entry(record.hour()).or_default() += record.total;
    }

    totals
        .into_iter()
        .map(|(hour, total)| HourTotal {
            hour,
            total: round_to(total, 2),
        })
        .collect()
}

/// Hour rows against a fixed Monday..Sunday column order, zero-filled where
/// no transactions fall.
pub fn hour_weekday_heatmap(records: &[SalesRecord]) -> HeatmapData {
    let mut cells: BTreeMap<u32, [f64; 7]> = BTreeMap::new();
    for record in records {
        let weekday = record.date.weekday().num_days_from_monday() as usize;
        let row = cells.entry(record.hour()).or_insert([0.0; 7]);
        row[weekday] += record.total;
    }

    let hours: Vec<u32> = cells.keys().copied().collect();
    let values: Vec<Vec<f64>> = cells
        .values()
        .map(|row| row.iter().map(|&v| round_to(v, 2)).collect())
        .collect();

    HeatmapData {
        hours,
        weekdays: WEEKDAY_ORDER.iter().map(|d| d.to_string()).collect(),
        values,
    }
}

pub fn chart_data(records: &[SalesRecord], top_n: usize) -> ChartData {
    ChartData {
        sales_by_product_line: sales_by_product_line(records),
        top_product_lines: top_product_lines(records, top_n),
        sales_by_hour: sales_by_hour(records),
        hour_weekday_heatmap: hour_weekday_heatmap(records),
    }
}

/// Sum values per date, then fill every day from the first to the last date
/// with 0.0 where nothing was recorded. Returns None on empty input.
pub fn resample_points<I>(points: I) -> Option<SalesSeries>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in points {
        *daily.entry(date).or_default() += value;
    }

    let (&start, _) = daily.first_key_value()?;
    let (&end, _) = daily.last_key_value()?;

    let mut values = Vec::new();
    let mut day = start;
    while day <= end {
        values.push(daily.get(&day).copied().unwrap_or(0.0));
        day = day.succ_opt()?;
    }

    Some(SalesSeries { start, values })
}

/// Daily sales total series for the forecaster.
pub fn resample_daily(records: &[SalesRecord]) -> Option<SalesSeries> {
    resample_points(records.iter().map(|r| (r.date, r.total)))
}
