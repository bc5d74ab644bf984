//! Rendering of estimate values into report cells.
//!
//! There are two ways a value can be unknown and they render differently:
//! - the enclosing sub-object is missing entirely ([`NO_ESTIMATE`])
//! - the sub-object is present but its numeric field is missing ([`UNKNOWN_VALUE`])

use crate::estimate::{KeywordEstimate, Money, StatsEstimate};

/// The service produced no estimate object for this metric.
pub const NO_ESTIMATE: &str = "none1";
/// The estimate object exists but its value was computed as unknown.
pub const UNKNOWN_VALUE: &str = "none2";

const MICROS_PER_UNIT: f64 = 1_000_000.0;

/// Column names appended after the input headers, in cell order.
pub const ESTIMATE_COLUMNS: [&str; 10] = [
    "Est Min CPC",
    "Est Max CPC",
    "Est Min Pos",
    "Est Max Pos",
    "Est Min Click",
    "Est Max Click",
    "Est Min Cost",
    "Est Max Cost",
    "Est Min Imp",
    "Est Max Imp",
];

/// Render a micro-unit amount with two fractional digits: `2500000` → `"2.50"`.
pub fn format_micros(micros: i64) -> String {
    format!("{:.2}", micros as f64 / MICROS_PER_UNIT)
}

/// Render an unscaled metric with two fractional digits.
pub fn format_metric(value: f64) -> String {
    format!("{value:.2}")
}

/// Render a monetary `(min, max)` pair.
///
/// The pair is checked as a unit: if either bound lacks its money object both cells are
/// [`NO_ESTIMATE`], and if either object lacks its amount both cells are [`UNKNOWN_VALUE`].
pub fn money_pair(min: Option<&Money>, max: Option<&Money>) -> [String; 2] {
    match (min, max) {
        (Some(min), Some(max)) => match (min.micro_amount, max.micro_amount) {
            (Some(min), Some(max)) => [format_micros(min), format_micros(max)],
            _ => [UNKNOWN_VALUE.to_string(), UNKNOWN_VALUE.to_string()],
        },
        _ => [NO_ESTIMATE.to_string(), NO_ESTIMATE.to_string()],
    }
}

/// Render one bound of a non-monetary metric.
///
/// `stats` is the enclosing min or max estimate; `value` picks the metric out of it.
pub fn metric(stats: Option<&StatsEstimate>, value: impl Fn(&StatsEstimate) -> Option<f64>) -> String {
    match stats {
        None => NO_ESTIMATE.to_string(),
        Some(stats) => value(stats).map(format_metric).unwrap_or_else(|| UNKNOWN_VALUE.to_string()),
    }
}

/// The ten estimate cells for one keyword, in [`ESTIMATE_COLUMNS`] order.
pub fn estimate_cells(estimate: &KeywordEstimate) -> [String; 10] {
    let min = estimate.min.as_ref();
    let max = estimate.max.as_ref();

    let [min_cpc, max_cpc] = money_pair(
        min.and_then(|s| s.average_cpc.as_ref()),
        max.and_then(|s| s.average_cpc.as_ref()),
    );
    let [min_cost, max_cost] = money_pair(
        min.and_then(|s| s.total_cost.as_ref()),
        max.and_then(|s| s.total_cost.as_ref()),
    );

    [
        min_cpc,
        max_cpc,
        metric(min, |s| s.average_position),
        metric(max, |s| s.average_position),
        metric(min, |s| s.clicks_per_day),
        metric(max, |s| s.clicks_per_day),
        min_cost,
        max_cost,
        metric(min, |s| s.impressions_per_day),
        metric(max, |s| s.impressions_per_day),
    ]
}
