//! Conversion of raw price history into chart-ready series.
//!
//! Dates are ISO-8601. Strings carrying an offset (RFC 3339) honour it; date-only
//! and naive date-time strings are read as UTC so the same payload yields the
//! same timestamps on every machine.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{DashboardError, Result};
use crate::models::{ChartSeries, PricePoint, StockSeries};

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 date into epoch milliseconds.
pub fn parse_date_millis(date: &str) -> Option<i64> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return day
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(date, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Inverse of [`parse_date_millis`] for UTC timestamps.
pub fn millis_to_date(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

/// Convert one point; `symbol` and `index` only label the error.
pub fn to_chart_point(symbol: &str, index: usize, point: &PricePoint) -> Result<(i64, f64)> {
    let millis = parse_date_millis(&point.date).ok_or_else(|| DashboardError::MalformedPoint {
        symbol: symbol.to_string(),
        index,
        date: point.date.clone(),
    })?;
    Ok((millis, point.price))
}

/// Convert a single series, failing on the first unparsable date.
pub fn series_to_chart(series: &StockSeries) -> Result<ChartSeries> {
    let data = series
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| to_chart_point(&series.symbol, i, p))
        .collect::<Result<Vec<_>>>()?;
    Ok(ChartSeries {
        name: series.symbol.clone(),
        data,
    })
}

/// Convert every series, preserving series and point order.
///
/// Any malformed point fails the whole conversion; no partial chart is returned.
pub fn to_chart_series(raw: &[StockSeries]) -> Result<Vec<ChartSeries>> {
    raw.iter().map(series_to_chart).collect()
}
