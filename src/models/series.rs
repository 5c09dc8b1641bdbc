use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PricePoint / StockSeries: raw time series as the server sends it
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: impl Into<String>, price: f64) -> Self {
        Self {
            date: date.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

// ---------------------------------------------------------------------------
// ChartSeries: chart-ready (epoch-ms, price) pairs
// ---------------------------------------------------------------------------

/// Serializes as `{"name": "AAPL", "data": [[1704067200000, 10.0], ...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<(i64, f64)>,
}
