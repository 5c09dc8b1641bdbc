use serde::{Deserialize, Serialize};

use super::series::{PricePoint, StockSeries};

// ---------------------------------------------------------------------------
// Wire payloads returned by the REST surface
// ---------------------------------------------------------------------------

/// `GET /api/portfolio/{userId}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioValueResponse {
    pub total_portfolio_value: f64,
}

/// `GET /api/portfolio/{userId}/roi` and the per-symbol ROI endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiResponse {
    pub roi: f64,
}

/// One element of `GET /api/user/{userId}/portfolio/stocks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStock {
    pub symbol: String,
    pub data: Vec<PricePoint>,
    pub last_closing_price: f64,
}

/// `GET /api/user/{userId}/portfolio/stock/{symbol}/performance`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub historical_prices: Vec<PricePoint>,
}

/// `GET /api/user/{userId}/portfolio/stock/{symbol}/details`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResponse {
    pub quantity: f64,
    pub total_value: f64,
}

// ---------------------------------------------------------------------------
// Domain values held by widgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub total_value: f64,
}

impl From<PortfolioValueResponse> for PortfolioSnapshot {
    fn from(resp: PortfolioValueResponse) -> Self {
        Self {
            total_value: resp.total_portfolio_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiRecord {
    pub roi_percent: f64,
}

impl From<RoiResponse> for RoiRecord {
    fn from(resp: RoiResponse) -> Self {
        Self {
            roi_percent: resp.roi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub symbol: String,
    pub last_closing_price: f64,
}

impl StockSummary {
    /// Route to this holding's detail view.
    pub fn detail_route(&self) -> String {
        crate::routes::details_path(&self.symbol)
    }
}

impl From<&PortfolioStock> for StockSummary {
    fn from(stock: &PortfolioStock) -> Self {
        Self {
            symbol: stock.symbol.clone(),
            last_closing_price: stock.last_closing_price,
        }
    }
}

impl From<PortfolioStock> for StockSeries {
    fn from(stock: PortfolioStock) -> Self {
        Self {
            symbol: stock.symbol,
            points: stock.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetail {
    pub symbol: String,
    pub quantity: f64,
    pub total_value: f64,
}

impl AssetDetail {
    pub fn from_response(symbol: &str, resp: DetailsResponse) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity: resp.quantity,
            total_value: resp.total_value,
        }
    }
}
