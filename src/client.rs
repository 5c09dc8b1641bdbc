//! Typed client for the portfolio REST surface.
//!
//! Every request carries `Authorization: Bearer <token>`. Requests are never
//! issued without both a token and a user id, and each call makes exactly one
//! attempt; retrying is the caller's decision.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config;
use crate::error::{DashboardError, Result};
use crate::models::{
    AssetDetail, DetailsResponse, PerformanceResponse, PortfolioSnapshot, PortfolioStock,
    PortfolioValueResponse, RoiRecord, RoiResponse, StockSeries,
};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single authenticated GET.
///
/// Implementations return `Err(DashboardError::Transport)` only when no HTTP
/// response was received; any status code is returned as an [`HttpResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, token: &str) -> Result<HttpResponse>;
}

/// [`Transport`] backed by `reqwest` with a bounded request timeout.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::InvalidArgument(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, token: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DashboardError::Transport(format!("request to {url} timed out"))
                } else {
                    DashboardError::Transport(e.to_string())
                }
            })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::Transport(format!("reading body: {e}")))?;
        Ok(HttpResponse { status, body })
    }
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// The fixed set of GET endpoints the dashboard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    PortfolioValue,
    PortfolioRoi,
    PortfolioStocks,
    StockRoi(&'a str),
    StockPerformance(&'a str),
    StockDetails(&'a str),
}

impl<'a> Endpoint<'a> {
    fn symbol(&self) -> Option<&'a str> {
        match *self {
            Endpoint::StockRoi(s) | Endpoint::StockPerformance(s) | Endpoint::StockDetails(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    /// Unencoded path segments; each element becomes exactly one segment.
    pub fn segments<'b>(&self, user_id: &'b str) -> Vec<&'b str>
    where
        'a: 'b,
    {
        match *self {
            Endpoint::PortfolioValue => vec!["api", "portfolio", user_id],
            Endpoint::PortfolioRoi => vec!["api", "portfolio", user_id, "roi"],
            Endpoint::PortfolioStocks => vec!["api", "user", user_id, "portfolio", "stocks"],
            Endpoint::StockRoi(symbol) => {
                vec!["api", "user", user_id, "portfolio", "stock", symbol, "roi"]
            }
            Endpoint::StockPerformance(symbol) => {
                vec!["api", "user", user_id, "portfolio", "stock", symbol, "performance"]
            }
            Endpoint::StockDetails(symbol) => {
                vec!["api", "user", user_id, "portfolio", "stock", symbol, "details"]
            }
        }
    }
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::PortfolioValue => write!(f, "portfolio value"),
            Endpoint::PortfolioRoi => write!(f, "portfolio ROI"),
            Endpoint::PortfolioStocks => write!(f, "portfolio stocks"),
            Endpoint::StockRoi(s) => write!(f, "ROI for {s}"),
            Endpoint::StockPerformance(s) => write!(f, "performance for {s}"),
            Endpoint::StockDetails(s) => write!(f, "details for {s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// PortfolioClient
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PortfolioClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for PortfolioClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortfolioClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl PortfolioClient {
    /// Client against `base_url` using the default `reqwest` transport.
    pub fn new(base_url: &str) -> Result<Self> {
        let transport = ReqwestTransport::new(config::DEFAULT_TIMEOUT)?;
        Self::with_transport(base_url, Arc::new(transport))
    }

    pub fn with_transport(base_url: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DashboardError::InvalidArgument(format!("base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::InvalidArgument(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }
        Ok(Self {
            base_url,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an endpoint; every segment is percent-encoded, so a
    /// symbol containing `/`, `?` or `#` stays inside its own segment.
    ///
    /// `.` and `..` are rejected: the URL serializer would collapse them and
    /// address a different endpoint.
    pub fn url_for(&self, endpoint: Endpoint<'_>, user_id: &str) -> Result<Url> {
        let segments = endpoint.segments(user_id);
        if let Some(dots) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(DashboardError::InvalidArgument(format!(
                "{endpoint}: {dots:?} is not a valid path segment"
            )));
        }
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                DashboardError::InvalidArgument("base URL cannot carry a path".into())
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Issue one GET and return the validated JSON body.
    pub async fn fetch(&self, endpoint: Endpoint<'_>, session: &Session) -> Result<Value> {
        let (token, user_id) = match session.credentials() {
            Some(creds) => creds,
            None => {
                let missing = match (session.token(), session.user_id()) {
                    (None, None) => "token and user ID",
                    (None, Some(_)) => "token",
                    _ => "user ID",
                };
                return Err(DashboardError::MissingCredentials(format!(
                    "{missing} not found for {endpoint}"
                )));
            }
        };
        if let Some(symbol) = endpoint.symbol() {
            if symbol.trim().is_empty() {
                return Err(DashboardError::MissingRouteParam("symbol".into()));
            }
        }

        let url = self.url_for(endpoint, user_id)?;
        debug!(%endpoint, path = url.path(), "GET");

        let response = self.transport.get(&url, token).await?;
        if !response.is_success() {
            let message = server_message(&response.body);
            warn!(%endpoint, status = response.status, ?message, "request failed");
            return Err(DashboardError::Http {
                status: response.status,
                message,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            DashboardError::UnexpectedShape(format!("{endpoint}: body is not JSON ({e})"))
        })
    }

    async fn fetch_as<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint<'_>,
        session: &Session,
    ) -> Result<T> {
        let value = self.fetch(endpoint, session).await?;
        decode(endpoint, value)
    }

    #[instrument(skip(self, session))]
    pub async fn portfolio_value(&self, session: &Session) -> Result<PortfolioSnapshot> {
        let resp: PortfolioValueResponse =
            self.fetch_as(Endpoint::PortfolioValue, session).await?;
        Ok(resp.into())
    }

    #[instrument(skip(self, session))]
    pub async fn portfolio_roi(&self, session: &Session) -> Result<RoiRecord> {
        let resp: RoiResponse = self.fetch_as(Endpoint::PortfolioRoi, session).await?;
        Ok(resp.into())
    }

    #[instrument(skip(self, session))]
    pub async fn portfolio_stocks(&self, session: &Session) -> Result<Vec<PortfolioStock>> {
        let endpoint = Endpoint::PortfolioStocks;
        let value = self.fetch(endpoint, session).await?;
        if !value.is_array() {
            return Err(DashboardError::UnexpectedShape(format!(
                "{endpoint}: expected a list, got {}",
                json_kind(&value)
            )));
        }
        decode(endpoint, value)
    }

    #[instrument(skip(self, session))]
    pub async fn stock_roi(&self, symbol: &str, session: &Session) -> Result<RoiRecord> {
        let resp: RoiResponse = self.fetch_as(Endpoint::StockRoi(symbol), session).await?;
        Ok(resp.into())
    }

    #[instrument(skip(self, session))]
    pub async fn stock_performance(&self, symbol: &str, session: &Session) -> Result<StockSeries> {
        let resp: PerformanceResponse = self
            .fetch_as(Endpoint::StockPerformance(symbol), session)
            .await?;
        Ok(StockSeries {
            symbol: symbol.to_string(),
            points: resp.historical_prices,
        })
    }

    #[instrument(skip(self, session))]
    pub async fn stock_details(&self, symbol: &str, session: &Session) -> Result<AssetDetail> {
        let resp: DetailsResponse = self
            .fetch_as(Endpoint::StockDetails(symbol), session)
            .await?;
        Ok(AssetDetail::from_response(symbol, resp))
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint<'_>, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| DashboardError::UnexpectedShape(format!("{endpoint}: {e}")))
}

/// Pull a `message` (or `error`) string out of an error body, if any.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
