//! Client-side data layer for a portfolio dashboard.
//!
//! Acquires portfolio data from the REST backend, converts price history into
//! chart series, and tracks each widget's load state independently. Rendering
//! is left to the caller, which reads widget snapshots.
//!
//! # Quick start
//!
//! ```no_run
//! use portfolio_dashboard::{PortfolioDashboard, Screen};
//!
//! # async fn run() -> portfolio_dashboard::Result<()> {
//! let app = PortfolioDashboard::builder()
//!     .base_url("http://localhost:5000")
//!     .build()?;
//!
//! if let Screen::Dashboard(dashboard) = app.navigate("/") {
//!     let view = dashboard.view();
//!     println!("{:?}", view.total_value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod detail;
pub mod error;
pub mod format;
pub mod models;
pub mod routes;
pub mod series;
pub mod session;
pub mod widget;

pub use auth::{AuthGate, RootView};
pub use client::{Endpoint, HttpResponse, PortfolioClient, ReqwestTransport, Transport};
pub use dashboard::{DashboardOrchestrator, DashboardView};
pub use detail::{DetailOrchestrator, DetailView};
pub use error::{DashboardError, Result};
pub use routes::Route;
pub use series::to_chart_series;
pub use session::{FileSessionStore, MemorySession, Session, SessionProvider};
pub use widget::{StateCell, Ticket, Widget, WidgetState};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

// ---------------------------------------------------------------------------
// PortfolioDashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PortfolioDashboard`].
pub struct PortfolioDashboardBuilder {
    base_url: Option<String>,
    timeout: Duration,
    session: Option<Arc<dyn SessionProvider>>,
    transport: Option<Arc<dyn Transport>>,
}

impl Default for PortfolioDashboardBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
            session: None,
            transport: None,
        }
    }
}

impl PortfolioDashboardBuilder {
    /// Set the API base URL.
    ///
    /// Defaults to `$PORTFOLIO_API_BASE_URL`, falling back to
    /// [`config::DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the per-request timeout of the default HTTP transport.
    ///
    /// Defaults to 30 seconds. Ignored when a custom transport is supplied.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supply the session source.
    ///
    /// Defaults to a [`FileSessionStore`] at the platform data directory.
    pub fn session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(session);
        self
    }

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<PortfolioDashboard> {
        let base_url = self.base_url.unwrap_or_else(config::default_base_url);
        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new(self.timeout)?),
        };
        let client = PortfolioClient::with_transport(&base_url, transport)?;
        let session = self
            .session
            .unwrap_or_else(|| Arc::new(FileSessionStore::at_default_location()));
        Ok(PortfolioDashboard {
            client: Arc::new(client),
            session,
        })
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// The view a navigation mounted.
pub enum Screen {
    Dashboard(DashboardOrchestrator),
    Detail(DetailOrchestrator),
    Login,
    Register,
    NotFound(String),
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Dashboard(_) => write!(f, "Screen::Dashboard"),
            Screen::Detail(d) => write!(f, "Screen::Detail({:?})", d.symbol()),
            Screen::Login => write!(f, "Screen::Login"),
            Screen::Register => write!(f, "Screen::Register"),
            Screen::NotFound(path) => write!(f, "Screen::NotFound({path})"),
        }
    }
}

// ---------------------------------------------------------------------------
// PortfolioDashboard
// ---------------------------------------------------------------------------

/// Entry point wiring the client, the session source and the auth gate.
pub struct PortfolioDashboard {
    client: Arc<PortfolioClient>,
    session: Arc<dyn SessionProvider>,
}

impl PortfolioDashboard {
    pub fn builder() -> PortfolioDashboardBuilder {
        PortfolioDashboardBuilder::default()
    }

    pub fn client(&self) -> &Arc<PortfolioClient> {
        &self.client
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    pub fn auth_gate(&self) -> AuthGate {
        AuthGate::new(Arc::clone(&self.session))
    }

    /// Mount the overview and start its widgets.
    ///
    /// Fetches run on the current Tokio runtime. Outside a runtime nothing is
    /// requested and every widget settles as `Failed`; the same holds for
    /// [`mount_detail`](Self::mount_detail) and [`navigate`](Self::navigate).
    pub fn mount_dashboard(&self) -> DashboardOrchestrator {
        DashboardOrchestrator::mount(Arc::clone(&self.client), Arc::clone(&self.session))
    }

    pub fn mount_detail(&self, symbol: Option<&str>) -> DetailOrchestrator {
        DetailOrchestrator::mount(Arc::clone(&self.client), Arc::clone(&self.session), symbol)
    }

    /// Resolve `path` through the auth gate and mount whatever it names.
    ///
    /// See [`mount_dashboard`](Self::mount_dashboard) for behaviour outside a
    /// Tokio runtime.
    pub fn navigate(&self, path: &str) -> Screen {
        let route = self.auth_gate().resolve(path);
        debug!(path, ?route, "navigate");
        match route {
            Route::Dashboard => Screen::Dashboard(self.mount_dashboard()),
            Route::Details { symbol } => Screen::Detail(self.mount_detail(symbol.as_deref())),
            Route::Login => Screen::Login,
            Route::Register => Screen::Register,
            Route::NotFound(p) => Screen::NotFound(p),
            // resolve() never yields Root
            Route::Root => Screen::Login,
        }
    }
}

impl fmt::Display for PortfolioDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PortfolioDashboard(base_url={}, authenticated={})",
            self.client.base_url(),
            self.auth_gate().is_authenticated()
        )
    }
}
