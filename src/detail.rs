//! Per-asset view: ROI, holding value and price history for one symbol.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::PortfolioClient;
use crate::error::DashboardError;
use crate::models::{AssetDetail, ChartSeries, RoiRecord};
use crate::routes::Route;
use crate::series::series_to_chart;
use crate::session::{Session, SessionProvider};
use crate::widget::{Widget, WidgetState};

/// Dependencies shared by every detail widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailParams {
    pub symbol: String,
    pub session: Session,
}

struct DetailWidgets {
    params: DetailParams,
    roi: Widget<DetailParams, RoiRecord>,
    holding: Widget<DetailParams, AssetDetail>,
    history: Widget<DetailParams, ChartSeries>,
}

impl DetailWidgets {
    fn new(client: &Arc<PortfolioClient>, params: DetailParams) -> Self {
        let roi = {
            let client = Arc::clone(client);
            Widget::new("asset_roi", move |p: DetailParams| {
                let client = Arc::clone(&client);
                async move { client.stock_roi(&p.symbol, &p.session).await }
            })
        };
        let holding = {
            let client = Arc::clone(client);
            Widget::new("asset_value", move |p: DetailParams| {
                let client = Arc::clone(&client);
                async move { client.stock_details(&p.symbol, &p.session).await }
            })
        };
        let history = {
            let client = Arc::clone(client);
            Widget::new("asset_history", move |p: DetailParams| {
                let client = Arc::clone(&client);
                async move {
                    let series = client.stock_performance(&p.symbol, &p.session).await?;
                    series_to_chart(&series)
                }
            })
        };
        Self {
            params,
            roi,
            holding,
            history,
        }
    }

    fn fan_out(&mut self, loading: bool) {
        let p = &self.params;
        self.roi.update(loading, p.clone());
        self.holding.update(loading, p.clone());
        self.history.update(loading, p.clone());
    }

    fn unmount(&mut self) {
        self.roi.unmount();
        self.holding.unmount();
        self.history.unmount();
    }
}

/// What the detail page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    /// Route or session incomplete; no widgets were mounted.
    Unavailable(String),
    Loaded {
        symbol: String,
        roi: WidgetState<RoiRecord>,
        holding: WidgetState<AssetDetail>,
        history: WidgetState<ChartSeries>,
    },
}

impl DetailView {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DetailView::Unavailable(_))
    }
}

enum Stage {
    Halted(DashboardError),
    Mounted(DetailWidgets),
}

pub struct DetailOrchestrator {
    client: Arc<PortfolioClient>,
    session: Arc<dyn SessionProvider>,
    loading: bool,
    stage: Stage,
}

impl DetailOrchestrator {
    /// Resolve route and session parameters and, when both are present, mount
    /// and start the three widgets.
    ///
    /// A missing symbol or user id halts the page with a single
    /// [`DashboardError::MissingRouteParam`] instead of mounting widgets.
    pub fn mount(
        client: Arc<PortfolioClient>,
        session: Arc<dyn SessionProvider>,
        symbol: Option<&str>,
    ) -> Self {
        let stage = Self::resolve(&client, session.session(), symbol);
        let mut detail = Self {
            client,
            session,
            loading: true,
            stage,
        };
        // Parameters are resolved at this point.
        detail.set_loading(false);
        detail
    }

    pub fn from_route(
        client: Arc<PortfolioClient>,
        session: Arc<dyn SessionProvider>,
        route: &Route,
    ) -> Self {
        Self::mount(client, session, route.symbol())
    }

    fn resolve(client: &Arc<PortfolioClient>, session: Session, symbol: Option<&str>) -> Stage {
        let symbol = symbol.map(str::trim).filter(|s| !s.is_empty());
        let Some(symbol) = symbol else {
            warn!("detail view without a symbol");
            return Stage::Halted(DashboardError::MissingRouteParam("symbol".into()));
        };
        if session.user_id().is_none() {
            warn!(symbol, "detail view without a user id");
            return Stage::Halted(DashboardError::MissingRouteParam("user ID".into()));
        }
        let params = DetailParams {
            symbol: symbol.to_string(),
            session,
        };
        Stage::Mounted(DetailWidgets::new(client, params))
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if let Stage::Mounted(widgets) = &mut self.stage {
            widgets.fan_out(loading);
        }
    }

    /// React to a new route symbol. Mounted widgets refetch with the new
    /// symbol; a halted page is re-resolved.
    pub fn set_symbol(&mut self, symbol: Option<&str>) {
        let session = self.session.session();
        let symbol = symbol.map(str::trim).filter(|s| !s.is_empty());
        if let (Stage::Mounted(widgets), Some(symbol)) = (&mut self.stage, symbol) {
            if session.user_id().is_some() {
                debug!(symbol, "detail symbol changed");
                widgets.params = DetailParams {
                    symbol: symbol.to_string(),
                    session,
                };
                widgets.fan_out(self.loading);
                return;
            }
        }

        if let Stage::Mounted(widgets) = &mut self.stage {
            widgets.unmount();
        }
        self.stage = Self::resolve(&self.client, session, symbol);
        let loading = self.loading;
        if let Stage::Mounted(widgets) = &mut self.stage {
            widgets.fan_out(loading);
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match &self.stage {
            Stage::Mounted(w) => Some(&w.params.symbol),
            Stage::Halted(_) => None,
        }
    }

    /// The error that stopped the page from mounting, if any.
    pub fn halt_reason(&self) -> Option<&DashboardError> {
        match &self.stage {
            Stage::Halted(e) => Some(e),
            Stage::Mounted(_) => None,
        }
    }

    pub fn retry_failed(&mut self) -> usize {
        match &mut self.stage {
            Stage::Mounted(w) => [w.roi.retry(), w.holding.retry(), w.history.retry()]
                .into_iter()
                .filter(|r| *r)
                .count(),
            Stage::Halted(_) => 0,
        }
    }

    pub fn view(&self) -> DetailView {
        match &self.stage {
            Stage::Halted(e) => DetailView::Unavailable(e.user_message()),
            Stage::Mounted(w) => DetailView::Loaded {
                symbol: w.params.symbol.clone(),
                roi: w.roi.state(),
                holding: w.holding.state(),
                history: w.history.state(),
            },
        }
    }

    pub fn unmount(mut self) {
        if let Stage::Mounted(widgets) = &mut self.stage {
            widgets.unmount();
        }
    }
}
