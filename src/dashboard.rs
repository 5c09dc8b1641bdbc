//! Portfolio overview: aggregate value, ROI, price chart and ticker list.
//!
//! The orchestrator owns one loading flag and fans it out to four widgets.
//! Widgets never see each other's results; one failing leaves the rest intact.

use std::sync::Arc;

use tracing::debug;

use crate::client::PortfolioClient;
use crate::models::{ChartSeries, PortfolioSnapshot, RoiRecord, StockSeries, StockSummary};
use crate::series::to_chart_series;
use crate::session::{Session, SessionProvider};
use crate::widget::{Widget, WidgetState};

/// Point-in-time copy of every widget's state, for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub total_value: WidgetState<PortfolioSnapshot>,
    pub roi: WidgetState<RoiRecord>,
    pub chart: WidgetState<Vec<ChartSeries>>,
    pub tickers: WidgetState<Vec<StockSummary>>,
}

impl DashboardView {
    /// Every widget has settled, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.total_value.is_settled()
            && self.roi.is_settled()
            && self.chart.is_settled()
            && self.tickers.is_settled()
    }
}

pub struct DashboardOrchestrator {
    session: Arc<dyn SessionProvider>,
    loading: bool,
    total_value: Widget<Session, PortfolioSnapshot>,
    roi: Widget<Session, RoiRecord>,
    chart: Widget<Session, Vec<ChartSeries>>,
    tickers: Widget<Session, Vec<StockSummary>>,
}

impl DashboardOrchestrator {
    /// Build the widgets in `Idle` with the loading flag still raised.
    pub fn new(client: Arc<PortfolioClient>, session: Arc<dyn SessionProvider>) -> Self {
        let total_value = {
            let client = Arc::clone(&client);
            Widget::new("total_value", move |session: Session| {
                let client = Arc::clone(&client);
                async move { client.portfolio_value(&session).await }
            })
        };
        let roi = {
            let client = Arc::clone(&client);
            Widget::new("portfolio_roi", move |session: Session| {
                let client = Arc::clone(&client);
                async move { client.portfolio_roi(&session).await }
            })
        };
        let chart = {
            let client = Arc::clone(&client);
            Widget::new("stock_chart", move |session: Session| {
                let client = Arc::clone(&client);
                async move {
                    let stocks = client.portfolio_stocks(&session).await?;
                    let series: Vec<StockSeries> = stocks.into_iter().map(Into::into).collect();
                    to_chart_series(&series)
                }
            })
        };
        let tickers = Widget::new("ticker_list", move |session: Session| {
            let client = Arc::clone(&client);
            async move {
                let stocks = client.portfolio_stocks(&session).await?;
                let summaries: Vec<StockSummary> = stocks.iter().map(StockSummary::from).collect();
                Ok(summaries)
            }
        });

        Self {
            session,
            loading: true,
            total_value,
            roi,
            chart,
            tickers,
        }
    }

    /// Build and immediately lower the loading flag, starting every fetch.
    pub fn mount(client: Arc<PortfolioClient>, session: Arc<dyn SessionProvider>) -> Self {
        let mut dashboard = Self::new(client, session);
        dashboard.set_loading(false);
        dashboard
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Change the parent flag and pass it to every widget.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.fan_out();
    }

    /// Re-read the session and hand it to every widget; widgets whose
    /// dependencies changed fetch again.
    pub fn refresh(&mut self) {
        self.fan_out();
    }

    fn fan_out(&mut self) {
        let session = self.session.session();
        let loading = self.loading;
        let dispatched = [
            self.total_value.update(loading, session.clone()),
            self.roi.update(loading, session.clone()),
            self.chart.update(loading, session.clone()),
            self.tickers.update(loading, session),
        ];
        debug!(loading, ?dispatched, "dashboard fan-out");
    }

    /// Retry every widget currently in `Failed`; returns how many restarted.
    pub fn retry_failed(&mut self) -> usize {
        [
            self.total_value.retry(),
            self.roi.retry(),
            self.chart.retry(),
            self.tickers.retry(),
        ]
        .into_iter()
        .filter(|r| *r)
        .count()
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            total_value: self.total_value.state(),
            roi: self.roi.state(),
            chart: self.chart.state(),
            tickers: self.tickers.state(),
        }
    }

    pub fn total_value(&self) -> &Widget<Session, PortfolioSnapshot> {
        &self.total_value
    }

    pub fn roi(&self) -> &Widget<Session, RoiRecord> {
        &self.roi
    }

    pub fn chart(&self) -> &Widget<Session, Vec<ChartSeries>> {
        &self.chart
    }

    pub fn tickers(&self) -> &Widget<Session, Vec<StockSummary>> {
        &self.tickers
    }

    /// Tear down every widget; in-flight responses are discarded.
    pub fn unmount(mut self) {
        self.total_value.unmount();
        self.roi.unmount();
        self.chart.unmount();
        self.tickers.unmount();
    }
}
