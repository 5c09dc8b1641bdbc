//! Per-asset orchestration: parameter hard stop, widgets, and symbol changes.

mod common;

use common::{client_with, drain, memory_session, signed_in, MockTransport};
use portfolio_dashboard::detail::DetailView;
use portfolio_dashboard::format::{format_currency, format_shares};
use portfolio_dashboard::{DashboardError, DetailOrchestrator, Route, Session, WidgetState};
use serde_json::json;

fn script_symbol(transport: &MockTransport, symbol: &str, roi: f64) {
    let base = format!("/api/user/u1/portfolio/stock/{symbol}");
    transport.json(&format!("{base}/roi"), 200, json!({"roi": roi}));
    transport.json(
        &format!("{base}/details"),
        200,
        json!({"quantity": 10, "totalValue": 1871.25}),
    );
    transport.json(
        &format!("{base}/performance"),
        200,
        json!({"historicalPrices": [
            {"date": "2024-01-01", "price": 10},
            {"date": "2024-01-02", "price": 11}
        ]}),
    );
}

#[tokio::test]
async fn missing_symbol_halts_without_requests() {
    let transport = MockTransport::new();

    let detail = DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), None);
    drain().await;

    assert!(matches!(
        detail.halt_reason(),
        Some(DashboardError::MissingRouteParam(p)) if p == "symbol"
    ));
    assert_eq!(
        detail.view(),
        DetailView::Unavailable("Cannot show asset details: symbol is missing.".into())
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn blank_symbol_counts_as_missing() {
    let transport = MockTransport::new();

    let detail =
        DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), Some("  "));

    assert!(detail.view().is_unavailable());
    assert!(detail.symbol().is_none());
}

#[tokio::test]
async fn missing_user_id_halts_without_requests() {
    let transport = MockTransport::new();
    let session = Session {
        token: Some("tok".into()),
        user_id: None,
    };

    let detail = DetailOrchestrator::mount(client_with(&transport), memory_session(session), Some("AAPL"));
    drain().await;

    assert!(matches!(
        detail.halt_reason(),
        Some(DashboardError::MissingRouteParam(p)) if p == "user ID"
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn loads_roi_holding_and_history() {
    let transport = MockTransport::new();
    script_symbol(&transport, "AAPL", 4.0);

    let detail =
        DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), Some("AAPL"));
    drain().await;

    let DetailView::Loaded {
        symbol,
        roi,
        holding,
        history,
    } = wait_loaded(&detail).await
    else {
        panic!("detail view should be loaded");
    };

    assert_eq!(symbol, "AAPL");
    assert_eq!(roi.value().unwrap().roi_percent, 4.0);
    let holding = holding.value().unwrap();
    assert_eq!(format_shares(&holding.symbol, holding.quantity), "AAPL: 10 shares");
    assert_eq!(format_currency(holding.total_value), "$1,871.25");
    assert_eq!(
        serde_json::to_value(history.value().unwrap()).unwrap(),
        json!({"name": "AAPL", "data": [[1704067200000_i64, 10.0], [1704153600000_i64, 11.0]]})
    );
}

#[tokio::test]
async fn symbol_from_route_is_decoded_and_reencoded() {
    let transport = MockTransport::new();
    transport.json(
        "/api/user/u1/portfolio/stock/BRK%2FB/roi",
        200,
        json!({"roi": 2.0}),
    );
    let route = Route::parse("/details/BRK%2FB");

    let detail =
        DetailOrchestrator::from_route(client_with(&transport), memory_session(signed_in()), &route);
    assert_eq!(detail.symbol(), Some("BRK/B"));

    let view = wait_loaded(&detail).await;
    let DetailView::Loaded { roi, holding, .. } = view else {
        panic!("detail view should be loaded");
    };
    assert_eq!(roi.value().unwrap().roi_percent, 2.0);
    // details endpoint was not scripted; its failure stays local
    assert!(holding.is_failed());
}

#[tokio::test]
async fn symbol_change_refetches_every_widget() {
    let transport = MockTransport::new();
    script_symbol(&transport, "AAPL", 1.0);
    script_symbol(&transport, "MSFT", 2.0);

    let mut detail =
        DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), Some("AAPL"));
    wait_loaded(&detail).await;

    detail.set_symbol(Some("MSFT"));
    let DetailView::Loaded { symbol, roi, .. } = wait_loaded(&detail).await else {
        panic!("detail view should be loaded");
    };
    assert_eq!(symbol, "MSFT");
    assert_eq!(roi, WidgetState::Ready(portfolio_dashboard::models::RoiRecord { roi_percent: 2.0 }));
    assert_eq!(transport.calls_to("/api/user/u1/portfolio/stock/MSFT/performance"), 1);
}

#[tokio::test]
async fn stale_symbol_response_does_not_overwrite_new_symbol() {
    let transport = MockTransport::new();
    script_symbol(&transport, "AAPL", 1.0);
    script_symbol(&transport, "MSFT", 2.0);
    let slow = transport.hold("/api/user/u1/portfolio/stock/AAPL/roi");

    let mut detail =
        DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), Some("AAPL"));
    drain().await;
    detail.set_symbol(Some("MSFT"));
    wait_loaded(&detail).await;

    let _ = slow.send(());
    drain().await;

    let DetailView::Loaded { roi, .. } = detail.view() else {
        panic!("detail view should be loaded");
    };
    assert_eq!(roi.value().unwrap().roi_percent, 2.0);
}

#[tokio::test]
async fn clearing_symbol_halts_the_page() {
    let transport = MockTransport::new();
    script_symbol(&transport, "AAPL", 1.0);

    let mut detail =
        DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), Some("AAPL"));
    wait_loaded(&detail).await;

    detail.set_symbol(None);
    assert!(detail.view().is_unavailable());

    detail.set_symbol(Some("AAPL"));
    assert!(!detail.view().is_unavailable());
}

#[tokio::test]
async fn missing_token_fails_each_widget_individually() {
    let transport = MockTransport::new();
    let session = Session {
        token: None,
        user_id: Some("u1".into()),
    };

    let detail = DetailOrchestrator::mount(client_with(&transport), memory_session(session), Some("AAPL"));

    let DetailView::Loaded { roi, holding, history, .. } = wait_loaded(&detail).await else {
        panic!("detail view should be loaded");
    };
    assert!(roi.is_failed());
    assert!(holding.is_failed());
    assert!(history.is_failed());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn retry_failed_refetches_only_the_failed_widget() {
    let transport = MockTransport::new();
    script_symbol(&transport, "AAPL", 3.0);
    transport.fail("/api/user/u1/portfolio/stock/AAPL/details", "connection reset");

    let mut detail =
        DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), Some("AAPL"));
    let DetailView::Loaded { roi, holding, .. } = wait_loaded(&detail).await else {
        panic!("detail view should be loaded");
    };
    assert!(roi.is_ready());
    assert!(holding.is_failed());

    transport.json(
        "/api/user/u1/portfolio/stock/AAPL/details",
        200,
        json!({"quantity": 5, "totalValue": 935.5}),
    );
    assert_eq!(detail.retry_failed(), 1);

    let DetailView::Loaded { holding, .. } = wait_loaded(&detail).await else {
        panic!("detail view should be loaded");
    };
    assert_eq!(holding.value().unwrap().quantity, 5.0);
    assert_eq!(transport.calls_to("/api/user/u1/portfolio/stock/AAPL/details"), 2);
    assert_eq!(transport.calls_to("/api/user/u1/portfolio/stock/AAPL/roi"), 1);
    assert_eq!(transport.calls_to("/api/user/u1/portfolio/stock/AAPL/performance"), 1);
}

#[tokio::test]
async fn retry_on_halted_page_does_nothing() {
    let transport = MockTransport::new();
    let mut detail = DetailOrchestrator::mount(client_with(&transport), memory_session(signed_in()), None);
    assert_eq!(detail.retry_failed(), 0);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn dot_symbol_from_route_never_reaches_the_server() {
    let transport = MockTransport::new();
    let route = Route::parse("/details/%2E%2E");

    let detail =
        DetailOrchestrator::from_route(client_with(&transport), memory_session(signed_in()), &route);
    let DetailView::Loaded { roi, holding, history, .. } = wait_loaded(&detail).await else {
        panic!("detail view should be loaded");
    };

    assert!(roi.is_failed() && holding.is_failed() && history.is_failed());
    assert_eq!(transport.call_count(), 0);
}

/// Poll until every mounted widget has settled.
async fn wait_loaded(detail: &DetailOrchestrator) -> DetailView {
    for _ in 0..500 {
        match detail.view() {
            DetailView::Loaded {
                ref roi,
                ref holding,
                ref history,
                ..
            } if roi.is_settled() && holding.is_settled() && history.is_settled() => {
                return detail.view();
            }
            DetailView::Unavailable(_) => return detail.view(),
            _ => tokio::time::sleep(std::time::Duration::from_millis(2)).await,
        }
    }
    panic!("detail widgets did not settle");
}
