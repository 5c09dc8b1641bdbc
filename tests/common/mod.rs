//! Shared fixtures for the integration tests.
//!
//! Provides a scripted [`MockTransport`] (canned replies keyed by URL path,
//! call recording, and optional gates that hold a request until released),
//! plus helpers that wire it into a [`PortfolioClient`].

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use portfolio_dashboard::{
    DashboardError, HttpResponse, MemorySession, PortfolioClient, Session, Transport, WidgetState,
};
use tokio::sync::{oneshot, watch};
use url::Url;

pub const BASE_URL: &str = "http://api.test";

#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16, String),
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub path: String,
    pub token: String,
}

#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, VecDeque<oneshot::Receiver<()>>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Reply to `path` with `status` and a JSON body.
    pub fn json(&self, path: &str, status: u16, body: serde_json::Value) {
        self.raw(path, status, &body.to_string());
    }

    pub fn raw(&self, path: &str, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), Reply::Status(status, body.to_string()));
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), Reply::Transport(message.to_string()));
    }

    /// Hold the next request to `path` until the returned sender fires.
    pub fn hold(&self, path: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &Url, token: &str) -> portfolio_dashboard::Result<HttpResponse> {
        let path = url.path().to_string();
        self.calls.lock().unwrap().push(Call {
            path: path.clone(),
            token: token.to_string(),
        });

        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&path)
            .and_then(|q| q.pop_front());
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let reply = self.replies.lock().unwrap().get(&path).cloned();
        match reply {
            Some(Reply::Status(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Reply::Transport(msg)) => Err(DashboardError::Transport(msg)),
            None => Ok(HttpResponse::new(404, r#"{"error": "Not found"}"#)),
        }
    }
}

/// A session with both token and user id (`u1`).
pub fn signed_in() -> Session {
    Session::new("tok-123", "u1")
}

pub fn client_with(transport: &Arc<MockTransport>) -> Arc<PortfolioClient> {
    let transport: Arc<dyn Transport> = transport.clone();
    Arc::new(PortfolioClient::with_transport(BASE_URL, transport).unwrap())
}

pub fn memory_session(session: Session) -> Arc<MemorySession> {
    Arc::new(MemorySession::new(session))
}

/// Sample `/portfolio/stocks` payload with two holdings.
pub fn sample_stocks() -> serde_json::Value {
    serde_json::json!([
        {
            "symbol": "AAPL",
            "lastClosingPrice": 187.1,
            "data": [
                {"date": "2024-01-01", "price": 185.0},
                {"date": "2024-01-02", "price": 187.1}
            ]
        },
        {
            "symbol": "MSFT",
            "lastClosingPrice": 402.56,
            "data": [
                {"date": "2024-01-01", "price": 398.0}
            ]
        }
    ])
}

/// Wait until the observed widget leaves `Idle`/`Loading`.
pub async fn settled<T: Clone>(rx: &mut watch::Receiver<WidgetState<T>>) -> WidgetState<T> {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.is_settled()))
        .await
        .expect("widget did not settle in time")
        .expect("widget state channel closed")
        .clone()
}

/// Let spawned tasks run for a few scheduler turns.
pub async fn drain() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
