//! Per-widget asynchronous load state.
//!
//! A [`Widget`] owns exactly one [`StateCell`] and at most one in-flight fetch
//! task. Each dispatch takes a generation [`Ticket`]; only the newest ticket
//! may settle the cell, so a slow response to a superseded request is
//! dropped instead of overwriting fresher state. After [`Widget::unmount`]
//! nothing settles the cell again.

use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{DashboardError, Result, GENERIC_FAILURE};

// ---------------------------------------------------------------------------
// WidgetState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub enum WidgetState<T> {
    /// Waiting for the parent's readiness signal.
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> WidgetState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, WidgetState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, WidgetState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, WidgetState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WidgetState::Failed(_))
    }

    /// Settled either way.
    pub fn is_settled(&self) -> bool {
        self.is_ready() || self.is_failed()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            WidgetState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            WidgetState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> WidgetState<U> {
        match self {
            WidgetState::Idle => WidgetState::Idle,
            WidgetState::Loading => WidgetState::Loading,
            WidgetState::Ready(v) => WidgetState::Ready(f(v)),
            WidgetState::Failed(msg) => WidgetState::Failed(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// StateCell
// ---------------------------------------------------------------------------

/// Generation stamp handed out by [`StateCell::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Control {
    generation: u64,
    mounted: bool,
}

/// Single-owner holder of a [`WidgetState`] with generation and unmount guards.
///
/// State is published through a `watch` channel so renderers can observe
/// transitions; every transition happens under the control lock, so
/// observers never see an old value paired with a new error.
#[derive(Debug)]
pub struct StateCell<T> {
    control: Mutex<Control>,
    tx: watch::Sender<WidgetState<T>>,
}

impl<T> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(WidgetState::Idle);
        Self {
            control: Mutex::new(Control {
                generation: 0,
                mounted: true,
            }),
            tx,
        }
    }

    /// Enter `Loading`, discarding any previous value or error.
    ///
    /// Returns `None` once the cell is unmounted.
    pub fn begin(&self) -> Option<Ticket> {
        let mut control = self.control.lock().ok()?;
        if !control.mounted {
            return None;
        }
        control.generation += 1;
        self.tx.send_replace(WidgetState::Loading);
        Some(Ticket(control.generation))
    }

    /// Apply a fetch outcome if `ticket` is still the newest and the cell is mounted.
    ///
    /// Returns whether the outcome was applied.
    pub fn settle(&self, ticket: Ticket, outcome: Result<T>) -> bool {
        let Ok(control) = self.control.lock() else {
            return false;
        };
        if !control.mounted || control.generation != ticket.0 {
            return false;
        }
        let next = match outcome {
            Ok(value) => WidgetState::Ready(value),
            Err(e) => {
                let message = e.user_message();
                let message = if message.trim().is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    message
                };
                WidgetState::Failed(message)
            }
        };
        self.tx.send_replace(next);
        true
    }

    /// Stop accepting transitions. Idempotent.
    pub fn unmount(&self) {
        if let Ok(mut control) = self.control.lock() {
            control.mounted = false;
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.control.lock().map(|c| c.mounted).unwrap_or(false)
    }

    /// Newest ticket handed out, if any.
    pub fn current(&self) -> Option<Ticket> {
        let control = self.control.lock().ok()?;
        (control.generation > 0).then_some(Ticket(control.generation))
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState<T>> {
        self.tx.subscribe()
    }
}

impl<T: Clone> StateCell<T> {
    pub fn snapshot(&self) -> WidgetState<T> {
        self.tx.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// Produces the fetch future for a given dependency value.
pub type Fetcher<D, T> = Arc<dyn Fn(D) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// One independently fetching unit driven by a parent readiness flag and its
/// own dependency value `D` (for example a user id or a symbol).
pub struct Widget<D, T> {
    name: &'static str,
    cell: Arc<StateCell<T>>,
    fetcher: Fetcher<D, T>,
    deps: Option<D>,
    task: Option<JoinHandle<()>>,
}

impl<D, T> Widget<D, T>
where
    D: Clone + PartialEq + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &'static str, fetch: F) -> Self
    where
        F: Fn(D) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            name,
            cell: Arc::new(StateCell::new()),
            fetcher: Arc::new(move |deps: D| fetch(deps).boxed()),
            deps: None,
            task: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Feed the parent's loading flag and the current dependencies.
    ///
    /// Dispatches a fetch when the parent is no longer loading and the
    /// dependencies differ from those of the last dispatch. Returns whether a
    /// fetch was dispatched.
    pub fn update(&mut self, parent_loading: bool, deps: D) -> bool {
        if parent_loading || self.deps.as_ref() == Some(&deps) {
            return false;
        }
        self.dispatch(deps)
    }

    /// Re-run the last fetch if the widget is in `Failed`.
    pub fn retry(&mut self) -> bool {
        if !self.cell.snapshot().is_failed() {
            return false;
        }
        match self.deps.clone() {
            Some(deps) => self.dispatch(deps),
            None => false,
        }
    }

    fn dispatch(&mut self, deps: D) -> bool {
        let Some(ticket) = self.cell.begin() else {
            return false;
        };
        if let Some(prev) = self.task.take() {
            prev.abort();
        }
        self.deps = Some(deps.clone());

        let Ok(handle) = Handle::try_current() else {
            warn!(widget = self.name, "no Tokio runtime; fetch not started");
            self.cell.settle(
                ticket,
                Err(DashboardError::Runtime(format!(
                    "{} must be mounted inside a Tokio runtime",
                    self.name
                ))),
            );
            return false;
        };
        debug!(widget = self.name, generation = ticket.generation(), "fetch dispatched");

        let fut = (self.fetcher)(deps);
        let cell = Arc::clone(&self.cell);
        let name = self.name;
        self.task = Some(handle.spawn(async move {
            let outcome = fut.await;
            if let Err(e) = &outcome {
                warn!(widget = name, error = %e, "fetch failed");
            }
            if !cell.settle(ticket, outcome) {
                debug!(widget = name, generation = ticket.generation(), "stale result dropped");
            }
        }));
        true
    }

    pub fn state(&self) -> WidgetState<T> {
        self.cell.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState<T>> {
        self.cell.subscribe()
    }

    /// Dependencies of the most recent dispatch.
    pub fn deps(&self) -> Option<&D> {
        self.deps.as_ref()
    }

    /// Abort any in-flight fetch and freeze the current state.
    pub fn unmount(&mut self) {
        self.cell.unmount();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.cell.is_mounted()
    }
}

impl<D, T> Drop for Widget<D, T> {
    fn drop(&mut self) {
        self.cell.unmount();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
