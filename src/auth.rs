//! Authentication gate for the application root.

use std::sync::Arc;

use crate::routes::Route;
use crate::session::SessionProvider;

/// Which view the root path mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootView {
    Dashboard,
    Login,
}

/// Decides navigation from whether a session token is present.
///
/// Evaluated once per navigation decision; a view already resolved is not
/// re-routed when the token later changes.
#[derive(Clone)]
pub struct AuthGate {
    session: Arc<dyn SessionProvider>,
}

impl AuthGate {
    pub fn new(session: Arc<dyn SessionProvider>) -> Self {
        Self { session }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.session().token().is_some()
    }

    pub fn root_view(&self) -> RootView {
        if self.is_authenticated() {
            RootView::Dashboard
        } else {
            RootView::Login
        }
    }

    /// Resolve a path, replacing [`Route::Root`] with the gated view.
    ///
    /// Never returns `Route::Root`.
    pub fn resolve(&self, path: &str) -> Route {
        match Route::parse(path) {
            Route::Root => match self.root_view() {
                RootView::Dashboard => Route::Dashboard,
                RootView::Login => Route::Login,
            },
            other => other,
        }
    }
}
