//! Route paths the data layer cares about.
//!
//! The route table itself belongs to the UI; this only resolves a path to the
//! view it names and extracts the `details/:symbol` parameter.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config;

/// Characters escaped when a symbol becomes a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`: resolved to dashboard or login by the auth gate.
    Root,
    /// `/dashboard` or `/dashboard/default`.
    Dashboard,
    /// `/details/:symbol`; `None` when the segment is missing or empty.
    Details { symbol: Option<String> },
    Login,
    Register,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Root,
            ["dashboard"] | ["dashboard", "default"] => Route::Dashboard,
            ["details"] => Route::Details { symbol: None },
            ["details", raw] => {
                let symbol = percent_decode_str(raw)
                    .decode_utf8()
                    .map(|s| s.trim().to_string())
                    .ok()
                    .filter(|s| !s.is_empty());
                Route::Details { symbol }
            }
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            Route::Details { symbol } => symbol.as_deref(),
            _ => None,
        }
    }
}

/// `/details/{symbol}` with the symbol encoded as one segment.
pub fn details_path(symbol: &str) -> String {
    format!(
        "{}/{}",
        config::DETAILS_ROUTE,
        utf8_percent_encode(symbol, SEGMENT)
    )
}
