use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "PORTFOLIO_API_BASE_URL";
/// Environment variable overriding the session file location.
pub const SESSION_PATH_ENV: &str = "PORTFOLIO_DASHBOARD_SESSION";

/// Storage keys the login flow writes.
pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";

/// Route prefix for the per-asset detail view.
pub const DETAILS_ROUTE: &str = "/details";

pub fn default_base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

pub fn default_session_path() -> PathBuf {
    if let Some(path) = std::env::var_os(SESSION_PATH_ENV) {
        return PathBuf::from(path);
    }
    if let Some(data) = dirs::data_dir() {
        data.join("portfolio-dashboard").join("session.json")
    } else {
        PathBuf::from(".portfolio-dashboard").join("session.json")
    }
}
