/// Fallback text shown when a failure carries no server-supplied message.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred";

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    #[error("Malformed point {index} in series {symbol}: unparsable date {date:?}")]
    MalformedPoint {
        symbol: String,
        index: usize,
        date: String,
    },

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Missing route parameter: {0}")]
    MissingRouteParam(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl DashboardError {
    /// Plain text suitable for rendering inline in a failed widget.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Transport(_) => {
                "Data failed to load, please check your connection and try again.".to_string()
            }
            DashboardError::Http { message, .. } => match message.as_deref().map(str::trim) {
                Some(m) if !m.is_empty() => m.to_string(),
                _ => GENERIC_FAILURE.to_string(),
            },
            DashboardError::UnexpectedShape(_) => {
                "Unexpected response from the server.".to_string()
            }
            DashboardError::MalformedPoint { symbol, .. } => {
                format!("Price history for {symbol} contains an invalid date.")
            }
            DashboardError::MissingCredentials(_) => "Token or user ID not found".to_string(),
            DashboardError::MissingRouteParam(param) => {
                format!("Cannot show asset details: {param} is missing.")
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
