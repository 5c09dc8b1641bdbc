//! Session access for every component that needs the user's token or id.
//!
//! Components never read storage directly; they receive an
//! `Arc<dyn SessionProvider>` and ask it for the current [`Session`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The authenticated user's token and identifier, either of which may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user_id: Some(user_id.into()),
        }
    }

    /// Token, treating an empty string as absent.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// User id, treating an empty string as absent.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|u| !u.is_empty())
    }

    /// Both halves are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.token()?, self.user_id()?))
    }
}

// ---------------------------------------------------------------------------
// SessionProvider
// ---------------------------------------------------------------------------

pub trait SessionProvider: Send + Sync {
    /// Current session as stored right now.
    fn session(&self) -> Session;

    fn token(&self) -> Option<String> {
        self.session().token().map(str::to_string)
    }

    fn user_id(&self) -> Option<String> {
        self.session().user_id().map(str::to_string)
    }
}

/// In-process session, useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySession {
    inner: RwLock<Session>,
}

impl MemorySession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }

    pub fn set(&self, session: Session) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = session;
        }
    }

    pub fn clear(&self) {
        self.set(Session::default());
    }
}

impl SessionProvider for MemorySession {
    fn session(&self) -> Session {
        self.inner
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// FileSessionStore
// ---------------------------------------------------------------------------

/// Session persisted as a flat JSON object of string keys (`token`, `userId`).
///
/// The file is re-read on every access, so a login flow writing the file is
/// observed by the next navigation decision or fetch. A missing file is an
/// empty session; an unreadable one is logged and treated as empty.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at [`config::default_session_path`].
    pub fn at_default_location() -> Self {
        Self::new(config::default_session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored key-value pairs.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Session::default());
        }
        let map: HashMap<String, serde_json::Value> = serde_json::from_str(&contents)?;
        let get = |key: &str| {
            map.get(key).and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };
        Ok(Session {
            token: get(config::TOKEN_KEY),
            user_id: get(config::USER_ID_KEY),
        })
    }

    /// Persist the session, creating parent directories as needed.
    ///
    /// Writes to a temp file and renames it over the target so readers never
    /// observe a half-written session.
    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let body = serde_json::to_string_pretty(session)?;
        let result = fs::write(&tmp, body).and_then(|_| fs::rename(&tmp, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result.map_err(DashboardError::from)
    }

    /// Remove the persisted session (logout).
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionProvider for FileSessionStore {
    fn session(&self) -> Session {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable session store");
                Session::default()
            }
        }
    }
}
