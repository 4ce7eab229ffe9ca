use serde::{Deserialize, Serialize};

/// Authenticated session returned by `POST /api/login/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage failed: {0}")]
    Storage(String),
}

/// Where the session token lives between runs. The browser client kept it
/// in localStorage; implementations here decide the equivalent.
pub trait SessionStore: Send + Sync {
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}
