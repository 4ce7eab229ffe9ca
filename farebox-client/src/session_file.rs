use farebox_core::session::{Session, SessionError, SessionStore};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// JSON-file session persistence, the stand-in for the browser client's
/// localStorage.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let payload = serde_json::to_string_pretty(session)
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        fs::write(&self.path, payload).map_err(|e| SessionError::Storage(e.to_string()))
    }

    fn load(&self) -> Result<Option<Session>, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| SessionError::Storage(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Storage(e.to_string())),
        }
    }
}
