//! services/client/src/adapters/token_store.rs
//!
//! Implementations of the `TokenStore` port: a file-backed store that keeps the
//! bearer token across runs, and an in-memory store for short-lived sessions.

use ridetribe_core::ports::{PortError, PortResult, TokenStore};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Persists the token in a single file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Some(raw.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read token file {}: {:?}", self.path.display(), e);
                None
            }
        }
    }

    fn save(&self, token: &str) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| PortError::Unexpected(format!("Failed to store token: {}", e)))?;
        }
        std::fs::write(&self.path, token)
            .map_err(|e| PortError::Unexpected(format!("Failed to store token: {}", e)))
    }

    fn clear(&self) -> PortResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(format!(
                "Failed to clear token: {}",
                e
            ))),
        }
    }
}

/// Keeps the token for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: &str) -> PortResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> PortResult<()> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token"));
        assert_eq!(store.load(), None);
        store.save("abc.def").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc.def"));
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Clearing twice is harmless.
        store.clear().unwrap();
    }

    #[test]
    fn memory_store_starts_empty() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load(), None);
        store.save("t").unwrap();
        assert_eq!(store.load().as_deref(), Some("t"));
    }
}
