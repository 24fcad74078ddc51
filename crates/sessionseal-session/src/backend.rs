//! Storage collaborator: an external key-value store of session id → opaque
//! encrypted blob. Connection, persistence, and expiry belong to the store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

/// Backend-level error (wraps arbitrary messages from the store).
#[derive(Debug, Clone, Error)]
#[error("Session backend error: {message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User-implemented store for encrypted token blobs, keyed by session id.
///
/// Writes overwrite; concurrent writers for one session id are not
/// arbitrated (last write wins).
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<String>, BackendError>;

    async fn store(&self, session_id: &str, blob: String) -> Result<(), BackendError>;

    /// Remove the blob. Removing an absent blob is not an error.
    async fn remove(&self, session_id: &str) -> Result<(), BackendError>;
}

#[async_trait]
impl<B: SessionBackend + ?Sized> SessionBackend for Arc<B> {
    async fn load(&self, session_id: &str) -> Result<Option<String>, BackendError> {
        (**self).load(session_id).await
    }

    async fn store(&self, session_id: &str, blob: String) -> Result<(), BackendError> {
        (**self).store(session_id, blob).await
    }

    async fn remove(&self, session_id: &str) -> Result<(), BackendError> {
        (**self).remove(session_id).await
    }
}

/// In-memory backend for tests and single-process development servers.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }

    /// Raw stored blob, bypassing decryption.
    pub fn raw(&self, session_id: &str) -> Option<String> {
        self.blobs.lock().get(session_id).cloned()
    }

    /// Insert a raw blob, bypassing encryption.
    pub fn insert_raw(&self, session_id: &str, blob: String) {
        self.blobs.lock().insert(session_id.to_string(), blob);
    }
}

#[async_trait]
impl SessionBackend for MemoryBackend {
    async fn load(&self, session_id: &str) -> Result<Option<String>, BackendError> {
        Ok(self.blobs.lock().get(session_id).cloned())
    }

    async fn store(&self, session_id: &str, blob: String) -> Result<(), BackendError> {
        self.blobs.lock().insert(session_id.to_string(), blob);
        Ok(())
    }

    async fn remove(&self, session_id: &str) -> Result<(), BackendError> {
        self.blobs.lock().remove(session_id);
        Ok(())
    }
}
