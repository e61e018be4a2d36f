//! Per-device session identifier lifecycle.

use std::sync::Arc;

use uuid::Uuid;

use footprints_core::types::SessionId;

use crate::kv::KeyValueStore;

/// Storage key holding the session token.
pub const SESSION_KEY: &str = "session-id";

/// Reads, or creates once, the identifier sent with every backend request.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Return the persisted identifier, minting and persisting a new random
    /// one the first time.
    ///
    /// If storage cannot be read or written the fresh identifier is still
    /// returned and lives for this process only.
    pub fn load_or_create(&self) -> SessionId {
        match self.store.get(SESSION_KEY) {
            Ok(Some(existing)) if !existing.trim().is_empty() => return SessionId::new(existing),
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read session id"),
        }

        let id = SessionId::new(Uuid::new_v4().to_string());
        match self.store.set(SESSION_KEY, id.as_str()) {
            Ok(()) => tracing::info!(session_id = %id, "New session id created"),
            Err(e) => tracing::warn!(error = %e, "Failed to persist session id"),
        }
        id
    }
}
