//! Write-through persistence of the conversation transcript.
//!
//! Storage problems never reach the caller: a failed read yields the greeting
//! transcript and a failed write is logged and dropped, so the conversation
//! keeps working in memory.

use std::sync::Arc;

use footprints_core::error::FootprintsError;
use footprints_core::types::{Transcript, Turn};

use crate::kv::KeyValueStore;

/// Storage key holding the JSON-serialized turn list.
pub const TRANSCRIPT_KEY: &str = "chat-history";

/// Loads and saves the transcript under [`TRANSCRIPT_KEY`].
#[derive(Clone)]
pub struct TranscriptStore {
    store: Arc<dyn KeyValueStore>,
    greeting: String,
}

impl TranscriptStore {
    pub fn new(store: Arc<dyn KeyValueStore>, greeting: impl Into<String>) -> Self {
        Self {
            store,
            greeting: greeting.into(),
        }
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Rehydrate the persisted transcript.
    ///
    /// Missing, unreadable, corrupt or empty data falls back to the
    /// single-turn greeting transcript.
    pub fn load(&self) -> Transcript {
        match self.try_load() {
            Ok(Some(transcript)) => {
                tracing::debug!(turns = transcript.len(), "Transcript restored");
                transcript
            }
            Ok(None) => Transcript::greeting(&self.greeting),
            Err(e) => {
                tracing::warn!(error = %e, "Persisted transcript unusable, starting fresh");
                Transcript::greeting(&self.greeting)
            }
        }
    }

    fn try_load(&self) -> Result<Option<Transcript>, FootprintsError> {
        let Some(raw) = self.store.get(TRANSCRIPT_KEY)? else {
            return Ok(None);
        };
        let turns: Vec<Turn> = serde_json::from_str(&raw)?;
        Ok(Some(Transcript::from_turns(turns, &self.greeting)))
    }

    /// Persist the full transcript, replacing whatever was stored.
    pub fn save(&self, transcript: &Transcript) {
        let result = serde_json::to_string(transcript)
            .map_err(FootprintsError::from)
            .and_then(|json| self.store.set(TRANSCRIPT_KEY, &json));
        if let Err(e) = result {
            tracing::warn!(error = %e, turns = transcript.len(), "Failed to persist transcript");
        }
    }

    /// Erase the persisted transcript.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(TRANSCRIPT_KEY) {
            tracing::warn!(error = %e, "Failed to erase persisted transcript");
        }
    }
}

impl std::fmt::Debug for TranscriptStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptStore")
            .field("greeting", &self.greeting)
            .finish()
    }
}
