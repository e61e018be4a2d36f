//! Footprints Storage crate - on-device persistence for the chat client.
//!
//! Provides a small SQLite key-value database, an in-memory store for tests,
//! and the transcript and session-identifier stores built on top of them.

pub mod db;
pub mod kv;
pub mod migrations;
pub mod session;
pub mod transcript;

pub use db::Database;
pub use kv::{KeyValueStore, MemoryStore};
pub use session::{SessionStore, SESSION_KEY};
pub use transcript::{TranscriptStore, TRANSCRIPT_KEY};
