//! Conversation engine for the Footprints parent assistant.
//!
//! Owns the transcript, the compose buffer and the UI flags, and runs the
//! send/receive cycle against the remote assistant backend.

pub mod backend;
pub mod controller;
pub mod emoji;
pub mod error;

pub use backend::{ChatBackend, ChatReply, ChatRequest, HttpChatBackend};
pub use controller::{ControllerConfig, ConversationController, PendingSend};
pub use emoji::EmojiPicker;
pub use error::ChatError;
