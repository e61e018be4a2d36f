//! Core types, configuration and errors shared by the Footprints crates.

pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::FootprintsConfig;
pub use error::{FootprintsError, Result};
pub use events::ConversationEvent;
pub use types::*;
