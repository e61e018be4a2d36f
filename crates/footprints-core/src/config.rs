use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FootprintsError, Result};

/// Greeting the assistant opens every conversation with.
pub const DEFAULT_GREETING: &str = "Hi! 👋 Welcome to Footprints Preschool. I’m Arjun, your assistant. May I know your child’s name? 👶";

/// Bot turn appended when the backend cannot be reached or answers garbage.
pub const DEFAULT_FALLBACK: &str = "Oops! Something went wrong.";

/// Top-level configuration for the Footprints client.
///
/// Loaded from `~/.footprints/config.toml` by default. Every section falls
/// back to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FootprintsConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl FootprintsConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FootprintsConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FootprintsError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the local transcript database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.footprints/data".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Remote assistant backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Full URL of the `POST /chat` endpoint.
    pub endpoint: String,
    /// Pause after the user's turn before the typing indicator appears.
    pub thinking_delay_ms: u64,
    /// Pause after a successful reply before the bot turn appears.
    pub reply_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://footprints-bot.onrender.com/chat".to_string(),
            thinking_delay_ms: 2000,
            reply_delay_ms: 800,
        }
    }
}

/// Assistant persona and fixed copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub name: String,
    pub greeting: String,
    pub fallback_message: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: "Arjun".to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            fallback_message: DEFAULT_FALLBACK.to_string(),
        }
    }
}

/// Speech-to-text input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether the microphone control is offered at all.
    pub enabled: bool,
    /// Recognition locale, e.g. "en-US".
    pub locale: String,
    /// Deliver partial results while the user is still speaking.
    pub interim_results: bool,
    /// Number of alternatives requested from the recognizer.
    pub max_alternatives: u32,
    /// External recognizer program and arguments. Empty means unavailable.
    pub command: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locale: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
            command: Vec::new(),
        }
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of transcript lines kept in view when redrawing.
    pub viewport_lines: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { viewport_lines: 40 }
    }
}
