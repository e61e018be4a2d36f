use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Turns
// =============================================================================

/// Who authored a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The parent typing into the widget.
    User,
    /// The preschool assistant.
    Bot,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::User => write!(f, "user"),
            Origin::Bot => write!(f, "bot"),
        }
    }
}

/// One message in the conversation.
///
/// Persisted as `{"from": "user", "text": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "from")]
    pub origin: Origin,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Bot,
            text: text.into(),
        }
    }

    /// Visual lines of this turn: split on newlines, each line trimmed.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n').map(str::trim)
    }
}

// =============================================================================
// Transcript
// =============================================================================

/// The full ordered history of turns.
///
/// Never empty: it is seeded with a greeting turn from the bot and every
/// reset returns it to that single turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// A transcript holding only the bot's greeting.
    pub fn greeting(greeting: &str) -> Self {
        Self {
            turns: vec![Turn::bot(greeting)],
        }
    }

    /// Rebuild a transcript from persisted turns.
    ///
    /// An empty list falls back to the greeting transcript.
    pub fn from_turns(turns: Vec<Turn>, greeting: &str) -> Self {
        if turns.is_empty() {
            Self::greeting(greeting)
        } else {
            Self { turns }
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drop every turn and reseed with the greeting.
    pub fn reset(&mut self, greeting: &str) {
        self.turns.clear();
        self.turns.push(Turn::bot(greeting));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

// =============================================================================
// Session identifier
// =============================================================================

/// Opaque per-device token correlating requests to one backend conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Compose buffer
// =============================================================================

/// Draft text that has not been sent yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposeBuffer {
    text: String,
}

impl ComposeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Replace the draft, as when the user edits the input field.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append typed text verbatim.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Append a recognized speech transcript with a leading space.
    pub fn append_transcript(&mut self, transcript: &str) {
        self.text.push(' ');
        self.text.push_str(transcript);
    }

    /// Append a picked emoji or other symbol.
    pub fn insert_symbol(&mut self, symbol: &str) {
        self.text.push_str(symbol);
    }

    /// True when there is nothing worth sending.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Take the draft, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

// =============================================================================
// UI flags
// =============================================================================

/// Transient view state mirrored by the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiFlags {
    pub bot_typing: bool,
    pub input_disabled: bool,
    pub listening: bool,
    pub emoji_picker_open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: &str = "Hello from the preschool";

    #[test]
    fn test_turn_serializes_with_from_key() {
        let json = serde_json::to_string(&Turn::user("Hello")).unwrap();
        assert_eq!(json, r#"{"from":"user","text":"Hello"}"#);

        let turn: Turn = serde_json::from_str(r#"{"from":"bot","text":"Hi there!"}"#).unwrap();
        assert_eq!(turn, Turn::bot("Hi there!"));
    }

    #[test]
    fn test_turn_rejects_unknown_origin() {
        let result: Result<Turn, _> = serde_json::from_str(r#"{"from":"admin","text":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_turn_lines_are_split_and_trimmed() {
        let turn = Turn::bot("Fees:\n  Playgroup  \n Nursery");
        let lines: Vec<&str> = turn.lines().collect();
        assert_eq!(lines, vec!["Fees:", "Playgroup", "Nursery"]);
    }

    #[test]
    fn test_greeting_transcript() {
        let transcript = Transcript::greeting(GREETING);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0], Turn::bot(GREETING));
        assert!(!transcript.is_empty());
    }

    #[test]
    fn test_from_empty_turns_falls_back_to_greeting() {
        let transcript = Transcript::from_turns(Vec::new(), GREETING);
        assert_eq!(transcript, Transcript::greeting(GREETING));
    }

    #[test]
    fn test_reset_after_many_turns() {
        let mut transcript = Transcript::greeting(GREETING);
        for i in 0..10 {
            transcript.push(Turn::user(format!("question {i}")));
            transcript.push(Turn::bot(format!("answer {i}")));
        }
        assert_eq!(transcript.len(), 21);

        transcript.reset(GREETING);
        assert_eq!(transcript, Transcript::greeting(GREETING));
    }

    #[test]
    fn test_transcript_serializes_as_plain_array() {
        let mut transcript = Transcript::greeting(GREETING);
        transcript.push(Turn::user("Hello"));
        let json = serde_json::to_string(&transcript).unwrap();
        assert!(json.starts_with('['));

        let turns: Vec<Turn> = serde_json::from_str(&json).unwrap();
        assert_eq!(Transcript::from_turns(turns, GREETING), transcript);
    }

    #[test]
    fn test_session_id_is_transparent() {
        let id = SessionId::new("3f1c");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""3f1c""#);
        assert_eq!(id.to_string(), "3f1c");
    }

    #[test]
    fn test_compose_buffer_symbol_insertion() {
        let mut compose = ComposeBuffer::new();
        compose.set("Hi ");
        compose.insert_symbol("😊");
        assert_eq!(compose.as_str(), "Hi 😊");
    }

    #[test]
    fn test_compose_buffer_transcript_gets_leading_space() {
        let mut compose = ComposeBuffer::new();
        compose.set("Admission");
        compose.append_transcript("for my daughter");
        assert_eq!(compose.as_str(), "Admission for my daughter");
    }

    #[test]
    fn test_compose_buffer_blank_and_take() {
        let mut compose = ComposeBuffer::new();
        assert!(compose.is_blank());
        compose.set("  \t ");
        assert!(compose.is_blank());

        compose.set("Hello");
        assert!(!compose.is_blank());
        assert_eq!(compose.take(), "Hello");
        assert_eq!(compose.as_str(), "");
    }

    #[test]
    fn test_ui_flags_default_all_false() {
        let flags = UiFlags::default();
        assert!(!flags.bot_typing);
        assert!(!flags.input_disabled);
        assert!(!flags.listening);
        assert!(!flags.emoji_picker_open);
    }
}
