use serde::{Deserialize, Serialize};

use crate::types::Turn;

/// State changes emitted by the conversation controller.
///
/// Consumed by the presentation layer, which keeps its own view model in
/// sync by applying events in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ConversationEvent {
    /// A turn was appended to the end of the transcript.
    TurnAppended { turn: Turn },

    /// The transcript was reset to the single greeting turn.
    TranscriptReset { greeting: Turn },

    /// The bot started or stopped "typing".
    BotTyping(bool),

    /// The compose input was disabled or re-enabled.
    InputDisabled(bool),

    /// The emoji picker was opened or dismissed.
    EmojiPicker(bool),
}
