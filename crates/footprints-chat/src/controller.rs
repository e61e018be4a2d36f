//! Conversation controller: central coordinator of the send/receive cycle.
//!
//! Owns the transcript, compose buffer, emoji picker and UI flags. Every
//! transcript mutation is written through to the transcript store and every
//! state change is broadcast as a [`ConversationEvent`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use footprints_core::config::FootprintsConfig;
use footprints_core::events::ConversationEvent;
use footprints_core::types::{ComposeBuffer, SessionId, Transcript, Turn, UiFlags};
use footprints_storage::TranscriptStore;

use crate::backend::{ChatBackend, ChatReply, ChatRequest};
use crate::emoji::EmojiPicker;
use crate::error::ChatError;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Behavioural knobs of the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub fallback_message: String,
    /// Pause between the user's turn and the typing indicator.
    pub thinking_delay: Duration,
    /// Pause between a successful reply and its bot turn.
    pub reply_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&FootprintsConfig::default())
    }
}

impl From<&FootprintsConfig> for ControllerConfig {
    fn from(config: &FootprintsConfig) -> Self {
        Self {
            fallback_message: config.assistant.fallback_message.clone(),
            thinking_delay: Duration::from_millis(config.backend.thinking_delay_ms),
            reply_delay: Duration::from_millis(config.backend.reply_delay_ms),
        }
    }
}

/// A send that has been committed to the transcript and awaits its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub request: ChatRequest,
}

/// Conversation state machine for one chat widget.
pub struct ConversationController {
    backend: Arc<dyn ChatBackend>,
    store: TranscriptStore,
    session_id: SessionId,
    config: ControllerConfig,
    transcript: Transcript,
    compose: ComposeBuffer,
    emoji: EmojiPicker,
    bot_typing: bool,
    input_disabled: bool,
    in_flight: bool,
    events: broadcast::Sender<ConversationEvent>,
}

impl ConversationController {
    /// Create a controller, rehydrating the transcript from `store`.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        store: TranscriptStore,
        session_id: SessionId,
        config: ControllerConfig,
    ) -> Self {
        let transcript = store.load();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        tracing::info!(
            turns = transcript.len(),
            session_id = %session_id,
            "Conversation ready"
        );
        Self {
            backend,
            store,
            session_id,
            config,
            transcript,
            compose: ComposeBuffer::new(),
            emoji: EmojiPicker::new(),
            bot_typing: false,
            input_disabled: false,
            in_flight: false,
            events,
        }
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn compose(&self) -> &ComposeBuffer {
        &self.compose
    }

    pub fn compose_mut(&mut self) -> &mut ComposeBuffer {
        &mut self.compose
    }

    pub fn emoji_picker(&self) -> &EmojiPicker {
        &self.emoji
    }

    /// Flags owned by the controller. `listening` belongs to the speech
    /// adapter and is always `false` here.
    pub fn flags(&self) -> UiFlags {
        UiFlags {
            bot_typing: self.bot_typing,
            input_disabled: self.input_disabled,
            listening: false,
            emoji_picker_open: self.emoji.is_open(),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    // -- Emoji picker --

    pub fn toggle_emoji_picker(&mut self) -> bool {
        let open = self.emoji.toggle();
        self.emit(ConversationEvent::EmojiPicker(open));
        open
    }

    /// Insert the palette symbol at `index` into the draft.
    pub fn select_emoji(&mut self, index: usize) -> Option<&'static str> {
        self.emoji.select(index, &mut self.compose)
    }

    /// Report a pointer interaction; one outside the picker dismisses it.
    pub fn pointer_down(&mut self, inside_picker: bool) {
        if self.emoji.pointer_down(inside_picker) {
            self.emit(ConversationEvent::EmojiPicker(false));
        }
    }

    // -- Send cycle --

    /// Send the draft and wait for the bot's answer.
    ///
    /// Returns the bot turn that was appended: the backend's reply, or the
    /// fallback message when the request failed in any way. A blank draft
    /// returns [`ChatError::EmptyMessage`] and changes nothing.
    pub async fn send_message(&mut self) -> Result<Turn, ChatError> {
        let pending = self.begin_send()?;

        if !self.config.thinking_delay.is_zero() {
            tokio::time::sleep(self.config.thinking_delay).await;
        }
        self.set_bot_typing(true);

        let outcome = self.backend.send(&pending.request).await;
        if outcome.is_ok() && !self.config.reply_delay.is_zero() {
            tokio::time::sleep(self.config.reply_delay).await;
        }

        Ok(self.complete_send(outcome))
    }

    /// First half of a send: commit the user's turn and lock the input.
    ///
    /// Fails without side effects when the draft is blank or another send
    /// has not completed yet.
    pub fn begin_send(&mut self) -> Result<PendingSend, ChatError> {
        if self.in_flight {
            tracing::debug!("Send rejected, reply still pending");
            return Err(ChatError::RequestInFlight);
        }
        if self.compose.is_blank() {
            return Err(ChatError::EmptyMessage);
        }

        let message = self.compose.take();
        self.append(Turn::user(message.clone()));
        if self.emoji.close() {
            self.emit(ConversationEvent::EmojiPicker(false));
        }
        self.set_input_disabled(true);
        self.in_flight = true;

        Ok(PendingSend {
            request: ChatRequest {
                message,
                session_id: self.session_id.clone(),
            },
        })
    }

    /// Show the typing indicator while the backend is working.
    pub fn set_bot_typing(&mut self, typing: bool) {
        if self.bot_typing != typing {
            self.bot_typing = typing;
            self.emit(ConversationEvent::BotTyping(typing));
        }
    }

    /// Second half of a send: append the bot's turn and unlock the input.
    pub fn complete_send(&mut self, outcome: Result<ChatReply, ChatError>) -> Turn {
        let turn = match outcome {
            Ok(reply) => Turn::bot(reply.response),
            Err(e) => {
                tracing::warn!(error = %e, "No reply from assistant, showing fallback");
                Turn::bot(self.config.fallback_message.clone())
            }
        };
        self.append(turn.clone());
        self.set_bot_typing(false);
        self.set_input_disabled(false);
        self.in_flight = false;
        turn
    }

    /// Reset the conversation to the greeting and erase the stored history.
    ///
    /// The session identifier is kept.
    pub fn clear_chat(&mut self) {
        self.transcript.reset(self.store.greeting());
        self.store.clear();
        tracing::info!("Chat cleared");
        self.emit(ConversationEvent::TranscriptReset {
            greeting: Turn::bot(self.store.greeting()),
        });
    }

    // -- Private helpers --

    fn append(&mut self, turn: Turn) {
        self.transcript.push(turn.clone());
        self.store.save(&self.transcript);
        self.emit(ConversationEvent::TurnAppended { turn });
    }

    fn set_input_disabled(&mut self, disabled: bool) {
        if self.input_disabled != disabled {
            self.input_disabled = disabled;
            self.emit(ConversationEvent::InputDisabled(disabled));
        }
    }

    fn emit(&self, event: ConversationEvent) {
        // No subscribers is fine; the controller works headless.
        let _ = self.events.send(event);
    }
}

// =============================================================================
// Tests
// =============================================================================
