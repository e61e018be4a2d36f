//! Speech capture adapter binding one recognizer to the compose buffer.

use std::sync::Arc;

use tokio::sync::mpsc;

use footprints_core::config::SpeechConfig;
use footprints_core::types::ComposeBuffer;

use crate::recognizer::{CommandRecognizer, RecognitionEvent, RecognitionOptions, SpeechRecognizer};
use crate::state::CaptureState;

/// Drives a single recognizer and folds its transcripts into the draft.
///
/// Recognizer events arrive on the receiver returned by [`SpeechCapture::new`];
/// the owner of the compose buffer feeds them back through
/// [`SpeechCapture::handle_event`].
pub struct SpeechCapture {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    options: RecognitionOptions,
    state: CaptureState,
    events_tx: mpsc::UnboundedSender<RecognitionEvent>,
}

impl SpeechCapture {
    pub fn new(
        recognizer: Option<Arc<dyn SpeechRecognizer>>,
        options: RecognitionOptions,
    ) -> (Self, mpsc::UnboundedReceiver<RecognitionEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let capture = Self {
            recognizer,
            options,
            state: CaptureState::Idle,
            events_tx,
        };
        (capture, events_rx)
    }

    /// Build from `[speech]` config: disabled or command-less means no
    /// recognizer is available.
    pub fn from_config(config: &SpeechConfig) -> (Self, mpsc::UnboundedReceiver<RecognitionEvent>) {
        let recognizer = if config.enabled {
            CommandRecognizer::from_argv(&config.command)
                .map(|r| Arc::new(r) as Arc<dyn SpeechRecognizer>)
        } else {
            None
        };
        Self::new(recognizer, RecognitionOptions::from(config))
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.as_ref().is_some_and(|r| r.is_available())
    }

    pub fn is_listening(&self) -> bool {
        self.state == CaptureState::Listening
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Start a capture. Returns whether one was started.
    ///
    /// A no-op when no recognizer is available or a capture is already in
    /// flight.
    pub fn start_listening(&mut self) -> bool {
        let Some(recognizer) = self.recognizer.as_ref().filter(|r| r.is_available()) else {
            tracing::debug!("Speech recognition unavailable, ignoring start");
            return false;
        };

        if let Err(e) = self.state.transition(CaptureState::Listening) {
            tracing::debug!(error = %e, "Speech capture already in flight");
            return false;
        }

        match recognizer.start(&self.options, self.events_tx.clone()) {
            Ok(()) => {
                tracing::info!(locale = %self.options.locale, "Listening for speech");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start speech recognition");
                self.state = CaptureState::Idle;
                false
            }
        }
    }

    /// Abort the capture in flight. The recognizer's `End` event clears the
    /// listening flag.
    pub fn stop_listening(&mut self) {
        if let (CaptureState::Listening, Some(recognizer)) = (self.state, &self.recognizer) {
            recognizer.stop();
        }
    }

    /// Apply one recognizer event.
    ///
    /// Only `End` finishes a capture. An `Error` is always followed by the
    /// same capture's `End`, so the next capture cannot start until every
    /// event of the previous one has been seen.
    pub fn handle_event(&mut self, event: RecognitionEvent, compose: &mut ComposeBuffer) {
        match event {
            RecognitionEvent::Result { transcript } => {
                compose.append_transcript(&transcript);
            }
            RecognitionEvent::Error { message } => {
                tracing::debug!(error = %message, "Speech recognition error");
            }
            RecognitionEvent::End => {
                if self.state == CaptureState::Listening {
                    self.state = CaptureState::Idle;
                }
            }
        }
    }
}
