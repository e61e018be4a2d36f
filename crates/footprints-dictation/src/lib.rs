//! Footprints Dictation crate - speech-to-text input for the compose field.
//!
//! A recognizer is a platform capability that, once started, emits result,
//! error and end events. `SpeechCapture` drives one recognizer through a
//! small Idle/Listening state machine and folds recognized text into the
//! compose buffer.

pub mod capture;
pub mod recognizer;
pub mod state;

pub use capture::SpeechCapture;
pub use recognizer::{CommandRecognizer, RecognitionEvent, RecognitionOptions, SpeechRecognizer};
pub use state::CaptureState;
