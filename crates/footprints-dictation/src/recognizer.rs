//! Speech recognizer capability and the external-command implementation.

use std::process::Stdio;
use std::sync::Mutex;

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};

use footprints_core::config::SpeechConfig;
use footprints_core::error::FootprintsError;

/// Events a recognizer emits after `start`.
///
/// A capture produces at most one `Result`, optionally an `Error`, and
/// always finishes with `End`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Final transcript of what was said.
    Result { transcript: String },
    /// Recognition failed; the message is for logs only.
    Error { message: String },
    /// The capture is over.
    End,
}

/// How a recognizer should listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub locale: String,
    pub interim_results: bool,
    pub max_alternatives: u32,
    /// Stop after the first utterance.
    pub one_shot: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            interim_results: false,
            max_alternatives: 1,
            one_shot: true,
        }
    }
}

impl From<&SpeechConfig> for RecognitionOptions {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            locale: config.locale.clone(),
            interim_results: config.interim_results,
            max_alternatives: config.max_alternatives.max(1),
            one_shot: true,
        }
    }
}

/// A platform speech-recognition capability.
pub trait SpeechRecognizer: Send + Sync {
    /// Whether the capability exists on this machine.
    fn is_available(&self) -> bool {
        true
    }

    /// Begin capturing. Events are delivered on `events` until `End`.
    fn start(
        &self,
        options: &RecognitionOptions,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), FootprintsError>;

    /// Abort the capture in flight, if any. An `End` event still follows.
    fn stop(&self);
}

/// Runs an external program that records one utterance and prints the
/// transcript on stdout.
///
/// Recognition options reach the program through `FOOTPRINTS_SPEECH_LOCALE`,
/// `FOOTPRINTS_SPEECH_INTERIM` and `FOOTPRINTS_SPEECH_MAX_ALTERNATIVES`. The
/// first non-empty stdout line is the transcript; a non-zero exit status is
/// a recognition error.
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stop_tx: Mutex::new(None),
        }
    }

    /// Build from a configured argv. Returns `None` for an empty command.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(
        &self,
        options: &RecognitionOptions,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), FootprintsError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| FootprintsError::Speech(format!("no async runtime: {}", e)))?;

        let child = Command::new(&self.program)
            .args(&self.args)
            .env("FOOTPRINTS_SPEECH_LOCALE", &options.locale)
            .env("FOOTPRINTS_SPEECH_INTERIM", options.interim_results.to_string())
            .env(
                "FOOTPRINTS_SPEECH_MAX_ALTERNATIVES",
                options.max_alternatives.to_string(),
            )
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FootprintsError::Speech(format!("failed to launch {}: {}", self.program, e))
            })?;

        let (stop_tx, stop_rx) = oneshot::channel();
        {
            let mut guard = self
                .stop_tx
                .lock()
                .map_err(|e| FootprintsError::Speech(format!("stop handle poisoned: {}", e)))?;
            *guard = Some(stop_tx);
        }

        let program = self.program.clone();
        runtime.spawn(async move {
            tokio::select! {
                output = child.wait_with_output() => {
                    match output {
                        Ok(output) if output.status.success() => {
                            let stdout = String::from_utf8_lossy(&output.stdout);
                            if let Some(transcript) = first_transcript(&stdout) {
                                tracing::debug!(chars = transcript.len(), "Speech recognized");
                                let _ = events.send(RecognitionEvent::Result { transcript });
                            } else {
                                tracing::debug!(program = %program, "Recognizer heard nothing");
                            }
                        }
                        Ok(output) => {
                            let stderr = String::from_utf8_lossy(&output.stderr);
                            let _ = events.send(RecognitionEvent::Error {
                                message: format!("{} exited with {}: {}", program, output.status, stderr.trim()),
                            });
                        }
                        Err(e) => {
                            let _ = events.send(RecognitionEvent::Error {
                                message: format!("{} failed: {}", program, e),
                            });
                        }
                    }
                }
                Ok(()) = stop_rx => {
                    tracing::debug!(program = %program, "Recognizer stopped");
                }
            }
            let _ = events.send(RecognitionEvent::End);
        });

        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut guard) = self.stop_tx.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }
}

fn first_transcript(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut rx: mpsc::UnboundedReceiver<RecognitionEvent>) -> Vec<RecognitionEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            let end = event == RecognitionEvent::End;
            events.push(event);
            if end {
                break;
            }
        }
        events
    }

    #[test]
    fn test_first_transcript_skips_blank_lines() {
        assert_eq!(
            first_transcript("\n  \nadmission for nursery\nsecond guess\n"),
            Some("admission for nursery".to_string())
        );
        assert_eq!(first_transcript(" \n\n"), None);
    }

    #[test]
    fn test_options_from_config() {
        let config = SpeechConfig {
            locale: "en-IN".to_string(),
            max_alternatives: 0,
            ..SpeechConfig::default()
        };
        let options = RecognitionOptions::from(&config);
        assert_eq!(options.locale, "en-IN");
        assert!(!options.interim_results);
        assert_eq!(options.max_alternatives, 1);
        assert!(options.one_shot);
    }

    #[test]
    fn test_from_argv() {
        assert!(CommandRecognizer::from_argv(&[]).is_none());
        assert!(CommandRecognizer::from_argv(&["  ".to_string()]).is_none());

        let argv = vec!["listen".to_string(), "--once".to_string()];
        let recognizer = CommandRecognizer::from_argv(&argv).unwrap();
        assert_eq!(recognizer.program(), "listen");
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let recognizer = CommandRecognizer::new("true", vec![]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = recognizer.start(&RecognitionOptions::default(), tx);
        assert!(matches!(result, Err(FootprintsError::Speech(_))));
    }

    #[tokio::test]
    async fn test_missing_program_fails_to_start() {
        let recognizer = CommandRecognizer::new("/definitely/not/a/recognizer", vec![]);
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = recognizer
            .start(&RecognitionOptions::default(), tx)
            .unwrap_err();
        assert!(err.to_string().contains("failed to launch"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_result_then_end() {
        let recognizer = CommandRecognizer::new(
            "sh",
            vec!["-c".to_string(), "echo \"$FOOTPRINTS_SPEECH_LOCALE hello\"".to_string()],
        );
        let (tx, rx) = mpsc::unbounded_channel();
        recognizer.start(&RecognitionOptions::default(), tx).unwrap();

        let events = collect(rx).await;
        assert_eq!(
            events,
            vec![
                RecognitionEvent::Result {
                    transcript: "en-US hello".to_string()
                },
                RecognitionEvent::End,
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_failure_is_error_then_end() {
        let recognizer =
            CommandRecognizer::new("sh", vec!["-c".to_string(), "echo no mic >&2; exit 3".to_string()]);
        let (tx, rx) = mpsc::unbounded_channel();
        recognizer.start(&RecognitionOptions::default(), tx).unwrap();

        let events = collect(rx).await;
        assert_eq!(events.len(), 2);
        match &events[0] {
            RecognitionEvent::Error { message } => assert!(message.contains("no mic")),
            other => panic!("Expected Error, got {:?}", other),
        }
        assert_eq!(events[1], RecognitionEvent::End);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stop_ends_capture() {
        let recognizer = CommandRecognizer::new("sleep", vec!["30".to_string()]);
        let (tx, rx) = mpsc::unbounded_channel();
        recognizer.start(&RecognitionOptions::default(), tx).unwrap();
        recognizer.stop();

        let events = tokio::time::timeout(std::time::Duration::from_secs(5), collect(rx))
            .await
            .unwrap();
        assert_eq!(events, vec![RecognitionEvent::End]);
    }
}
