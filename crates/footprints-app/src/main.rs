//! Footprints client binary - composition root.
//!
//! 1. Load configuration from TOML and apply CLI overrides
//! 2. Open the local store (SQLite, or memory when the disk is unusable)
//! 3. Restore the session id and transcript
//! 4. Run the prompt loop, re-rendering on every conversation event

mod cli;
mod render;

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;

use footprints_chat::emoji::PALETTE;
use footprints_chat::{ChatError, ControllerConfig, ConversationController, HttpChatBackend};
use footprints_core::config::FootprintsConfig;
use footprints_core::error::FootprintsError;
use footprints_dictation::SpeechCapture;
use footprints_storage::{Database, KeyValueStore, MemoryStore, SessionStore, TranscriptStore};

use cli::{discard_input_while, expand_home, parse_input, read_line, CliArgs, Input, HELP};
use render::ChatView;

type SharedView = Arc<Mutex<ChatView>>;

/// Run `f` against the view. A panicked renderer leaves the view usable.
fn with_view<T>(view: &SharedView, f: impl FnOnce(&mut ChatView) -> T) -> T {
    let mut guard = view.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Clear the terminal and draw `screen`.
fn draw(screen: &str) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "\x1b[2J\x1b[H{screen} ");
    let _ = out.flush();
}

fn open_database(data_dir: &Path) -> Result<Database, FootprintsError> {
    std::fs::create_dir_all(data_dir)?;
    Database::open(&data_dir.join("footprints.db"))
}

/// Sync app-owned state into the view and redraw.
fn refresh(
    view: &SharedView,
    controller: &ConversationController,
    speech: &SpeechCapture,
    viewport_lines: usize,
) {
    with_view(view, |v| {
        v.set_draft(controller.compose().as_str());
        v.set_listening(speech.is_listening());
        draw(&v.screen(viewport_lines));
    });
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = FootprintsConfig::load_or_default(&config_file);
    args.apply_overrides(&mut config);

    // Tracing. Logs go to stderr so they stay out of the chat screen.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Footprints v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = expand_home(&config.general.data_dir);
    let kv: Arc<dyn KeyValueStore> = match open_database(&data_dir) {
        Ok(db) => {
            tracing::info!(path = %data_dir.display(), "SQLite database opened");
            Arc::new(db)
        }
        Err(e) => {
            tracing::warn!(
                path = %data_dir.display(),
                error = %e,
                "Local storage unavailable, chat history will not be kept"
            );
            Arc::new(MemoryStore::new())
        }
    };

    // Conversation.
    let session_id = SessionStore::new(Arc::clone(&kv)).load_or_create();
    let backend = Arc::new(HttpChatBackend::new(config.backend.endpoint.clone()));
    tracing::info!(endpoint = %backend.endpoint(), "Chat backend configured");
    let mut controller = ConversationController::new(
        backend,
        TranscriptStore::new(kv, config.assistant.greeting.clone()),
        session_id,
        ControllerConfig::from(&config),
    );

    let (mut speech, mut speech_rx) = SpeechCapture::from_config(&config.speech);
    if !speech.is_available() {
        tracing::info!("Speech input unavailable");
    }

    // Renderer.
    let viewport_lines = config.display.viewport_lines;
    let view: SharedView = Arc::new(Mutex::new(ChatView::new(
        config.assistant.name.clone(),
        controller.transcript(),
        PALETTE,
    )));
    let mut events = controller.subscribe();
    let render_view = Arc::clone(&view);
    let render_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => with_view(&render_view, |v| {
                    v.apply(&event);
                    draw(&v.screen(viewport_lines));
                }),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind conversation events");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    refresh(&view, &controller, &speech, viewport_lines);

    // Prompt loop.
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut line_buf = Vec::new();
    let mut stdin_closed = false;
    while !stdin_closed {
        tokio::select! {
            line = read_line(&mut stdin, &mut line_buf) => {
                let Some(line) = line? else { break };
                let input = parse_input(&line);
                with_view(&view, |v| v.set_notice(None));

                // Only picker commands count as interaction inside the picker.
                if !matches!(input, Input::ToggleEmoji | Input::InsertEmoji(_)) {
                    controller.pointer_down(false);
                }

                match input {
                    Input::Quit => break,
                    Input::Message(text) => {
                        controller.compose_mut().push_str(&text);
                        let (outcome, discarded) = discard_input_while(
                            controller.send_message(),
                            &mut stdin,
                            &mut line_buf,
                        )
                        .await?;
                        stdin_closed = discarded.closed;
                        if discarded.lines > 0 {
                            with_view(&view, |v| {
                                v.set_notice(Some(
                                    "Messages typed while waiting for the reply were not sent"
                                        .to_string(),
                                ))
                            });
                        }
                        match outcome {
                            Ok(turn) => tracing::debug!(chars = turn.text.len(), "Reply shown"),
                            Err(ChatError::EmptyMessage) => {}
                            Err(e) => tracing::warn!(error = %e, "Message not sent"),
                        }
                    }
                    Input::ToggleEmoji => {
                        controller.toggle_emoji_picker();
                    }
                    Input::InsertEmoji(index) => {
                        if controller.select_emoji(index).is_none() {
                            let notice = if controller.emoji_picker().is_open() {
                                format!("No emoji at {index}")
                            } else {
                                "Open the picker with /emoji first".to_string()
                            };
                            with_view(&view, |v| v.set_notice(Some(notice)));
                        }
                    }
                    Input::Mic => {
                        if speech.is_listening() {
                            speech.stop_listening();
                        } else if !speech.start_listening() && !speech.is_available() {
                            with_view(&view, |v| {
                                v.set_notice(Some("Speech input is not available".to_string()))
                            });
                        }
                    }
                    Input::Clear => controller.clear_chat(),
                    Input::Draft => {
                        let notice = if controller.compose().as_str().is_empty() {
                            "Draft is empty".to_string()
                        } else {
                            format!("Draft: {}", controller.compose().as_str())
                        };
                        with_view(&view, |v| v.set_notice(Some(notice)));
                    }
                    Input::Help => with_view(&view, |v| v.set_notice(Some(HELP.to_string()))),
                    Input::Unknown(command) => {
                        let notice = format!("Unknown command {command}. {HELP}");
                        with_view(&view, |v| v.set_notice(Some(notice)));
                    }
                }
            }
            Some(event) = speech_rx.recv() => {
                speech.handle_event(event, controller.compose_mut());
            }
        }
        refresh(&view, &controller, &speech, viewport_lines);
    }

    speech.stop_listening();
    drop(controller);
    let _ = render_task.await;
    println!();
    tracing::info!("Footprints stopped");
    Ok(())
}
