//! Terminal view of the conversation.
//!
//! `ChatView` is a projection of controller events plus the app-owned bits
//! (speech indicator, draft, notices). It renders to plain text; the binary
//! decides how to put that on screen.

use footprints_core::events::ConversationEvent;
use footprints_core::types::{Origin, Transcript, Turn, UiFlags};

pub const HEADER: &str = "Footprints Parent Assistant";

const USER_LABEL: &str = "You";

pub struct ChatView {
    assistant_name: String,
    turns: Vec<Turn>,
    flags: UiFlags,
    draft: String,
    notice: Option<String>,
    palette: &'static [&'static str],
}

impl ChatView {
    pub fn new(
        assistant_name: impl Into<String>,
        transcript: &Transcript,
        palette: &'static [&'static str],
    ) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            turns: transcript.turns().to_vec(),
            flags: UiFlags::default(),
            draft: String::new(),
            notice: None,
            palette,
        }
    }

    /// Fold one controller event into the view.
    pub fn apply(&mut self, event: &ConversationEvent) {
        match event {
            ConversationEvent::TurnAppended { turn } => self.turns.push(turn.clone()),
            ConversationEvent::TranscriptReset { greeting } => {
                self.turns = vec![greeting.clone()];
            }
            ConversationEvent::BotTyping(typing) => self.flags.bot_typing = *typing,
            ConversationEvent::InputDisabled(disabled) => self.flags.input_disabled = *disabled,
            ConversationEvent::EmojiPicker(open) => self.flags.emoji_picker_open = *open,
            _ => {}
        }
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.flags.listening = listening;
    }

    pub fn set_draft(&mut self, draft: &str) {
        draft.clone_into(&mut self.draft);
    }

    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    pub fn placeholder(&self) -> String {
        format!("Type a message to {}...", self.assistant_name)
    }

    /// Every transcript line in order, followed by the typing indicator.
    ///
    /// Each turn is split on newlines and every line is trimmed. The first
    /// line carries the speaker label; continuation lines are indented under
    /// it.
    pub fn render_lines(&self) -> Vec<String> {
        let label_width = USER_LABEL
            .chars()
            .count()
            .max(self.assistant_name.chars().count());

        let mut lines = Vec::new();
        for turn in &self.turns {
            let label = match turn.origin {
                Origin::User => USER_LABEL,
                Origin::Bot => self.assistant_name.as_str(),
            };
            // User turns are marked with '>' and bot turns with '|'.
            let marker = match turn.origin {
                Origin::User => '>',
                Origin::Bot => '|',
            };
            for (i, text) in turn.lines().enumerate() {
                let shown = if i == 0 { label } else { "" };
                let line = format!("{shown:>label_width$} {marker} {text}");
                lines.push(line.trim_end().to_string());
            }
        }

        if self.flags.bot_typing {
            lines.push(format!("{} is typing...", self.assistant_name));
        }
        lines
    }

    /// The last `height` rendered lines, so the newest line is always shown.
    pub fn visible_lines(&self, height: usize) -> Vec<String> {
        let mut lines = self.render_lines();
        let skip = lines.len().saturating_sub(height);
        lines.drain(..skip);
        lines
    }

    /// Numbered palette entries while the picker is open.
    pub fn palette_line(&self) -> Option<String> {
        if !self.flags.emoji_picker_open {
            return None;
        }
        let entries: Vec<String> = self
            .palette
            .iter()
            .enumerate()
            .map(|(i, symbol)| format!("{i}:{symbol}"))
            .collect();
        Some(entries.join("  "))
    }

    /// The compose prompt line.
    pub fn prompt(&self) -> String {
        let mic = if self.flags.listening {
            "[mic: listening] "
        } else {
            ""
        };
        if self.flags.input_disabled {
            return format!("{mic}(waiting for {}...)", self.assistant_name);
        }
        if self.draft.is_empty() {
            format!("{mic}> {}", self.placeholder())
        } else {
            format!("{mic}> {}", self.draft)
        }
    }

    /// Full screen: header, transcript viewport, picker, notice, prompt.
    pub fn screen(&self, viewport_lines: usize) -> String {
        let mut out = Vec::with_capacity(viewport_lines + 6);
        out.push(HEADER.to_string());
        out.push("-".repeat(HEADER.chars().count()));
        out.extend(self.visible_lines(viewport_lines));
        out.push(String::new());
        if let Some(palette) = self.palette_line() {
            out.push(palette);
        }
        if let Some(notice) = &self.notice {
            out.push(notice.clone());
        }
        out.push(self.prompt());
        out.join("\n")
    }
}
