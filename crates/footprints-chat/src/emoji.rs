//! Emoji picker adapter.

use footprints_core::types::ComposeBuffer;

/// Symbols offered by the picker, in display order.
pub const PALETTE: &[&str] = &[
    "😊", "😂", "😍", "🙏", "👍", "👋", "👶", "🧒", "🎉", "❤️", "🤔", "😢", "🙌", "🏫", "📚",
    "🎨", "⚽", "🍎", "🚌", "📅",
];

/// Open/closed state plus the symbol palette.
#[derive(Debug, Clone)]
pub struct EmojiPicker {
    open: bool,
    palette: &'static [&'static str],
}

impl Default for EmojiPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl EmojiPicker {
    pub fn new() -> Self {
        Self::with_palette(PALETTE)
    }

    pub fn with_palette(palette: &'static [&'static str]) -> Self {
        Self {
            open: false,
            palette,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn palette(&self) -> &'static [&'static str] {
        self.palette
    }

    /// Flip the picker and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Dismiss the picker. Returns whether it was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// A pointer went down somewhere; anything outside the picker dismisses
    /// it. Returns whether the picker was closed by this interaction.
    pub fn pointer_down(&mut self, inside_picker: bool) -> bool {
        if inside_picker {
            false
        } else {
            self.close()
        }
    }

    /// Append the symbol at `index` to the draft.
    ///
    /// Only possible while the picker is open; the picker stays open so
    /// several symbols can be added in a row.
    pub fn select(&self, index: usize, compose: &mut ComposeBuffer) -> Option<&'static str> {
        if !self.open {
            return None;
        }
        let symbol = *self.palette.get(index)?;
        compose.insert_symbol(symbol);
        Some(symbol)
    }
}
