//! Address field component.

use crate::keyboard::Key;

/// Address field.
///
/// Holds the text shown to the user. The engine-reported address replaces
/// the text whenever it changes, even while the user is editing.
pub struct AddressBar {
    /// Last address reported by the engine.
    url: String,
    /// Displayed text.
    input: String,
    /// Is focused.
    focused: bool,
    /// Cursor position, as a byte offset on a char boundary.
    cursor: usize,
    /// Selection range.
    selection: Option<(usize, usize)>,
}

impl AddressBar {
    /// Create an address field showing `url`.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            input: url.to_string(),
            focused: false,
            cursor: url.len(),
            selection: None,
        }
    }

    /// Get the last engine-reported URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the displayed address. Last write wins.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
        self.input = url.to_string();
        self.cursor = self.input.len();
        self.selection = None;
    }

    /// Get the displayed text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Set the displayed text as if typed.
    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
        self.cursor = self.input.len();
        self.selection = None;
    }

    /// Focus the field and select its contents.
    pub fn focus(&mut self) {
        self.focused = true;
        self.cursor = self.input.len();
        self.selection = Some((0, self.input.len()));
    }

    /// Drop focus, keeping the text.
    pub fn blur(&mut self) {
        self.focused = false;
        self.selection = None;
    }

    /// Check if focused.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Get cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get selection.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.selection
    }

    /// Handle key input.
    pub fn on_key(&mut self, key: Key) -> Option<AddressBarAction> {
        match key {
            Key::Char(c) => {
                self.delete_selection();
                self.input.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                None
            }
            Key::Space => self.on_key(Key::Char(' ')),
            Key::Backspace => {
                if !self.delete_selection() {
                    if let Some(prev) = self.prev_boundary() {
                        self.input.remove(prev);
                        self.cursor = prev;
                    }
                }
                None
            }
            Key::Delete => {
                if !self.delete_selection() && self.cursor < self.input.len() {
                    self.input.remove(self.cursor);
                }
                None
            }
            Key::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
                self.selection = None;
                None
            }
            Key::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
                self.selection = None;
                None
            }
            Key::Home => {
                self.cursor = 0;
                self.selection = None;
                None
            }
            Key::End => {
                self.cursor = self.input.len();
                self.selection = None;
                None
            }
            Key::Enter => {
                self.blur();
                Some(AddressBarAction::Submit(self.input.clone()))
            }
            Key::Escape => {
                self.input = self.url.clone();
                self.focus();
                Some(AddressBarAction::Cancel)
            }
            _ => None,
        }
    }

    fn delete_selection(&mut self) -> bool {
        match self.selection.take() {
            Some((start, end)) if start < end => {
                self.input.replace_range(start..end, "");
                self.cursor = start;
                true
            }
            _ => false,
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.input[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.input[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

impl Default for AddressBar {
    fn default() -> Self {
        Self::new("")
    }
}

/// Address field action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressBarAction {
    /// The user pressed Enter with this text.
    Submit(String),
    /// The user abandoned the edit.
    Cancel,
}
