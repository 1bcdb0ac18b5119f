//! Keyboard input types.

use std::fmt;

use bitflags::bitflags;
use common::{ShellError, ShellResult};

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const CTRL = 0b0001;
        const ALT = 0b0010;
        const SHIFT = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Key input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Enter,
    Escape,
    Tab,
    Space,
    F(u8),
}

/// A key together with its modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl KeyCombo {
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Self { modifiers, key }
    }

    /// The combo with character keys lowercased, so that `Ctrl+T` and
    /// `Ctrl+t` look up the same binding. Shift stays in the modifiers.
    pub fn normalized(&self) -> Self {
        let key = match self.key {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self::new(self.modifiers, key)
    }

    /// A key pressed without modifiers.
    pub fn plain(key: Key) -> Self {
        Self::new(Modifiers::empty(), key)
    }

    /// Parse a combo such as `"ctrl+shift+tab"` or `"F5"`. The result is
    /// normalized.
    pub fn parse(input: &str) -> ShellResult<Self> {
        let parts: Vec<&str> = input
            .split('+')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        let (key_name, modifier_names) = parts
            .split_last()
            .ok_or_else(|| ShellError::keybind(format!("empty key combination '{}'", input)))?;

        let mut modifiers = Modifiers::empty();
        for name in modifier_names {
            modifiers |= match name.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => Modifiers::CTRL,
                "alt" | "option" => Modifiers::ALT,
                "shift" => Modifiers::SHIFT,
                "super" | "cmd" | "meta" => Modifiers::SUPER,
                other => {
                    return Err(ShellError::keybind(format!(
                        "unknown modifier '{}' in '{}'",
                        other, input
                    )))
                }
            };
        }

        let key = parse_key(key_name)
            .ok_or_else(|| ShellError::keybind(format!("unknown key '{}' in '{}'", key_name, input)))?;

        Ok(Self::new(modifiers, key).normalized())
    }

    /// Whether the combo carries a command modifier (anything but Shift).
    pub fn is_command(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER)
    }
}

fn parse_key(name: &str) -> Option<Key> {
    let lower = name.to_ascii_lowercase();
    let key = match lower.as_str() {
        "backspace" => Key::Backspace,
        "delete" | "del" => Key::Delete,
        "left" => Key::Left,
        "right" => Key::Right,
        "up" => Key::Up,
        "down" => Key::Down,
        "home" => Key::Home,
        "end" => Key::End,
        "enter" | "return" => Key::Enter,
        "escape" | "esc" => Key::Escape,
        "tab" => Key::Tab,
        "space" => Key::Space,
        _ => {
            if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=24).contains(&n) {
                    return Some(Key::F(n));
                }
                return None;
            }
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(Modifiers::CTRL) {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            write!(f, "Alt+")?;
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            write!(f, "Shift+")?;
        }
        if self.modifiers.contains(Modifiers::SUPER) {
            write!(f, "Super+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            Key::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}
