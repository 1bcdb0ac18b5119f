//! Window-scoped keyboard shortcuts.
//!
//! Shortcuts are looked up before any focus routing, so they fire no matter
//! which widget or surface holds keyboard focus.

use std::collections::HashMap;
use std::fmt;

use common::ShellResult;
use tracing::warn;

use crate::keyboard::KeyCombo;

/// Chrome-level actions a shortcut can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChromeAction {
    /// Open a tab on the default start URL.
    NewTab,
    CloseTab,
    NextTab,
    PreviousTab,
    Reload,
    FocusAddressBar,
}

impl fmt::Display for ChromeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChromeAction::NewTab => "new-tab",
            ChromeAction::CloseTab => "close-tab",
            ChromeAction::NextTab => "next-tab",
            ChromeAction::PreviousTab => "previous-tab",
            ChromeAction::Reload => "reload",
            ChromeAction::FocusAddressBar => "focus-address-bar",
        };
        f.write_str(name)
    }
}

/// Default bindings.
pub const DEFAULT_BINDINGS: &[(&str, ChromeAction)] = &[
    ("ctrl+t", ChromeAction::NewTab),
    ("ctrl+w", ChromeAction::CloseTab),
    ("ctrl+tab", ChromeAction::NextTab),
    ("ctrl+shift+tab", ChromeAction::PreviousTab),
    ("f5", ChromeAction::Reload),
    ("ctrl+l", ChromeAction::FocusAddressBar),
];

/// Maps key combinations to chrome actions.
pub struct ShortcutRouter {
    bindings: HashMap<KeyCombo, ChromeAction>,
}

impl ShortcutRouter {
    /// A router with no bindings.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// A router with [`DEFAULT_BINDINGS`].
    pub fn with_defaults() -> Self {
        Self::from_bindings(DEFAULT_BINDINGS.iter().copied())
    }

    /// Build from `(combination, action)` pairs.
    ///
    /// Invalid combinations are logged and skipped.
    pub fn from_bindings<'a>(bindings: impl IntoIterator<Item = (&'a str, ChromeAction)>) -> Self {
        let mut router = Self::new();
        for (combo, action) in bindings {
            if let Err(e) = router.bind_str(combo, action) {
                warn!("skipping keybind for {}: {}", action, e);
            }
        }
        router
    }

    /// Bind a combination, replacing any previous binding for it.
    pub fn bind(&mut self, combo: KeyCombo, action: ChromeAction) -> Option<ChromeAction> {
        self.bindings.insert(combo.normalized(), action)
    }

    /// Parse and bind a combination.
    pub fn bind_str(&mut self, combo: &str, action: ChromeAction) -> ShellResult<()> {
        let combo = KeyCombo::parse(combo)?;
        self.bind(combo, action);
        Ok(())
    }

    /// Remove every binding for an action.
    pub fn unbind_action(&mut self, action: ChromeAction) {
        self.bindings.retain(|_, a| *a != action);
    }

    /// Look up the action for a key press.
    pub fn route(&self, combo: &KeyCombo) -> Option<ChromeAction> {
        self.bindings.get(&combo.normalized()).copied()
    }

    /// Display string of a combination bound to `action`.
    pub fn combo_for(&self, action: ChromeAction) -> Option<String> {
        let mut combos: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(combo, _)| combo.to_string())
            .collect();
        combos.sort();
        combos.into_iter().next()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for ShortcutRouter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
