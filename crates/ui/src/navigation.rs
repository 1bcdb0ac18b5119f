//! Navigation bar component.
//!
//! One per tab: back, forward and reload buttons plus the address field,
//! wired to that tab's browser and nothing else.

use std::sync::Arc;

use common::BrowserHandle;
use tracing::debug;

use crate::address_bar::{AddressBar, AddressBarAction};
use crate::keyboard::{Key, KeyCombo, Modifiers};
use crate::tab::TabId;

/// Chrome controls of a tab, in focus-traversal order.
///
/// The rendering surface follows the address field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChromeControl {
    Back,
    Forward,
    Reload,
    AddressField,
}

impl ChromeControl {
    /// Traversal order.
    pub const ORDER: [ChromeControl; 4] = [
        ChromeControl::Back,
        ChromeControl::Forward,
        ChromeControl::Reload,
        ChromeControl::AddressField,
    ];

    /// First control in traversal order.
    pub fn first() -> Self {
        ChromeControl::Back
    }

    /// Last control before the rendering surface.
    pub fn last() -> Self {
        ChromeControl::AddressField
    }

    /// The next control, or `None` when focus moves on to the surface.
    pub fn next(self) -> Option<Self> {
        let index = Self::ORDER.iter().position(|c| *c == self)?;
        Self::ORDER.get(index + 1).copied()
    }

    /// The previous control, or `None` at the start of the chrome.
    pub fn previous(self) -> Option<Self> {
        let index = Self::ORDER.iter().position(|c| *c == self)?;
        index.checked_sub(1).map(|i| Self::ORDER[i])
    }
}

/// Navigation action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationAction {
    Back,
    Forward,
    Reload,
}

/// Prefix the secure scheme unless the input already names http or https.
///
/// Returns `None` for blank input.
pub fn normalize_url(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if input.starts_with("http://") || input.starts_with("https://") {
        Some(input.to_string())
    } else {
        Some(format!("https://{}", input))
    }
}

/// Navigation bar.
pub struct NavigationBar {
    /// Owning tab.
    tab: TabId,
    /// Browser the controls drive.
    browser: Arc<dyn BrowserHandle>,
    /// Address field.
    address: AddressBar,
    /// Focused chrome control, if host chrome holds focus in this tab.
    focused: Option<ChromeControl>,
}

impl NavigationBar {
    /// Create a navigation bar for `browser`, showing `url`.
    pub fn new(tab: TabId, browser: Arc<dyn BrowserHandle>, url: &str) -> Self {
        Self {
            tab,
            browser,
            address: AddressBar::new(url),
            focused: None,
        }
    }

    /// Get the displayed address text.
    pub fn displayed_url(&self) -> &str {
        self.address.input()
    }

    /// Get the address field.
    pub fn address_bar(&self) -> &AddressBar {
        &self.address
    }

    /// Submit user text: normalize, navigate, and hand focus to the page.
    ///
    /// Returns the URL sent to the engine.
    pub fn submit(&mut self, text: &str) -> Option<String> {
        let url = normalize_url(text)?;
        debug!(tab = self.tab.0, browser = %self.browser.id(), url = %url, "navigate");
        self.address.set_input(text.trim());
        self.blur();
        self.browser.load_url(&url);
        self.browser.set_focus(true);
        Some(url)
    }

    /// The engine reported a new address for this tab's browser.
    pub fn on_address_change(&mut self, url: &str) {
        self.address.set_url(url);
    }

    /// Run a navigation action. Controls are always enabled.
    pub fn perform(&self, action: NavigationAction) {
        debug!(tab = self.tab.0, ?action, "navigation action");
        match action {
            NavigationAction::Back => self.browser.go_back(),
            NavigationAction::Forward => self.browser.go_forward(),
            NavigationAction::Reload => self.browser.reload(),
        }
    }

    pub fn back(&self) {
        self.perform(NavigationAction::Back);
    }

    pub fn forward(&self) {
        self.perform(NavigationAction::Forward);
    }

    pub fn reload(&self) {
        self.perform(NavigationAction::Reload);
    }

    /// Activate a control as if clicked.
    pub fn activate(&mut self, control: ChromeControl) {
        match control {
            ChromeControl::Back => self.back(),
            ChromeControl::Forward => self.forward(),
            ChromeControl::Reload => self.reload(),
            ChromeControl::AddressField => self.focus_control(ChromeControl::AddressField),
        }
    }

    /// Give host focus to one of the chrome controls.
    pub fn focus_control(&mut self, control: ChromeControl) {
        self.focused = Some(control);
        if control == ChromeControl::AddressField {
            self.address.focus();
        } else {
            self.address.blur();
        }
    }

    /// Drop host focus from the chrome controls.
    pub fn blur(&mut self) {
        self.focused = None;
        self.address.blur();
    }

    /// Get the focused control.
    pub fn focused_control(&self) -> Option<ChromeControl> {
        self.focused
    }

    /// Handle a key while host chrome holds focus.
    ///
    /// Tab moves through the controls; tabbing past the address field hands
    /// focus to the rendering surface. Returns `true` if the key was used.
    pub fn on_key(&mut self, combo: KeyCombo) -> bool {
        let Some(control) = self.focused else {
            return false;
        };

        if combo.key == Key::Tab && !combo.is_command() {
            let backward = combo.modifiers.contains(Modifiers::SHIFT);
            let target = if backward {
                control.previous()
            } else {
                control.next()
            };
            match target {
                Some(next) => self.focus_control(next),
                None if !backward => {
                    self.blur();
                    self.browser.set_focus(true);
                }
                None => {}
            }
            return true;
        }

        if combo.is_command() {
            return false;
        }

        match control {
            ChromeControl::AddressField => match self.address.on_key(combo.key) {
                Some(AddressBarAction::Submit(text)) => {
                    // Blank input keeps the field focused
                    if self.submit(&text).is_none() {
                        self.focus_control(ChromeControl::AddressField);
                    }
                    true
                }
                Some(AddressBarAction::Cancel) => true,
                None => true,
            },
            button => match combo.key {
                Key::Enter | Key::Space => {
                    self.activate(button);
                    true
                }
                _ => false,
            },
        }
    }
}
