//! Browser chrome.
//!
//! This crate provides the host side of the shell:
//! - Window and its dispatch entry point
//! - Tabs and tab management
//! - Navigation bar and address field
//! - Focus arbitration with the engine
//! - Keyboard shortcuts

pub mod address_bar;
pub mod focus;
pub mod keyboard;
pub mod navigation;
pub mod shortcuts;
pub mod tab;
pub mod tab_manager;
pub mod window;

#[cfg(test)]
mod testing;

pub use focus::{FocusArbiter, FocusState, HostFocus, LoggingHostFocus};
pub use keyboard::{Key, KeyCombo, Modifiers};
pub use navigation::{normalize_url, ChromeControl, NavigationBar};
pub use shortcuts::{ChromeAction, ShortcutRouter};
pub use tab::{Tab, TabId};
pub use tab_manager::TabManager;
pub use window::{Dispatch, UiTask, UserInput, Window, WindowConfig, WindowState};
