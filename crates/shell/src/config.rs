//! Shell configuration.

use std::path::{Path, PathBuf};

use common::{EngineSettings, ShellError, ShellResult};
use serde::{Deserialize, Serialize};
use tracing::info;
use ui::{ChromeAction, ShortcutRouter, WindowConfig};
use url::Url;

/// Shell configuration.
///
/// Every field has a default, so a config file only names what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// URL new tabs open on.
    pub start_url: String,
    /// Window title.
    pub window_title: String,
    /// Window width.
    pub window_width: u32,
    /// Window height.
    pub window_height: u32,
    /// Render into offscreen buffers instead of native child windows.
    pub offscreen_rendering: bool,
    /// Engine resource directory.
    pub install_dir: PathBuf,
    /// Locale handed to the engine.
    pub locale: String,
    /// Keyboard shortcuts.
    pub keybinds: KeybindConfig,
}

impl ShellConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> ShellResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> ShellResult<Self> {
        let config: ShellConfig = toml::from_str(content)
            .map_err(|e| ShellError::config(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the engine and window cannot work with.
    pub fn validate(&self) -> ShellResult<()> {
        let url = Url::parse(&self.start_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ShellError::config(format!(
                "start_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ShellError::config(format!(
                "window size must be non-zero, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        Ok(())
    }

    /// Set the start URL.
    pub fn with_start_url(mut self, url: &str) -> Self {
        self.start_url = url.to_string();
        self
    }

    /// Set window size.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set offscreen rendering.
    pub fn with_offscreen_rendering(mut self, enabled: bool) -> Self {
        self.offscreen_rendering = enabled;
        self
    }

    /// Set the engine resource directory.
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    /// Engine bootstrap settings.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            windowless_rendering_enabled: self.offscreen_rendering,
            install_dir: self.install_dir.clone(),
            locale: self.locale.clone(),
        }
    }

    /// Window settings.
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            title: self.window_title.clone(),
            width: self.window_width,
            height: self.window_height,
            start_url: self.start_url.clone(),
        }
    }

    /// Shortcut router built from the configured keybinds.
    pub fn shortcut_router(&self) -> ShortcutRouter {
        ShortcutRouter::from_bindings(self.keybinds.bindings())
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        let window = WindowConfig::default();
        let engine = EngineSettings::default();
        Self {
            start_url: window.start_url,
            window_title: window.title,
            window_width: window.width,
            window_height: window.height,
            offscreen_rendering: engine.windowless_rendering_enabled,
            install_dir: engine.install_dir,
            locale: engine.locale,
            keybinds: KeybindConfig::default(),
        }
    }
}

/// Key combination per chrome action. An empty string leaves the action
/// unbound.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindConfig {
    pub new_tab: String,
    pub close_tab: String,
    pub next_tab: String,
    pub previous_tab: String,
    pub reload: String,
    pub focus_address_bar: String,
}

impl KeybindConfig {
    /// Non-empty bindings as `(combination, action)` pairs.
    pub fn bindings(&self) -> Vec<(&str, ChromeAction)> {
        [
            (self.new_tab.as_str(), ChromeAction::NewTab),
            (self.close_tab.as_str(), ChromeAction::CloseTab),
            (self.next_tab.as_str(), ChromeAction::NextTab),
            (self.previous_tab.as_str(), ChromeAction::PreviousTab),
            (self.reload.as_str(), ChromeAction::Reload),
            (self.focus_address_bar.as_str(), ChromeAction::FocusAddressBar),
        ]
        .into_iter()
        .filter(|(combo, _)| !combo.trim().is_empty())
        .collect()
    }
}

impl Default for KeybindConfig {
    fn default() -> Self {
        Self {
            new_tab: "ctrl+t".to_string(),
            close_tab: "ctrl+w".to_string(),
            next_tab: "ctrl+tab".to_string(),
            previous_tab: "ctrl+shift+tab".to_string(),
            reload: "f5".to_string(),
            focus_address_bar: "ctrl+l".to_string(),
        }
    }
}
