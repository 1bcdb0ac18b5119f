//! Oxide Shell - a tabbed browser window around an embedded engine.
//!
//! This crate wires the chrome to an engine:
//! - Engine bootstrap and client factory
//! - Configuration
//! - A headless engine for running without native binaries
//! - Console front-end

pub mod config;
pub mod console;
pub mod engine;
pub mod headless;

pub use config::{KeybindConfig, ShellConfig};
pub use engine::EngineHost;
pub use headless::HeadlessBackend;

/// Shell version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
