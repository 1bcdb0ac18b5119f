//! Engine host - bootstraps the engine and hands out clients.

use std::sync::Arc;

use common::{
    Engine, EngineBackend, EngineClient, EngineConnection, EngineSettings, EventSink,
    MessageRouterConfig, ShellError, ShellResult,
};
use tracing::info;

/// Operating systems the engine ships binaries for.
const SUPPORTED_OS: &[&str] = &["linux", "macos", "windows"];

/// Architectures the engine ships binaries for.
const SUPPORTED_ARCH: &[&str] = &["x86_64", "aarch64"];

/// Whether the engine can run on `os`/`arch`.
pub fn platform_supported(os: &str, arch: &str) -> bool {
    SUPPORTED_OS.contains(&os) && SUPPORTED_ARCH.contains(&arch)
}

/// The running engine, as seen by the chrome.
pub struct EngineHost {
    /// Backend name.
    backend: String,
    /// Running engine.
    engine: Arc<dyn Engine>,
    /// Router every client is created with.
    router: MessageRouterConfig,
    /// Whether browsers render offscreen.
    offscreen: bool,
}

impl EngineHost {
    /// Bootstrap the engine.
    ///
    /// Blocks until the engine is up. Every error is fatal to startup.
    pub fn initialize(
        settings: &EngineSettings,
        backend: &dyn EngineBackend,
        sink: EventSink,
    ) -> ShellResult<Self> {
        Self::initialize_on(std::env::consts::OS, std::env::consts::ARCH, settings, backend, sink)
    }

    fn initialize_on(
        os: &str,
        arch: &str,
        settings: &EngineSettings,
        backend: &dyn EngineBackend,
        sink: EventSink,
    ) -> ShellResult<Self> {
        if !platform_supported(os, arch) {
            return Err(ShellError::unsupported_platform(format!("{}-{}", os, arch)));
        }

        std::fs::create_dir_all(&settings.install_dir)?;

        info!(
            backend = backend.name(),
            install_dir = %settings.install_dir.display(),
            "initializing engine"
        );
        let engine = backend.initialize(settings, sink)?;
        info!(backend = backend.name(), "engine initialized");

        Ok(Self {
            backend: backend.name().to_string(),
            engine,
            router: MessageRouterConfig::default(),
            offscreen: settings.windowless_rendering_enabled,
        })
    }

    /// Get the backend name.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Get the message router configuration.
    pub fn router(&self) -> &MessageRouterConfig {
        &self.router
    }
}

impl EngineConnection for EngineHost {
    fn create_client(&self) -> Arc<dyn EngineClient> {
        self.engine.create_client(self.router.clone())
    }

    fn offscreen_rendering(&self) -> bool {
        self.offscreen
    }

    fn dispose(&self) -> ShellResult<()> {
        info!(backend = %self.backend, "disposing engine");
        self.engine.dispose()
    }
}
