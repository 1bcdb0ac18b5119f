//! Interface to the embedded browser engine.
//!
//! The engine runs out of process and on threads the shell does not control.
//! Commands flow into it through [`BrowserHandle`]; everything it reports
//! comes back as an [`EngineEvent`] posted through an [`EventSink`], which
//! marshals the event onto the UI dispatch queue.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ShellResult;

/// Engine client identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

/// Browser instance identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrowserId(pub u64);

/// Frame identifier within a browser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

impl FrameId {
    /// The top-level frame.
    pub const MAIN: FrameId = FrameId(0);
}

impl fmt::Display for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "browser-{}", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Direction hint carried by a take-focus notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusDirection {
    /// Focus is leaving the surface towards the next control.
    Forward,
    /// Focus is leaving the surface towards the previous control.
    Backward,
}

/// Coarse engine lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    New,
    Initializing,
    Initialized,
    Shutdown,
    Terminated,
}

impl LifecycleState {
    /// Whether the engine is gone for good.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Terminated)
    }
}

/// Notifications emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    /// A frame's address changed.
    AddressChange {
        browser: BrowserId,
        frame: FrameId,
        url: String,
    },
    /// A rendering surface received input focus.
    GotFocus { browser: BrowserId },
    /// A rendering surface gave focus back to the host.
    TakeFocus {
        browser: BrowserId,
        direction: FocusDirection,
    },
    /// The engine moved to a new lifecycle state.
    LifecycleStateChanged(LifecycleState),
}

impl EngineEvent {
    /// The browser the event concerns, if any.
    pub fn browser(&self) -> Option<BrowserId> {
        match self {
            EngineEvent::AddressChange { browser, .. }
            | EngineEvent::GotFocus { browser }
            | EngineEvent::TakeFocus { browser, .. } => Some(*browser),
            EngineEvent::LifecycleStateChanged(_) => None,
        }
    }
}

/// Thread-safe handle engine callbacks use to post events to the UI.
#[derive(Clone)]
pub struct EventSink {
    post: Arc<dyn Fn(EngineEvent) -> bool + Send + Sync>,
}

impl EventSink {
    /// Create a sink from a posting function.
    ///
    /// The function returns `false` once the receiving side is gone.
    pub fn new(post: impl Fn(EngineEvent) -> bool + Send + Sync + 'static) -> Self {
        Self {
            post: Arc::new(post),
        }
    }

    /// A sink that drops everything.
    pub fn discard() -> Self {
        Self::new(|_| false)
    }

    /// Post an event. Returns `false` if nobody is listening anymore.
    pub fn post(&self, event: EngineEvent) -> bool {
        (self.post)(event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

/// Engine bootstrap settings.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// Render into offscreen buffers instead of native child windows.
    pub windowless_rendering_enabled: bool,
    /// Where engine resources are installed and unpacked.
    pub install_dir: PathBuf,
    /// Locale passed to the engine.
    pub locale: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            windowless_rendering_enabled: false,
            install_dir: PathBuf::from("engine"),
            locale: "en-US".to_string(),
        }
    }
}

/// Message router configuration handed to each client.
///
/// The engine uses the router for asynchronous page-to-host queries; the
/// shell only names the entry points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRouterConfig {
    /// Name of the query function exposed to pages.
    pub query_function: String,
    /// Name of the cancel function exposed to pages.
    pub cancel_function: String,
}

impl Default for MessageRouterConfig {
    fn default() -> Self {
        Self {
            query_function: "shellQuery".to_string(),
            cancel_function: "shellQueryCancel".to_string(),
        }
    }
}

/// Native surface a browser renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceHandle {
    /// Browser rendering into the surface.
    pub browser: BrowserId,
    /// Whether the surface is an offscreen buffer.
    pub offscreen: bool,
    /// Whether the surface is transparent.
    pub transparent: bool,
}

/// Bootstraps an engine.
pub trait EngineBackend {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Start the engine. May block on disk or network work.
    fn initialize(&self, settings: &EngineSettings, sink: EventSink)
        -> ShellResult<Arc<dyn Engine>>;
}

/// A running engine.
pub trait Engine: Send + Sync {
    /// Create a new client. Clients are never shared between tabs.
    fn create_client(&self, router: MessageRouterConfig) -> Arc<dyn EngineClient>;

    /// Tear down all engine resources.
    fn dispose(&self) -> ShellResult<()>;
}

/// A client owning browser instances.
pub trait EngineClient: Send + Sync {
    fn id(&self) -> ClientId;

    /// Create a browser and start loading `url`.
    fn create_browser(&self, url: &str, offscreen: bool, transparent: bool)
        -> Arc<dyn BrowserHandle>;

    /// Release the client and everything it owns.
    fn dispose(&self);
}

/// Fire-and-forget commands to a browser instance.
pub trait BrowserHandle: Send + Sync {
    fn id(&self) -> BrowserId;

    fn load_url(&self, url: &str);

    fn go_back(&self);

    fn go_forward(&self);

    fn reload(&self);

    fn set_focus(&self, focused: bool);

    /// The native surface to embed in the chrome.
    fn ui_component(&self) -> SurfaceHandle;

    fn close(&self);
}

/// What the chrome needs from the engine host.
pub trait EngineConnection {
    /// A fresh client, pre-wired to the UI dispatch queue.
    fn create_client(&self) -> Arc<dyn EngineClient>;

    /// Whether browsers render offscreen.
    fn offscreen_rendering(&self) -> bool {
        false
    }

    /// Dispose the engine. Called once, from the window close sequence.
    fn dispose(&self) -> ShellResult<()>;
}
