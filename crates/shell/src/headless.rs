//! Headless engine.
//!
//! Runs every browser on one worker thread and reports back only through
//! the event sink, the way an out-of-process engine would. Nothing is
//! rendered; each browser keeps a session history so back and forward
//! report real addresses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use common::{
    BrowserHandle, BrowserId, ClientId, Engine, EngineBackend, EngineClient, EngineEvent,
    EngineSettings, EventSink, FrameId, LifecycleState, MessageRouterConfig, ShellError,
    ShellResult, SurfaceHandle,
};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Maximum entries kept per browser history.
const MAX_HISTORY: usize = 50;

/// Backend starting a [`HeadlessEngine`]. Starts at most once.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    started: AtomicBool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EngineBackend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn initialize(
        &self,
        settings: &EngineSettings,
        sink: EventSink,
    ) -> ShellResult<Arc<dyn Engine>> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ShellError::initialization("headless engine already started"));
        }

        sink.post(EngineEvent::LifecycleStateChanged(LifecycleState::Initializing));
        let engine = HeadlessEngine::start(settings, sink.clone())?;
        sink.post(EngineEvent::LifecycleStateChanged(LifecycleState::Initialized));
        Ok(Arc::new(engine))
    }
}

/// Commands to the worker thread.
#[derive(Debug)]
enum WorkerCommand {
    CreateBrowser { browser: BrowserId, url: String },
    Load { browser: BrowserId, url: String },
    Back(BrowserId),
    Forward(BrowserId),
    Reload(BrowserId),
    Focus { browser: BrowserId, focused: bool },
    CloseBrowser(BrowserId),
    Shutdown,
}

/// Headless engine.
pub struct HeadlessEngine {
    /// Command channel to the worker.
    commands: UnboundedSender<WorkerCommand>,
    /// Worker thread, taken on dispose.
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Lifecycle reporting.
    sink: EventSink,
    /// Client ID counter.
    next_client: AtomicU64,
    /// Browser ID counter, shared with clients.
    next_browser: Arc<AtomicU64>,
}

impl HeadlessEngine {
    fn start(settings: &EngineSettings, sink: EventSink) -> ShellResult<Self> {
        let (commands, receiver) = mpsc::unbounded_channel();
        let worker_sink = sink.clone();
        let worker = thread::Builder::new()
            .name("headless-engine".to_string())
            .spawn(move || run_worker(receiver, worker_sink))?;

        info!(
            install_dir = %settings.install_dir.display(),
            locale = %settings.locale,
            offscreen = settings.windowless_rendering_enabled,
            "headless engine started"
        );

        Ok(Self {
            commands,
            worker: Mutex::new(Some(worker)),
            sink,
            next_client: AtomicU64::new(0),
            next_browser: Arc::new(AtomicU64::new(0)),
        })
    }
}

impl Engine for HeadlessEngine {
    fn create_client(&self, router: MessageRouterConfig) -> Arc<dyn EngineClient> {
        let id = ClientId(self.next_client.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(client = %id, query = %router.query_function, "client created");
        Arc::new(HeadlessClient {
            id,
            commands: self.commands.clone(),
            next_browser: self.next_browser.clone(),
            browsers: Mutex::new(Vec::new()),
        })
    }

    fn dispose(&self) -> ShellResult<()> {
        let worker = self
            .worker
            .lock()
            .take()
            .ok_or_else(|| ShellError::disposal("headless engine already disposed"))?;

        self.sink
            .post(EngineEvent::LifecycleStateChanged(LifecycleState::Shutdown));
        send(&self.commands, WorkerCommand::Shutdown);
        worker
            .join()
            .map_err(|_| ShellError::disposal("headless engine worker panicked"))?;

        info!("headless engine disposed");
        self.sink
            .post(EngineEvent::LifecycleStateChanged(LifecycleState::Terminated));
        Ok(())
    }
}

/// Client of the headless engine.
pub struct HeadlessClient {
    id: ClientId,
    commands: UnboundedSender<WorkerCommand>,
    next_browser: Arc<AtomicU64>,
    /// Browsers this client created and has not closed.
    browsers: Mutex<Vec<BrowserId>>,
}

impl EngineClient for HeadlessClient {
    fn id(&self) -> ClientId {
        self.id
    }

    fn create_browser(
        &self,
        url: &str,
        offscreen: bool,
        transparent: bool,
    ) -> Arc<dyn BrowserHandle> {
        let browser = BrowserId(self.next_browser.fetch_add(1, Ordering::SeqCst) + 1);
        self.browsers.lock().push(browser);
        send(
            &self.commands,
            WorkerCommand::CreateBrowser {
                browser,
                url: url.to_string(),
            },
        );
        Arc::new(HeadlessBrowser {
            surface: SurfaceHandle {
                browser,
                offscreen,
                transparent,
            },
            commands: self.commands.clone(),
        })
    }

    fn dispose(&self) {
        for browser in self.browsers.lock().drain(..) {
            send(&self.commands, WorkerCommand::CloseBrowser(browser));
        }
        debug!(client = %self.id, "client disposed");
    }
}

/// Browser of the headless engine.
pub struct HeadlessBrowser {
    surface: SurfaceHandle,
    commands: UnboundedSender<WorkerCommand>,
}

impl BrowserHandle for HeadlessBrowser {
    fn id(&self) -> BrowserId {
        self.surface.browser
    }

    fn load_url(&self, url: &str) {
        send(
            &self.commands,
            WorkerCommand::Load {
                browser: self.id(),
                url: url.to_string(),
            },
        );
    }

    fn go_back(&self) {
        send(&self.commands, WorkerCommand::Back(self.id()));
    }

    fn go_forward(&self) {
        send(&self.commands, WorkerCommand::Forward(self.id()));
    }

    fn reload(&self) {
        send(&self.commands, WorkerCommand::Reload(self.id()));
    }

    fn set_focus(&self, focused: bool) {
        send(
            &self.commands,
            WorkerCommand::Focus {
                browser: self.id(),
                focused,
            },
        );
    }

    fn ui_component(&self) -> SurfaceHandle {
        self.surface
    }

    fn close(&self) {
        send(&self.commands, WorkerCommand::CloseBrowser(self.id()));
    }
}

fn send(commands: &UnboundedSender<WorkerCommand>, command: WorkerCommand) {
    if let Err(e) = commands.send(command) {
        warn!(command = ?e.0, "headless engine is gone");
    }
}

fn run_worker(mut commands: UnboundedReceiver<WorkerCommand>, sink: EventSink) {
    let mut browsers: HashMap<BrowserId, History> = HashMap::new();

    let address_change = |browser: BrowserId, url: &str| {
        sink.post(EngineEvent::AddressChange {
            browser,
            frame: FrameId::MAIN,
            url: url.to_string(),
        });
    };

    while let Some(command) = commands.blocking_recv() {
        match command {
            WorkerCommand::CreateBrowser { browser, url } => {
                let history = browsers.entry(browser).or_default();
                history.push(url);
                if let Some(url) = history.current() {
                    address_change(browser, url);
                }
            }
            WorkerCommand::Load { browser, url } => {
                if let Some(history) = browsers.get_mut(&browser) {
                    history.push(url);
                    if let Some(url) = history.current() {
                        address_change(browser, url);
                    }
                }
            }
            WorkerCommand::Back(browser) => {
                if let Some(url) = browsers.get_mut(&browser).and_then(History::back) {
                    address_change(browser, url);
                }
            }
            WorkerCommand::Forward(browser) => {
                if let Some(url) = browsers.get_mut(&browser).and_then(History::forward) {
                    address_change(browser, url);
                }
            }
            WorkerCommand::Reload(browser) => {
                if let Some(url) = browsers.get(&browser).and_then(History::current) {
                    address_change(browser, url);
                }
            }
            WorkerCommand::Focus { browser, focused } => {
                if focused && browsers.contains_key(&browser) {
                    sink.post(EngineEvent::GotFocus { browser });
                }
            }
            WorkerCommand::CloseBrowser(browser) => {
                browsers.remove(&browser);
            }
            WorkerCommand::Shutdown => break,
        }
    }

    debug!(open = browsers.len(), "headless engine worker stopped");
}

/// Session history of one browser.
#[derive(Debug, Default)]
struct History {
    entries: Vec<String>,
    current: usize,
}

impl History {
    /// Push an entry, dropping forward history.
    fn push(&mut self, url: String) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.current + 1);
        }
        self.entries.push(url);

        if self.entries.len() > MAX_HISTORY {
            self.entries.remove(0);
        }
        self.current = self.entries.len() - 1;
    }

    fn back(&mut self) -> Option<&str> {
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        self.current()
    }

    fn forward(&mut self) -> Option<&str> {
        if self.current + 1 >= self.entries.len() {
            return None;
        }
        self.current += 1;
        self.current()
    }

    fn current(&self) -> Option<&str> {
        self.entries.get(self.current).map(String::as_str)
    }
}
