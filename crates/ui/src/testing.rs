//! In-memory engine for chrome tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{
    BrowserHandle, BrowserId, ClientId, EngineClient, EngineConnection, ShellError, ShellResult,
    SurfaceHandle,
};
use parking_lot::Mutex;

use crate::focus::HostFocus;

/// A command the chrome sent to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    CreateBrowser(BrowserId, String),
    LoadUrl(BrowserId, String),
    Back(BrowserId),
    Forward(BrowserId),
    Reload(BrowserId),
    SetFocus(BrowserId, bool),
    Close(BrowserId),
    DisposeClient(ClientId),
    DisposeEngine,
}

impl Command {
    pub fn browser(&self) -> Option<BrowserId> {
        match self {
            Command::CreateBrowser(id, _)
            | Command::LoadUrl(id, _)
            | Command::Back(id)
            | Command::Forward(id)
            | Command::Reload(id)
            | Command::SetFocus(id, _)
            | Command::Close(id) => Some(*id),
            Command::DisposeClient(_) | Command::DisposeEngine => None,
        }
    }
}

#[derive(Default)]
struct Journal {
    commands: Vec<Command>,
    next_client: u64,
    next_browser: u64,
    clients_created: usize,
    engine_disposals: usize,
    fail_disposal: bool,
}

type SharedJournal = Arc<Mutex<Journal>>;

/// Engine that records every command.
#[derive(Clone, Default)]
pub struct FakeEngine {
    journal: SharedJournal,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command so far, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.journal.lock().commands.clone()
    }

    /// URLs loaded into a browser after creation.
    pub fn loads(&self, browser: BrowserId) -> Vec<String> {
        self.journal
            .lock()
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::LoadUrl(id, url) if *id == browser => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clients_created(&self) -> usize {
        self.journal.lock().clients_created
    }

    pub fn engine_disposals(&self) -> usize {
        self.journal.lock().engine_disposals
    }

    /// Make the next engine disposal fail.
    pub fn fail_disposal(&self) {
        self.journal.lock().fail_disposal = true;
    }
}

impl EngineConnection for FakeEngine {
    fn create_client(&self) -> Arc<dyn EngineClient> {
        let mut journal = self.journal.lock();
        journal.next_client += 1;
        journal.clients_created += 1;
        Arc::new(FakeClient {
            id: ClientId(journal.next_client),
            journal: self.journal.clone(),
        })
    }

    fn dispose(&self) -> ShellResult<()> {
        let mut journal = self.journal.lock();
        journal.engine_disposals += 1;
        journal.commands.push(Command::DisposeEngine);
        if std::mem::take(&mut journal.fail_disposal) {
            return Err(ShellError::disposal("fake engine refused to shut down"));
        }
        Ok(())
    }
}

struct FakeClient {
    id: ClientId,
    journal: SharedJournal,
}

impl EngineClient for FakeClient {
    fn id(&self) -> ClientId {
        self.id
    }

    fn create_browser(&self, url: &str, offscreen: bool, transparent: bool) -> Arc<dyn BrowserHandle> {
        let mut journal = self.journal.lock();
        journal.next_browser += 1;
        let id = BrowserId(journal.next_browser);
        journal.commands.push(Command::CreateBrowser(id, url.to_string()));
        Arc::new(FakeBrowser {
            surface: SurfaceHandle {
                browser: id,
                offscreen,
                transparent,
            },
            journal: self.journal.clone(),
        })
    }

    fn dispose(&self) {
        self.journal.lock().commands.push(Command::DisposeClient(self.id));
    }
}

struct FakeBrowser {
    surface: SurfaceHandle,
    journal: SharedJournal,
}

impl FakeBrowser {
    fn record(&self, command: Command) {
        self.journal.lock().commands.push(command);
    }
}

impl BrowserHandle for FakeBrowser {
    fn id(&self) -> BrowserId {
        self.surface.browser
    }

    fn load_url(&self, url: &str) {
        self.record(Command::LoadUrl(self.id(), url.to_string()));
    }

    fn go_back(&self) {
        self.record(Command::Back(self.id()));
    }

    fn go_forward(&self) {
        self.record(Command::Forward(self.id()));
    }

    fn reload(&self) {
        self.record(Command::Reload(self.id()));
    }

    fn set_focus(&self, focused: bool) {
        self.record(Command::SetFocus(self.id(), focused));
    }

    fn ui_component(&self) -> SurfaceHandle {
        self.surface
    }

    fn close(&self) {
        self.record(Command::Close(self.id()));
    }
}

/// Host focus that counts clears.
#[derive(Clone, Default)]
pub struct CountingHostFocus {
    clears: Arc<AtomicUsize>,
}

impl CountingHostFocus {
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl HostFocus for CountingHostFocus {
    fn clear_global_focus_owner(&mut self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}
