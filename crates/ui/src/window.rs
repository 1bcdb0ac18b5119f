//! Browser window.
//!
//! The window is the only consumer of the UI dispatch queue. Engine events
//! and user input arrive as [`UiTask`]s and are applied one at a time.

use std::sync::Arc;

use common::{EngineConnection, EngineEvent, LifecycleState, ShellResult};
use tracing::{debug, info, warn};

use crate::focus::{FocusArbiter, FocusState, HostFocus};
use crate::keyboard::KeyCombo;
use crate::navigation::ChromeControl;
use crate::shortcuts::{ChromeAction, ShortcutRouter};
use crate::tab::TabId;
use crate::tab_manager::TabManager;

/// Default start page for new tabs.
pub const DEFAULT_START_URL: &str = "https://www.google.com";

/// Title given to new tabs.
pub const NEW_TAB_TITLE: &str = "New Tab";

/// Window settings.
#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// URL new tabs open on.
    pub start_url: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Oxide Shell".to_string(),
            width: 800,
            height: 600,
            start_url: DEFAULT_START_URL.to_string(),
        }
    }
}

/// User input delivered to the window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserInput {
    /// A key press anywhere in the window.
    Key(KeyCombo),
    /// Text submitted through the selected tab's address field.
    Submit(String),
    /// A chrome control of the selected tab was clicked.
    Click(ChromeControl),
    /// A tab header was clicked.
    SelectTab(usize),
    /// A tab's close button was clicked.
    CloseTab(TabId),
    /// A chrome action picked from a menu.
    Action(ChromeAction),
    /// The selected tab's rendering surface was clicked.
    FocusSurface,
    /// The window's close button was clicked.
    Close,
}

/// Work for the UI dispatch context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiTask {
    Engine(EngineEvent),
    Input(UserInput),
}

impl From<EngineEvent> for UiTask {
    fn from(event: EngineEvent) -> Self {
        UiTask::Engine(event)
    }
}

impl From<UserInput> for UiTask {
    fn from(input: UserInput) -> Self {
        UiTask::Input(input)
    }
}

/// What the dispatch loop should do after a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    /// The window closed or the engine terminated.
    Exit,
}

/// Window lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowState {
    Open,
    Closed,
}

/// Browser window.
pub struct Window {
    /// Window settings.
    config: WindowConfig,
    /// Engine connection, disposed on close.
    engine: Arc<dyn EngineConnection>,
    /// Tabs.
    tabs: TabManager,
    /// Shortcuts.
    shortcuts: ShortcutRouter,
    /// Focus state machine.
    focus: FocusArbiter,
    /// Window state.
    state: WindowState,
}

impl Window {
    /// Create a window with no tabs.
    pub fn new(
        config: WindowConfig,
        engine: Arc<dyn EngineConnection>,
        shortcuts: ShortcutRouter,
        host_focus: Box<dyn HostFocus>,
    ) -> Self {
        Self {
            config,
            tabs: TabManager::new(engine.clone()),
            engine,
            shortcuts,
            focus: FocusArbiter::new(host_focus),
            state: WindowState::Open,
        }
    }

    /// Open the initial tab.
    pub fn open(&mut self) -> TabId {
        info!(title = %self.config.title, width = self.config.width, height = self.config.height, "window opened");
        self.new_tab()
    }

    /// Get the window settings.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Get the tabs.
    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    /// Get the shortcuts.
    pub fn shortcuts(&self) -> &ShortcutRouter {
        &self.shortcuts
    }

    /// Get the focus state.
    pub fn focus_state(&self) -> FocusState {
        self.focus.state()
    }

    /// Get window state.
    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == WindowState::Closed
    }

    /// Open a tab on the start URL.
    pub fn new_tab(&mut self) -> TabId {
        let url = self.config.start_url.clone();
        self.tabs.add_tab(NEW_TAB_TITLE, &url)
    }

    /// Close a tab, forgetting its focus ownership.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        if let Some(browser) = self.tabs.tab(id).map(|t| t.browser_id()) {
            self.focus.release(browser);
        }
        self.tabs.close_tab(id)
    }

    /// Apply one task.
    pub fn handle(&mut self, task: UiTask) -> ShellResult<Dispatch> {
        match task {
            UiTask::Engine(event) => Ok(self.on_engine_event(event)),
            UiTask::Input(input) => self.on_input(input),
        }
    }

    fn on_engine_event(&mut self, event: EngineEvent) -> Dispatch {
        match event {
            EngineEvent::LifecycleStateChanged(state) => {
                if state == LifecycleState::Terminated {
                    info!("engine terminated");
                    return Dispatch::Exit;
                }
                debug!(?state, "engine lifecycle");
            }
            _ if self.is_closed() => {
                debug!(?event, "event after close ignored");
            }
            EngineEvent::AddressChange { browser, frame, url } => {
                match self.tabs.tab_by_browser_mut(browser) {
                    Some(tab) => {
                        debug!(tab = tab.id().0, browser = %browser, frame = frame.0, url = %url, "address changed");
                        tab.navigation_mut().on_address_change(&url);
                    }
                    None => debug!(browser = %browser, "address change for unknown browser"),
                }
            }
            EngineEvent::GotFocus { browser } => {
                if self.tabs.tab_by_browser(browser).is_none() {
                    debug!(browser = %browser, "focus for unknown browser");
                    return Dispatch::Continue;
                }
                if self.focus.on_got_focus(browser) {
                    if let Some(tab) = self.tabs.tab_by_browser_mut(browser) {
                        tab.navigation_mut().blur();
                        tab.browser().set_focus(true);
                    }
                }
            }
            EngineEvent::TakeFocus { browser, direction } => {
                if let Some(control) = self.focus.on_take_focus(browser, direction) {
                    if let Some(tab) = self.tabs.tab_by_browser_mut(browser) {
                        tab.navigation_mut().focus_control(control);
                    }
                }
            }
        }
        Dispatch::Continue
    }

    fn on_input(&mut self, input: UserInput) -> ShellResult<Dispatch> {
        if self.is_closed() {
            return Ok(Dispatch::Exit);
        }

        match input {
            UserInput::Key(combo) => self.on_key(combo),
            UserInput::Submit(text) => {
                if let Some(tab) = self.tabs.selected_tab_mut() {
                    tab.navigation_mut().submit(&text);
                }
            }
            UserInput::Click(ChromeControl::AddressField) => self.focus_address_bar(),
            UserInput::Click(control) => {
                if let Some(tab) = self.tabs.selected_tab_mut() {
                    tab.navigation_mut().activate(control);
                }
            }
            UserInput::SelectTab(index) => {
                self.tabs.select_index(index);
            }
            UserInput::CloseTab(id) => {
                self.close_tab(id);
            }
            UserInput::Action(action) => self.perform(action),
            UserInput::FocusSurface => {
                if let Some(tab) = self.tabs.selected_tab() {
                    tab.browser().set_focus(true);
                }
            }
            UserInput::Close => {
                self.close()?;
                return Ok(Dispatch::Exit);
            }
        }
        Ok(Dispatch::Continue)
    }

    fn on_key(&mut self, combo: KeyCombo) {
        if let Some(action) = self.shortcuts.route(&combo) {
            debug!(%combo, %action, "shortcut");
            self.perform(action);
            return;
        }

        if self.focus.is_engine_focused() {
            return;
        }

        if let Some(tab) = self.tabs.selected_tab_mut() {
            tab.navigation_mut().on_key(combo);
        }
    }

    /// Run a chrome action.
    pub fn perform(&mut self, action: ChromeAction) {
        match action {
            ChromeAction::NewTab => {
                info!("new tab");
                self.new_tab();
            }
            ChromeAction::CloseTab => {
                if let Some(id) = self.tabs.selected_id() {
                    self.close_tab(id);
                }
            }
            ChromeAction::NextTab => {
                self.tabs.select_next();
            }
            ChromeAction::PreviousTab => {
                self.tabs.select_previous();
            }
            ChromeAction::Reload => {
                if let Some(tab) = self.tabs.selected_tab() {
                    tab.navigation().reload();
                }
            }
            ChromeAction::FocusAddressBar => self.focus_address_bar(),
        }
    }

    /// Take input back from the engine and focus the selected address field.
    fn focus_address_bar(&mut self) {
        if let Some(browser) = self.focus.focus_host() {
            if let Some(tab) = self.tabs.tab_by_browser(browser) {
                tab.browser().set_focus(false);
            }
        }
        if let Some(tab) = self.tabs.selected_tab_mut() {
            tab.navigation_mut().focus_control(ChromeControl::AddressField);
        }
    }

    /// Close the window: dispose the engine, then the window.
    ///
    /// Runs once. Later calls return `Ok(false)` without touching the engine.
    /// A disposal error is returned as is; the window stays closed.
    pub fn close(&mut self) -> ShellResult<bool> {
        if self.state == WindowState::Closed {
            warn!("window already closed");
            return Ok(false);
        }
        self.state = WindowState::Closed;

        info!(tabs = self.tabs.count(), "closing window");
        self.engine.dispose()?;
        self.tabs.clear();
        self.focus.focus_host();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{Key, Modifiers};
    use crate::testing::{Command, CountingHostFocus, FakeEngine};
    use common::{BrowserId, FocusDirection, FrameId};

    fn window() -> (Window, FakeEngine, CountingHostFocus) {
        let engine = FakeEngine::new();
        let host = CountingHostFocus::default();
        let mut window = Window::new(
            WindowConfig::default(),
            Arc::new(engine.clone()),
            ShortcutRouter::with_defaults(),
            Box::new(host.clone()),
        );
        window.open();
        (window, engine, host)
    }

    fn browser_of(window: &Window, id: TabId) -> BrowserId {
        window.tabs().tab(id).map(|t| t.browser_id()).unwrap()
    }

    fn address_change(browser: BrowserId, url: &str) -> UiTask {
        UiTask::Engine(EngineEvent::AddressChange {
            browser,
            frame: FrameId::MAIN,
            url: url.to_string(),
        })
    }

    fn ctrl(c: char) -> UiTask {
        UiTask::Input(UserInput::Key(KeyCombo::new(Modifiers::CTRL, Key::Char(c))))
    }

    #[test]
    fn test_window_opens_one_tab() {
        let (window, engine, _) = window();
        assert_eq!(window.tabs().count(), 1);
        assert_eq!(window.focus_state(), FocusState::HostFocused);
        assert_eq!(
            window.tabs().selected_tab().map(|t| t.url()),
            Some(DEFAULT_START_URL)
        );
        assert_eq!(engine.clients_created(), 1);
    }

    #[test]
    fn test_address_change_is_isolated() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let b = window.new_tab();

        window
            .handle(address_change(browser_of(&window, a), "https://a.test/page"))
            .unwrap();

        assert_eq!(window.tabs().tab(a).unwrap().url(), "https://a.test/page");
        assert_eq!(window.tabs().tab(b).unwrap().url(), DEFAULT_START_URL);
    }

    #[test]
    fn test_address_changes_apply_in_order() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);

        for url in ["https://1.test", "https://2.test", "https://3.test"] {
            window.handle(address_change(browser, url)).unwrap();
        }
        assert_eq!(window.tabs().tab(a).unwrap().url(), "https://3.test");
    }

    #[test]
    fn test_address_change_for_closed_tab_ignored() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);
        window.close_tab(a);

        let result = window.handle(address_change(browser, "https://late.test"));
        assert_eq!(result.unwrap(), Dispatch::Continue);
    }

    #[test]
    fn test_got_focus_twice_clears_once() {
        let (mut window, _, host) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);

        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();

        assert_eq!(host.clears(), 1);
        assert_eq!(window.focus_state(), FocusState::EngineFocused(browser));
    }

    #[test]
    fn test_take_focus_returns_to_chrome() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);

        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();
        window
            .handle(UiTask::Engine(EngineEvent::TakeFocus {
                browser,
                direction: FocusDirection::Backward,
            }))
            .unwrap();

        assert_eq!(window.focus_state(), FocusState::HostFocused);
        assert_eq!(
            window.tabs().tab(a).unwrap().navigation().focused_control(),
            Some(ChromeControl::AddressField)
        );

        window
            .handle(UiTask::Engine(EngineEvent::TakeFocus {
                browser,
                direction: FocusDirection::Forward,
            }))
            .unwrap();
        assert_eq!(window.focus_state(), FocusState::HostFocused);
        assert_eq!(
            window.tabs().tab(a).unwrap().navigation().focused_control(),
            Some(ChromeControl::AddressField)
        );
    }

    #[test]
    fn test_new_tab_shortcut_while_engine_focused() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();

        window.handle(ctrl('t')).unwrap();

        assert_eq!(window.tabs().count(), 2);
        assert_ne!(window.tabs().selected_id(), Some(a));
        assert_eq!(window.focus_state(), FocusState::EngineFocused(browser));
    }

    #[test]
    fn test_select_tab_keeps_focus_state() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        window.new_tab();
        let browser = browser_of(&window, a);
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();

        window.handle(UiTask::Input(UserInput::SelectTab(0))).unwrap();

        assert_eq!(window.tabs().selected_id(), Some(a));
        assert_eq!(window.focus_state(), FocusState::EngineFocused(browser));
    }

    #[test]
    fn test_keys_go_to_engine_when_focused() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);

        window.perform(ChromeAction::FocusAddressBar);
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();
        window
            .handle(UiTask::Input(UserInput::Key(KeyCombo::plain(Key::Char('z')))))
            .unwrap();

        assert_eq!(window.tabs().tab(a).unwrap().url(), DEFAULT_START_URL);
    }

    #[test]
    fn test_focus_address_bar_takes_focus_from_engine() {
        let (mut window, engine, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();

        window.handle(ctrl('l')).unwrap();

        assert_eq!(window.focus_state(), FocusState::HostFocused);
        assert!(engine.commands().contains(&Command::SetFocus(browser, false)));
        assert_eq!(
            window.tabs().tab(a).unwrap().navigation().focused_control(),
            Some(ChromeControl::AddressField)
        );
    }

    #[test]
    fn test_got_focus_confirms_engine_focus_once() {
        let (mut window, engine, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);

        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();

        let confirmations = engine
            .commands()
            .into_iter()
            .filter(|c| *c == Command::SetFocus(browser, true))
            .count();
        assert_eq!(confirmations, 1);
    }

    #[test]
    fn test_click_address_field_takes_focus_from_engine() {
        let (mut window, engine, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();

        window
            .handle(UiTask::Input(UserInput::Click(ChromeControl::AddressField)))
            .unwrap();
        window
            .handle(UiTask::Input(UserInput::Key(KeyCombo::plain(Key::Char('x')))))
            .unwrap();

        assert_eq!(window.focus_state(), FocusState::HostFocused);
        assert!(engine.commands().contains(&Command::SetFocus(browser, false)));
        assert_eq!(window.tabs().tab(a).unwrap().url(), "x");
    }

    #[test]
    fn test_escape_in_address_field_keeps_typing_there() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();

        window.handle(ctrl('l')).unwrap();
        window
            .handle(UiTask::Input(UserInput::Key(KeyCombo::plain(Key::Escape))))
            .unwrap();
        window
            .handle(UiTask::Input(UserInput::Key(KeyCombo::plain(Key::Char('x')))))
            .unwrap();

        let navigation = window.tabs().tab(a).unwrap().navigation();
        assert_eq!(navigation.focused_control(), Some(ChromeControl::AddressField));
        assert!(navigation.address_bar().is_focused());
        assert_eq!(navigation.displayed_url(), "x");
    }

    #[test]
    fn test_submit_navigates_selected_tab() {
        let (mut window, engine, _) = window();
        window.new_tab();
        let b = window.tabs().selected_id().unwrap();

        window
            .handle(UiTask::Input(UserInput::Submit("example.com".to_string())))
            .unwrap();

        assert_eq!(engine.loads(browser_of(&window, b)), vec!["https://example.com"]);
    }

    #[test]
    fn test_close_tab_releases_focus() {
        let (mut window, _, _) = window();
        let a = window.tabs().selected_id().unwrap();
        let browser = browser_of(&window, a);
        window
            .handle(UiTask::Engine(EngineEvent::GotFocus { browser }))
            .unwrap();

        window.handle(ctrl('w')).unwrap();

        assert!(window.tabs().is_empty());
        assert_eq!(window.focus_state(), FocusState::HostFocused);
    }

    #[test]
    fn test_close_twice_disposes_once() {
        let (mut window, engine, _) = window();

        assert!(window.close().unwrap());
        assert!(!window.close().unwrap());

        assert_eq!(engine.engine_disposals(), 1);
        assert!(window.is_closed());
        assert!(window.tabs().is_empty());
    }

    #[test]
    fn test_close_input_twice_disposes_once() {
        let (mut window, engine, _) = window();

        let first = window.handle(UiTask::Input(UserInput::Close)).unwrap();
        let second = window.handle(UiTask::Input(UserInput::Close)).unwrap();

        assert_eq!(first, Dispatch::Exit);
        assert_eq!(second, Dispatch::Exit);
        assert_eq!(engine.engine_disposals(), 1);
    }

    #[test]
    fn test_close_propagates_disposal_error() {
        let (mut window, engine, _) = window();
        engine.fail_disposal();

        assert!(window.close().is_err());
        assert!(window.is_closed());
        assert!(!window.close().unwrap());
        assert_eq!(engine.engine_disposals(), 1);
    }

    #[test]
    fn test_terminated_exits() {
        let (mut window, _, _) = window();

        let dispatch = window
            .handle(UiTask::Engine(EngineEvent::LifecycleStateChanged(
                LifecycleState::Initialized,
            )))
            .unwrap();
        assert_eq!(dispatch, Dispatch::Continue);

        let dispatch = window
            .handle(UiTask::Engine(EngineEvent::LifecycleStateChanged(
                LifecycleState::Terminated,
            )))
            .unwrap();
        assert_eq!(dispatch, Dispatch::Exit);
    }
}
