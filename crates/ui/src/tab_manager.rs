//! Tab collection.

use std::sync::Arc;

use common::{BrowserId, EngineConnection};
use tracing::{debug, info};

use crate::tab::{Tab, TabId};

/// Ordered collection of tabs with a single selection.
///
/// Each tab gets its own engine client. Closing the last tab leaves the
/// manager empty with nothing selected.
pub struct TabManager {
    /// Engine the tabs' clients come from.
    engine: Arc<dyn EngineConnection>,
    /// Tabs in display order.
    tabs: Vec<Tab>,
    /// Selected tab.
    selected: Option<TabId>,
    /// Tab ID counter.
    tab_counter: u64,
}

impl TabManager {
    /// Create an empty tab manager.
    pub fn new(engine: Arc<dyn EngineConnection>) -> Self {
        Self {
            engine,
            tabs: Vec::new(),
            selected: None,
            tab_counter: 0,
        }
    }

    /// Open a tab at the end and select it.
    pub fn add_tab(&mut self, title: &str, url: &str) -> TabId {
        self.tab_counter += 1;
        let id = TabId(self.tab_counter);

        let client = self.engine.create_client();
        let tab = Tab::new(id, title, client, url, self.engine.offscreen_rendering());
        info!(tab = id.0, browser = %tab.browser_id(), url = %url, "tab added");

        self.tabs.push(tab);
        self.selected = Some(id);
        id
    }

    /// Close a tab and release its engine client.
    ///
    /// If the tab was selected, its right neighbour takes over, or the new
    /// last tab when it was the rightmost.
    pub fn close_tab(&mut self, id: TabId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };

        let tab = self.tabs.remove(index);
        tab.release();
        info!(tab = id.0, remaining = self.tabs.len(), "tab closed");

        if self.selected == Some(id) {
            let next = index.min(self.tabs.len().saturating_sub(1));
            self.selected = self.tabs.get(next).map(Tab::id);
        }
        true
    }

    /// Select a tab. Does not touch focus.
    pub fn select_tab(&mut self, id: TabId) -> bool {
        if self.index_of(id).is_some() {
            debug!(tab = id.0, "tab selected");
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Select the tab at a display position.
    pub fn select_index(&mut self, index: usize) -> bool {
        match self.tabs.get(index).map(Tab::id) {
            Some(id) => self.select_tab(id),
            None => false,
        }
    }

    /// Select the next tab, wrapping around.
    pub fn select_next(&mut self) -> bool {
        self.select_offset(1)
    }

    /// Select the previous tab, wrapping around.
    pub fn select_previous(&mut self) -> bool {
        self.select_offset(self.tabs.len().saturating_sub(1))
    }

    fn select_offset(&mut self, offset: usize) -> bool {
        let Some(current) = self.selected.and_then(|id| self.index_of(id)) else {
            return false;
        };
        let next = (current + offset) % self.tabs.len();
        self.select_index(next)
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id() == id)
    }

    /// Get a tab.
    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    /// Get a mutable tab.
    pub fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id() == id)
    }

    /// Find the tab owning a browser.
    pub fn tab_by_browser(&self, browser: BrowserId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.browser_id() == browser)
    }

    /// Find the tab owning a browser, mutably.
    pub fn tab_by_browser_mut(&mut self, browser: BrowserId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.browser_id() == browser)
    }

    /// Get the selected tab.
    pub fn selected_tab(&self) -> Option<&Tab> {
        self.selected.and_then(|id| self.tab(id))
    }

    /// Get the selected tab mutably.
    pub fn selected_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.selected?;
        self.tab_mut(id)
    }

    /// Get the selected tab ID.
    pub fn selected_id(&self) -> Option<TabId> {
        self.selected
    }

    /// Get all tabs in display order.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Get the tab count.
    pub fn count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Drop every tab without releasing clients; used once the engine
    /// itself has been disposed.
    pub fn clear(&mut self) {
        self.tabs.clear();
        self.selected = None;
    }
}
