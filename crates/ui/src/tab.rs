//! Browser tab.

use std::sync::Arc;

use common::{BrowserHandle, BrowserId, ClientId, EngineClient, SurfaceHandle};
use tracing::debug;

use crate::navigation::NavigationBar;

/// Tab identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

/// Browser tab: a navigation bar and a rendering surface, paired with one
/// engine client.
pub struct Tab {
    /// Tab ID.
    id: TabId,
    /// Tab title, fixed at creation.
    title: String,
    /// Engine client owned by this tab alone.
    client: Arc<dyn EngineClient>,
    /// Browser rendering the tab.
    browser: Arc<dyn BrowserHandle>,
    /// Embedded rendering surface.
    surface: SurfaceHandle,
    /// Navigation bar.
    navigation: NavigationBar,
}

impl Tab {
    /// Create a tab around a freshly created client.
    pub fn new(
        id: TabId,
        title: impl Into<String>,
        client: Arc<dyn EngineClient>,
        url: &str,
        offscreen: bool,
    ) -> Self {
        let browser = client.create_browser(url, offscreen, false);
        let surface = browser.ui_component();
        let navigation = NavigationBar::new(id, browser.clone(), url);

        Self {
            id,
            title: title.into(),
            client,
            browser,
            surface,
            navigation,
        }
    }

    /// Get the tab ID.
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Get the tab title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the engine client ID.
    pub fn client_id(&self) -> ClientId {
        self.client.id()
    }

    /// Get the browser ID.
    pub fn browser_id(&self) -> BrowserId {
        self.browser.id()
    }

    /// Get the browser handle.
    pub fn browser(&self) -> &Arc<dyn BrowserHandle> {
        &self.browser
    }

    /// Get the rendering surface.
    pub fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    /// Get the displayed URL.
    pub fn url(&self) -> &str {
        self.navigation.displayed_url()
    }

    /// Get the navigation bar.
    pub fn navigation(&self) -> &NavigationBar {
        &self.navigation
    }

    /// Get the navigation bar mutably.
    pub fn navigation_mut(&mut self) -> &mut NavigationBar {
        &mut self.navigation
    }

    /// Release the tab's engine resources.
    pub fn release(&self) {
        debug!(tab = self.id.0, browser = %self.browser.id(), client = %self.client.id(), "releasing tab");
        self.browser.close();
        self.client.dispose();
    }
}
