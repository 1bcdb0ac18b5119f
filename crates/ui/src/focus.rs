//! Focus arbitration between host chrome and engine surfaces.
//!
//! The window has one arbiter, keyed by browser identity: at any moment
//! either the host chrome owns keyboard input or exactly one rendering
//! surface does. Every engine focus notification from every tab goes
//! through [`FocusArbiter`], in dispatch-queue order.

use common::{BrowserId, FocusDirection};
use tracing::{debug, info};

use crate::navigation::ChromeControl;

/// Who owns keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusState {
    HostFocused,
    EngineFocused(BrowserId),
}

/// Host-side focus effects.
pub trait HostFocus {
    /// Clear the host's global focus owner so native input goes to the
    /// rendering surface alone.
    fn clear_global_focus_owner(&mut self);
}

/// Host focus that only logs.
#[derive(Debug, Default)]
pub struct LoggingHostFocus;

impl HostFocus for LoggingHostFocus {
    fn clear_global_focus_owner(&mut self) {
        debug!("host focus owner cleared");
    }
}

/// Focus state machine.
pub struct FocusArbiter {
    state: FocusState,
    host: Box<dyn HostFocus>,
}

impl FocusArbiter {
    /// Create an arbiter; the host starts focused.
    pub fn new(host: Box<dyn HostFocus>) -> Self {
        Self {
            state: FocusState::HostFocused,
            host,
        }
    }

    /// Current state.
    pub fn state(&self) -> FocusState {
        self.state
    }

    /// Browser owning input, if any.
    pub fn focused_browser(&self) -> Option<BrowserId> {
        match self.state {
            FocusState::EngineFocused(browser) => Some(browser),
            FocusState::HostFocused => None,
        }
    }

    pub fn is_engine_focused(&self) -> bool {
        matches!(self.state, FocusState::EngineFocused(_))
    }

    /// A surface got focus.
    ///
    /// The host focus owner is cleared only when leaving `HostFocused`.
    /// Returns `true` if the state changed.
    pub fn on_got_focus(&mut self, browser: BrowserId) -> bool {
        match self.state {
            FocusState::EngineFocused(current) if current == browser => false,
            FocusState::EngineFocused(current) => {
                debug!(from = %current, to = %browser, "engine focus moved");
                self.state = FocusState::EngineFocused(browser);
                true
            }
            FocusState::HostFocused => {
                info!(browser = %browser, "engine surface focused");
                self.state = FocusState::EngineFocused(browser);
                self.host.clear_global_focus_owner();
                true
            }
        }
    }

    /// A surface gave focus back.
    ///
    /// Returns the chrome control to focus next, or `None` when the
    /// notification changes nothing.
    pub fn on_take_focus(
        &mut self,
        browser: BrowserId,
        direction: FocusDirection,
    ) -> Option<ChromeControl> {
        match self.state {
            FocusState::EngineFocused(current) if current == browser => {
                info!(browser = %browser, ?direction, "engine surface yielded focus");
                self.state = FocusState::HostFocused;
                Some(match direction {
                    FocusDirection::Forward => ChromeControl::first(),
                    FocusDirection::Backward => ChromeControl::last(),
                })
            }
            FocusState::EngineFocused(current) => {
                debug!(browser = %browser, owner = %current, "take focus from non-owner ignored");
                None
            }
            FocusState::HostFocused => None,
        }
    }

    /// Move focus to the host on an explicit user request.
    ///
    /// Returns the browser that lost focus.
    pub fn focus_host(&mut self) -> Option<BrowserId> {
        let previous = self.focused_browser();
        self.state = FocusState::HostFocused;
        previous
    }

    /// Forget a browser that is going away.
    pub fn release(&mut self, browser: BrowserId) -> bool {
        if self.state == FocusState::EngineFocused(browser) {
            debug!(browser = %browser, "focused browser released");
            self.state = FocusState::HostFocused;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingHostFocus;

    fn arbiter() -> (FocusArbiter, CountingHostFocus) {
        let host = CountingHostFocus::default();
        (FocusArbiter::new(Box::new(host.clone())), host)
    }

    #[test]
    fn test_initial_state() {
        let (arbiter, host) = arbiter();
        assert_eq!(arbiter.state(), FocusState::HostFocused);
        assert_eq!(host.clears(), 0);
    }

    #[test]
    fn test_got_focus_is_idempotent() {
        let (mut arbiter, host) = arbiter();

        assert!(arbiter.on_got_focus(BrowserId(1)));
        assert!(!arbiter.on_got_focus(BrowserId(1)));

        assert_eq!(arbiter.state(), FocusState::EngineFocused(BrowserId(1)));
        assert_eq!(host.clears(), 1);
    }

    #[test]
    fn test_take_focus_returns_to_host() {
        let (mut arbiter, _) = arbiter();
        arbiter.on_got_focus(BrowserId(1));

        let next = arbiter.on_take_focus(BrowserId(1), FocusDirection::Forward);
        assert_eq!(next, Some(ChromeControl::Back));
        assert_eq!(arbiter.state(), FocusState::HostFocused);

        assert_eq!(
            arbiter.on_take_focus(BrowserId(1), FocusDirection::Forward),
            None
        );
        assert_eq!(arbiter.state(), FocusState::HostFocused);
    }

    #[test]
    fn test_take_focus_backward_targets_address_field() {
        let (mut arbiter, _) = arbiter();
        arbiter.on_got_focus(BrowserId(1));

        assert_eq!(
            arbiter.on_take_focus(BrowserId(1), FocusDirection::Backward),
            Some(ChromeControl::AddressField)
        );
    }

    #[test]
    fn test_single_owner_across_browsers() {
        let (mut arbiter, host) = arbiter();

        arbiter.on_got_focus(BrowserId(1));
        assert!(arbiter.on_got_focus(BrowserId(2)));
        assert_eq!(arbiter.focused_browser(), Some(BrowserId(2)));
        assert_eq!(host.clears(), 1);

        assert_eq!(
            arbiter.on_take_focus(BrowserId(1), FocusDirection::Forward),
            None
        );
        assert_eq!(arbiter.focused_browser(), Some(BrowserId(2)));
    }

    #[test]
    fn test_refocus_after_yield_clears_again() {
        let (mut arbiter, host) = arbiter();

        arbiter.on_got_focus(BrowserId(1));
        arbiter.on_take_focus(BrowserId(1), FocusDirection::Forward);
        arbiter.on_got_focus(BrowserId(1));

        assert_eq!(host.clears(), 2);
    }

    #[test]
    fn test_release() {
        let (mut arbiter, _) = arbiter();
        arbiter.on_got_focus(BrowserId(1));

        assert!(!arbiter.release(BrowserId(2)));
        assert!(arbiter.release(BrowserId(1)));
        assert_eq!(arbiter.state(), FocusState::HostFocused);
    }

    #[test]
    fn test_focus_host() {
        let (mut arbiter, _) = arbiter();
        assert_eq!(arbiter.focus_host(), None);

        arbiter.on_got_focus(BrowserId(4));
        assert_eq!(arbiter.focus_host(), Some(BrowserId(4)));
        assert!(!arbiter.is_engine_focused());
    }
}
