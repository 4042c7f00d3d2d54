//=========================================================================
// Layered UI Primitives
//=========================================================================
//
// Identity traits and capability traits for the two layered UI
// families the engine manages:
//
// - Screens: full-surface views, at most one visible, tracked on a
//   stack that is cleared whenever a new screen is shown.
// - Popups: modal overlays stacked above the current screen, closed
//   in LIFO order.
//
// Lifecycle hooks are leaf callbacks. They must not call back into
// the engine synchronously; anything they trigger must go through the
// intent channel or a spawned task.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

//=== Submodules ==========================================================

mod manager;

pub use manager::UiManager;

//=== Identity Traits =====================================================

/// Marker trait for screen identifiers.
///
/// Typically implemented by an application enum. An identifier may
/// designate itself a placeholder (a "no screen" sentinel); the
/// manager refuses to register handles under placeholder identities.
pub trait ScreenKey: Clone + Copy + Eq + Hash + Debug + 'static {
    /// True when this identity is a sentinel rather than a real screen.
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// Marker trait for popup identifiers.
///
/// Same contract as [`ScreenKey`], for the popup family.
pub trait PopupKey: Clone + Copy + Eq + Hash + Debug + 'static {
    /// True when this identity is a sentinel rather than a real popup.
    fn is_placeholder(&self) -> bool {
        false
    }
}

//=== Capability Traits ===================================================

/// Capability interface for a full-surface screen.
///
/// `on_init` runs exactly once, before the first `on_show`. The
/// activation order on show is init (first time only), then
/// `set_active(true)`, then `on_show`; on hide it is `on_hide`, then
/// `set_active(false)`.
pub trait Screen {
    /// Shows or hides the screen's widget subtree.
    fn set_active(&mut self, active: bool);

    /// One-time setup, before the first show.
    fn on_init(&mut self) {}

    /// Runs after every activation.
    fn on_show(&mut self) {}

    /// Runs before every deactivation.
    fn on_hide(&mut self) {}
}

/// Capability interface for a modal popup.
///
/// Hook ordering mirrors [`Screen`], with open/close in place of
/// show/hide.
pub trait Popup {
    /// Shows or hides the popup's widget subtree.
    fn set_active(&mut self, active: bool);

    /// One-time setup, before the first open.
    fn on_init(&mut self) {}

    /// Runs after every activation.
    fn on_open(&mut self) {}

    /// Runs before every deactivation.
    fn on_close(&mut self) {}
}

/// Shared handle to a screen implementation.
pub type SharedScreen = Rc<RefCell<dyn Screen>>;

/// Shared handle to a popup implementation.
pub type SharedPopup = Rc<RefCell<dyn Popup>>;

//=== UI Intent ===========================================================

/// Global input gesture routed through the stack manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiIntent {
    /// Toggle the designated settings popup, subject to the settings
    /// gate.
    ToggleSettings,

    /// Close the topmost popup unconditionally.
    CloseTopPopup,
}
