//=========================================================================
// Screen & Popup Stack Manager
//=========================================================================
//
// Owns the registries and stacks for both layered UI families.
//
// Entries are keyed by the application's identity enums and carry a
// one-time init latch alongside the widget handle. Handles are
// rediscovered after every context change; re-registering the same
// widget keeps its latch, while a different widget under the same
// identity replaces the entry and starts over.
//
// Registration always parks the widget hidden without running its
// hide hook, so discovery never produces visible side effects.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use crate::core::rules::ContextMatcher;
use super::{PopupKey, ScreenKey, SharedPopup, SharedScreen, UiIntent};

//=== Entries =============================================================

struct ScreenEntry {
    handle: SharedScreen,
    initialized: bool,
}

struct PopupEntry {
    handle: SharedPopup,
    initialized: bool,
}

//=== UI Manager ==========================================================

/// Registry and stack manager for screens and popups.
///
/// Screens are exclusive: showing one hides everything else on the
/// screen stack first. Popups stack freely above the current screen
/// and close in LIFO order. The same popup identity may appear on the
/// stack more than once.
pub struct UiManager<S: ScreenKey, P: PopupKey> {
    screens: HashMap<S, ScreenEntry>,
    popups: HashMap<P, PopupEntry>,
    screen_stack: Vec<S>,
    popup_stack: Vec<P>,
    screen_rules: ContextMatcher<S>,
    settings_popup: Option<P>,
    settings_gate: Option<Box<dyn Fn() -> bool>>,
}

impl<S: ScreenKey, P: PopupKey> UiManager<S, P> {
    //--- Construction -----------------------------------------------------

    /// Creates an empty manager.
    ///
    /// `screen_rules` resolve context names to the screen shown
    /// automatically after a transition. `settings_popup` designates
    /// the popup toggled by [`UiIntent::ToggleSettings`]; without one
    /// the intent is ignored.
    pub fn new(screen_rules: ContextMatcher<S>, settings_popup: Option<P>) -> Self {
        Self {
            screens: HashMap::new(),
            popups: HashMap::new(),
            screen_stack: Vec::new(),
            popup_stack: Vec::new(),
            screen_rules,
            settings_popup,
            settings_gate: None,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a screen handle under an identity.
    ///
    /// The handle is parked inactive without running its hide hook.
    /// Re-registering the same handle keeps the one-time init latch;
    /// a different handle replaces the entry and resets it.
    pub fn register_screen(&mut self, id: S, handle: SharedScreen) {
        if id.is_placeholder() {
            error!("Refusing to register a screen under placeholder id {:?}", id);
            return;
        }

        match self.screens.entry(id) {
            Entry::Occupied(mut slot) => {
                if !Rc::ptr_eq(&slot.get().handle, &handle) {
                    warn!("Screen {:?} was already registered and has been replaced", id);
                    slot.insert(ScreenEntry {
                        handle: Rc::clone(&handle),
                        initialized: false,
                    });
                }
            }
            Entry::Vacant(slot) => {
                debug!("Screen {:?} registered", id);
                slot.insert(ScreenEntry {
                    handle: Rc::clone(&handle),
                    initialized: false,
                });
            }
        }

        handle.borrow_mut().set_active(false);
    }

    /// Registers a popup handle under an identity.
    ///
    /// Same contract as [`register_screen`](UiManager::register_screen).
    pub fn register_popup(&mut self, id: P, handle: SharedPopup) {
        if id.is_placeholder() {
            error!("Refusing to register a popup under placeholder id {:?}", id);
            return;
        }

        match self.popups.entry(id) {
            Entry::Occupied(mut slot) => {
                if !Rc::ptr_eq(&slot.get().handle, &handle) {
                    warn!("Popup {:?} was already registered and has been replaced", id);
                    slot.insert(PopupEntry {
                        handle: Rc::clone(&handle),
                        initialized: false,
                    });
                }
            }
            Entry::Vacant(slot) => {
                debug!("Popup {:?} registered", id);
                slot.insert(PopupEntry {
                    handle: Rc::clone(&handle),
                    initialized: false,
                });
            }
        }

        handle.borrow_mut().set_active(false);
    }

    /// Merges a fresh surface scan into the registries.
    pub fn rescan_from(
        &mut self,
        screens: Vec<(S, SharedScreen)>,
        popups: Vec<(P, SharedPopup)>,
    ) {
        debug!(
            "Rescanning UI surface: {} screens, {} popups",
            screens.len(),
            popups.len()
        );

        for (id, handle) in screens {
            self.register_screen(id, handle);
        }
        for (id, handle) in popups {
            self.register_popup(id, handle);
        }
    }

    //--- Screens ----------------------------------------------------------

    /// Shows a screen.
    ///
    /// With `clear_stack` everything on the screen stack is hidden
    /// first; without it the target is pushed and shown above the
    /// still-active stack. Unregistered identities are a logged
    /// no-op.
    pub fn show_screen(&mut self, id: S, clear_stack: bool) {
        if !self.screens.contains_key(&id) {
            warn!("Screen {:?} is not registered", id);
            return;
        }

        if clear_stack {
            self.hide_all_screens();
        }

        debug!("Showing screen {:?} (clear stack: {})", id, clear_stack);
        self.screen_stack.push(id);
        self.activate_screen(id);
    }

    /// Resolves the screen mapped to a context name and shows it,
    /// clearing the stack.
    ///
    /// Contexts without a matching rule simply leave the screen stack
    /// as it is.
    pub fn show_screen_for_context(&mut self, context: &str) {
        match self.screen_rules.resolve(context) {
            Some(id) => self.show_screen(id, true),
            None => debug!("No screen rule matches context {:?}", context),
        }
    }

    fn hide_all_screens(&mut self) {
        let stacked: Vec<S> = self.screen_stack.drain(..).collect();
        for id in stacked {
            if let Some(entry) = self.screens.get(&id) {
                let mut screen = entry.handle.borrow_mut();
                screen.on_hide();
                screen.set_active(false);
            }
        }
    }

    fn activate_screen(&mut self, id: S) {
        let Some(entry) = self.screens.get_mut(&id) else {
            return;
        };

        let handle = Rc::clone(&entry.handle);
        let first_time = !entry.initialized;
        entry.initialized = true;

        if first_time {
            handle.borrow_mut().on_init();
        }

        let mut screen = handle.borrow_mut();
        screen.set_active(true);
        screen.on_show();
    }

    //--- Popups -----------------------------------------------------------

    /// Opens a popup on top of the stack.
    ///
    /// The same identity may be stacked more than once. Unregistered
    /// identities are a logged no-op.
    pub fn show_popup(&mut self, id: P) {
        if !self.popups.contains_key(&id) {
            warn!("Popup {:?} is not registered", id);
            return;
        }

        debug!("Opening popup {:?} (depth {})", id, self.popup_stack.len() + 1);
        self.popup_stack.push(id);

        let Some(entry) = self.popups.get_mut(&id) else {
            return;
        };

        let handle = Rc::clone(&entry.handle);
        let first_time = !entry.initialized;
        entry.initialized = true;

        if first_time {
            handle.borrow_mut().on_init();
        }

        let mut popup = handle.borrow_mut();
        popup.set_active(true);
        popup.on_open();
    }

    /// Closes the popup when it is on top of the stack, opens it
    /// otherwise.
    pub fn toggle_popup(&mut self, id: P) {
        if self.popup_stack.last() == Some(&id) {
            self.close_top_popup();
        } else {
            self.show_popup(id);
        }
    }

    /// Closes the topmost popup. No-op on an empty stack.
    pub fn close_top_popup(&mut self) {
        let Some(id) = self.popup_stack.pop() else {
            debug!("No popup to close");
            return;
        };

        debug!("Closing popup {:?}", id);
        if let Some(entry) = self.popups.get(&id) {
            let mut popup = entry.handle.borrow_mut();
            popup.on_close();
            popup.set_active(false);
        }
    }

    /// Closes every stacked popup, topmost first.
    pub fn close_all_popups(&mut self) {
        while !self.popup_stack.is_empty() {
            self.close_top_popup();
        }
    }

    //--- Intent Routing ---------------------------------------------------

    /// Routes a global input gesture.
    pub fn route_intent(&mut self, intent: UiIntent) {
        match intent {
            UiIntent::ToggleSettings => {
                let Some(settings) = self.settings_popup else {
                    debug!("No settings popup designated, ignoring toggle");
                    return;
                };
                if let Some(gate) = &self.settings_gate {
                    if !gate() {
                        debug!("Settings toggle blocked by gate");
                        return;
                    }
                }
                self.toggle_popup(settings);
            }
            UiIntent::CloseTopPopup => self.close_top_popup(),
        }
    }

    /// Installs the predicate consulted before the settings popup is
    /// toggled. Without one the toggle is always allowed.
    pub fn set_settings_gate(&mut self, gate: impl Fn() -> bool + 'static) {
        self.settings_gate = Some(Box::new(gate));
    }

    /// Removes the settings gate.
    pub fn clear_settings_gate(&mut self) {
        self.settings_gate = None;
    }

    //--- Queries ----------------------------------------------------------

    /// Identity of the screen on top of the stack, if any.
    pub fn current_screen(&self) -> Option<S> {
        self.screen_stack.last().copied()
    }

    /// True when at least one popup is stacked.
    pub fn has_open_popups(&self) -> bool {
        !self.popup_stack.is_empty()
    }

    /// Number of stacked popups.
    pub fn popup_depth(&self) -> usize {
        self.popup_stack.len()
    }

    /// Handle to a registered screen, for tooling and tests.
    ///
    /// # Panics
    ///
    /// Panics when the identity is not registered.
    pub fn expect_screen(&self, id: S) -> SharedScreen {
        match self.screens.get(&id) {
            Some(entry) => Rc::clone(&entry.handle),
            None => panic!("screen {:?} is not registered", id),
        }
    }

    /// Handle to a registered popup, for tooling and tests.
    ///
    /// # Panics
    ///
    /// Panics when the identity is not registered.
    pub fn expect_popup(&self, id: P) -> SharedPopup {
        match self.popups.get(&id) {
            Some(entry) => Rc::clone(&entry.handle),
            None => panic!("popup {:?} is not registered", id),
        }
    }
}

//=== Tests ===============================================================
