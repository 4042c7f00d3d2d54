//=========================================================================
// Shared Test Fakes
//=========================================================================
//
// In-memory stand-ins for the outbound seams, shared by the unit test
// modules across the crate. Each fake records the calls it receives so
// tests can assert on ordering as well as end state.
//
//=========================================================================

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::Rc;

use crate::core::canvas::{Canvas, CanvasKind, SharedCanvas};
use crate::core::content::{ContentLoader, LoadError, LoadMode, LoadOp, FINALIZE_THRESHOLD};
use crate::core::surface::UiSurface;
use crate::core::ui::{Popup, PopupKey, Screen, ScreenKey, SharedPopup, SharedScreen};

//=== Identities ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestScreenId {
    Home,
    Battle,
    Placeholder,
}

impl ScreenKey for TestScreenId {
    fn is_placeholder(&self) -> bool {
        matches!(self, TestScreenId::Placeholder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestPopupId {
    Settings,
    Confirm,
    Placeholder,
}

impl PopupKey for TestPopupId {
    fn is_placeholder(&self) -> bool {
        matches!(self, TestPopupId::Placeholder)
    }
}

//=== Canvas Fake =========================================================

pub struct FakeCanvas {
    pub active: bool,
    pub blocking: bool,
    pub restores: usize,
    pub layer_order: Option<i32>,
}

impl FakeCanvas {
    pub fn new() -> Self {
        Self {
            active: false,
            blocking: false,
            restores: 0,
            layer_order: None,
        }
    }
}

impl Canvas for FakeCanvas {
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn restore_presentation(&mut self) {
        self.restores += 1;
    }

    fn set_layer_order(&mut self, order: i32) {
        self.layer_order = Some(order);
    }

    fn set_input_blocking(&mut self, blocking: bool) {
        self.blocking = blocking;
    }
}

pub fn shared_canvas(fake: &Rc<RefCell<FakeCanvas>>) -> SharedCanvas {
    Rc::clone(fake) as SharedCanvas
}

//=== Screen Fake =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenCall {
    Init,
    Show,
    Hide,
    Active(bool),
}

pub struct FakeScreen {
    pub active: bool,
    pub calls: Vec<ScreenCall>,
}

impl FakeScreen {
    pub fn new() -> Self {
        Self {
            active: false,
            calls: Vec::new(),
        }
    }

    pub fn inits(&self) -> usize {
        self.count(ScreenCall::Init)
    }

    pub fn shows(&self) -> usize {
        self.count(ScreenCall::Show)
    }

    pub fn hides(&self) -> usize {
        self.count(ScreenCall::Hide)
    }

    fn count(&self, call: ScreenCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl Screen for FakeScreen {
    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.calls.push(ScreenCall::Active(active));
    }

    fn on_init(&mut self) {
        self.calls.push(ScreenCall::Init);
    }

    fn on_show(&mut self) {
        self.calls.push(ScreenCall::Show);
    }

    fn on_hide(&mut self) {
        self.calls.push(ScreenCall::Hide);
    }
}

pub fn shared_screen(fake: &Rc<RefCell<FakeScreen>>) -> SharedScreen {
    Rc::clone(fake) as SharedScreen
}

//=== Popup Fake ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupCall {
    Init,
    Open,
    Close,
    Active(bool),
}

pub struct FakePopup {
    pub active: bool,
    pub calls: Vec<PopupCall>,
}

impl FakePopup {
    pub fn new() -> Self {
        Self {
            active: false,
            calls: Vec::new(),
        }
    }

    pub fn inits(&self) -> usize {
        self.count(PopupCall::Init)
    }

    pub fn opens(&self) -> usize {
        self.count(PopupCall::Open)
    }

    pub fn closes(&self) -> usize {
        self.count(PopupCall::Close)
    }

    fn count(&self, call: PopupCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl Popup for FakePopup {
    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.calls.push(PopupCall::Active(active));
    }

    fn on_init(&mut self) {
        self.calls.push(PopupCall::Init);
    }

    fn on_open(&mut self) {
        self.calls.push(PopupCall::Open);
    }

    fn on_close(&mut self) {
        self.calls.push(PopupCall::Close);
    }
}

pub fn shared_popup(fake: &Rc<RefCell<FakePopup>>) -> SharedPopup {
    Rc::clone(fake) as SharedPopup
}

//=== Loader Fake =========================================================

/// What the loader was asked to do, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    BeginLoad(String, LoadMode),
    Finalize(String),
    SetPrimary(String),
    BeginUnload(String),
}

struct LoadState {
    mode: LoadMode,
    progress_polls: u32,
    finalized: bool,
    done_polls: u32,
}

/// Scripted content substrate.
///
/// Loads reach the finalize threshold after `polls_to_threshold`
/// progress polls and complete after `polls_to_done` done polls once
/// activation is released. Replace loads swap the primary at
/// activation; additive loads leave it alone.
pub struct FakeLoader {
    known: RefCell<HashSet<String>>,
    primary: RefCell<Option<String>>,
    loaded: RefCell<HashSet<String>>,
    loads: RefCell<HashMap<String, LoadState>>,
    unloads: RefCell<HashMap<String, u32>>,
    polls_to_threshold: Cell<u32>,
    polls_to_done: Cell<u32>,
    refuse_primary: Cell<bool>,
    events: RefCell<Vec<LoaderEvent>>,
}

impl FakeLoader {
    pub fn new(known: &[&str]) -> Self {
        Self {
            known: RefCell::new(known.iter().map(|s| s.to_string()).collect()),
            primary: RefCell::new(None),
            loaded: RefCell::new(HashSet::new()),
            loads: RefCell::new(HashMap::new()),
            unloads: RefCell::new(HashMap::new()),
            polls_to_threshold: Cell::new(2),
            polls_to_done: Cell::new(1),
            refuse_primary: Cell::new(false),
            events: RefCell::new(Vec::new()),
        }
    }

    /// Marks a target as currently loaded and primary.
    pub fn with_primary(self, target: &str) -> Self {
        self.known.borrow_mut().insert(target.to_string());
        self.loaded.borrow_mut().insert(target.to_string());
        *self.primary.borrow_mut() = Some(target.to_string());
        self
    }

    pub fn with_polls(self, to_threshold: u32, to_done: u32) -> Self {
        self.polls_to_threshold.set(to_threshold);
        self.polls_to_done.set(to_done);
        self
    }

    /// Makes every `set_primary` call fail.
    pub fn refuse_primary_swap(self) -> Self {
        self.refuse_primary.set(true);
        self
    }

    pub fn events(&self) -> Vec<LoaderEvent> {
        self.events.borrow().clone()
    }

    pub fn begin_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, LoaderEvent::BeginLoad(..)))
            .count()
    }
}

impl ContentLoader for FakeLoader {
    fn begin_load(&self, target: &str, mode: LoadMode) -> Result<LoadOp, LoadError> {
        if !self.known.borrow().contains(target) {
            return Err(LoadError::UnknownTarget(target.to_string()));
        }
        if self.loaded.borrow().contains(target) {
            return Err(LoadError::AlreadyLoaded(target.to_string()));
        }

        self.unloads.borrow_mut().remove(target);
        self.loads.borrow_mut().insert(
            target.to_string(),
            LoadState {
                mode,
                progress_polls: 0,
                finalized: false,
                done_polls: 0,
            },
        );
        self.events
            .borrow_mut()
            .push(LoaderEvent::BeginLoad(target.to_string(), mode));
        Ok(LoadOp::new(target))
    }

    fn progress(&self, op: &LoadOp) -> f32 {
        let mut loads = self.loads.borrow_mut();
        let Some(state) = loads.get_mut(op.target()) else {
            return 0.0;
        };

        state.progress_polls += 1;
        let goal = self.polls_to_threshold.get();
        if state.progress_polls >= goal {
            FINALIZE_THRESHOLD
        } else {
            FINALIZE_THRESHOLD * state.progress_polls as f32 / goal as f32
        }
    }

    fn finalize_activation(&self, op: &LoadOp) {
        let target = op.target().to_string();
        let mut loads = self.loads.borrow_mut();
        let Some(state) = loads.get_mut(&target) else {
            return;
        };
        state.finalized = true;

        match state.mode {
            LoadMode::Replace => {
                let mut loaded = self.loaded.borrow_mut();
                loaded.clear();
                loaded.insert(target.clone());
                *self.primary.borrow_mut() = Some(target.clone());
            }
            LoadMode::Additive => {
                self.loaded.borrow_mut().insert(target.clone());
            }
        }

        self.events.borrow_mut().push(LoaderEvent::Finalize(target));
    }

    fn is_done(&self, op: &LoadOp) -> bool {
        if let Some(polls) = self.unloads.borrow_mut().get_mut(op.target()) {
            *polls += 1;
            return *polls >= self.polls_to_done.get();
        }

        let mut loads = self.loads.borrow_mut();
        let Some(state) = loads.get_mut(op.target()) else {
            return true;
        };
        if !state.finalized {
            return false;
        }
        state.done_polls += 1;
        state.done_polls >= self.polls_to_done.get()
    }

    fn begin_unload(&self, target: &str) -> Option<LoadOp> {
        if !self.loaded.borrow().contains(target) {
            return None;
        }

        self.loaded.borrow_mut().remove(target);
        if self.primary.borrow().as_deref() == Some(target) {
            *self.primary.borrow_mut() = None;
        }
        self.loads.borrow_mut().remove(target);
        self.unloads.borrow_mut().insert(target.to_string(), 0);
        self.events
            .borrow_mut()
            .push(LoaderEvent::BeginUnload(target.to_string()));
        Some(LoadOp::new(target))
    }

    fn set_primary(&self, target: &str) -> bool {
        if self.refuse_primary.get() || !self.loaded.borrow().contains(target) {
            return false;
        }

        *self.primary.borrow_mut() = Some(target.to_string());
        self.events
            .borrow_mut()
            .push(LoaderEvent::SetPrimary(target.to_string()));
        true
    }

    fn is_loaded(&self, target: &str) -> bool {
        self.loaded.borrow().contains(target)
    }

    fn primary(&self) -> Option<String> {
        self.primary.borrow().clone()
    }
}

//=== Surface Fake ========================================================

/// Scan provider returning preconfigured handle sets.
pub struct FakeSurface {
    pub canvases: Vec<(CanvasKind, SharedCanvas)>,
    pub screens: Vec<(TestScreenId, SharedScreen)>,
    pub popups: Vec<(TestPopupId, SharedPopup)>,
    pub canvas_scans: u32,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self {
            canvases: Vec::new(),
            screens: Vec::new(),
            popups: Vec::new(),
            canvas_scans: 0,
        }
    }

    pub fn with_canvas(mut self, kind: CanvasKind, fake: &Rc<RefCell<FakeCanvas>>) -> Self {
        self.canvases.push((kind, shared_canvas(fake)));
        self
    }

    pub fn with_screen(mut self, id: TestScreenId, fake: &Rc<RefCell<FakeScreen>>) -> Self {
        self.screens.push((id, shared_screen(fake)));
        self
    }

    pub fn with_popup(mut self, id: TestPopupId, fake: &Rc<RefCell<FakePopup>>) -> Self {
        self.popups.push((id, shared_popup(fake)));
        self
    }
}

impl UiSurface<TestScreenId, TestPopupId> for FakeSurface {
    fn scan_canvases(&mut self) -> Vec<(CanvasKind, SharedCanvas)> {
        self.canvas_scans += 1;
        self.canvases.clone()
    }

    fn scan_screens(&mut self) -> Vec<(TestScreenId, SharedScreen)> {
        self.screens.clone()
    }

    fn scan_popups(&mut self) -> Vec<(TestPopupId, SharedPopup)> {
        self.popups.clone()
    }
}

//=== Local Runtime Helper ================================================

/// Drives a future to completion on a fresh `LocalSet`, so code under
/// test may `spawn_local`.
pub async fn run_local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}
