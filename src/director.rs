//=========================================================================
// Proscenium Director
//
// Main entry point and facade for the scene-flow engine.
//
// Architecture:
// ```text
//     DirectorBuilder  ──build()──>  Director  ──run()──>  [LocalSet]
//         │                            │
//         ├─ with_contexts()           ├─ cold start
//         ├─ with_tick_rate()          ├─ spawns bootstrap task
//         └─ with_screen_rule()        └─ pumps UI intents until
//                                         every sender is dropped
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::{error, info};
use tokio::time::{sleep_until, Instant};

//=== Internal Dependencies ===============================================

use crate::core::transition::BootPlan;
use crate::core::{
    BootPhase, CanvasKind, CanvasRegistry, Catalog, ContentLoader, ContextMatcher, PopupKey,
    Scrim, ScreenKey, SharedPopup, SharedScreen, TickClock, TickControl, TransitionCoordinator,
    TransitionState, UiIntent, UiManager, UiSurface,
};

//=== DirectorBuilder =====================================================

/// Builder for configuring and constructing a [`Director`].
///
/// Provides a fluent API for setting flow parameters before
/// construction. The content loader and UI surface are the two seams
/// the embedding application must supply; everything else has a
/// default.
///
/// # Default Values
///
/// - **Contexts**: `"Boot"` / `"Lobby"` / `"Game"`
/// - **Boot hold**: 3s minimum plus up to 2s of random extra
/// - **Auto-advance**: enabled (boot flows into the lobby)
/// - **Veil floor**: 1.2s minimum visibility, input blocked
/// - **Layer orders**: content at 0, veil at 5000
/// - **Tick rate**: 60.0 polls per second
/// - **Intent capacity**: 64 queued events
///
/// # Examples
///
/// Simple usage with defaults:
/// ```no_run
/// use proscenium::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum ScreenId { Home }
/// impl ScreenKey for ScreenId {}
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum PopupId { Settings }
/// impl PopupKey for PopupId {}
///
/// # struct NullLoader;
/// # impl ContentLoader for NullLoader {
/// #     fn begin_load(&self, target: &str, _mode: LoadMode) -> Result<LoadOp, LoadError> {
/// #         Ok(LoadOp::new(target))
/// #     }
/// #     fn progress(&self, _op: &LoadOp) -> f32 { 1.0 }
/// #     fn finalize_activation(&self, _op: &LoadOp) {}
/// #     fn is_done(&self, _op: &LoadOp) -> bool { true }
/// #     fn begin_unload(&self, _target: &str) -> Option<LoadOp> { None }
/// #     fn set_primary(&self, _target: &str) -> bool { true }
/// #     fn is_loaded(&self, _target: &str) -> bool { true }
/// #     fn primary(&self) -> Option<String> { None }
/// # }
/// # struct NullSurface;
/// # impl UiSurface<ScreenId, PopupId> for NullSurface {
/// #     fn scan_canvases(&mut self) -> Vec<(CanvasKind, SharedCanvas)> { Vec::new() }
/// #     fn scan_screens(&mut self) -> Vec<(ScreenId, SharedScreen)> { Vec::new() }
/// #     fn scan_popups(&mut self) -> Vec<(PopupId, SharedPopup)> { Vec::new() }
/// # }
/// # async fn start() {
/// let director = DirectorBuilder::<ScreenId, PopupId>::new(NullLoader, NullSurface)
///     .with_screen_rule("Lobby", ScreenId::Home)
///     .with_settings_popup(PopupId::Settings)
///     .build();
///
/// tokio::task::LocalSet::new().run_until(director.run()).await;
/// # }
/// ```
///
/// Advanced configuration:
/// ```no_run
/// # use proscenium::prelude::*;
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum ScreenId { Home }
/// # impl ScreenKey for ScreenId {}
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// # enum PopupId { Settings }
/// # impl PopupKey for PopupId {}
/// # struct NullLoader;
/// # impl ContentLoader for NullLoader {
/// #     fn begin_load(&self, target: &str, _mode: LoadMode) -> Result<LoadOp, LoadError> {
/// #         Ok(LoadOp::new(target))
/// #     }
/// #     fn progress(&self, _op: &LoadOp) -> f32 { 1.0 }
/// #     fn finalize_activation(&self, _op: &LoadOp) {}
/// #     fn is_done(&self, _op: &LoadOp) -> bool { true }
/// #     fn begin_unload(&self, _target: &str) -> Option<LoadOp> { None }
/// #     fn set_primary(&self, _target: &str) -> bool { true }
/// #     fn is_loaded(&self, _target: &str) -> bool { true }
/// #     fn primary(&self) -> Option<String> { None }
/// # }
/// # struct NullSurface;
/// # impl UiSurface<ScreenId, PopupId> for NullSurface {
/// #     fn scan_canvases(&mut self) -> Vec<(CanvasKind, SharedCanvas)> { Vec::new() }
/// #     fn scan_screens(&mut self) -> Vec<(ScreenId, SharedScreen)> { Vec::new() }
/// #     fn scan_popups(&mut self) -> Vec<(PopupId, SharedPopup)> { Vec::new() }
/// # }
/// # async fn start() {
/// use std::time::Duration;
///
/// let director = DirectorBuilder::<ScreenId, PopupId>::new(NullLoader, NullSurface)
///     .with_contexts("Splash", "MainMenu", "Match")
///     .with_boot_hold(Duration::from_secs(2), Duration::from_secs(1))
///     .with_scrim_min_visible(Duration::from_millis(800))
///     .with_tick_rate(30.0)
///     .build();
///
/// tokio::task::LocalSet::new().run_until(director.run()).await;
/// # }
/// ```
pub struct DirectorBuilder<S: ScreenKey, P: PopupKey> {
    loader: Rc<dyn ContentLoader>,
    surface: Rc<RefCell<dyn UiSurface<S, P>>>,
    catalog: Option<Rc<dyn Catalog>>,
    boot_context: String,
    lobby_context: String,
    game_context: String,
    min_boot_hold: Duration,
    extra_boot_hold: Duration,
    auto_advance: bool,
    scrim_min_visible: Duration,
    scrim_blocks_input: bool,
    base_order: i32,
    veil_order: i32,
    tps: f64,
    intent_capacity: usize,
    canvas_rules: ContextMatcher<CanvasKind>,
    screen_rules: ContextMatcher<S>,
    settings_popup: Option<P>,
}

impl<S: ScreenKey, P: PopupKey> DirectorBuilder<S, P> {
    /// Creates a new builder around the two mandatory seams.
    pub fn new(
        loader: impl ContentLoader + 'static,
        surface: impl UiSurface<S, P> + 'static,
    ) -> Self {
        Self {
            loader: Rc::new(loader),
            surface: Rc::new(RefCell::new(surface)),
            catalog: None,
            boot_context: "Boot".to_string(),
            lobby_context: "Lobby".to_string(),
            game_context: "Game".to_string(),
            min_boot_hold: Duration::from_secs(3),
            extra_boot_hold: Duration::from_secs(2),
            auto_advance: true,
            scrim_min_visible: Duration::from_millis(1200),
            scrim_blocks_input: true,
            base_order: 0,
            veil_order: 5000,
            tps: 60.0,
            intent_capacity: 64,
            canvas_rules: ContextMatcher::new(),
            screen_rules: ContextMatcher::new(),
            settings_popup: None,
        }
    }

    /// Attaches a catalog service, initialized once during bootstrap.
    pub fn with_catalog(mut self, catalog: impl Catalog + 'static) -> Self {
        self.catalog = Some(Rc::new(catalog));
        self
    }

    /// Sets the boot, lobby, and game context names.
    ///
    /// These drive bootstrap detection, auto-advance, the
    /// [`Director::load_lobby`] / [`Director::load_game`] shortcuts,
    /// and the default canvas rules.
    ///
    /// # Panics
    ///
    /// Panics if any name is empty.
    pub fn with_contexts(
        mut self,
        boot: impl Into<String>,
        lobby: impl Into<String>,
        game: impl Into<String>,
    ) -> Self {
        let boot = boot.into();
        let lobby = lobby.into();
        let game = game.into();
        assert!(
            !boot.is_empty() && !lobby.is_empty() && !game.is_empty(),
            "Context names must not be empty"
        );

        self.boot_context = boot;
        self.lobby_context = lobby;
        self.game_context = game;
        self
    }

    /// Sets how long bootstrap holds the boot context: a fixed
    /// minimum plus a uniformly random extra in `[0, extra]`.
    ///
    /// Default: 3s minimum, up to 2s extra.
    pub fn with_boot_hold(mut self, min: Duration, extra: Duration) -> Self {
        self.min_boot_hold = min;
        self.extra_boot_hold = extra;
        self
    }

    /// Enables or disables the automatic boot → lobby advance at the
    /// end of bootstrap.
    ///
    /// Default: enabled.
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    /// Sets the minimum time the loading veil stays visible once
    /// shown. Transitions also withhold content activation until this
    /// floor has passed.
    ///
    /// Default: 1.2s.
    pub fn with_scrim_min_visible(mut self, min_visible: Duration) -> Self {
        self.scrim_min_visible = min_visible;
        self
    }

    /// Sets whether the veil blocks pointer input while visible.
    ///
    /// Default: enabled.
    pub fn with_scrim_input_blocking(mut self, blocking: bool) -> Self {
        self.scrim_blocks_input = blocking;
        self
    }

    /// Sets the layer order applied to content canvases and the
    /// order applied to the veil canvas.
    ///
    /// Default: 0 and 5000.
    ///
    /// # Panics
    ///
    /// Panics if `veil <= base`.
    pub fn with_layer_orders(mut self, base: i32, veil: i32) -> Self {
        assert!(
            veil > base,
            "Veil order must sit above the base order, got {} and {}",
            base,
            veil
        );
        self.base_order = base;
        self.veil_order = veil;
        self
    }

    /// Sets the polling rate for load progress and the intent pump.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `tps <= 0.0`.
    pub fn with_tick_rate(mut self, tps: f64) -> Self {
        assert!(tps > 0.0, "Tick rate must be positive, got {}", tps);
        self.tps = tps;
        self
    }

    /// Sets the capacity of the embedder → director intent channel.
    ///
    /// Default: 64
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_intent_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Intent capacity must be positive");
        self.intent_capacity = capacity;
        self
    }

    /// Adds a context → canvas rule. A context matches when its name
    /// contains the pattern; earlier rules win.
    ///
    /// When no rule is added, a default set mapping the configured
    /// boot, lobby, and game context names onto their canvas kinds is
    /// installed at build time.
    pub fn with_canvas_rule(mut self, pattern: impl Into<String>, kind: CanvasKind) -> Self {
        self.canvas_rules.insert(pattern, kind);
        self
    }

    /// Adds a context → screen rule for the screen auto-shown after a
    /// transition. Earlier rules win.
    pub fn with_screen_rule(mut self, pattern: impl Into<String>, screen: S) -> Self {
        self.screen_rules.insert(pattern, screen);
        self
    }

    /// Designates the popup toggled by [`UiIntent::ToggleSettings`].
    ///
    /// # Panics
    ///
    /// Panics if `popup` is a placeholder id.
    pub fn with_settings_popup(mut self, popup: P) -> Self {
        assert!(
            !popup.is_placeholder(),
            "Settings popup must not use a placeholder id"
        );
        self.settings_popup = Some(popup);
        self
    }

    /// Builds the director instance.
    ///
    /// Consumes the builder and produces a configured [`Director`]
    /// ready for execution. All flow systems are created here; the
    /// registries stay empty until the first surface scan (cold start
    /// or the first transition).
    pub fn build(mut self) -> Director<S, P> {
        info!(
            "Building director (tick: {}, intent capacity: {})",
            self.tps, self.intent_capacity
        );

        if self.canvas_rules.is_empty() {
            self.canvas_rules
                .insert(self.boot_context.clone(), CanvasKind::Boot);
            self.canvas_rules
                .insert(self.lobby_context.clone(), CanvasKind::Lobby);
            self.canvas_rules
                .insert(self.game_context.clone(), CanvasKind::Game);
        }

        let canvases = Rc::new(RefCell::new(CanvasRegistry::new(
            self.canvas_rules,
            self.base_order,
            self.veil_order,
        )));
        let ui = Rc::new(RefCell::new(UiManager::new(
            self.screen_rules,
            self.settings_popup,
        )));
        let scrim = Scrim::new(
            Rc::clone(&canvases),
            self.scrim_min_visible,
            self.scrim_blocks_input,
        );
        let state = Rc::new(RefCell::new(TransitionState::new()));
        let tick = TickClock::from_tps(self.tps);

        let plan = BootPlan {
            boot_context: self.boot_context,
            lobby_context: self.lobby_context.clone(),
            auto_advance: self.auto_advance,
            min_hold: self.min_boot_hold,
            extra_hold: self.extra_boot_hold,
        };

        let coordinator = Rc::new(TransitionCoordinator::new(
            self.loader,
            self.catalog,
            self.surface,
            canvases,
            Rc::clone(&ui),
            scrim,
            Rc::clone(&state),
            tick.clone(),
            plan,
        ));

        let (intent_tx, intent_rx) = bounded(self.intent_capacity);

        Director {
            coordinator,
            ui,
            state,
            intent_tx,
            intent_rx,
            tick,
            lobby_context: self.lobby_context,
            game_context: self.game_context,
        }
    }
}

//=== Director ============================================================

/// Scene-flow runtime.
///
/// The director owns the transition coordinator, the loading veil,
/// the canvas registry, and the layered UI stacks, and pumps UI
/// intents from the embedder. Create via [`DirectorBuilder`].
///
/// # Architecture
///
/// ```text
/// Director (logic task, inside a LocalSet)
///   ├─► TransitionCoordinator ──► ContentLoader (seam)
///   │     ├─► Scrim ──► CanvasRegistry
///   │     └─► UiManager (screens, popups)
///   │
///   └─► Intent pump ◄── Sender<UiIntent> (any thread)
/// ```
///
/// All engine state lives on one task; the only concurrent surface is
/// the intent channel, whose senders may be cloned onto any thread.
pub struct Director<S: ScreenKey, P: PopupKey> {
    coordinator: Rc<TransitionCoordinator<S, P>>,
    ui: Rc<RefCell<UiManager<S, P>>>,
    state: Rc<RefCell<TransitionState>>,
    intent_tx: Sender<UiIntent>,
    intent_rx: Receiver<UiIntent>,
    tick: TickClock,
    lobby_context: String,
    game_context: String,
}

impl<S: ScreenKey, P: PopupKey> Director<S, P> {
    //--- Flow Control -----------------------------------------------------

    /// Scans the surface and applies the current primary context
    /// without running any flow. [`Director::run`] does this before
    /// anything else; call it directly when driving flows manually.
    pub fn cold_start(&self) {
        self.coordinator.cold_start();
    }

    /// Runs the one-shot bootstrap flow. See
    /// [`TransitionCoordinator::bootstrap`].
    pub async fn bootstrap(&self) {
        self.coordinator.bootstrap().await;
    }

    /// Requests a guarded transition to the named context.
    pub async fn request_transition(&self, target: &str) {
        self.coordinator.request_transition(target).await;
    }

    /// Requests a transition to the configured lobby context.
    pub async fn load_lobby(&self) {
        self.coordinator.request_transition(&self.lobby_context).await;
    }

    /// Requests a transition to the configured game context.
    pub async fn load_game(&self) {
        self.coordinator.request_transition(&self.game_context).await;
    }

    /// True while a transition holds the in-flight flag.
    pub fn is_transitioning(&self) -> bool {
        self.state.borrow().is_transitioning()
    }

    /// Current phase of the bootstrap flow.
    pub fn boot_phase(&self) -> BootPhase {
        self.state.borrow().boot_phase()
    }

    //--- UI Access --------------------------------------------------------

    /// Returns a cloneable sender for the intent channel. Senders may
    /// live on any thread; [`Director::run`] exits once every sender
    /// is dropped and the queue has drained.
    pub fn intent_sender(&self) -> Sender<UiIntent> {
        self.intent_tx.clone()
    }

    /// Registers a screen handle outside the surface scan. Scans do
    /// this automatically; use this for screens created at runtime.
    pub fn register_screen(&self, id: S, handle: SharedScreen) {
        self.ui.borrow_mut().register_screen(id, handle);
    }

    /// Registers a popup handle outside the surface scan.
    pub fn register_popup(&self, id: P, handle: SharedPopup) {
        self.ui.borrow_mut().register_popup(id, handle);
    }

    /// Shows a screen, hiding every other screen first.
    pub fn show_screen(&self, id: S) {
        self.ui.borrow_mut().show_screen(id, true);
    }

    /// Shows a screen on top of the stack, leaving the screens
    /// beneath it active.
    pub fn show_screen_stacked(&self, id: S) {
        self.ui.borrow_mut().show_screen(id, false);
    }

    /// Opens a popup on top of the popup stack.
    pub fn show_popup(&self, id: P) {
        self.ui.borrow_mut().show_popup(id);
    }

    /// Opens the popup, or closes it when it is already on top.
    pub fn toggle_popup(&self, id: P) {
        self.ui.borrow_mut().toggle_popup(id);
    }

    /// Closes the topmost popup, if any.
    pub fn close_top_popup(&self) {
        self.ui.borrow_mut().close_top_popup();
    }

    /// Closes every open popup, top down.
    pub fn close_all_popups(&self) {
        self.ui.borrow_mut().close_all_popups();
    }

    /// Screen currently on top of the screen stack.
    pub fn current_screen(&self) -> Option<S> {
        self.ui.borrow().current_screen()
    }

    /// True when at least one popup is open.
    pub fn has_open_popups(&self) -> bool {
        self.ui.borrow().has_open_popups()
    }

    /// Number of open popups.
    pub fn popup_depth(&self) -> usize {
        self.ui.borrow().popup_depth()
    }

    /// Installs a predicate consulted before the settings popup
    /// toggles. While it returns `false`, [`UiIntent::ToggleSettings`]
    /// is ignored.
    pub fn set_settings_gate(&self, gate: impl Fn() -> bool + 'static) {
        self.ui.borrow_mut().set_settings_gate(gate);
    }

    /// Removes the settings gate.
    pub fn clear_settings_gate(&self) {
        self.ui.borrow_mut().clear_settings_gate();
    }

    /// Registered handle for a screen.
    ///
    /// # Panics
    ///
    /// Panics if the screen is not registered.
    pub fn expect_screen(&self, id: S) -> SharedScreen {
        self.ui.borrow().expect_screen(id)
    }

    /// Registered handle for a popup.
    ///
    /// # Panics
    ///
    /// Panics if the popup is not registered.
    pub fn expect_popup(&self, id: P) -> SharedPopup {
        self.ui.borrow().expect_popup(id)
    }

    //--- Execution --------------------------------------------------------

    /// Starts the director and resolves when the intent channel
    /// disconnects and the bootstrap task has finished.
    ///
    /// # Lifecycle
    ///
    /// 1. Cold start: scan the surface, lower any stale veil, apply
    ///    the current primary context
    /// 2. Spawn the bootstrap flow as a local task
    /// 3. Pump UI intents at the configured tick rate
    /// 4. When every [`Sender`] from [`Director::intent_sender`] is
    ///    dropped and the queue is drained, the pump exits and the
    ///    bootstrap task is awaited
    ///
    /// Grab a sender *before* calling `run`, or the pump exits on its
    /// first pass.
    ///
    /// # Panics
    ///
    /// Panics if called outside a [`tokio::task::LocalSet`], which the
    /// spawned flows require.
    pub async fn run(self) {
        info!("Starting director runtime");

        let Director {
            coordinator,
            ui,
            intent_tx,
            intent_rx,
            tick,
            ..
        } = self;

        //--- 1. Bring registries in line with the live surface -----------
        coordinator.cold_start();

        //--- 2. Spawn the bootstrap flow ----------------------------------
        let boot = {
            let coordinator = Rc::clone(&coordinator);
            tokio::task::spawn_local(async move {
                coordinator.bootstrap().await;
            })
        };
        info!("Bootstrap task spawned");

        // The director's own sender must not keep the channel alive.
        drop(intent_tx);

        //--- 3. Pump intents at the tick rate -----------------------------
        loop {
            let frame_start = Instant::now();

            if let TickControl::Exit = Self::drain_intents(&intent_rx, &ui) {
                info!("Intent channel disconnected, pump exiting.");
                break;
            }

            sleep_until(frame_start + tick.period()).await;
        }

        //--- 4. Cleanup: wait for the bootstrap flow ----------------------
        if let Err(e) = boot.await {
            error!("Bootstrap task failed: {:?}", e);
        }

        info!("Director shutdown complete");
    }

    //--- drain_intents() --------------------------------------------------
    //
    // Routes every queued intent into the UI stacks. Returns a
    // TickControl indicating whether to continue or exit.
    //
    fn drain_intents(
        rx: &Receiver<UiIntent>,
        ui: &Rc<RefCell<UiManager<S, P>>>,
    ) -> TickControl {
        loop {
            match rx.try_recv() {
                Ok(intent) => ui.borrow_mut().route_intent(intent),
                Err(TryRecvError::Empty) => return TickControl::Continue,
                Err(TryRecvError::Disconnected) => return TickControl::Exit,
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        run_local, FakeCanvas, FakeLoader, FakePopup, FakeScreen, FakeSurface, TestPopupId,
        TestScreenId,
    };

    fn builder() -> DirectorBuilder<TestScreenId, TestPopupId> {
        DirectorBuilder::new(FakeLoader::new(&[]), FakeSurface::new())
    }

    //=====================================================================
    // DirectorBuilder Tests
    //=====================================================================

    #[test]
    fn builder_can_be_created() {
        let _builder = builder();
    }

    #[test]
    fn builder_defaults() {
        let builder = builder();
        assert_eq!(builder.boot_context, "Boot");
        assert_eq!(builder.lobby_context, "Lobby");
        assert_eq!(builder.game_context, "Game");
        assert_eq!(builder.min_boot_hold, Duration::from_secs(3));
        assert_eq!(builder.extra_boot_hold, Duration::from_secs(2));
        assert!(builder.auto_advance);
        assert_eq!(builder.scrim_min_visible, Duration::from_millis(1200));
        assert!(builder.scrim_blocks_input);
        assert_eq!(builder.base_order, 0);
        assert_eq!(builder.veil_order, 5000);
        assert_eq!(builder.tps, 60.0);
        assert_eq!(builder.intent_capacity, 64);
        assert!(builder.canvas_rules.is_empty());
        assert!(builder.screen_rules.is_empty());
        assert!(builder.settings_popup.is_none());
    }

    #[test]
    fn builder_with_contexts() {
        let builder = builder().with_contexts("Splash", "MainMenu", "Match");
        assert_eq!(builder.boot_context, "Splash");
        assert_eq!(builder.lobby_context, "MainMenu");
        assert_eq!(builder.game_context, "Match");
    }

    #[test]
    #[should_panic(expected = "Context names must not be empty")]
    fn builder_with_contexts_panics_on_empty_name() {
        builder().with_contexts("Splash", "", "Match");
    }

    #[test]
    fn builder_with_tick_rate() {
        let builder = builder().with_tick_rate(120.0);
        assert_eq!(builder.tps, 120.0);
    }

    #[test]
    #[should_panic(expected = "Tick rate must be positive")]
    fn builder_with_tick_rate_panics_on_zero() {
        builder().with_tick_rate(0.0);
    }

    #[test]
    #[should_panic(expected = "Tick rate must be positive")]
    fn builder_with_tick_rate_panics_on_negative() {
        builder().with_tick_rate(-60.0);
    }

    #[test]
    fn builder_with_intent_capacity() {
        let builder = builder().with_intent_capacity(256);
        assert_eq!(builder.intent_capacity, 256);
    }

    #[test]
    #[should_panic(expected = "Intent capacity must be positive")]
    fn builder_with_intent_capacity_panics_on_zero() {
        builder().with_intent_capacity(0);
    }

    #[test]
    fn builder_with_layer_orders() {
        let builder = builder().with_layer_orders(10, 900);
        assert_eq!(builder.base_order, 10);
        assert_eq!(builder.veil_order, 900);
    }

    #[test]
    #[should_panic(expected = "Veil order must sit above the base order")]
    fn builder_with_layer_orders_panics_when_veil_is_not_above() {
        builder().with_layer_orders(100, 100);
    }

    #[test]
    #[should_panic(expected = "Settings popup must not use a placeholder id")]
    fn builder_rejects_placeholder_settings_popup() {
        builder().with_settings_popup(TestPopupId::Placeholder);
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let director = builder()
            .with_contexts("Boot", "Front", "Match")
            .with_tick_rate(90.0)
            .with_intent_capacity(16)
            .build();

        assert_eq!(director.tick.period(), Duration::from_secs_f64(1.0 / 90.0));
        assert_eq!(director.lobby_context, "Front");
        assert_eq!(director.game_context, "Match");
    }

    //=====================================================================
    // Director Runtime Tests
    //=====================================================================

    #[test]
    fn ui_delegation_reaches_the_stacks() {
        let home = Rc::new(RefCell::new(FakeScreen::new()));
        let battle = Rc::new(RefCell::new(FakeScreen::new()));
        let confirm = Rc::new(RefCell::new(FakePopup::new()));
        let surface = FakeSurface::new()
            .with_screen(TestScreenId::Home, &home)
            .with_screen(TestScreenId::Battle, &battle)
            .with_popup(TestPopupId::Confirm, &confirm);

        let director = DirectorBuilder::new(FakeLoader::new(&[]), surface).build();
        director.cold_start();

        director.show_screen(TestScreenId::Home);
        assert_eq!(director.current_screen(), Some(TestScreenId::Home));
        assert!(home.borrow().active);

        director.show_screen_stacked(TestScreenId::Battle);
        assert_eq!(director.current_screen(), Some(TestScreenId::Battle));
        assert!(home.borrow().active);

        director.show_popup(TestPopupId::Confirm);
        assert!(director.has_open_popups());
        assert_eq!(director.popup_depth(), 1);

        director.close_top_popup();
        assert!(!director.has_open_popups());
        assert_eq!(confirm.borrow().closes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_exits_when_no_intent_sender_exists() {
        run_local(async {
            let director = DirectorBuilder::<TestScreenId, TestPopupId>::new(
                FakeLoader::new(&[]),
                FakeSurface::new(),
            )
            .build();

            // No sender was handed out, so the pump exits on its first
            // pass and bootstrap (skipped outside the boot context)
            // resolves immediately.
            director.run().await;
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn run_routes_intents_until_senders_drop() {
        run_local(async {
            let settings = Rc::new(RefCell::new(FakePopup::new()));
            let surface = FakeSurface::new().with_popup(TestPopupId::Settings, &settings);

            let director = DirectorBuilder::new(
                FakeLoader::new(&[]).with_primary("Lobby"),
                surface,
            )
            .with_settings_popup(TestPopupId::Settings)
            .build();

            let tx = director.intent_sender();
            let runtime = tokio::task::spawn_local(director.run());

            tx.send(UiIntent::ToggleSettings).expect("send toggle");
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert!(settings.borrow().active);
            assert_eq!(settings.borrow().opens(), 1);

            tx.send(UiIntent::ToggleSettings).expect("send toggle");
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert!(!settings.borrow().active);
            assert_eq!(settings.borrow().closes(), 1);

            // Close with nothing open is a no-op.
            tx.send(UiIntent::CloseTopPopup).expect("send close");
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert_eq!(settings.borrow().closes(), 1);

            drop(tx);
            runtime.await.expect("director runtime");
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn run_drives_bootstrap_through_default_canvas_rules() {
        run_local(async {
            let boot_canvas = Rc::new(RefCell::new(FakeCanvas::new()));
            let lobby_canvas = Rc::new(RefCell::new(FakeCanvas::new()));
            let loading_canvas = Rc::new(RefCell::new(FakeCanvas::new()));
            let home = Rc::new(RefCell::new(FakeScreen::new()));

            let surface = FakeSurface::new()
                .with_canvas(CanvasKind::Boot, &boot_canvas)
                .with_canvas(CanvasKind::Lobby, &lobby_canvas)
                .with_canvas(CanvasKind::Loading, &loading_canvas)
                .with_screen(TestScreenId::Home, &home);
            let loader = Rc::new(FakeLoader::new(&["Lobby"]).with_primary("Boot"));

            let director = DirectorBuilder::new(Rc::clone(&loader), surface)
                .with_screen_rule("Lobby", TestScreenId::Home)
                .build();

            director.run().await;
            tokio::time::sleep(Duration::from_millis(50)).await;

            assert_eq!(loader.primary().as_deref(), Some("Lobby"));
            assert!(lobby_canvas.borrow().active);
            assert!(!boot_canvas.borrow().active);
            assert!(!loading_canvas.borrow().active);
            assert_eq!(loading_canvas.borrow().layer_order, Some(5000));
            assert!(home.borrow().active);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn load_shortcuts_target_their_configured_contexts() {
        run_local(async {
            let lobby_canvas = Rc::new(RefCell::new(FakeCanvas::new()));
            let game_canvas = Rc::new(RefCell::new(FakeCanvas::new()));
            let loading_canvas = Rc::new(RefCell::new(FakeCanvas::new()));

            let surface = FakeSurface::new()
                .with_canvas(CanvasKind::Lobby, &lobby_canvas)
                .with_canvas(CanvasKind::Game, &game_canvas)
                .with_canvas(CanvasKind::Loading, &loading_canvas);
            let loader = Rc::new(FakeLoader::new(&["Match"]).with_primary("Front"));

            let director = DirectorBuilder::new(Rc::clone(&loader), surface)
                .with_contexts("Splash", "Front", "Match")
                .build();
            director.cold_start();

            director.load_game().await;
            assert_eq!(loader.primary().as_deref(), Some("Match"));
            assert!(game_canvas.borrow().active);
            assert!(!lobby_canvas.borrow().active);

            director.load_lobby().await;
            assert_eq!(loader.primary().as_deref(), Some("Front"));
            assert!(lobby_canvas.borrow().active);
            assert!(!game_canvas.borrow().active);
        })
        .await;
    }
}
