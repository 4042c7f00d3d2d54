//=========================================================================
// Transition Coordinator
//=========================================================================
//
// Drives the two long flows of the engine:
//
// - bootstrap: one-shot startup in the boot context. Initializes the
//   catalog if one is configured, holds the boot surface visible for a
//   randomized minimum, then advances to the lobby.
// - request_transition: guarded context switch under the loading
//   veil. Shows the veil, yields one tick so it can present, then
//   runs the Replace or AdditiveThenSwap protocol against the content
//   loader, reapplies canvases and screens for the new context, and
//   lowers the veil.
//
// Failure policy: collaborator failures are logged and the flow
// unwinds to a safe state (veil lowered, in-flight flag cleared, the
// previous context left intact). Nothing retries and nothing queues;
// callers re-request if they still want the switch.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

//=== External Crates =====================================================

use log::{debug, error, info, warn};
use rand::Rng;
use tokio::time::{sleep_until, Instant};

//=== Internal Dependencies ===============================================

use crate::core::canvas::CanvasRegistry;
use crate::core::catalog::{Catalog, CatalogError};
use crate::core::content::{ContentLoader, LoadMode, LoadOp, FINALIZE_THRESHOLD};
use crate::core::scrim::Scrim;
use crate::core::surface::UiSurface;
use crate::core::tick::TickClock;
use crate::core::ui::{PopupKey, ScreenKey, UiManager};
use super::{BootPhase, TransitionGuard, TransitionMode, TransitionRequest, TransitionState};

//=== Boot Plan ===========================================================

/// Context names and hold times governing the startup flow.
pub(crate) struct BootPlan {
    pub boot_context: String,
    pub lobby_context: String,
    pub auto_advance: bool,
    pub min_hold: Duration,
    pub extra_hold: Duration,
}

//=== Transition Coordinator ==============================================

/// Orchestrates bootstrap and guarded context transitions.
///
/// Holds shared handles to every collaborator; the director builds
/// exactly one and shares it by `Rc`.
pub struct TransitionCoordinator<S: ScreenKey, P: PopupKey> {
    loader: Rc<dyn ContentLoader>,
    catalog: Option<Rc<dyn Catalog>>,
    surface: Rc<RefCell<dyn UiSurface<S, P>>>,
    canvases: Rc<RefCell<CanvasRegistry>>,
    ui: Rc<RefCell<UiManager<S, P>>>,
    scrim: Scrim,
    state: Rc<RefCell<TransitionState>>,
    tick: TickClock,
    plan: BootPlan,
}

impl<S: ScreenKey, P: PopupKey> TransitionCoordinator<S, P> {
    //--- Construction -----------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        loader: Rc<dyn ContentLoader>,
        catalog: Option<Rc<dyn Catalog>>,
        surface: Rc<RefCell<dyn UiSurface<S, P>>>,
        canvases: Rc<RefCell<CanvasRegistry>>,
        ui: Rc<RefCell<UiManager<S, P>>>,
        scrim: Scrim,
        state: Rc<RefCell<TransitionState>>,
        tick: TickClock,
        plan: BootPlan,
    ) -> Self {
        Self {
            loader,
            catalog,
            surface,
            canvases,
            ui,
            scrim,
            state,
            tick,
            plan,
        }
    }

    //--- Cold Start -------------------------------------------------------

    /// Brings the registries in line with whatever content is already
    /// live, before any flow runs.
    ///
    /// Scans the surface, force-lowers a veil the content may have
    /// left active, and applies canvas exclusivity and the auto-shown
    /// screen for the current primary context.
    pub fn cold_start(&self) {
        info!("Cold start: scanning surfaces and applying the current context");

        let canvas_scan = self.surface.borrow_mut().scan_canvases();
        let screens = self.surface.borrow_mut().scan_screens();
        let popups = self.surface.borrow_mut().scan_popups();

        self.canvases.borrow_mut().rebuild_from(canvas_scan);
        self.scrim.hide_immediate();

        match self.loader.primary() {
            Some(context) => {
                self.canvases.borrow_mut().apply_for_context(&context);
                let mut ui = self.ui.borrow_mut();
                ui.rescan_from(screens, popups);
                ui.show_screen_for_context(&context);
            }
            None => {
                debug!("No primary context at cold start");
                self.ui.borrow_mut().rescan_from(screens, popups);
            }
        }
    }

    //--- Bootstrap --------------------------------------------------------

    /// One-shot startup flow.
    ///
    /// No-op unless bootstrap is still pending and the loader's
    /// primary context is exactly the configured boot context. The
    /// catalog (when configured) is initialized leniently: a missing
    /// data source or a failed ingest is logged and the flow carries
    /// on. The boot surface then stays up for `min_hold` plus a
    /// uniformly sampled share of `extra_hold`, after which the flow
    /// advances to the lobby if auto-advance is enabled.
    pub async fn bootstrap(&self) {
        if self.state.borrow().boot_phase() != BootPhase::Pending {
            warn!("Bootstrap already ran, ignoring");
            return;
        }

        let primary = self.loader.primary();
        if primary.as_deref() != Some(self.plan.boot_context.as_str()) {
            debug!(
                "Primary context {:?} is not the boot context {:?}, bootstrap skipped",
                primary, self.plan.boot_context
            );
            self.state.borrow_mut().set_boot_phase(BootPhase::Complete);
            return;
        }

        info!("Bootstrap started in {:?}", self.plan.boot_context);
        self.state.borrow_mut().set_boot_phase(BootPhase::Running);
        let hold_start = Instant::now();

        self.initialize_catalog();

        let hold = self.sample_boot_hold();
        info!("Holding boot context for {:.2}s", hold.as_secs_f64());
        sleep_until(hold_start + hold).await;

        self.state.borrow_mut().set_boot_phase(BootPhase::Complete);
        info!("Bootstrap complete");

        if self.plan.auto_advance {
            let lobby = self.plan.lobby_context.clone();
            self.request_transition(&lobby).await;
        }
    }

    fn initialize_catalog(&self) {
        match &self.catalog {
            None => info!("No catalog service configured, skipping data initialization"),
            Some(catalog) => match catalog.initialize() {
                Ok(()) => info!("Catalog initialized"),
                Err(err @ CatalogError::SourceMissing(_)) => {
                    info!("Catalog data unavailable, skipping initialization: {}", err)
                }
                Err(err) => {
                    error!("Catalog initialization failed, continuing without it: {}", err)
                }
            },
        }
    }

    fn sample_boot_hold(&self) -> Duration {
        let extra_max = self.plan.extra_hold.as_secs_f64();
        let extra = if extra_max > 0.0 {
            rand::thread_rng().gen_range(0.0..=extra_max)
        } else {
            0.0
        };
        self.plan.min_hold + Duration::from_secs_f64(extra)
    }

    //--- Transitions ------------------------------------------------------

    /// Requests a guarded switch to another context.
    ///
    /// Dropped silently (at debug level) while another transition or
    /// the bootstrap hold is in flight; requests are never queued.
    /// An empty target is refused outright. On collaborator failure
    /// the veil is lowered, the flag is released, and the previous
    /// context stays active.
    pub async fn request_transition(&self, target: &str) {
        if target.trim().is_empty() {
            error!("Transition request with an empty target refused");
            return;
        }

        let Some(_guard) = TransitionGuard::acquire(&self.state) else {
            debug!("Transition to {:?} dropped, another flow is in flight", target);
            return;
        };

        info!("Transition to {:?} started", target);
        self.scrim.show();
        // One tick so the veil presents before the heavy work begins.
        self.tick.next().await;

        let request = self.classify(target);
        match request.mode() {
            TransitionMode::Replace => self.run_replace(&request).await,
            TransitionMode::AdditiveThenSwap => self.run_additive_swap(&request).await,
        }
    }

    /// Leaving the boot context keeps its surface alive under the
    /// veil until the destination is ready; everything else is a
    /// plain replacement.
    fn classify(&self, target: &str) -> TransitionRequest {
        let leaving_boot = self.loader.primary().as_deref()
            == Some(self.plan.boot_context.as_str())
            && target != self.plan.boot_context;
        let mode = if leaving_boot {
            TransitionMode::AdditiveThenSwap
        } else {
            TransitionMode::Replace
        };

        debug!("Transition to {:?} classified as {:?}", target, mode);
        TransitionRequest::new(target, mode)
    }

    async fn run_replace(&self, request: &TransitionRequest) {
        let target = request.target();

        let op = match self.loader.begin_load(target, LoadMode::Replace) {
            Ok(op) => op,
            Err(err) => {
                error!("Cannot begin loading {:?}: {}", target, err);
                self.scrim.hide();
                return;
            }
        };

        self.poll_to_threshold(&op).await;
        self.scrim.wait_min_visible().await;
        self.loader.finalize_activation(&op);
        self.poll_done(&op).await;

        self.apply_context(target);
        self.scrim.hide();
        info!("Transition to {:?} complete", target);
    }

    async fn run_additive_swap(&self, request: &TransitionRequest) {
        let target = request.target();
        let previous = self.loader.primary();

        let op = match self.loader.begin_load(target, LoadMode::Additive) {
            Ok(op) => op,
            Err(err) => {
                error!("Cannot begin loading {:?}: {}", target, err);
                self.scrim.hide();
                return;
            }
        };

        self.poll_to_threshold(&op).await;
        self.scrim.wait_min_visible().await;
        self.loader.finalize_activation(&op);
        self.poll_done(&op).await;

        if !self.loader.is_loaded(target) {
            error!("{:?} never reported loaded, staying on {:?}", target, previous);
            self.scrim.hide();
            return;
        }
        if !self.loader.set_primary(target) {
            error!(
                "Cannot make {:?} the primary context, staying on {:?}",
                target, previous
            );
            self.scrim.hide();
            return;
        }

        if let Some(previous) = previous {
            match self.loader.begin_unload(&previous) {
                Some(unload) => self.poll_done(&unload).await,
                None => warn!("Nothing to unload for former context {:?}", previous),
            }
        }

        self.apply_context(target);
        self.scrim.hide();
        info!("Transition to {:?} complete", target);
    }

    async fn poll_to_threshold(&self, op: &LoadOp) {
        loop {
            let progress = self.loader.progress(op);
            if progress >= FINALIZE_THRESHOLD {
                debug!("Load {:?} reached the activation threshold", op.target());
                return;
            }
            debug!("Load {:?} at {:.2}", op.target(), progress);
            self.tick.next().await;
        }
    }

    async fn poll_done(&self, op: &LoadOp) {
        while !self.loader.is_done(op) {
            self.tick.next().await;
        }
    }

    /// Post-switch application: fresh canvas scan, exclusivity for
    /// the new context, UI rescan, then the context's auto-shown
    /// screen. Runs only after the destination is fully active.
    fn apply_context(&self, target: &str) {
        let canvas_scan = self.surface.borrow_mut().scan_canvases();
        let screens = self.surface.borrow_mut().scan_screens();
        let popups = self.surface.borrow_mut().scan_popups();

        {
            let mut registry = self.canvases.borrow_mut();
            registry.rebuild_from(canvas_scan);
            registry.apply_for_context(target);
            registry.dump();
        }

        let mut ui = self.ui.borrow_mut();
        ui.rescan_from(screens, popups);
        ui.show_screen_for_context(target);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
