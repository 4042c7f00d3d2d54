//=========================================================================
// Loading Scrim
//=========================================================================
//
// The full-viewport veil raised over every context transition so the
// old content is never seen tearing down and the new content is never
// seen half-built.
//
// Anti-flicker rule: a hide request never takes visible effect before
// the minimum-visible deadline computed when the veil was last shown.
// Hides are scheduled on a spawned task that sleeps out the remaining
// time; a fresh show cancels the pending task and recomputes the
// deadline.
//
// The veil surface is the Loading canvas, resolved through the canvas
// registry at call time. It is orthogonal to canvas exclusivity and
// is never touched by context switches.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, error};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

//=== Internal Dependencies ===============================================

use super::canvas::{CanvasKind, CanvasRegistry};

//=== Scrim State =========================================================

struct ScrimState {
    visible: bool,
    hide_deadline: Instant,
    pending_hide: Option<JoinHandle<()>>,
}

//=== Scrim ===============================================================

/// Loading veil with a minimum visible time.
///
/// Clones share the same state; the coordinator and the director each
/// hold one.
#[derive(Clone)]
pub struct Scrim {
    canvases: Rc<RefCell<CanvasRegistry>>,
    state: Rc<RefCell<ScrimState>>,
    min_visible: Duration,
    block_input: bool,
}

impl Scrim {
    //--- Construction -----------------------------------------------------

    /// Creates a hidden scrim over the given canvas registry.
    pub fn new(
        canvases: Rc<RefCell<CanvasRegistry>>,
        min_visible: Duration,
        block_input: bool,
    ) -> Self {
        Self {
            canvases,
            state: Rc::new(RefCell::new(ScrimState {
                visible: false,
                hide_deadline: Instant::now(),
                pending_hide: None,
            })),
            min_visible,
            block_input,
        }
    }

    //--- Show / Hide ------------------------------------------------------

    /// Raises the veil and restarts the minimum-visible window.
    ///
    /// Idempotent: showing an already visible veil cancels any pending
    /// hide and pushes the deadline out again. Without a registered
    /// Loading canvas this is a logged no-op and the veil state is
    /// left untouched.
    pub fn show(&self) {
        self.cancel_pending_hide();

        let Some(canvas) = self.canvases.borrow().canvas(CanvasKind::Loading) else {
            error!("No Loading canvas registered, cannot raise the veil");
            return;
        };

        {
            let mut state = self.state.borrow_mut();
            state.visible = true;
            state.hide_deadline = Instant::now() + self.min_visible;
        }

        // Reassert compositing orders so the veil sits above whatever
        // the registry currently holds.
        self.canvases.borrow_mut().apply_layer_orders();

        let mut canvas = canvas.borrow_mut();
        canvas.set_active(true);
        canvas.restore_presentation();
        canvas.set_input_blocking(self.block_input);

        debug!("Loading veil raised (min visible {:?})", self.min_visible);
    }

    /// Lowers the veil once the minimum-visible deadline has passed.
    ///
    /// Returns immediately; the actual hide happens on a spawned task
    /// after `max(0, deadline - now)`. Hiding an already hidden veil
    /// is a no-op.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio `LocalSet` on a
    /// current-thread runtime.
    pub fn hide(&self) {
        self.cancel_pending_hide();

        let deadline = {
            let state = self.state.borrow();
            if !state.visible {
                debug!("Veil already hidden, nothing to do");
                return;
            }
            state.hide_deadline
        };

        let state = Rc::clone(&self.state);
        let canvases = Rc::clone(&self.canvases);
        let task = tokio::task::spawn_local(async move {
            sleep_until(deadline).await;
            finish_hide(&state, &canvases);
        });

        self.state.borrow_mut().pending_hide = Some(task);
    }

    /// Lowers the veil right now, bypassing the minimum-visible rule.
    ///
    /// Also forces the Loading canvas off when the veil was never
    /// tracked visible, which is what clears a veil left active by the
    /// embedding content at cold start.
    pub fn hide_immediate(&self) {
        self.cancel_pending_hide();
        finish_hide(&self.state, &self.canvases);
    }

    /// Sleeps out whatever remains of the minimum-visible window.
    pub async fn wait_min_visible(&self) {
        let deadline = self.state.borrow().hide_deadline;
        sleep_until(deadline).await;
    }

    //--- Queries ----------------------------------------------------------

    /// True while the veil is raised.
    pub fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    //--- Internal ---------------------------------------------------------

    fn cancel_pending_hide(&self) {
        if let Some(task) = self.state.borrow_mut().pending_hide.take() {
            task.abort();
        }
    }
}

//=== Hide Completion =====================================================
//
// Shared by the debounced path (on the spawned task) and the immediate
// path. Unconditional: the debounced task only exists while its hide
// is still wanted, and the immediate path must clear the canvas even
// when the veil was never tracked visible.
//
fn finish_hide(state: &Rc<RefCell<ScrimState>>, canvases: &Rc<RefCell<CanvasRegistry>>) {
    {
        let mut state = state.borrow_mut();
        state.visible = false;
        state.pending_hide = None;
    }

    match canvases.borrow().canvas(CanvasKind::Loading) {
        Some(canvas) => {
            let mut canvas = canvas.borrow_mut();
            canvas.set_input_blocking(false);
            canvas.set_active(false);
            debug!("Loading veil lowered");
        }
        None => debug!("No Loading canvas registered, veil state cleared only"),
    }
}

//=== Tests ===============================================================
