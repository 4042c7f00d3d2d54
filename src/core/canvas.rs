//=========================================================================
// Canvas Exclusivity Registry
//=========================================================================
//
// Tracks the top-level canvas surfaces (one per context family plus
// the loading veil) and enforces that exactly one content canvas is
// visible at a time.
//
// Canvases are rediscovered from the UI surface on every context
// change. The registry holds at most one handle per kind; within one
// scan the first handle found for a kind wins and later duplicates are
// ignored with a warning.
//
// The Loading canvas is orthogonal to exclusivity: switching contexts
// never touches it, and it is driven solely by the scrim.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::rules::ContextMatcher;

//=== Canvas Kind =========================================================

/// Fixed classification of top-level canvas surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasKind {
    /// Boot / title surface.
    Boot,

    /// Lobby surface.
    Lobby,

    /// In-game surface.
    Game,

    /// Loading veil. Excluded from exclusivity.
    Loading,
}

impl CanvasKind {
    /// All kinds, in a stable order.
    pub const ALL: [CanvasKind; 4] = [
        CanvasKind::Boot,
        CanvasKind::Lobby,
        CanvasKind::Game,
        CanvasKind::Loading,
    ];

    /// True for kinds that participate in exclusivity.
    pub fn is_content(&self) -> bool {
        !matches!(self, CanvasKind::Loading)
    }
}

//=== Canvas Trait ========================================================

/// Capability interface for a top-level canvas surface.
///
/// Implemented by the embedder over whatever widget subtree backs the
/// canvas. All calls are synchronous and must not call back into the
/// engine.
pub trait Canvas {
    /// Shows or hides the whole surface.
    fn set_active(&mut self, active: bool);

    /// Restores the surface to a presentable state: re-enables its
    /// substructure and resets any residual fade to opaque and
    /// interactive.
    fn restore_presentation(&mut self);

    /// Sets the compositing order of the surface.
    fn set_layer_order(&mut self, order: i32);

    /// Makes the surface swallow or pass through pointer input.
    fn set_input_blocking(&mut self, blocking: bool);
}

/// Shared handle to a canvas implementation.
pub type SharedCanvas = Rc<RefCell<dyn Canvas>>;

//=== Canvas Registry =====================================================

/// Registry enforcing one visible content canvas at a time.
///
/// Rebuilt from a fresh surface scan after every context change, so
/// handles from torn-down contexts never linger.
pub struct CanvasRegistry {
    entries: HashMap<CanvasKind, SharedCanvas>,
    active_kind: Option<CanvasKind>,
    rules: ContextMatcher<CanvasKind>,
    base_order: i32,
    veil_order: i32,
}

impl CanvasRegistry {
    //--- Construction -----------------------------------------------------

    /// Creates an empty registry.
    ///
    /// `rules` resolve context names to the canvas kind to activate;
    /// `base_order` is applied to content canvases and `veil_order` to
    /// the Loading canvas.
    pub fn new(rules: ContextMatcher<CanvasKind>, base_order: i32, veil_order: i32) -> Self {
        Self {
            entries: HashMap::new(),
            active_kind: None,
            rules,
            base_order,
            veil_order,
        }
    }

    //--- Rebuild ----------------------------------------------------------

    /// Replaces all entries with the results of a fresh scan.
    ///
    /// The first handle per kind wins; later duplicates are ignored
    /// with a warning. Layer orders are re-applied to every surviving
    /// handle.
    pub fn rebuild_from(&mut self, scan: Vec<(CanvasKind, SharedCanvas)>) {
        self.entries.clear();
        self.active_kind = None;

        for (kind, canvas) in scan {
            if self.entries.contains_key(&kind) {
                warn!("Duplicate {:?} canvas in scan, keeping the first", kind);
                continue;
            }
            self.entries.insert(kind, canvas);
        }

        self.apply_layer_orders();

        let present: Vec<CanvasKind> = CanvasKind::ALL
            .into_iter()
            .filter(|kind| self.entries.contains_key(kind))
            .collect();
        debug!("Canvas registry rebuilt: {:?}", present);
    }

    /// Re-applies the configured compositing orders to every entry.
    pub fn apply_layer_orders(&mut self) {
        for (kind, canvas) in &self.entries {
            let order = if kind.is_content() {
                self.base_order
            } else {
                self.veil_order
            };
            canvas.borrow_mut().set_layer_order(order);
        }
    }

    //--- Exclusivity ------------------------------------------------------

    /// Activates exactly one content canvas and deactivates the rest.
    ///
    /// The activated canvas also gets its presentation restored, so a
    /// surface recycled from an earlier context never comes back faded
    /// or inert. The Loading canvas is never touched.
    pub fn set_exclusive(&mut self, kind: CanvasKind) {
        if !kind.is_content() {
            warn!("{:?} is not a content canvas, exclusivity unchanged", kind);
            return;
        }

        if !self.entries.contains_key(&kind) {
            warn!("No {:?} canvas registered", kind);
        }

        for candidate in CanvasKind::ALL {
            if !candidate.is_content() {
                continue;
            }
            if let Some(canvas) = self.entries.get(&candidate) {
                let mut canvas = canvas.borrow_mut();
                if candidate == kind {
                    canvas.set_active(true);
                    canvas.restore_presentation();
                } else {
                    canvas.set_active(false);
                }
            }
        }

        self.active_kind = self.entries.contains_key(&kind).then_some(kind);
        debug!("Canvas exclusivity set to {:?}", kind);
    }

    /// Resolves a context name through the rules and applies
    /// exclusivity for it.
    ///
    /// Returns `false` (leaving all canvases untouched) when no rule
    /// matches.
    pub fn apply_for_context(&mut self, context: &str) -> bool {
        match self.rules.resolve(context) {
            Some(kind) => {
                self.set_exclusive(kind);
                true
            }
            None => {
                warn!("No canvas rule matches context {:?}", context);
                false
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Handle to the canvas of the given kind, if registered.
    pub fn canvas(&self, kind: CanvasKind) -> Option<SharedCanvas> {
        self.entries.get(&kind).map(Rc::clone)
    }

    /// Kind activated by the last exclusivity change.
    pub fn active_kind(&self) -> Option<CanvasKind> {
        self.active_kind
    }

    /// Number of registered canvases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no canvases are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logs a summary of the current registry state.
    pub fn dump(&self) {
        let present: Vec<CanvasKind> = CanvasKind::ALL
            .into_iter()
            .filter(|kind| self.entries.contains_key(kind))
            .collect();
        debug!(
            "Canvas registry: {} entries {:?}, active: {:?}",
            self.entries.len(),
            present,
            self.active_kind
        );
    }
}

//=== Tests ===============================================================
