//=========================================================================
// Transition Types
//=========================================================================
//
// Shared state and value types for the context-transition flow.
//
// At most one transition may be in flight, and none may start while
// bootstrap is holding the boot context. Both conditions live in a
// single shared `TransitionState`; the in-flight flag is held through
// an RAII guard so it clears on every exit path, including failures
// and task cancellation.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== Submodules ==========================================================

mod coordinator;

pub use coordinator::TransitionCoordinator;
pub(crate) use coordinator::BootPlan;

//=== Transition Mode =====================================================

/// Load protocol chosen for a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionMode {
    /// Load the target as a full replacement of the current context.
    Replace,

    /// Load the target alongside the current context, swap primacy,
    /// then unload the old context. Used when leaving the boot
    /// context, whose surface must stay alive under the veil until
    /// the destination is ready.
    AdditiveThenSwap,
}

//=== Transition Request ==================================================

/// A classified transition, handed to exactly one load protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    target: String,
    mode: TransitionMode,
}

impl TransitionRequest {
    pub(crate) fn new(target: impl Into<String>, mode: TransitionMode) -> Self {
        Self {
            target: target.into(),
            mode,
        }
    }

    /// Destination context name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Protocol selected for this transition.
    pub fn mode(&self) -> TransitionMode {
        self.mode
    }
}

//=== Boot Phase ==========================================================

/// Progress of the one-shot bootstrap flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPhase {
    /// Bootstrap has not run yet.
    Pending,

    /// Bootstrap is holding the boot context; transition requests are
    /// dropped.
    Running,

    /// Bootstrap finished (or was skipped for not starting in the
    /// boot context).
    Complete,
}

//=== Transition State ====================================================

/// Shared flow state: boot phase plus the single in-flight flag.
#[derive(Debug)]
pub struct TransitionState {
    boot: BootPhase,
    transitioning: bool,
}

impl TransitionState {
    pub fn new() -> Self {
        Self {
            boot: BootPhase::Pending,
            transitioning: false,
        }
    }

    /// Current bootstrap phase.
    pub fn boot_phase(&self) -> BootPhase {
        self.boot
    }

    /// True while a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub(crate) fn set_boot_phase(&mut self, phase: BootPhase) {
        self.boot = phase;
    }
}

impl Default for TransitionState {
    fn default() -> Self {
        Self::new()
    }
}

//=== Transition Guard ====================================================

/// RAII claim on the in-flight flag.
///
/// Acquiring fails while another transition holds the flag or while
/// bootstrap is running. Dropping the guard clears the flag, so no
/// exit path can leave the flow wedged.
pub(crate) struct TransitionGuard {
    state: Rc<RefCell<TransitionState>>,
}

impl TransitionGuard {
    pub fn acquire(state: &Rc<RefCell<TransitionState>>) -> Option<Self> {
        {
            let mut flow = state.borrow_mut();
            if flow.transitioning || flow.boot == BootPhase::Running {
                return None;
            }
            flow.transitioning = true;
        }

        Some(Self {
            state: Rc::clone(state),
        })
    }
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        self.state.borrow_mut().transitioning = false;
    }
}

//=== Tests ===============================================================
