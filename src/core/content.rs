//=========================================================================
// Content Loader Seam
//=========================================================================
//
// Outbound interface to the load substrate that owns the heavy content
// units (worlds, scenes, bundles). The core never touches content
// directly; it begins loads, polls progress, releases activation, and
// polls completion through this trait.
//
// Progress contract: while a load is in flight, `progress` reports a
// value in [0, FINALIZE_THRESHOLD] and parks at the threshold once all
// work short of activation is done. Activation is withheld until the
// core calls `finalize_activation`, which is what lets the coordinator
// keep the veil up for its minimum visible time before the switch.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::rc::Rc;

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Constants ===========================================================

/// Progress value at which a pending load parks until activation is
/// released.
pub const FINALIZE_THRESHOLD: f32 = 0.9;

//=== Load Mode ===========================================================

/// How a load integrates with the currently active content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadMode {
    /// The new content replaces everything currently active.
    Replace,

    /// The new content loads alongside the current content; the caller
    /// swaps primacy and unloads the old content afterwards.
    Additive,
}

//=== Load Operation ======================================================

/// Handle to an in-flight load or unload operation.
///
/// Returned by [`ContentLoader::begin_load`] and
/// [`ContentLoader::begin_unload`] and passed back into the polling
/// calls. The loader keys its internal bookkeeping by target name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOp {
    target: String,
}

impl LoadOp {
    /// Creates a handle for the given target.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// The content target this operation concerns.
    pub fn target(&self) -> &str {
        &self.target
    }
}

//=== Load Error ==========================================================

/// Reasons the load substrate can refuse to begin an operation.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The target name does not exist in the substrate.
    #[error("unknown content target {0:?}")]
    UnknownTarget(String),

    /// The target is already loaded and cannot be loaded again.
    #[error("content target {0:?} is already loaded")]
    AlreadyLoaded(String),

    /// The substrate refused the request for its own reasons.
    #[error("load substrate rejected {target:?}: {reason}")]
    Rejected {
        /// The refused target.
        target: String,
        /// Substrate-provided explanation.
        reason: String,
    },
}

//=== Content Loader ======================================================

/// Interface to the content-load substrate.
///
/// Implementations track loaded targets and which one is the primary
/// (active) context. All calls are synchronous and non-blocking; the
/// core drives long operations by polling once per tick.
pub trait ContentLoader {
    /// Begins loading a target. Activation must be withheld until
    /// [`finalize_activation`](ContentLoader::finalize_activation).
    fn begin_load(&self, target: &str, mode: LoadMode) -> Result<LoadOp, LoadError>;

    /// Current progress of an operation, in `[0, 1)` while activation
    /// is withheld, parking at [`FINALIZE_THRESHOLD`] once all work
    /// short of activation is done. Completion is reported through
    /// [`is_done`](ContentLoader::is_done), not through this value.
    fn progress(&self, op: &LoadOp) -> f32;

    /// Releases activation for a load parked at the threshold.
    fn finalize_activation(&self, op: &LoadOp);

    /// True once an operation has fully completed.
    fn is_done(&self, op: &LoadOp) -> bool;

    /// Begins unloading a target. Returns `None` when there is nothing
    /// to unload.
    fn begin_unload(&self, target: &str) -> Option<LoadOp>;

    /// Designates a loaded target as the primary context. Returns
    /// `false` when the target is not in a state that allows it.
    fn set_primary(&self, target: &str) -> bool;

    /// True when the target is currently loaded (primary or not).
    fn is_loaded(&self, target: &str) -> bool;

    /// Name of the current primary context, if any.
    fn primary(&self) -> Option<String>;
}

/// Shared handles forward to the underlying loader, so an embedder
/// can keep talking to a loader it handed to the director.
impl<T: ContentLoader + ?Sized> ContentLoader for Rc<T> {
    fn begin_load(&self, target: &str, mode: LoadMode) -> Result<LoadOp, LoadError> {
        (**self).begin_load(target, mode)
    }

    fn progress(&self, op: &LoadOp) -> f32 {
        (**self).progress(op)
    }

    fn finalize_activation(&self, op: &LoadOp) {
        (**self).finalize_activation(op)
    }

    fn is_done(&self, op: &LoadOp) -> bool {
        (**self).is_done(op)
    }

    fn begin_unload(&self, target: &str) -> Option<LoadOp> {
        (**self).begin_unload(target)
    }

    fn set_primary(&self, target: &str) -> bool {
        (**self).set_primary(target)
    }

    fn is_loaded(&self, target: &str) -> bool {
        (**self).is_loaded(target)
    }

    fn primary(&self) -> Option<String> {
        (**self).primary()
    }
}

//=== Tests ===============================================================
