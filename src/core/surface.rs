//=========================================================================
// UI Surface Seam
//=========================================================================
//
// Outbound interface through which the core discovers the widget
// handles that exist in the currently loaded content: top-level
// canvases, screens, and popups.
//
// The core re-scans after every context change; providers should
// return whatever is alive right now and never cache handles from
// torn-down contexts.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::canvas::{CanvasKind, SharedCanvas};
use super::ui::{PopupKey, ScreenKey, SharedPopup, SharedScreen};

//=== UI Surface ==========================================================

/// Discovery provider for live UI handles.
///
/// `S` and `P` are the embedder's screen and popup identity types.
pub trait UiSurface<S: ScreenKey, P: PopupKey> {
    /// Top-level canvases currently alive, classified by kind.
    fn scan_canvases(&mut self) -> Vec<(CanvasKind, SharedCanvas)>;

    /// Screens currently alive, with their identities.
    fn scan_screens(&mut self) -> Vec<(S, SharedScreen)>;

    /// Popups currently alive, with their identities.
    fn scan_popups(&mut self) -> Vec<(P, SharedPopup)>;
}
