//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use proscenium::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Director facade
pub use crate::director::{Director, DirectorBuilder};

// Content seam
pub use crate::core::content::{ContentLoader, LoadError, LoadMode, LoadOp, FINALIZE_THRESHOLD};

// Catalog seam
pub use crate::core::catalog::{Catalog, CatalogError};

// Canvas system
pub use crate::core::canvas::{Canvas, CanvasKind, SharedCanvas};

// Surface scanning
pub use crate::core::surface::UiSurface;

// Layered UI
pub use crate::core::ui::{
    Popup, PopupKey, Screen, ScreenKey, SharedPopup, SharedScreen, UiIntent,
};

// Flow state
pub use crate::core::transition::{BootPhase, TransitionMode};
