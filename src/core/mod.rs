//=========================================================================
// Core Orchestration Systems
//
// Module tree for the scene-flow core running on the single logic
// task.
//
// Responsibilities:
// - Coordinate context transitions (boot → lobby → game) exactly once
//   at a time, with a loading veil covering every switch
// - Track canvas exclusivity so precisely one content surface is
//   visible per context
// - Manage layered UI (screen stack, popup stack) across context
//   changes
// - Provide the outbound seams (content loader, catalog, UI surface)
//   the embedding application implements
//
// Notes:
// Everything here runs on one thread inside a tokio `LocalSet`; shared
// state is `Rc<RefCell<…>>` and no borrow is ever held across an await
// point. Inbound events arrive only through the director's intent
// channel, keeping the core isolated from the embedder's threads.
//
//=========================================================================

pub mod canvas;
pub mod catalog;
pub mod content;
pub mod rules;
pub mod scrim;
pub mod surface;
pub mod tick;
pub mod transition;
pub mod ui;

//=== Re-exports ==========================================================
//
// Flatten the types that cross module seams so internal code can write
// `crate::core::CanvasKind` instead of spelling the full path.
//
pub use canvas::{Canvas, CanvasKind, CanvasRegistry, SharedCanvas};
pub use catalog::{Catalog, CatalogError};
pub use content::{ContentLoader, LoadError, LoadMode, LoadOp, FINALIZE_THRESHOLD};
pub use rules::ContextMatcher;
pub use scrim::Scrim;
pub use surface::UiSurface;
pub use tick::TickClock;
pub use transition::{BootPhase, TransitionCoordinator, TransitionMode, TransitionState};
pub use ui::{Popup, PopupKey, Screen, ScreenKey, SharedPopup, SharedScreen, UiIntent, UiManager};

//=== TickControl =========================================================
//
// Defines control flow for the director's intent pump loop.
// Each drain pass signals either to continue or terminate the loop.
//
pub(crate) enum TickControl {
    Continue,
    Exit,
}
