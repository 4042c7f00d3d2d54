//=========================================================================
// Proscenium Library Root
//
// This crate defines the public API surface of Proscenium, a
// scene-flow orchestration engine for game clients.
//
// Responsibilities:
// - Expose the high-level flow facade (`Director`)
// - Keep the orchestration internals reachable for engine-level
//   extensibility without making them the primary surface
// - Provide clean separation between the facade and the lower-level
//   systems (transitions, canvases, layered UI)
//
// Typical usage:
// ```no_run
// use proscenium::prelude::*;
//
// let director = DirectorBuilder::new(my_loader, my_surface).build();
// tokio::task::LocalSet::new().run_until(director.run()).await;
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the flow systems (transition coordinator, loading
// veil, canvas registry, layered UI stacks) and the outbound seams the
// embedding application implements. It is exposed publicly for
// extensibility, but normal application code will mostly use the
// top-level `Director` facade.
//
pub mod core;

pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `director` defines the main entry point and wiring logic.
//
mod director;

#[cfg(test)]
pub(crate) mod test_support;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the facade as the main entry point for applications, so
// users can simply `use proscenium::DirectorBuilder;` without knowing
// the internal module structure.
//
pub use director::{Director, DirectorBuilder};
