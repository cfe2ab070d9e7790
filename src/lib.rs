//=========================================================================
// Aetheric Framework: Library Root
//
// This crate defines the public API surface of the Aetheric Framework.
//
// Responsibilities:
// - Expose the application context (`Framework`) and its builder
// - Expose the scoped object registry, command bus and scene controller
//   for hosts that wire the pieces themselves
// - Keep engine specifics behind the `SceneEnvironment` seam
//
// Typical usage:
// ```no_run
// use aetheric_framework::prelude::*;
//
// fn main() -> Result<(), FrameworkError> {
//     let mut framework = FrameworkBuilder::new()
//         .with_initial_scene("Menu")
//         .build(HeadlessEnvironment::new())
//         .init(|_framework| {});
//
//     loop {
//         framework.tick(1.0 / 60.0)?;
//     }
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the framework building blocks (registry, command bus,
// scenes). It is exposed publicly for hosts that assemble their own
// context, but normal application code will mostly use `Framework`.
//
pub mod core;

// `config` holds the serializable framework options.
pub mod config;

// `error` aggregates the per-module errors.
pub mod error;

// `prelude` re-exports the commonly used types and traits.
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `framework` defines the application context and its builder.
//
mod framework;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the context and its builder as the main entry points.
//
pub use error::FrameworkError;
pub use framework::{Framework, FrameworkBuilder};
