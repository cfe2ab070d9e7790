//=========================================================================
// Core Systems
//
// Building blocks owned by the framework context.
//
// Responsibilities:
// - Capability traits and the `Service` dispatch seam (`lifecycle`)
// - Scoped object tables with lifecycle sweeps (`registry`)
// - Deferred, type-routed command delivery (`command_bus`)
// - Command-driven scene transitions (`scene`)
// - Tick and time tracking for the framework scope (`frame_clock`)
//
// Notes:
// Everything here runs on the host's main thread. The only cross-thread
// hand-off is the scene load completion signal.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod command_bus;
pub mod frame_clock;
pub mod lifecycle;
pub mod registry;
pub mod scene;

//=== Public API ==========================================================

pub use command_bus::{CommandBus, CommandSender, Trigger};
pub use frame_clock::FrameClock;
pub use lifecycle::{Configurable, Destroyable, Initializable, Service, Updatable};
pub use registry::{ObjectRegistry, Shared};
pub use scene::{SceneController, SceneEnvironment, SceneView};
