//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_framework::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Framework context
pub use crate::config::{ConfigError, FrameworkOptions};
pub use crate::error::FrameworkError;
pub use crate::framework::{Framework, FrameworkBuilder};

// Lifecycle capabilities
pub use crate::core::lifecycle::{Configurable, Destroyable, Initializable, Service, Updatable};

// Scoped registry
pub use crate::core::registry::{ObjectRegistry, RegistryError, Shared, SingletonReplacement};

// Command bus
pub use crate::core::command_bus::{
    Command, CommandBus, CommandBusError, CommandSender, DrainReport, Trigger, UnhandledCommands,
};

// Scene system
pub use crate::core::scene::{
    ChangeScene, HeadlessEnvironment, LoadCompletion, SceneController, SceneEnvironment,
    SceneError, SceneLoaded, SceneSettings, SceneState, SceneView, SharedView, ViewCatalog,
};

// Built-in services
pub use crate::core::frame_clock::FrameClock;
