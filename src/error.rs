//=========================================================================
// Framework Error
//=========================================================================
//
// Aggregates the per-module errors surfaced to the host.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::config::ConfigError;
use crate::core::command_bus::CommandBusError;
use crate::core::registry::RegistryError;
use crate::core::scene::SceneError;

//=========================================================================

/// Any error the framework can return to its host.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Commands(#[from] CommandBusError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
