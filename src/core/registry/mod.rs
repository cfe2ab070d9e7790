//=========================================================================
// Object Registry
//=========================================================================
//
// Scoped service container with capability-based lifecycle dispatch.
//
// Architecture:
//   ObjectRegistry (one per scope)
//     ├─ singletons: HashMap<TypeId, Slot>
//     ├─ transients: HashMap<TypeId, HashMap<String, Slot>>
//     └─ index: CapabilityIndex (update / initialize / configure / destroy)
//
// Flow:
//   register → classify → file → (catch-up if initialized)
//   initialize_scene_objects() → initialize all → configure all
//   update(dt) → update all (once initialized)
//   destroy() → destroy all → clear tables
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Module Declarations =================================================

mod capability_index;
mod object_registry;

//=== Public API ==========================================================

pub use capability_index::CapabilityCounts;
pub use object_registry::ObjectRegistry;

/// Shared handle to an object owned by a scope.
///
/// Scopes are driven from a single logical thread, so handles use
/// `Rc<RefCell<_>>`.
pub type Shared<T> = Rc<RefCell<T>>;

//=== SingletonReplacement ================================================

/// What happens to a singleton when another instance of its type is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingletonReplacement {
    /// The previous instance leaves the scope without being destroyed.
    #[default]
    Silent,

    /// The previous instance's destroy capability runs before it leaves.
    DestroyPrevious,
}

//=== RegistryError =======================================================

/// Errors raised by registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A transient with the same type and name is already registered.
    #[error("duplicate transient key: {type_name} named {name:?}")]
    DuplicateKey {
        type_name: &'static str,
        name: String,
    },
}
