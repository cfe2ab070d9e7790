//=========================================================================
// Scene System
//=========================================================================
//
// Command-driven scene transitions.
//
// Architecture:
//   SceneController
//     ├─ state: SceneState (Idle → AwaitingLoad → AwaitingView → Active)
//     ├─ environment: Box<dyn SceneEnvironment> (engine seam)
//     ├─ catalog: ViewCatalog (view factories by name)
//     └─ scope: ObjectRegistry (per-scene objects)
//
// Flow:
//   ChangeScene → teardown scope → load (sync or async)
//   load completion → resolve/create view → push SceneLoaded
//   SceneLoaded → view.initialize(scope) → scope.initialize_scene_objects()
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::registry::ObjectRegistry;

//=== Module Declarations =================================================

mod environment;
mod scene_controller;
mod view_catalog;

//=== Public API ==========================================================

pub use environment::{HeadlessEnvironment, LoadCompletion, SceneEnvironment};
pub use scene_controller::{SceneController, SceneSettings, SceneState};
pub use view_catalog::ViewCatalog;

//=== SceneView Trait =====================================================

/// Per-scene entry object, found or created when a scene finishes loading.
///
/// The view populates the fresh per-scene scope; the controller then runs
/// the scope's two-phase initialization.
///
/// ```rust
/// # use aetheric_framework::prelude::*;
/// struct Enemy;
/// aetheric_framework::service!(Enemy);
///
/// struct GameSceneView;
///
/// impl SceneView for GameSceneView {
///     fn initialize(&mut self, scope: &mut ObjectRegistry) {
///         scope.register_transient("grunt", Enemy).unwrap();
///     }
/// }
/// ```
pub trait SceneView {
    fn initialize(&mut self, scope: &mut ObjectRegistry);
}

/// Shared handle to a scene view.
pub type SharedView = Rc<RefCell<dyn SceneView>>;

//=== Commands ============================================================

/// Requests a transition to the named scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeScene {
    pub scene: String,
}

impl ChangeScene {
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
        }
    }
}

/// Announces that a scene finished loading and its view is attached.
#[derive(Clone)]
pub struct SceneLoaded {
    pub scene: String,
    pub view: SharedView,

    /// Transition generation the load answered.
    pub generation: u64,
}

impl fmt::Debug for SceneLoaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneLoaded")
            .field("scene", &self.scene)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

//=== SceneError ==========================================================

/// Fatal scene configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// No view exists in the scene and no factory is registered for it.
    #[error("no scene view named {view:?} exists or can be created")]
    UnknownView { view: String },
}
