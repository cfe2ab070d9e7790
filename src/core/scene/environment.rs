//=========================================================================
// Scene Environment
//=========================================================================
//
// Seam between the scene controller and the engine that actually loads
// scenes and hosts view objects.
//
// Async loads report back through a LoadCompletion, a one-shot signal
// over a crossbeam channel, so an engine may finish loading on another
// thread. The controller polls the channel once per tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::rc::Rc;

use crossbeam_channel::Sender;
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::SharedView;

//=== LoadCompletion ======================================================

/// Payload of a load completion: the scene and the transition it answers.
pub(super) type LoadSignal = (String, u64);

/// One-shot signal an environment fires once a requested scene is active.
///
/// Carries the transition generation it was issued for, so a completion
/// from an earlier request of the same scene is recognized as stale.
/// `Send`, so it may be moved to a loader thread.
#[derive(Debug)]
pub struct LoadCompletion {
    scene: String,
    generation: u64,
    signal: Sender<LoadSignal>,
}

impl LoadCompletion {
    pub(super) fn new(
        scene: impl Into<String>,
        generation: u64,
        signal: Sender<LoadSignal>,
    ) -> Self {
        Self {
            scene: scene.into(),
            generation,
            signal,
        }
    }

    /// The scene this completion belongs to.
    pub fn scene(&self) -> &str {
        &self.scene
    }

    /// The transition this completion answers.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Signals that the scene finished loading.
    pub fn complete(self) {
        if self.signal.send((self.scene, self.generation)).is_err() {
            warn!("Scene load completed after the scene controller was dropped");
        }
    }
}

//=== SceneEnvironment Trait ==============================================

/// Engine primitives the scene controller depends on.
///
/// Only [`load_scene`](Self::load_scene) is required. An environment that
/// can load in the background overrides
/// [`supports_async_loading`](Self::supports_async_loading) and
/// [`load_scene_async`](Self::load_scene_async).
pub trait SceneEnvironment {
    /// Whether [`load_scene_async`](Self::load_scene_async) should be used.
    ///
    /// Queried at every load request.
    fn supports_async_loading(&self) -> bool {
        false
    }

    /// Loads the named scene before returning.
    fn load_scene(&mut self, scene: &str);

    /// Starts loading the named scene and fires `completion` when done.
    ///
    /// The default loads synchronously and completes immediately.
    fn load_scene_async(&mut self, scene: &str, completion: LoadCompletion) {
        self.load_scene(scene);
        completion.complete();
    }

    /// Finds an existing object named `view_name` in the active scene.
    fn find_view(&mut self, _view_name: &str) -> Option<SharedView> {
        None
    }

    /// Attaches a freshly created view to the active scene.
    fn attach_view(&mut self, _view_name: &str, _view: &SharedView) {}

    /// Best-effort hint to reclaim memory before a heavy load.
    fn reclaim_memory(&mut self) {}
}

//=== HeadlessEnvironment =================================================

/// Environment without an engine behind it.
///
/// Loads complete synchronously. Views attached to a scene stay findable
/// until another scene is loaded.
#[derive(Default)]
pub struct HeadlessEnvironment {
    active_scene: Option<String>,
    views: HashMap<String, SharedView>,
    loads: usize,
}

impl HeadlessEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently loaded scene.
    pub fn active_scene(&self) -> Option<&str> {
        self.active_scene.as_deref()
    }

    /// Number of scene loads performed.
    pub fn loads(&self) -> usize {
        self.loads
    }
}

impl SceneEnvironment for HeadlessEnvironment {
    fn load_scene(&mut self, scene: &str) {
        debug!("Headless load of scene {:?}", scene);
        self.views.clear();
        self.active_scene = Some(scene.to_string());
        self.loads += 1;
    }

    fn find_view(&mut self, view_name: &str) -> Option<SharedView> {
        self.views.get(view_name).map(Rc::clone)
    }

    fn attach_view(&mut self, view_name: &str, view: &SharedView) {
        self.views.insert(view_name.to_string(), Rc::clone(view));
    }
}

//=========================================================================
// Tests
//=========================================================================
