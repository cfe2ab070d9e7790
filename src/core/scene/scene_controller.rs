//=========================================================================
// Scene Controller
//=========================================================================
//
// State machine sequencing scene teardown, engine load, view resolution
// and scene object initialization.
//
// The controller reacts to exactly two commands (ChangeScene and
// SceneLoaded) plus load-completion signals from the environment. It never
// blocks: a load request returns immediately and the controller resumes
// when the completion is polled on a later tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::environment::LoadSignal;
use super::{
    ChangeScene, LoadCompletion, SceneEnvironment, SceneError, SceneLoaded, ViewCatalog,
};
use crate::core::command_bus::{CommandBus, CommandSender};
use crate::core::registry::{ObjectRegistry, SingletonReplacement};

//=== SceneState ==========================================================

/// Where the controller is in the scene transition cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SceneState {
    /// No scene has been requested yet.
    #[default]
    Idle,

    /// A load was requested and the engine has not finished it.
    AwaitingLoad { scene: String },

    /// The scene is loaded and its view was pushed with `SceneLoaded`.
    AwaitingView { scene: String },

    /// The view and the scene objects are initialized.
    Active { scene: String },
}

//=== SceneSettings =======================================================

/// Controller knobs, usually taken from the framework options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSettings {
    /// Appended to the scene name to form the view name.
    pub view_suffix: String,

    /// Whether to hint the environment to reclaim memory before loading.
    pub reclaim_memory_before_load: bool,

    /// Replacement policy of each per-scene scope.
    pub singleton_replacement: SingletonReplacement,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            view_suffix: "SceneView".to_string(),
            reclaim_memory_before_load: true,
            singleton_replacement: SingletonReplacement::default(),
        }
    }
}

//=== SceneController =====================================================

/// Drives scene transitions from commands.
///
/// # Transition Cycle
///
/// 1. [`ChangeScene`]: destroys the current scene scope, hints memory
///    reclamation, then requests the load (async if the environment
///    supports it)
/// 2. Load completion: finds `<scene><suffix>` in the environment or
///    creates it from the [`ViewCatalog`], then pushes [`SceneLoaded`]
/// 3. [`SceneLoaded`]: the view populates the fresh scene scope, the scope
///    is initialized and the scene becomes active
///
/// Every `ChangeScene` starts a new transition generation. Load completions
/// and `SceneLoaded` commands carry the generation they answer and are
/// ignored once a newer transition has started, even for the same scene.
pub struct SceneController {
    state: SceneState,
    target: Option<String>,
    generation: u64,
    environment: Box<dyn SceneEnvironment>,
    catalog: ViewCatalog,
    commands: CommandSender,
    completion_tx: Sender<LoadSignal>,
    completion_rx: Receiver<LoadSignal>,
    scope: ObjectRegistry,
    settings: SceneSettings,
}

impl SceneController {
    //--- Construction -----------------------------------------------------

    /// Creates an idle controller that pushes its commands through `commands`.
    pub fn new(
        environment: Box<dyn SceneEnvironment>,
        catalog: ViewCatalog,
        commands: CommandSender,
        settings: SceneSettings,
    ) -> Self {
        let (completion_tx, completion_rx) = unbounded();
        Self {
            state: SceneState::Idle,
            target: None,
            generation: 0,
            environment,
            catalog,
            commands,
            completion_tx,
            completion_rx,
            scope: ObjectRegistry::with_replacement(settings.singleton_replacement),
            settings,
        }
    }

    /// Wires the controller into `bus` as the handler of [`ChangeScene`]
    /// and [`SceneLoaded`], returning the shared controller.
    pub fn install(self, bus: &mut CommandBus) -> Rc<RefCell<Self>> {
        let controller = Rc::new(RefCell::new(self));

        let handle = Rc::clone(&controller);
        bus.register_handler(move |command: &ChangeScene| {
            handle.borrow_mut().change_scene(&command.scene);
        });

        let handle = Rc::clone(&controller);
        bus.register_handler(move |command: &SceneLoaded| {
            handle.borrow_mut().scene_loaded(command);
        });

        controller
    }

    //--- Transitions ------------------------------------------------------

    /// Begins a transition to `scene`.
    pub fn change_scene(&mut self, scene: &str) {
        info!("Changing scene to {:?}", scene);

        self.teardown_scope();
        self.generation += 1;
        self.state = SceneState::AwaitingLoad {
            scene: scene.to_string(),
        };
        self.target = Some(scene.to_string());

        if self.settings.reclaim_memory_before_load {
            self.environment.reclaim_memory();
        }

        let completion = LoadCompletion::new(scene, self.generation, self.completion_tx.clone());
        if self.environment.supports_async_loading() {
            debug!("Requesting async load of {:?}", scene);
            self.environment.load_scene_async(scene, completion);
        } else {
            debug!("Loading {:?} synchronously", scene);
            self.environment.load_scene(scene);
            completion.complete();
        }
    }

    /// Handles every load completion received since the last poll.
    ///
    /// Returns the number of completions that resolved a view.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownView`] if the loaded scene has no view
    /// and the catalog cannot create one.
    pub fn poll_load_completions(&mut self) -> Result<usize, SceneError> {
        let mut resolved = 0;
        while let Ok((scene, generation)) = self.completion_rx.try_recv() {
            if self.resolve_view(scene, generation)? {
                resolved += 1;
            }
        }
        Ok(resolved)
    }

    /// Initializes the loaded view and the scene objects, making the scene active.
    pub fn scene_loaded(&mut self, loaded: &SceneLoaded) {
        match &self.state {
            SceneState::AwaitingView { scene }
                if *scene == loaded.scene && loaded.generation == self.generation => {}
            state => {
                warn!(
                    "Ignoring SceneLoaded for {:?} (transition {}) in state {:?}",
                    loaded.scene, loaded.generation, state
                );
                return;
            }
        }

        loaded.view.borrow_mut().initialize(&mut self.scope);
        self.scope.initialize_scene_objects();

        info!("Scene {:?} active", loaded.scene);
        self.state = SceneState::Active {
            scene: loaded.scene.clone(),
        };
    }

    //--- Per-frame --------------------------------------------------------

    /// Updates the per-scene scope.
    pub fn update(&mut self, delta_time: f32) {
        self.scope.update(delta_time);
    }

    /// Destroys the per-scene scope and returns to idle.
    pub fn shutdown(&mut self) {
        self.teardown_scope();
        self.state = SceneState::Idle;
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Returns true once the current scene's objects are initialized.
    pub fn is_scene_initialized(&self) -> bool {
        matches!(self.state, SceneState::Active { .. })
    }

    /// The scene most recently requested with [`ChangeScene`].
    pub fn transition_target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Number of transitions started so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The scene currently active, if any.
    pub fn active_scene(&self) -> Option<&str> {
        match &self.state {
            SceneState::Active { scene } => Some(scene),
            _ => None,
        }
    }

    /// The per-scene scope.
    pub fn scene_scope(&self) -> &ObjectRegistry {
        &self.scope
    }

    pub fn scene_scope_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.scope
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    //--- Internal Helpers -------------------------------------------------

    /// Returns false if the completion was stale and ignored.
    fn resolve_view(&mut self, scene: String, generation: u64) -> Result<bool, SceneError> {
        match &self.state {
            SceneState::AwaitingLoad { scene: pending }
                if *pending == scene && generation == self.generation => {}
            state => {
                warn!(
                    "Ignoring load completion for {:?} (transition {}) in state {:?}",
                    scene, generation, state
                );
                return Ok(false);
            }
        }

        let view_name = format!("{}{}", scene, self.settings.view_suffix);

        let view = match self.environment.find_view(&view_name) {
            Some(view) => {
                debug!("Found existing view {}", view_name);
                view
            }
            None => {
                let Some(view) = self.catalog.instantiate(&view_name) else {
                    error!("Scene {:?} has no view and no factory for {}", scene, view_name);
                    return Err(SceneError::UnknownView { view: view_name });
                };
                debug!("Created view {}", view_name);
                self.environment.attach_view(&view_name, &view);
                view
            }
        };

        self.state = SceneState::AwaitingView {
            scene: scene.clone(),
        };
        self.commands.push(SceneLoaded {
            scene,
            view,
            generation,
        });
        Ok(true)
    }

    fn teardown_scope(&mut self) {
        let fresh = ObjectRegistry::with_replacement(self.settings.singleton_replacement);
        let mut previous = std::mem::replace(&mut self.scope, fresh);

        let populated = previous.singleton_count() + previous.transient_count() > 0;
        if populated || previous.is_initialized() {
            previous.destroy();
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
