//=========================================================================
// Aetheric Framework
//
// Application context and host-facing entry point.
//
// Architecture:
// ```text
//     FrameworkBuilder  ──build(env)──>  Framework  ──tick(dt)──> [per frame]
//         │                                │
//         ├─ with_options()                ├─ framework scope (FrameClock, ...)
//         ├─ with_initial_scene()          ├─ globals scope
//         └─ with_view()                   ├─ CommandBus
//                                          └─ SceneController (wired into bus)
// ```
//
// There is no process-wide instance: the host owns the Framework and
// passes it (or pieces of it) to whatever needs access.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

use log::info;

//=== Internal Dependencies ===============================================

use crate::config::FrameworkOptions;
use crate::core::command_bus::{CommandBus, CommandSender, DrainReport};
use crate::core::frame_clock::FrameClock;
use crate::core::registry::ObjectRegistry;
use crate::core::scene::{
    ChangeScene, SceneController, SceneEnvironment, SceneState, SceneView, ViewCatalog,
};
use crate::error::FrameworkError;

//=== FrameworkBuilder ====================================================

/// Builder for configuring and constructing a [`Framework`].
///
/// # Default Values
///
/// - **Options**: [`FrameworkOptions::default`]
/// - **Views**: none registered
///
/// # Examples
///
/// ```rust
/// use aetheric_framework::prelude::*;
///
/// struct GameSceneView;
/// impl SceneView for GameSceneView {
///     fn initialize(&mut self, _scope: &mut ObjectRegistry) {}
/// }
///
/// let mut framework = FrameworkBuilder::new()
///     .with_initial_scene("Game")
///     .with_view("GameSceneView", || GameSceneView)
///     .build(HeadlessEnvironment::new())
///     .init(|_framework| {});
///
/// framework.tick(0.016).unwrap(); // ChangeScene → load → view resolved
/// framework.tick(0.016).unwrap(); // SceneLoaded → scene objects initialized
/// assert!(framework.is_scene_initialized());
/// ```
pub struct FrameworkBuilder {
    options: FrameworkOptions,
    catalog: ViewCatalog,
}

impl FrameworkBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            options: FrameworkOptions::default(),
            catalog: ViewCatalog::new(),
        }
    }

    /// Replaces all options.
    pub fn with_options(mut self, options: FrameworkOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the scene requested as soon as the framework is built.
    ///
    /// # Panics
    ///
    /// Panics if `scene` is empty.
    pub fn with_initial_scene(mut self, scene: impl Into<String>) -> Self {
        let scene = scene.into();
        assert!(!scene.is_empty(), "Initial scene name must not be empty");
        self.options.initial_scene = Some(scene);
        self
    }

    /// Registers the factory used when a loaded scene lacks the view
    /// named `view_name`.
    ///
    /// # Panics
    ///
    /// Panics if `view_name` is empty.
    pub fn with_view<V, F>(mut self, view_name: impl Into<String>, factory: F) -> Self
    where
        V: SceneView + 'static,
        F: Fn() -> V + 'static,
    {
        let view_name = view_name.into();
        assert!(!view_name.is_empty(), "View name must not be empty");
        self.catalog.register(view_name, factory);
        self
    }

    /// Builds the framework around the engine's scene environment.
    ///
    /// Creates the framework and globals scopes, the command bus, and wires
    /// the scene controller into the bus. Registers a [`FrameClock`] in the
    /// framework scope. Pushes `ChangeScene` for the initial scene, if any.
    pub fn build<E>(self, environment: E) -> Framework
    where
        E: SceneEnvironment + 'static,
    {
        let options = self.options;
        info!(
            "Building framework (initial scene: {:?}, {} views)",
            options.initial_scene,
            self.catalog.len()
        );

        let mut bus = CommandBus::with_unhandled(options.unhandled_commands);
        let scenes = SceneController::new(
            Box::new(environment),
            self.catalog,
            bus.sender(),
            options.scene_settings(),
        )
        .install(&mut bus);

        let mut framework_scope = ObjectRegistry::with_replacement(options.singleton_replacement);
        framework_scope.register_singleton(FrameClock::new());

        if let Some(scene) = &options.initial_scene {
            bus.push(ChangeScene::new(scene.clone()));
        }

        Framework {
            framework_scope,
            globals: ObjectRegistry::with_replacement(options.singleton_replacement),
            bus,
            scenes,
            options,
        }
    }
}

impl Default for FrameworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Framework ===========================================================

/// The application context.
///
/// Owns the long-lived scopes, the command bus and the scene controller.
/// The host calls [`tick`](Self::tick) once per frame.
pub struct Framework {
    options: FrameworkOptions,
    framework_scope: ObjectRegistry,
    globals: ObjectRegistry,
    bus: CommandBus,
    scenes: Rc<RefCell<SceneController>>,
}

impl Framework {
    //--- Initialization ---------------------------------------------------

    /// Runs `init_fn` to register services, then initializes the framework
    /// and globals scopes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use aetheric_framework::prelude::*;
    /// struct Settings { volume: f32 }
    /// aetheric_framework::service!(Settings);
    ///
    /// let framework = FrameworkBuilder::new()
    ///     .build(HeadlessEnvironment::new())
    ///     .init(|framework| {
    ///         framework.globals_mut().register_singleton(Settings { volume: 0.8 });
    ///     });
    ///
    /// assert!(framework.globals().is_initialized());
    /// ```
    pub fn init<F>(mut self, init_fn: F) -> Self
    where
        F: FnOnce(&mut Framework),
    {
        info!("Initializing framework scopes");

        init_fn(&mut self);
        self.framework_scope.initialize_scene_objects();
        self.globals.initialize_scene_objects();

        info!("Framework initialization complete");
        self
    }

    //--- Execution --------------------------------------------------------

    /// Advances the framework by one host frame.
    ///
    /// # Processing Pipeline
    ///
    /// 1. **Command Drain**: delivers every due command
    /// 2. **Scene Loads**: resumes transitions whose load completed
    /// 3. **Scope Updates**: framework scope, globals, then the scene scope
    ///
    /// # Errors
    ///
    /// Returns an error if the drain reports unhandled commands under
    /// [`UnhandledCommands::Error`](crate::core::command_bus::UnhandledCommands::Error)
    /// or if a loaded scene has no resolvable view. Every step still runs
    /// before the error is returned; the drain error takes precedence.
    pub fn tick(&mut self, delta_time: f32) -> Result<DrainReport, FrameworkError> {
        //--- Step 1: Drain commands ---------------------------------------
        let drained = self.bus.process(delta_time);

        //--- Step 2: Resume scene loads -----------------------------------
        let polled = self.scenes.borrow_mut().poll_load_completions();

        //--- Step 3: Update scopes ----------------------------------------
        self.framework_scope.update(delta_time);
        self.globals.update(delta_time);
        self.scenes.borrow_mut().update(delta_time);

        let report = drained?;
        polled?;
        Ok(report)
    }

    /// Requests a transition to `scene` on the next drain.
    pub fn change_scene(&self, scene: impl Into<String>) {
        self.bus.push(ChangeScene::new(scene));
    }

    /// Tears down the scene, globals and framework scopes, in that order.
    pub fn shutdown(mut self) {
        info!("Shutting down framework");

        self.scenes.borrow_mut().shutdown();
        self.globals.destroy();
        self.framework_scope.destroy();

        info!("Framework shutdown complete");
    }

    //--- Accessors --------------------------------------------------------

    pub fn options(&self) -> &FrameworkOptions {
        &self.options
    }

    /// Scope for framework-level singletons that persist across scenes.
    pub fn framework_scope(&self) -> &ObjectRegistry {
        &self.framework_scope
    }

    pub fn framework_scope_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.framework_scope
    }

    /// Scope for application-chosen long-lived state.
    pub fn globals(&self) -> &ObjectRegistry {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.globals
    }

    /// Runs `f` against the current per-scene scope.
    pub fn with_scene_scope<R>(&self, f: impl FnOnce(&ObjectRegistry) -> R) -> R {
        f(self.scenes.borrow().scene_scope())
    }

    /// A producer handle for the command bus.
    pub fn commands(&self) -> CommandSender {
        self.bus.sender()
    }

    pub fn bus_mut(&mut self) -> &mut CommandBus {
        &mut self.bus
    }

    /// The scene most recently requested with `ChangeScene`.
    pub fn transition_target(&self) -> Option<String> {
        self.scenes.borrow().transition_target().map(str::to_string)
    }

    pub fn is_scene_initialized(&self) -> bool {
        self.scenes.borrow().is_scene_initialized()
    }

    pub fn scene_state(&self) -> SceneState {
        self.scenes.borrow().state().clone()
    }

    /// Elapsed framework time as tracked by the [`FrameClock`] service.
    pub fn clock(&self) -> Option<FrameClock> {
        self.framework_scope
            .resolve_singleton::<FrameClock>()
            .map(|clock| clock.borrow().clone())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command_bus::UnhandledCommands;
    use crate::core::lifecycle::{Configurable, Destroyable, Initializable, Updatable};
    use crate::core::registry::Shared;
    use crate::core::scene::HeadlessEnvironment;

    type Log = Rc<RefCell<Vec<String>>>;

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    //--- Test Services ----------------------------------------------------

    struct Audio {
        name: &'static str,
        log: Log,
    }

    impl Audio {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
            }
        }

        fn record(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.name, what));
        }
    }

    impl Initializable for Audio {
        fn initialize(&mut self) {
            self.record("init");
        }
    }

    impl Configurable for Audio {
        fn configure(&mut self) {
            self.record("configure");
        }
    }

    impl Updatable for Audio {
        fn update(&mut self, _delta_time: f32) {
            self.record("update");
        }
    }

    impl Destroyable for Audio {
        fn destroy(&mut self) {
            self.record("destroy");
        }
    }

    crate::service!(Audio: Initializable, Configurable, Updatable, Destroyable);

    struct Player {
        log: Log,
    }

    impl Destroyable for Player {
        fn destroy(&mut self) {
            self.log.borrow_mut().push("player:destroy".to_string());
        }
    }

    crate::service!(Player: Destroyable);

    struct GameSceneView {
        log: Log,
    }

    impl SceneView for GameSceneView {
        fn initialize(&mut self, scope: &mut ObjectRegistry) {
            self.log.borrow_mut().push("view:init".to_string());
            scope.register_singleton(Player {
                log: Rc::clone(&self.log),
            });
        }
    }

    fn framework(log: &Log) -> Framework {
        let view_log = Rc::clone(log);
        FrameworkBuilder::new()
            .with_view("GameSceneView", move || GameSceneView {
                log: Rc::clone(&view_log),
            })
            .build(HeadlessEnvironment::new())
    }

    //--- Builder ----------------------------------------------------------

    #[test]
    fn builder_defaults() {
        let builder = FrameworkBuilder::new();
        assert_eq!(builder.options, FrameworkOptions::default());
        assert!(builder.catalog.is_empty());
    }

    #[test]
    #[should_panic(expected = "View name must not be empty")]
    fn builder_with_empty_view_name_panics() {
        FrameworkBuilder::new().with_view("", || GameSceneView { log: new_log() });
    }

    #[test]
    #[should_panic(expected = "Initial scene name must not be empty")]
    fn builder_with_empty_initial_scene_panics() {
        FrameworkBuilder::new().with_initial_scene("");
    }

    #[test]
    fn build_wires_scene_handlers() {
        let mut framework = framework(&new_log());
        assert!(framework.bus_mut().has_handler::<ChangeScene>());
        assert!(framework.bus_mut().has_handler::<crate::core::scene::SceneLoaded>());
        assert!(framework.framework_scope().contains_singleton::<FrameClock>());
        assert_eq!(framework.scene_state(), SceneState::Idle);
    }

    //--- Scopes -----------------------------------------------------------

    #[test]
    fn scopes_update_only_after_init() {
        let log = new_log();
        let mut framework = framework(&log);
        framework
            .globals_mut()
            .register_singleton(Audio::new("audio", &log));

        framework.tick(0.016).unwrap();
        assert!(log.borrow().is_empty());

        let mut framework = framework.init(|_| {});
        framework.tick(0.016).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["audio:init", "audio:configure", "audio:update"]
        );
    }

    #[test]
    fn init_registers_and_initializes() {
        let log = new_log();
        let framework = framework(&log).init(|framework| {
            framework
                .globals_mut()
                .register_singleton(Audio::new("audio", &log));
        });

        assert!(framework.globals().is_initialized());
        assert!(framework.framework_scope().is_initialized());
        assert_eq!(*log.borrow(), vec!["audio:init", "audio:configure"]);
    }

    #[test]
    fn frame_clock_tracks_ticks() {
        let mut framework = framework(&new_log()).init(|_| {});
        framework.tick(0.5).unwrap();
        framework.tick(0.5).unwrap();

        let clock = framework.clock().unwrap();
        assert_eq!(clock.frame(), 2);
        assert_eq!(clock.elapsed(), 1.0);
    }

    //--- Scenes -----------------------------------------------------------

    #[test]
    fn change_scene_end_to_end() {
        let log = new_log();
        let mut framework = framework(&log).init(|_| {});

        framework.change_scene("Game");
        assert_eq!(framework.transition_target(), None);

        framework.tick(0.016).unwrap();
        assert_eq!(framework.transition_target().as_deref(), Some("Game"));
        assert!(!framework.is_scene_initialized());

        framework.tick(0.016).unwrap();
        assert!(framework.is_scene_initialized());
        assert_eq!(*log.borrow(), vec!["view:init"]);
        assert!(framework.with_scene_scope(|scope| scope.contains_singleton::<Player>()));
    }

    #[test]
    fn initial_scene_option_starts_transition() {
        let log = new_log();
        let view_log = Rc::clone(&log);
        let mut framework = FrameworkBuilder::new()
            .with_initial_scene("Game")
            .with_view("GameSceneView", move || GameSceneView {
                log: Rc::clone(&view_log),
            })
            .build(HeadlessEnvironment::new());

        framework.tick(0.016).unwrap();
        framework.tick(0.016).unwrap();

        assert_eq!(
            framework.scene_state(),
            SceneState::Active {
                scene: "Game".into()
            }
        );
    }

    #[test]
    fn delayed_scene_change() {
        let mut framework = framework(&new_log()).init(|_| {});
        framework
            .commands()
            .push_after_seconds(ChangeScene::new("Game"), 1.0);

        framework.tick(0.5).unwrap();
        assert_eq!(framework.transition_target(), None);

        framework.tick(0.5).unwrap();
        assert_eq!(framework.transition_target().as_deref(), Some("Game"));
    }

    #[test]
    fn unknown_view_surfaces_as_scene_error() {
        let mut framework = framework(&new_log());
        framework.change_scene("Credits");

        let err = framework.tick(0.016).unwrap_err();

        assert!(matches!(err, FrameworkError::Scene(_)));
        assert!(err.to_string().contains("CreditsSceneView"));
    }

    #[test]
    fn strict_bus_surfaces_unhandled_commands() {
        struct Orphan;

        let options = FrameworkOptions {
            unhandled_commands: UnhandledCommands::Error,
            ..FrameworkOptions::default()
        };
        let mut framework = FrameworkBuilder::new()
            .with_options(options)
            .build(HeadlessEnvironment::new());
        framework.commands().push(Orphan);

        let err = framework.tick(0.016).unwrap_err();

        assert!(matches!(err, FrameworkError::Commands(_)));
    }

    #[test]
    fn failed_drain_still_updates_scopes() {
        struct Orphan;

        let log = new_log();
        let options = FrameworkOptions {
            unhandled_commands: UnhandledCommands::Error,
            ..FrameworkOptions::default()
        };
        let mut framework = FrameworkBuilder::new()
            .with_options(options)
            .build(HeadlessEnvironment::new())
            .init(|framework| {
                framework
                    .globals_mut()
                    .register_singleton(Audio::new("audio", &log));
            });
        log.borrow_mut().clear();

        framework.tick(0.5).unwrap();
        framework.commands().push(Orphan);
        assert!(framework.tick(0.5).is_err());
        framework.tick(0.5).unwrap();

        let clock = framework.clock().unwrap();
        assert_eq!(framework.bus.frame(), clock.frame());
        assert_eq!(framework.bus.elapsed(), clock.elapsed());
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn scene_error_still_updates_scopes() {
        let mut framework = framework(&new_log()).init(|_| {});
        framework.change_scene("Credits");

        assert!(framework.tick(0.25).is_err());

        assert_eq!(framework.clock().unwrap().frame(), 1);
    }

    //--- Shutdown ---------------------------------------------------------

    #[test]
    fn shutdown_destroys_scene_then_globals() {
        let log = new_log();
        let mut framework = framework(&log).init(|framework| {
            framework
                .globals_mut()
                .register_singleton(Audio::new("audio", &log));
        });
        framework.change_scene("Game");
        framework.tick(0.016).unwrap();
        framework.tick(0.016).unwrap();
        log.borrow_mut().clear();

        let audio: Shared<Audio> = framework.globals().resolve_singleton().unwrap();
        framework.shutdown();

        assert_eq!(*log.borrow(), vec!["player:destroy", "audio:destroy"]);
        assert_eq!(audio.borrow().name, "audio");
    }
}
