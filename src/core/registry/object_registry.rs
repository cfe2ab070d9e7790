//=========================================================================
// Object Registry
//=========================================================================
//
// Owns the singleton and transient tables of one scope and drives the
// lifecycle of every object registered in it.
//
// Lookup storage is type-erased (`Rc<dyn Any>`) and resolved with a
// checked downcast. Lifecycle dispatch goes through the capability index,
// which holds the same objects as `Rc<RefCell<dyn Service>>`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::capability_index::{CapabilityIndex, ObjectId, ServiceRef};
use super::{CapabilityCounts, RegistryError, Shared, SingletonReplacement};
use crate::core::lifecycle::{Capabilities, Service};

//=== Slot ================================================================

/// One registered object: its scope identity plus both erased views of it.
struct Slot {
    id: ObjectId,
    object: Rc<dyn Any>,
    service: ServiceRef,
}

impl Slot {
    fn is_same_object<T: Service>(&self, shared: &Shared<T>) -> bool {
        Rc::as_ptr(&self.object) as *const () == Rc::as_ptr(shared) as *const ()
    }

    fn resolve<T: Service>(&self) -> Option<Shared<T>> {
        Rc::clone(&self.object).downcast::<RefCell<T>>().ok()
    }
}

//=== ObjectRegistry ======================================================

/// A scope of registered objects with its own lifecycle state.
///
/// Objects are either singletons (one per type) or transients (one per
/// type and name). Registration classifies each object against the four
/// lifecycle capabilities and files it for dispatch in registration order.
///
/// # Lifecycle
///
/// 1. Register objects.
/// 2. [`initialize_scene_objects`](Self::initialize_scene_objects) runs every
///    `initialize`, then every `configure`. Happens once per scope.
/// 3. [`update`](Self::update) sweeps updatable objects each tick.
/// 4. [`destroy`](Self::destroy) runs every `destroy` and empties the scope.
///    A destroyed scope should be dropped, not reused.
///
/// # Example
///
/// ```rust
/// use aetheric_framework::prelude::*;
///
/// struct Spawner { spawned: u32 }
/// impl Updatable for Spawner {
///     fn update(&mut self, _dt: f32) { self.spawned += 1; }
/// }
/// aetheric_framework::service!(Spawner: Updatable);
///
/// let mut scope = ObjectRegistry::new();
/// let spawner = scope.register_singleton(Spawner { spawned: 0 });
///
/// scope.update(0.016); // not initialized yet, no-op
/// scope.initialize_scene_objects();
/// scope.update(0.016);
///
/// assert_eq!(spawner.borrow().spawned, 1);
/// ```
pub struct ObjectRegistry {
    singletons: HashMap<TypeId, Slot>,
    transients: HashMap<TypeId, HashMap<String, Slot>>,
    index: CapabilityIndex,
    next_id: u64,
    initialized: bool,
    destroyed: bool,
    replacement: SingletonReplacement,
}

impl ObjectRegistry {
    //--- Construction -----------------------------------------------------

    /// Creates an empty, uninitialized scope.
    pub fn new() -> Self {
        Self::with_replacement(SingletonReplacement::default())
    }

    /// Creates an empty scope with an explicit singleton replacement policy.
    pub fn with_replacement(replacement: SingletonReplacement) -> Self {
        Self {
            singletons: HashMap::new(),
            transients: HashMap::new(),
            index: CapabilityIndex::new(),
            next_id: 0,
            initialized: false,
            destroyed: false,
            replacement,
        }
    }

    //--- Singletons -------------------------------------------------------

    /// Registers `instance` as the singleton of type `T` and returns its handle.
    ///
    /// A previously registered singleton of the same type is replaced. It
    /// leaves the scope's capability lists and is only destroyed when the
    /// scope uses [`SingletonReplacement::DestroyPrevious`]; by default the
    /// replaced instance is never destroyed by the scope.
    pub fn register_singleton<T: Service>(&mut self, instance: T) -> Shared<T> {
        self.register_shared_singleton(Rc::new(RefCell::new(instance)))
    }

    /// Registers an existing shared handle as the singleton of type `T`.
    pub fn register_shared_singleton<T: Service>(&mut self, shared: Shared<T>) -> Shared<T> {
        let type_id = TypeId::of::<T>();

        if let Some(previous) = self.singletons.remove(&type_id) {
            if previous.is_same_object(&shared) {
                debug!("Singleton {} re-registered with the same instance", type_name::<T>());
                self.singletons.insert(type_id, previous);
                return shared;
            }
            self.retire_replaced(previous, type_name::<T>());
        }

        let slot = self.admit(&shared);
        self.singletons.insert(type_id, slot);
        shared
    }

    /// Returns the singleton of type `T`, if one is registered.
    pub fn resolve_singleton<T: Service>(&self) -> Option<Shared<T>> {
        self.singletons.get(&TypeId::of::<T>())?.resolve::<T>()
    }

    /// Returns true if a singleton of type `T` is registered.
    pub fn contains_singleton<T: Service>(&self) -> bool {
        self.singletons.contains_key(&TypeId::of::<T>())
    }

    //--- Transients -------------------------------------------------------

    /// Registers `instance` under the pair (`T`, `name`).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] if the pair is already taken.
    /// The existing registration is left untouched.
    pub fn register_transient<T: Service>(
        &mut self,
        name: impl Into<String>,
        instance: T,
    ) -> Result<Shared<T>, RegistryError> {
        self.register_shared_transient(name, Rc::new(RefCell::new(instance)))
    }

    /// Registers an existing shared handle under the pair (`T`, `name`).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] if the pair is already taken.
    pub fn register_shared_transient<T: Service>(
        &mut self,
        name: impl Into<String>,
        shared: Shared<T>,
    ) -> Result<Shared<T>, RegistryError> {
        let name = name.into();
        let type_id = TypeId::of::<T>();

        let taken = self
            .transients
            .get(&type_id)
            .is_some_and(|bucket| bucket.contains_key(&name));
        if taken {
            return Err(RegistryError::DuplicateKey {
                type_name: type_name::<T>(),
                name,
            });
        }

        let slot = self.admit(&shared);
        self.transients.entry(type_id).or_default().insert(name, slot);
        Ok(shared)
    }

    /// Returns the transient registered under (`T`, `name`), if any.
    pub fn resolve_transient<T: Service>(&self, name: &str) -> Option<Shared<T>> {
        self.transients
            .get(&TypeId::of::<T>())?
            .get(name)?
            .resolve::<T>()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Runs the one-time two-phase initialization of this scope.
    ///
    /// Every initializable object is initialized, in registration order,
    /// before any configurable object is configured. Later calls are no-ops.
    pub fn initialize_scene_objects(&mut self) {
        if self.initialized {
            debug!("Scope already initialized, skipping");
            return;
        }

        for service in self.index.initializables() {
            let mut service = service.borrow_mut();
            if let Some(initializable) = service.as_initializable() {
                initializable.initialize();
            }
        }

        for service in self.index.configurables() {
            let mut service = service.borrow_mut();
            if let Some(configurable) = service.as_configurable() {
                configurable.configure();
            }
        }

        self.initialized = true;

        let counts = self.index.counts();
        debug!(
            "Scope initialized ({} initialized, {} configured)",
            counts.initializable, counts.configurable
        );
    }

    /// Updates every updatable object in registration order.
    ///
    /// Does nothing until the scope has been initialized.
    pub fn update(&mut self, delta_time: f32) {
        if !self.initialized {
            return;
        }

        for service in self.index.updatables() {
            let mut service = service.borrow_mut();
            if let Some(updatable) = service.as_updatable() {
                updatable.update(delta_time);
            }
        }
    }

    /// Destroys every destroyable object in registration order, then clears
    /// all tables.
    ///
    /// Calling it again destroys nothing since the tables are already empty.
    pub fn destroy(&mut self) {
        let destroyed = self.index.counts().destroyable;

        for service in self.index.destroyables() {
            let mut service = service.borrow_mut();
            if let Some(destroyable) = service.as_destroyable() {
                destroyable.destroy();
            }
        }

        self.singletons.clear();
        self.transients.clear();
        self.index.clear();
        self.destroyed = true;

        info!("Scope destroyed ({} objects torn down)", destroyed);
    }

    //--- Queries ----------------------------------------------------------

    /// Returns true once [`initialize_scene_objects`](Self::initialize_scene_objects) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Returns true once [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Number of registered singletons.
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// Number of registered transients across all types.
    pub fn transient_count(&self) -> usize {
        self.transients.values().map(HashMap::len).sum()
    }

    /// Number of objects filed under each capability.
    pub fn capability_counts(&self) -> CapabilityCounts {
        self.index.counts()
    }

    /// The singleton replacement policy of this scope.
    pub fn replacement(&self) -> SingletonReplacement {
        self.replacement
    }

    //--- Internal Helpers -------------------------------------------------

    /// Classifies and files a new object, running catch-up lifecycle calls
    /// when the scope is already initialized.
    fn admit<T: Service>(&mut self, shared: &Shared<T>) -> Slot {
        if self.destroyed {
            warn!(
                "Registering {} into a destroyed scope; create a new scope instead",
                type_name::<T>()
            );
        }

        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let object: Rc<dyn Any> = Rc::clone(shared) as Rc<dyn Any>;
        let service: ServiceRef = Rc::clone(shared) as ServiceRef;
        let capabilities = service.borrow_mut().capabilities();
        self.index.file(id, &service, capabilities);

        if self.initialized {
            Self::catch_up(&service, capabilities);
        }

        Slot {
            id,
            object,
            service,
        }
    }

    fn catch_up(service: &ServiceRef, capabilities: Capabilities) {
        let mut service = service.borrow_mut();

        if capabilities.initializable {
            if let Some(initializable) = service.as_initializable() {
                initializable.initialize();
            }
        }

        if capabilities.configurable {
            if let Some(configurable) = service.as_configurable() {
                configurable.configure();
            }
        }
    }

    fn retire_replaced(&mut self, previous: Slot, type_name: &'static str) {
        self.index.evict(previous.id);

        match self.replacement {
            SingletonReplacement::Silent => {
                warn!("Singleton {} replaced without destroying the previous instance", type_name);
            }
            SingletonReplacement::DestroyPrevious => {
                debug!("Singleton {} replaced, destroying the previous instance", type_name);
                let mut service = previous.service.borrow_mut();
                if let Some(destroyable) = service.as_destroyable() {
                    destroyable.destroy();
                }
            }
        }
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lifecycle::{Configurable, Destroyable, Initializable, Updatable};

    type Log = Rc<RefCell<Vec<String>>>;

    fn new_log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    //--- Test Services ----------------------------------------------------

    /// Implements all four capabilities. The const parameter yields a
    /// distinct type per id so several can be singletons in one scope.
    struct Witness<const ID: u8> {
        log: Log,
    }

    impl<const ID: u8> Witness<ID> {
        fn new(log: &Log) -> Self {
            Self { log: Rc::clone(log) }
        }

        fn record(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{}", what, ID));
        }
    }

    impl<const ID: u8> Updatable for Witness<ID> {
        fn update(&mut self, _delta_time: f32) {
            self.record("update");
        }
    }

    impl<const ID: u8> Initializable for Witness<ID> {
        fn initialize(&mut self) {
            self.record("init");
        }
    }

    impl<const ID: u8> Configurable for Witness<ID> {
        fn configure(&mut self) {
            self.record("configure");
        }
    }

    impl<const ID: u8> Destroyable for Witness<ID> {
        fn destroy(&mut self) {
            self.record("destroy");
        }
    }

    impl<const ID: u8> Service for Witness<ID> {
        fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
            Some(self)
        }
        fn as_initializable(&mut self) -> Option<&mut dyn Initializable> {
            Some(self)
        }
        fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
            Some(self)
        }
        fn as_destroyable(&mut self) -> Option<&mut dyn Destroyable> {
            Some(self)
        }
    }

    /// Configurable only; records how many initializations it observed.
    struct InitObserver {
        log: Log,
    }

    impl Configurable for InitObserver {
        fn configure(&mut self) {
            let inits = self.log.borrow().iter().filter(|e| e.starts_with("init")).count();
            self.log.borrow_mut().push(format!("observed:{}", inits));
        }
    }

    crate::service!(InitObserver: Configurable);

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);
    crate::service!(Label);

    //--- Singletons -------------------------------------------------------

    #[test]
    fn singleton_register_and_resolve() {
        let mut scope = ObjectRegistry::new();
        let registered = scope.register_singleton(Label("hud"));
        let resolved = scope.resolve_singleton::<Label>().expect("registered");

        assert!(Rc::ptr_eq(&registered, &resolved));
        assert_eq!(*resolved.borrow(), Label("hud"));
    }

    #[test]
    fn resolve_missing_singleton_is_none() {
        let scope = ObjectRegistry::new();
        assert!(scope.resolve_singleton::<Label>().is_none());
        assert!(!scope.contains_singleton::<Label>());
    }

    #[test]
    fn singleton_overwrite_returns_latest() {
        let mut scope = ObjectRegistry::new();
        let first = scope.register_singleton(Label("first"));
        let second = scope.register_singleton(Label("second"));

        let resolved = scope.resolve_singleton::<Label>().expect("registered");
        assert!(Rc::ptr_eq(&resolved, &second));
        assert!(!Rc::ptr_eq(&resolved, &first));
        assert_eq!(scope.singleton_count(), 1);
    }

    #[test]
    fn silent_overwrite_skips_destroy_and_stops_updates() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));
        scope.initialize_scene_objects();
        scope.register_singleton(Witness::<1>::new(&log));
        log.borrow_mut().clear();

        scope.update(0.1);

        assert_eq!(entries(&log), vec!["update:1"]);
        assert_eq!(scope.capability_counts().updatable, 1);
    }

    #[test]
    fn destroy_previous_policy_destroys_replaced() {
        let log = new_log();
        let mut scope = ObjectRegistry::with_replacement(SingletonReplacement::DestroyPrevious);
        scope.register_singleton(Witness::<1>::new(&log));
        scope.register_singleton(Witness::<1>::new(&log));

        assert_eq!(entries(&log), vec!["destroy:1"]);
        assert_eq!(scope.capability_counts().destroyable, 1);
    }

    #[test]
    fn reregistering_same_instance_is_noop() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        let witness = scope.register_singleton(Witness::<1>::new(&log));
        scope.initialize_scene_objects();
        log.borrow_mut().clear();

        scope.register_shared_singleton(Rc::clone(&witness));

        assert!(entries(&log).is_empty());
        assert_eq!(scope.capability_counts().updatable, 1);
    }

    //--- Transients -------------------------------------------------------

    #[test]
    fn transients_are_keyed_by_type_and_name() {
        let mut scope = ObjectRegistry::new();
        scope.register_transient("left", Label("L")).unwrap();
        scope.register_transient("right", Label("R")).unwrap();

        assert_eq!(*scope.resolve_transient::<Label>("left").unwrap().borrow(), Label("L"));
        assert_eq!(*scope.resolve_transient::<Label>("right").unwrap().borrow(), Label("R"));
        assert_eq!(scope.transient_count(), 2);
    }

    #[test]
    fn duplicate_transient_fails_and_keeps_first() {
        let mut scope = ObjectRegistry::new();
        let first = scope.register_transient("slot", Label("first")).unwrap();

        let err = scope.register_transient("slot", Label("second")).unwrap_err();

        assert_eq!(
            err,
            RegistryError::DuplicateKey {
                type_name: type_name::<Label>(),
                name: "slot".to_string(),
            }
        );
        assert!(err.to_string().contains("duplicate transient key"));
        let resolved = scope.resolve_transient::<Label>("slot").unwrap();
        assert!(Rc::ptr_eq(&resolved, &first));
        assert_eq!(scope.transient_count(), 1);
    }

    #[test]
    fn duplicate_transient_is_not_filed() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_transient("a", Witness::<1>::new(&log)).unwrap();
        assert!(scope.register_transient("a", Witness::<1>::new(&log)).is_err());

        assert_eq!(scope.capability_counts().updatable, 1);
    }

    #[test]
    fn resolve_transient_missing_bucket_or_name() {
        let mut scope = ObjectRegistry::new();
        assert!(scope.resolve_transient::<Label>("nope").is_none());

        scope.register_transient("yes", Label("y")).unwrap();
        assert!(scope.resolve_transient::<Label>("nope").is_none());
    }

    #[test]
    fn singleton_and_transient_tables_are_independent() {
        let mut scope = ObjectRegistry::new();
        scope.register_transient("named", Label("t")).unwrap();

        assert!(scope.resolve_singleton::<Label>().is_none());
    }

    #[test]
    fn scopes_are_isolated() {
        let mut framework = ObjectRegistry::new();
        let globals = ObjectRegistry::new();
        framework.register_singleton(Label("core"));

        assert!(globals.resolve_singleton::<Label>().is_none());
    }

    //--- Lifecycle --------------------------------------------------------

    #[test]
    fn update_is_noop_before_initialization() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));

        scope.update(0.016);

        assert!(entries(&log).is_empty());
    }

    #[test]
    fn initialize_runs_all_initializers_before_configurers() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));
        scope.register_singleton(Witness::<2>::new(&log));
        scope.register_transient("x", Witness::<3>::new(&log)).unwrap();

        scope.initialize_scene_objects();

        assert_eq!(
            entries(&log),
            vec!["init:1", "init:2", "init:3", "configure:1", "configure:2", "configure:3"]
        );
        assert!(scope.is_initialized());
    }

    #[test]
    fn configure_observes_every_initialization() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(InitObserver { log: Rc::clone(&log) });
        scope.register_singleton(Witness::<1>::new(&log));
        scope.register_singleton(Witness::<2>::new(&log));

        scope.initialize_scene_objects();

        assert_eq!(entries(&log)[..3], ["init:1", "init:2", "observed:2"]);
    }

    #[test]
    fn initialize_is_idempotent() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));

        scope.initialize_scene_objects();
        let once = entries(&log);
        scope.initialize_scene_objects();

        assert_eq!(entries(&log), once);
    }

    #[test]
    fn update_runs_once_per_tick_in_registration_order() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<2>::new(&log));
        scope.register_transient("t", Witness::<3>::new(&log)).unwrap();
        scope.register_singleton(Witness::<1>::new(&log));
        scope.register_singleton(Label("inert"));
        scope.initialize_scene_objects();
        log.borrow_mut().clear();

        scope.update(0.016);
        scope.update(0.016);

        assert_eq!(
            entries(&log),
            vec!["update:2", "update:3", "update:1", "update:2", "update:3", "update:1"]
        );
    }

    #[test]
    fn late_registration_catches_up() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));
        scope.initialize_scene_objects();
        log.borrow_mut().clear();

        scope.register_singleton(Witness::<2>::new(&log));

        assert_eq!(entries(&log), vec!["init:2", "configure:2"]);

        scope.update(0.016);
        assert_eq!(entries(&log)[2..], ["update:1", "update:2"]);
    }

    #[test]
    fn registration_before_initialization_does_not_catch_up() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));

        assert!(entries(&log).is_empty());
    }

    #[test]
    fn destroy_runs_in_order_then_clears() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));
        scope.register_singleton(Witness::<2>::new(&log));
        scope.register_singleton(Witness::<3>::new(&log));
        scope.register_singleton(Label("inert"));

        scope.destroy();

        assert_eq!(entries(&log), vec!["destroy:1", "destroy:2", "destroy:3"]);
        assert!(scope.resolve_singleton::<Witness<1>>().is_none());
        assert!(scope.resolve_singleton::<Witness<2>>().is_none());
        assert!(scope.resolve_singleton::<Witness<3>>().is_none());
        assert!(scope.resolve_singleton::<Label>().is_none());
        assert_eq!(scope.capability_counts(), CapabilityCounts::default());
        assert!(scope.is_destroyed());
    }

    #[test]
    fn second_destroy_destroys_nothing() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.register_singleton(Witness::<1>::new(&log));

        scope.destroy();
        scope.destroy();

        assert_eq!(entries(&log), vec!["destroy:1"]);
    }

    #[test]
    fn destroy_does_not_reset_initialized() {
        let mut scope = ObjectRegistry::new();
        scope.initialize_scene_objects();
        scope.destroy();

        assert!(scope.is_initialized());
    }

    #[test]
    fn registration_into_destroyed_scope_still_catches_up() {
        let log = new_log();
        let mut scope = ObjectRegistry::new();
        scope.initialize_scene_objects();
        scope.destroy();

        let late = scope.register_singleton(Witness::<1>::new(&log));

        assert_eq!(entries(&log), vec!["init:1", "configure:1"]);
        assert!(scope.is_destroyed());
        assert!(Rc::ptr_eq(&late, &scope.resolve_singleton::<Witness<1>>().unwrap()));
        assert_eq!(scope.capability_counts().updatable, 1);
    }
}
