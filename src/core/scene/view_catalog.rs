//=========================================================================
// View Catalog
//=========================================================================
//
// Scene view factories keyed by view name (`<Scene><suffix>`), used when
// a loaded scene does not already contain its view.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;

//=== Internal Dependencies ===============================================

use super::{SceneView, SharedView};

//=========================================================================

type ViewFactory = Box<dyn Fn() -> SharedView>;

/// Named constructors for scene views.
#[derive(Default)]
pub struct ViewCatalog {
    factories: HashMap<String, ViewFactory>,
}

impl ViewCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory that builds the view named `view_name`.
    pub fn register<V, F>(&mut self, view_name: impl Into<String>, factory: F)
    where
        V: SceneView + 'static,
        F: Fn() -> V + 'static,
    {
        let view_name = view_name.into();
        let factory: ViewFactory = Box::new(move || Rc::new(RefCell::new(factory())) as SharedView);
        if self.factories.insert(view_name.clone(), factory).is_some() {
            warn!("View factory {:?} was already registered and has been replaced", view_name);
        }
    }

    /// Creates a new instance of the named view.
    pub fn instantiate(&self, view_name: &str) -> Option<SharedView> {
        self.factories.get(view_name).map(|factory| factory())
    }

    /// Returns true if a factory is registered for `view_name`.
    pub fn contains(&self, view_name: &str) -> bool {
        self.factories.contains_key(view_name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ObjectRegistry;

    struct CountingView {
        id: u32,
    }

    impl SceneView for CountingView {
        fn initialize(&mut self, _scope: &mut ObjectRegistry) {
            self.id += 1;
        }
    }

    #[test]
    fn instantiate_builds_fresh_views() {
        let mut catalog = ViewCatalog::new();
        catalog.register("GameSceneView", || CountingView { id: 0 });

        let first = catalog.instantiate("GameSceneView").unwrap();
        let second = catalog.instantiate("GameSceneView").unwrap();

        assert!(!Rc::ptr_eq(&first, &second));
        assert!(catalog.contains("GameSceneView"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn unknown_view_is_none() {
        let catalog = ViewCatalog::new();
        assert!(catalog.instantiate("MissingSceneView").is_none());
        assert!(catalog.is_empty());
    }
}
