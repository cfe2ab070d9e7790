//=========================================================================
// Lifecycle Capabilities
//=========================================================================
//
// Narrow behavioral contracts an object registered in an ObjectRegistry
// may implement. The four capabilities are independent: an object may
// implement any subset of them, including none.
//
// Capability discovery is static. A type opts in by implementing the
// capability trait and exposing it through the matching `Service`
// accessor (or by declaring it with the `service!` macro). The registry
// asks each accessor exactly once, at registration time.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;

//=== Capability Traits ===================================================

/// Receives the per-frame update sweep once its scope is initialized.
pub trait Updatable {
    /// Called once per tick with the seconds elapsed since the previous tick.
    fn update(&mut self, delta_time: f32);
}

/// First phase of scope initialization.
pub trait Initializable {
    fn initialize(&mut self);
}

/// Second phase of scope initialization.
///
/// Runs only after every initializable object of the scope has been
/// initialized, so configuration may rely on that state.
pub trait Configurable {
    fn configure(&mut self);
}

/// Invoked when the owning scope is destroyed.
pub trait Destroyable {
    fn destroy(&mut self);
}

//=== Service Trait =======================================================

/// An object that can be stored in an [`ObjectRegistry`](crate::core::registry::ObjectRegistry).
///
/// Every accessor defaults to `None`. Override the ones matching the
/// capabilities the type implements, or use [`service!`](crate::service)
/// to generate the impl.
///
/// ```rust
/// use aetheric_framework::prelude::*;
///
/// struct Score { points: u32 }
///
/// impl Initializable for Score {
///     fn initialize(&mut self) { self.points = 0; }
/// }
///
/// aetheric_framework::service!(Score: Initializable);
///
/// let mut scope = ObjectRegistry::new();
/// let score = scope.register_singleton(Score { points: 7 });
/// scope.initialize_scene_objects();
/// assert_eq!(score.borrow().points, 0);
/// ```
pub trait Service: Any {
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        None
    }

    fn as_initializable(&mut self) -> Option<&mut dyn Initializable> {
        None
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }

    fn as_destroyable(&mut self) -> Option<&mut dyn Destroyable> {
        None
    }

    /// Classifies this object against the four capabilities.
    fn capabilities(&mut self) -> Capabilities {
        Capabilities {
            updatable: self.as_updatable().is_some(),
            initializable: self.as_initializable().is_some(),
            configurable: self.as_configurable().is_some(),
            destroyable: self.as_destroyable().is_some(),
        }
    }
}

//=== Capabilities ========================================================

/// Result of classifying a service at registration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub updatable: bool,
    pub initializable: bool,
    pub configurable: bool,
    pub destroyable: bool,
}

impl Capabilities {
    /// Returns true if the object implements none of the capabilities.
    pub fn is_empty(&self) -> bool {
        !(self.updatable || self.initializable || self.configurable || self.destroyable)
    }
}

//=== service! ============================================================

/// Implements [`Service`] for a type, exposing the listed capabilities.
///
/// ```rust
/// use aetheric_framework::prelude::*;
///
/// struct Clock { elapsed: f32 }
/// impl Updatable for Clock {
///     fn update(&mut self, dt: f32) { self.elapsed += dt; }
/// }
/// impl Destroyable for Clock {
///     fn destroy(&mut self) { self.elapsed = 0.0; }
/// }
///
/// aetheric_framework::service!(Clock: Updatable, Destroyable);
///
/// struct Plain;
/// aetheric_framework::service!(Plain);
/// ```
#[macro_export]
macro_rules! service {
    (@accessor Updatable) => {
        fn as_updatable(&mut self) -> Option<&mut dyn $crate::core::lifecycle::Updatable> {
            Some(self)
        }
    };
    (@accessor Initializable) => {
        fn as_initializable(&mut self) -> Option<&mut dyn $crate::core::lifecycle::Initializable> {
            Some(self)
        }
    };
    (@accessor Configurable) => {
        fn as_configurable(&mut self) -> Option<&mut dyn $crate::core::lifecycle::Configurable> {
            Some(self)
        }
    };
    (@accessor Destroyable) => {
        fn as_destroyable(&mut self) -> Option<&mut dyn $crate::core::lifecycle::Destroyable> {
            Some(self)
        }
    };
    ($ty:ty) => {
        impl $crate::core::lifecycle::Service for $ty {}
    };
    ($ty:ty : $($capability:ident),+ $(,)?) => {
        impl $crate::core::lifecycle::Service for $ty {
            $( $crate::service!(@accessor $capability); )+
        }
    };
}

//=========================================================================
// Tests
//=========================================================================
