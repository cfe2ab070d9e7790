//=========================================================================
// Capability Index
//=========================================================================
//
// Ordered capability lists of a single scope.
//
// Each registered object is classified once and filed into zero or more
// of the four lists. Lists preserve registration order, which is the
// dispatch order of every lifecycle sweep.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::lifecycle::{Capabilities, Service};

//=========================================================================

/// Registration-order identity of an object inside one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) struct ObjectId(pub(super) u64);

/// Type-erased handle used for lifecycle dispatch.
pub(super) type ServiceRef = Rc<RefCell<dyn Service>>;

type Filed = Vec<(ObjectId, ServiceRef)>;

/// Per-capability dispatch lists.
#[derive(Default)]
pub(super) struct CapabilityIndex {
    updatables: Filed,
    initializables: Filed,
    configurables: Filed,
    destroyables: Filed,
}

impl CapabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Filing -----------------------------------------------------------

    /// Appends `service` to every list matching `capabilities`.
    pub fn file(&mut self, id: ObjectId, service: &ServiceRef, capabilities: Capabilities) {
        if capabilities.updatable {
            self.updatables.push((id, Rc::clone(service)));
        }
        if capabilities.initializable {
            self.initializables.push((id, Rc::clone(service)));
        }
        if capabilities.configurable {
            self.configurables.push((id, Rc::clone(service)));
        }
        if capabilities.destroyable {
            self.destroyables.push((id, Rc::clone(service)));
        }
    }

    /// Removes the object from every list it was filed into.
    pub fn evict(&mut self, id: ObjectId) {
        for list in [
            &mut self.updatables,
            &mut self.initializables,
            &mut self.configurables,
            &mut self.destroyables,
        ] {
            list.retain(|(filed, _)| *filed != id);
        }
    }

    pub fn clear(&mut self) {
        self.updatables.clear();
        self.initializables.clear();
        self.configurables.clear();
        self.destroyables.clear();
    }

    //--- Dispatch Lists ---------------------------------------------------

    pub fn updatables(&self) -> impl Iterator<Item = &ServiceRef> {
        self.updatables.iter().map(|(_, service)| service)
    }

    pub fn initializables(&self) -> impl Iterator<Item = &ServiceRef> {
        self.initializables.iter().map(|(_, service)| service)
    }

    pub fn configurables(&self) -> impl Iterator<Item = &ServiceRef> {
        self.configurables.iter().map(|(_, service)| service)
    }

    pub fn destroyables(&self) -> impl Iterator<Item = &ServiceRef> {
        self.destroyables.iter().map(|(_, service)| service)
    }

    /// Number of objects filed under each capability.
    pub fn counts(&self) -> CapabilityCounts {
        CapabilityCounts {
            updatable: self.updatables.len(),
            initializable: self.initializables.len(),
            configurable: self.configurables.len(),
            destroyable: self.destroyables.len(),
        }
    }
}

//=== CapabilityCounts ====================================================

/// Snapshot of how many objects a scope dispatches per capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityCounts {
    pub updatable: usize,
    pub initializable: usize,
    pub configurable: usize,
    pub destroyable: usize,
}

//=========================================================================
// Tests
//=========================================================================
