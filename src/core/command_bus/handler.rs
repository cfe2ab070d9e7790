//=========================================================================
// Command Handler
//=========================================================================
//
// Type-erased handler storage so callbacks for different command kinds
// can live in one HashMap without concrete type knowledge.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any};
use std::marker::PhantomData;

use log::error;

//=== Internal Dependencies ===============================================

use super::Command;

//=========================================================================

/// Type-erased handler for a single command kind.
pub(super) trait CommandHandler {
    /// Delivers a command; `command` must be of the handler's kind.
    fn handle(&mut self, command: &dyn Any);
}

//=========================================================================

/// Adapts a typed callback to [`CommandHandler`] through a checked downcast.
pub(super) struct TypedHandler<C, F> {
    callback: F,
    _kind: PhantomData<fn(&C)>,
}

impl<C, F> TypedHandler<C, F>
where
    C: Command,
    F: FnMut(&C) + 'static,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            _kind: PhantomData,
        }
    }
}

impl<C, F> CommandHandler for TypedHandler<C, F>
where
    C: Command,
    F: FnMut(&C) + 'static,
{
    fn handle(&mut self, command: &dyn Any) {
        match command.downcast_ref::<C>() {
            Some(command) => (self.callback)(command),
            None => error!("Handler for {} received a command of another kind", type_name::<C>()),
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
