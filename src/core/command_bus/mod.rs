//=========================================================================
// Command Bus
//=========================================================================
//
// Type-routed deferred command delivery synchronized to the host tick.
//
// Architecture:
//   Producers → CommandSender::push*() → inbox (FIFO)
//                                          ↓  process(dt)
//   ingest (stamp frame + clock) → queue: Vec<ScheduledEntry>
//                                          ↓
//   due entries (enqueue order) → handlers: HashMap<TypeId, handler>
//
// Pattern: push → process (once per tick) → handler → push → ...
//
//=========================================================================

//=== External Dependencies ===============================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Module Declarations =================================================

mod command_bus;
mod handler;
mod schedule;
mod sender;

//=== Public API ==========================================================

pub use command_bus::{CommandBus, DrainReport};
pub use schedule::Trigger;
pub use sender::CommandSender;

/// Marker trait for values routed through the [`CommandBus`].
///
/// A command's kind is its concrete type. Automatically implemented for
/// every `'static` type.
pub trait Command: 'static {}

// Blanket implementation
impl<T: 'static> Command for T {}

//=== UnhandledCommands ===================================================

/// What a drain does with a due command whose kind has no handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhandledCommands {
    /// Drop the command without a trace.
    #[default]
    Silent,

    /// Drop the command and log a warning.
    Warn,

    /// Drop the command and fail the drain once every due entry is delivered.
    Error,
}

//=== CommandBusError =====================================================

/// Errors surfaced by [`CommandBus::process`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandBusError {
    /// Due commands were dropped because no handler was registered.
    #[error("no handler registered for command kinds: {}", .kinds.join(", "))]
    Unhandled { kinds: Vec<&'static str> },
}
