//=========================================================================
// Command Bus
//=========================================================================
//
// Routes commands to at most one handler per command kind, delivering
// them immediately, after a number of drains, or after an amount of bus
// time. One `process` call per host tick.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, TypeId};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::handler::{CommandHandler, TypedHandler};
use super::schedule::{ScheduledEntry, Trigger};
use super::sender::{CommandSender, Inbox};
use super::{Command, CommandBusError, UnhandledCommands};

//=== DrainReport =========================================================

/// Outcome of a single [`CommandBus::process`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Commands handed to a handler.
    pub delivered: usize,

    /// Kinds of due commands dropped for lack of a handler, in delivery order.
    pub unhandled: Vec<&'static str>,

    /// Commands still waiting for their trigger.
    pub still_pending: usize,
}

//=== CommandBus ==========================================================

/// Deferred, type-routed command dispatcher.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use aetheric_framework::prelude::*;
///
/// struct Explode { radius: f32 }
///
/// let mut bus = CommandBus::new();
/// let hits = Rc::new(Cell::new(0.0));
/// let sink = Rc::clone(&hits);
/// bus.register_handler(move |cmd: &Explode| sink.set(cmd.radius));
///
/// bus.push_after_frames(Explode { radius: 3.0 }, 1);
///
/// bus.process(0.016).unwrap();
/// assert_eq!(hits.get(), 0.0);
/// bus.process(0.016).unwrap();
/// assert_eq!(hits.get(), 3.0);
/// ```
pub struct CommandBus {
    handlers: HashMap<TypeId, Box<dyn CommandHandler>>,
    queue: Vec<ScheduledEntry>,
    inbox: Inbox,
    frame: u64,
    clock: f64,
    unhandled: UnhandledCommands,
}

impl CommandBus {
    //--- Construction -----------------------------------------------------

    /// Creates an empty bus that drops unhandled commands silently.
    pub fn new() -> Self {
        Self::with_unhandled(UnhandledCommands::default())
    }

    /// Creates an empty bus with an explicit unhandled-command policy.
    pub fn with_unhandled(unhandled: UnhandledCommands) -> Self {
        Self {
            handlers: HashMap::new(),
            queue: Vec::new(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            frame: 0,
            clock: 0.0,
            unhandled,
        }
    }

    //--- Handlers ---------------------------------------------------------

    /// Installs the handler for command kind `C`, replacing any previous one.
    pub fn register_handler<C, F>(&mut self, callback: F)
    where
        C: Command,
        F: FnMut(&C) + 'static,
    {
        let handler: Box<dyn CommandHandler> = Box::new(TypedHandler::new(callback));
        if self.handlers.insert(TypeId::of::<C>(), handler).is_some() {
            debug!("Handler for {} replaced", type_name::<C>());
        }
    }

    /// Removes the handler for command kind `C`. Returns true if one existed.
    pub fn remove_handler<C: Command>(&mut self) -> bool {
        self.handlers.remove(&TypeId::of::<C>()).is_some()
    }

    /// Returns true if a handler for command kind `C` is installed.
    pub fn has_handler<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }

    //--- Producers --------------------------------------------------------

    /// Returns a producer handle that feeds this bus.
    pub fn sender(&self) -> CommandSender {
        CommandSender::new(Rc::clone(&self.inbox))
    }

    /// Enqueues a command for delivery on the next drain.
    pub fn push<C: Command>(&self, command: C) {
        self.push_with(command, Trigger::Immediate);
    }

    /// Enqueues a command for delivery after `frames` drains.
    pub fn push_after_frames<C: Command>(&self, command: C, frames: u32) {
        self.push_with(command, Trigger::Frames(frames));
    }

    /// Enqueues a command for delivery once `seconds` of bus time have passed.
    pub fn push_after_seconds<C: Command>(&self, command: C, seconds: f32) {
        self.push_with(command, Trigger::Seconds(seconds));
    }

    /// Enqueues a command with an explicit trigger.
    pub fn push_with<C: Command>(&self, command: C, trigger: Trigger) {
        self.sender().push_with(command, trigger);
    }

    //--- Drain ------------------------------------------------------------

    /// Drains the bus once.
    ///
    /// # Processing Pipeline
    ///
    /// 1. **Ingest**: moves pushed commands into the queue, stamped with the
    ///    current frame counter and clock
    /// 2. **Advance**: increments the frame counter and adds `delta_time`
    ///    to the clock
    /// 3. **Deliver**: hands every due entry, in enqueue order, to the
    ///    handler of its kind; entries not yet due stay queued
    ///
    /// Commands pushed by handlers during step 3 wait for the next drain.
    ///
    /// # Errors
    ///
    /// With [`UnhandledCommands::Error`], returns
    /// [`CommandBusError::Unhandled`] after delivering the rest of the drain
    /// if any due command had no handler.
    pub fn process(&mut self, delta_time: f32) -> Result<DrainReport, CommandBusError> {
        //--- Step 1: Ingest -----------------------------------------------
        self.ingest();

        //--- Step 2: Advance ----------------------------------------------
        self.frame += 1;
        if delta_time.is_finite() && delta_time > 0.0 {
            self.clock += f64::from(delta_time);
        }

        //--- Step 3: Deliver ----------------------------------------------
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.queue)
            .into_iter()
            .partition(|entry| entry.is_due(self.frame, self.clock));
        self.queue = pending;

        let mut report = DrainReport::default();

        for entry in due {
            let command = entry.command;
            match self.handlers.get_mut(&command.kind) {
                Some(handler) => {
                    handler.handle(command.payload.as_ref());
                    report.delivered += 1;
                }
                None => {
                    if self.unhandled == UnhandledCommands::Warn {
                        warn!("No handler for command {}, dropped", command.kind_name);
                    }
                    report.unhandled.push(command.kind_name);
                }
            }
        }

        report.still_pending = self.queue.len() + self.inbox.borrow().len();

        if self.unhandled == UnhandledCommands::Error && !report.unhandled.is_empty() {
            return Err(CommandBusError::Unhandled {
                kinds: report.unhandled,
            });
        }

        Ok(report)
    }

    //--- Query API --------------------------------------------------------

    /// Number of commands waiting for delivery, including unprocessed pushes.
    pub fn pending(&self) -> usize {
        self.queue.len() + self.inbox.borrow().len()
    }

    /// Number of drains performed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Bus time accumulated from drain deltas, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.clock
    }

    /// The unhandled-command policy of this bus.
    pub fn unhandled_policy(&self) -> UnhandledCommands {
        self.unhandled
    }

    //--- Internal Helpers -------------------------------------------------

    fn ingest(&mut self) {
        let (frame, clock) = (self.frame, self.clock);
        let mut inbox = self.inbox.borrow_mut();
        self.queue.extend(inbox.drain(..).map(|command| ScheduledEntry {
            command,
            enqueued_frame: frame,
            enqueued_at: clock,
        }));
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
