//=========================================================================
// Command Sender
//=========================================================================
//
// Cloneable producer handle for a CommandBus.
//
// Pushes land in an inbox shared with the bus and are ingested at the
// start of the next drain, so handlers and scene views may push while
// the bus itself is draining.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use super::schedule::{PendingCommand, Trigger};
use super::Command;

//=========================================================================

pub(super) type Inbox = Rc<RefCell<VecDeque<PendingCommand>>>;

/// Pushes commands into a [`CommandBus`](super::CommandBus) without
/// borrowing it.
#[derive(Clone)]
pub struct CommandSender {
    inbox: Inbox,
}

impl CommandSender {
    pub(super) fn new(inbox: Inbox) -> Self {
        Self { inbox }
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
        self.inbox
            .borrow_mut()
            .push_back(PendingCommand::new(command, trigger));
    }
}
