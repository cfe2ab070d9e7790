//=========================================================================
// Schedule
//=========================================================================
//
// Delivery triggers and the queued entries they belong to.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{type_name, Any, TypeId};

use log::warn;

//=== Internal Dependencies ===============================================

use super::Command;

//=== Trigger =============================================================

/// When a pushed command becomes due.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Trigger {
    /// Delivered on the next drain.
    #[default]
    Immediate,

    /// Delivered on the first drain after `n` drains have elapsed since
    /// the push. `Frames(0)` behaves like [`Trigger::Immediate`].
    Frames(u32),

    /// Delivered on the first drain at which at least this many seconds of
    /// bus time have elapsed since the push.
    Seconds(f32),
}

impl Trigger {
    /// Normalizes a trigger: negative or non-finite delays become zero.
    pub(super) fn sanitized(self) -> Self {
        match self {
            Trigger::Seconds(seconds) if !seconds.is_finite() || seconds < 0.0 => {
                warn!("Invalid command delay {}s, delivering on next drain", seconds);
                Trigger::Seconds(0.0)
            }
            other => other,
        }
    }

    /// Returns true once the trigger condition holds.
    ///
    /// `drains` counts drains since the push, including the current one.
    /// `elapsed` is bus time since the push, in seconds.
    fn is_due(&self, drains: u64, elapsed: f64) -> bool {
        match *self {
            Trigger::Immediate => true,
            Trigger::Frames(frames) => drains > u64::from(frames),
            Trigger::Seconds(seconds) => elapsed >= f64::from(seconds),
        }
    }
}

//=== PendingCommand ======================================================

/// A pushed command that the bus has not ingested yet.
pub(super) struct PendingCommand {
    pub kind: TypeId,
    pub kind_name: &'static str,
    pub payload: Box<dyn Any>,
    pub trigger: Trigger,
}

impl PendingCommand {
    pub fn new<C: Command>(command: C, trigger: Trigger) -> Self {
        Self {
            kind: TypeId::of::<C>(),
            kind_name: type_name::<C>(),
            payload: Box::new(command),
            trigger: trigger.sanitized(),
        }
    }
}

//=== ScheduledEntry ======================================================

/// A command held in the bus queue together with its enqueue stamp.
pub(super) struct ScheduledEntry {
    pub command: PendingCommand,
    pub enqueued_frame: u64,
    pub enqueued_at: f64,
}

impl ScheduledEntry {
    pub fn is_due(&self, frame: u64, clock: f64) -> bool {
        self.command
            .trigger
            .is_due(frame - self.enqueued_frame, clock - self.enqueued_at)
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_is_always_due() {
        assert!(Trigger::Immediate.is_due(1, 0.0));
    }

    #[test]
    fn frames_due_after_n_drains() {
        let trigger = Trigger::Frames(3);
        assert!(!trigger.is_due(1, 0.0));
        assert!(!trigger.is_due(3, 0.0));
        assert!(trigger.is_due(4, 0.0));
    }

    #[test]
    fn zero_frames_behaves_like_immediate() {
        assert!(Trigger::Frames(0).is_due(1, 0.0));
    }

    #[test]
    fn seconds_due_at_threshold() {
        let trigger = Trigger::Seconds(2.0);
        assert!(!trigger.is_due(10, 1.5));
        assert!(trigger.is_due(10, 2.0));
        assert!(trigger.is_due(1, 3.0));
    }

    #[test]
    fn invalid_delays_are_clamped() {
        assert_eq!(Trigger::Seconds(-1.0).sanitized(), Trigger::Seconds(0.0));
        assert_eq!(Trigger::Seconds(f32::NAN).sanitized(), Trigger::Seconds(0.0));
        assert_eq!(Trigger::Seconds(f32::INFINITY).sanitized(), Trigger::Seconds(0.0));
        assert_eq!(Trigger::Frames(5).sanitized(), Trigger::Frames(5));
    }

    #[test]
    fn entry_measures_since_enqueue() {
        let entry = ScheduledEntry {
            command: PendingCommand::new("payload", Trigger::Frames(2)),
            enqueued_frame: 10,
            enqueued_at: 4.0,
        };

        assert!(!entry.is_due(12, 5.0));
        assert!(entry.is_due(13, 5.0));
    }
}
