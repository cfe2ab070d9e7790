//=========================================================================
// Frame Clock
//=========================================================================
//
// Framework-scope service tracking tick count and elapsed time. It is
// registered when the framework is built and advanced by the framework
// scope's update sweep.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::lifecycle::{Initializable, Updatable};

//=== FrameClock ==========================================================

/// Tick counter and time accumulator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameClock {
    frame: u64,
    delta: f32,
    elapsed: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks seen since initialization.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Delta of the most recent tick, in seconds.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Seconds accumulated since initialization.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Initializable for FrameClock {
    fn initialize(&mut self) {
        *self = Self::default();
    }
}

impl Updatable for FrameClock {
    fn update(&mut self, delta_time: f32) {
        self.frame += 1;
        self.delta = delta_time;
        self.elapsed += f64::from(delta_time);
    }
}

crate::service!(FrameClock: Initializable, Updatable);

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ObjectRegistry;

    #[test]
    fn advances_with_scope_updates() {
        let mut scope = ObjectRegistry::new();
        let clock = scope.register_singleton(FrameClock::new());
        scope.initialize_scene_objects();

        scope.update(0.5);
        scope.update(0.25);

        let clock = clock.borrow();
        assert_eq!(clock.frame(), 2);
        assert_eq!(clock.delta(), 0.25);
        assert_eq!(clock.elapsed(), 0.75);
    }

    #[test]
    fn initialize_resets() {
        let mut clock = FrameClock::new();
        clock.update(1.0);
        clock.initialize();
        assert_eq!(clock, FrameClock::default());
    }
}
