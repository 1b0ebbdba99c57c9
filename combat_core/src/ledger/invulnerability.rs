//! InvulnerabilityWindow - Timed damage immunity after being hit

use crate::types::TIME_EPSILON;
use serde::{Deserialize, Serialize};

/// The two gate states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvulnerabilityState {
    Vulnerable,
    Invulnerable,
}

/// Countdown gate that rejects incoming damage while active
///
/// Triggers set the remaining time rather than adding to it, so a manual
/// trigger overrides the automatic one. The window closes on the tick that
/// brings the remaining time to zero: after exactly `duration` seconds the
/// owner is vulnerable again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvulnerabilityWindow {
    active: bool,
    remaining: f64,
    /// Duration used by [`InvulnerabilityWindow::trigger_default`]
    pub default_duration: f64,
}

impl InvulnerabilityWindow {
    pub fn new(default_duration: f64) -> Self {
        InvulnerabilityWindow {
            active: false,
            remaining: 0.0,
            default_duration,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> InvulnerabilityState {
        if self.active {
            InvulnerabilityState::Invulnerable
        } else {
            InvulnerabilityState::Vulnerable
        }
    }

    /// Seconds until the window closes (0 when vulnerable)
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Open the window for `duration` seconds, overriding any running countdown
    ///
    /// Returns false (and leaves the state alone) for non-positive durations.
    pub fn trigger(&mut self, duration: f64) -> bool {
        if !(duration > 0.0) {
            return false;
        }
        self.active = true;
        self.remaining = duration;
        true
    }

    /// Open the window for the configured default duration
    pub fn trigger_default(&mut self) -> bool {
        self.trigger(self.default_duration)
    }

    /// Advance the countdown. Returns true on the tick the window closes.
    pub fn tick(&mut self, delta: f64) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= delta;
        if self.remaining <= TIME_EPSILON {
            self.remaining = 0.0;
            self.active = false;
            return true;
        }
        false
    }
}

impl Default for InvulnerabilityWindow {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_and_expire() {
        let mut window = InvulnerabilityWindow::new(1.0);
        assert_eq!(window.state(), InvulnerabilityState::Vulnerable);

        assert!(window.trigger_default());
        assert!(window.is_active());

        assert!(!window.tick(0.5));
        assert!(window.is_active());
        assert!(window.tick(0.5));
        assert!(!window.is_active());
        assert_eq!(window.remaining(), 0.0);
    }

    #[test]
    fn test_boundary_just_before_duration() {
        let mut window = InvulnerabilityWindow::new(1.0);
        window.trigger_default();
        window.tick(1.0 - 1e-3);
        assert!(window.is_active());
        window.tick(1e-3);
        assert!(!window.is_active());
    }

    #[test]
    fn test_manual_trigger_overrides() {
        let mut window = InvulnerabilityWindow::new(1.0);
        window.trigger_default();
        window.trigger(3.0);
        assert!((window.remaining() - 3.0).abs() < f64::EPSILON);

        // A shorter trigger also overrides rather than stacking
        window.trigger(0.25);
        assert!((window.remaining() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let mut window = InvulnerabilityWindow::new(0.0);
        assert!(!window.trigger_default());
        assert!(!window.trigger(-1.0));
        assert!(!window.is_active());
    }

    #[test]
    fn test_tick_while_vulnerable_is_noop() {
        let mut window = InvulnerabilityWindow::new(1.0);
        assert!(!window.tick(5.0));
        assert_eq!(window.remaining(), 0.0);
    }
}
