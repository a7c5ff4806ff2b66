//! Launch-force charging for a tank's gun.
//!
//! Pressing fire starts a charge at the minimum force. Holding it raises the
//! force linearly; releasing fires. A charge that reaches the maximum fires
//! on its own on the next tick.

use serde::{Deserialize, Serialize};

use crate::signal::FireIntent;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeTuning {
    pub min_launch_force: f32,
    pub max_launch_force: f32,
    /// Seconds from minimum to maximum force.
    pub max_charge_time: f32,
}

impl Default for ChargeTuning {
    fn default() -> Self {
        Self {
            min_launch_force: 15.0,
            max_launch_force: 30.0,
            max_charge_time: 0.75,
        }
    }
}

impl ChargeTuning {
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let min_launch_force = if self.min_launch_force.is_finite() {
            self.min_launch_force.max(0.0)
        } else {
            defaults.min_launch_force
        };
        let max_launch_force = if self.max_launch_force.is_finite() {
            self.max_launch_force.max(min_launch_force)
        } else {
            defaults.max_launch_force.max(min_launch_force)
        };
        let max_charge_time = if self.max_charge_time.is_finite() && self.max_charge_time > 0.0 {
            self.max_charge_time
        } else {
            defaults.max_charge_time
        };
        Self {
            min_launch_force,
            max_launch_force,
            max_charge_time,
        }
    }

    /// Force gained per second of holding.
    pub fn charge_speed(&self) -> f32 {
        (self.max_launch_force - self.min_launch_force) / self.max_charge_time
    }
}

/// A shell leaving the barrel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    pub launch_force: f32,
}

#[derive(Clone, Debug)]
pub struct FireCharge {
    tuning: ChargeTuning,
    current_force: f32,
    /// The current press already produced its shot (or no press happened yet).
    fired: bool,
}

impl Default for FireCharge {
    fn default() -> Self {
        Self::new(ChargeTuning::default())
    }
}

impl FireCharge {
    pub fn new(tuning: ChargeTuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            current_force: tuning.min_launch_force,
            tuning,
            fired: true,
        }
    }

    pub fn tuning(&self) -> &ChargeTuning {
        &self.tuning
    }

    /// Force the next shot would leave with; drives an aim gauge.
    pub fn current_force(&self) -> f32 {
        self.current_force
    }

    pub fn is_charging(&self) -> bool {
        !self.fired
    }

    /// Apply one tick of fire input. Returns the shot fired this tick, if any.
    pub fn update(&mut self, intent: FireIntent, dt: f32) -> Option<Shot> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if !self.fired && self.current_force >= self.tuning.max_launch_force {
            self.current_force = self.tuning.max_launch_force;
            return Some(self.fire());
        }
        if intent.pressed {
            self.fired = false;
            self.current_force = self.tuning.min_launch_force;
            tracing::trace!("charging");
        } else if intent.held && !self.fired {
            self.current_force += self.tuning.charge_speed() * dt;
        } else if intent.released && !self.fired {
            return Some(self.fire());
        }
        None
    }

    fn fire(&mut self) -> Shot {
        let shot = Shot {
            launch_force: self.current_force,
        };
        self.fired = true;
        self.current_force = self.tuning.min_launch_force;
        tracing::debug!(launch_force = shot.launch_force, "fired");
        shot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESS: FireIntent = FireIntent {
        pressed: true,
        held: true,
        released: false,
    };
    const HOLD: FireIntent = FireIntent {
        pressed: false,
        held: true,
        released: false,
    };
    const RELEASE: FireIntent = FireIntent {
        pressed: false,
        held: false,
        released: true,
    };

    #[test]
    fn test_release_fires_charged_force() {
        let mut charge = FireCharge::default();
        assert!(charge.update(PRESS, 0.1).is_none());
        assert!(charge.update(HOLD, 0.25).is_none());
        let shot = charge.update(RELEASE, 0.1).unwrap();
        assert!((shot.launch_force - 20.0).abs() < 1e-4);
        assert_eq!(charge.current_force(), 15.0);
    }

    #[test]
    fn test_max_charge_fires_once() {
        let mut charge = FireCharge::default();
        charge.update(PRESS, 0.0);
        charge.update(HOLD, 1.0);
        let shot = charge.update(HOLD, 0.1).unwrap();
        assert_eq!(shot.launch_force, 30.0);

        assert!(charge.update(HOLD, 0.1).is_none());
        assert!(charge.update(RELEASE, 0.1).is_none());
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut charge = FireCharge::default();
        assert!(charge.update(RELEASE, 0.1).is_none());
        assert!(charge.update(HOLD, 0.1).is_none());
        assert_eq!(charge.current_force(), 15.0);
    }

    #[test]
    fn test_press_restarts_charge() {
        let mut charge = FireCharge::default();
        charge.update(PRESS, 0.0);
        charge.update(HOLD, 0.5);
        charge.update(PRESS, 0.0);
        assert_eq!(charge.current_force(), 15.0);
        assert!(charge.is_charging());
    }
}
