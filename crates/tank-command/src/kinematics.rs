//! Reference tank integrator.
//!
//! Moves a body along its heading and yaws it from a [`ControlSignal`], the
//! way a simple kinematic tank does. Games apply signals through their own
//! physics; this exists for the simulator, the sandbox, and tests.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::signal::ControlSignal;

/// Speed limits for the reference integrator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankKinematics {
    /// Ground speed at full throttle (m/s).
    pub speed: f32,
    /// Yaw rate at full turn (degrees/s).
    pub turn_speed_deg: f32,
}

impl Default for TankKinematics {
    fn default() -> Self {
        Self {
            speed: 12.0,
            turn_speed_deg: 180.0,
        }
    }
}

/// Planar tank pose.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TankBody {
    pub position: Vec3,
    /// Rotation about +Y in radians; zero faces +Z.
    pub yaw: f32,
}

impl TankBody {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Unit heading on the ground plane.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos())
    }
}

impl TankKinematics {
    /// Advance `body` by `dt` seconds under `signal`.
    ///
    /// Turns first, then moves along the new heading.
    #[must_use]
    pub fn integrate(&self, body: TankBody, signal: ControlSignal, dt: f32) -> TankBody {
        let yaw = wrap_angle(body.yaw + (signal.turn * self.turn_speed_deg * dt).to_radians());
        let turned = TankBody {
            position: body.position,
            yaw,
        };
        let position = body.position + turned.forward() * (signal.movement * self.speed * dt);
        TankBody { position, yaw }
    }
}

/// Wrap an angle in radians to `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_matches_rotation() {
        let body = TankBody::new(Vec3::ZERO, 0.7);
        let expected = body.rotation() * Vec3::Z;
        assert!((body.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn test_full_throttle_moves_along_heading() {
        let kinematics = TankKinematics::default();
        let body = kinematics.integrate(TankBody::default(), ControlSignal::new(1.0, 0.0), 0.5);
        assert!((body.position - Vec3::new(0.0, 0.0, 6.0)).length() < 1e-5);
    }

    #[test]
    fn test_positive_turn_swings_toward_positive_x() {
        let kinematics = TankKinematics::default();
        let body = kinematics.integrate(TankBody::default(), ControlSignal::new(0.0, 1.0), 0.5);
        assert!((body.forward() - Vec3::X).length() < 1e-5);
    }
}
