//! Seek-and-stop steering.
//!
//! Pure functions that turn a pose and a target point into a drive signal.
//! There is no hidden integration: the same pose and order always produce
//! the same output, so a tank body can be advanced by any integrator.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::signal::ControlSignal;

/// Smallest stop distance a move order accepts.
pub const MIN_STOP_DISTANCE: f32 = 0.2;

/// Stop distance used when none is configured.
pub const DEFAULT_STOP_DISTANCE: f32 = 1.5;

/// Horizontal offsets shorter than this count as "already there".
const ARRIVAL_EPSILON: f32 = 1e-4;

/// Heading-error thresholds shaping turn and throttle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringTuning {
    /// Heading error (degrees) at which turn input saturates.
    pub full_turn_angle_deg: f32,
    /// Above this heading error (degrees) throttle is halved.
    pub slow_turn_angle_deg: f32,
    /// Above this heading error (degrees) throttle is cut to turn in place.
    pub stop_turn_angle_deg: f32,
}

impl Default for SteeringTuning {
    fn default() -> Self {
        Self {
            full_turn_angle_deg: 45.0,
            slow_turn_angle_deg: 25.0,
            stop_turn_angle_deg: 60.0,
        }
    }
}

impl SteeringTuning {
    /// Keep the thresholds positive and ordered.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let full_turn_angle_deg = positive_or(self.full_turn_angle_deg, defaults.full_turn_angle_deg);
        let slow_turn_angle_deg = positive_or(self.slow_turn_angle_deg, defaults.slow_turn_angle_deg);
        let stop_turn_angle_deg =
            positive_or(self.stop_turn_angle_deg, defaults.stop_turn_angle_deg).max(slow_turn_angle_deg);
        Self {
            full_turn_angle_deg,
            slow_turn_angle_deg,
            stop_turn_angle_deg,
        }
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// A pending destination for one tank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOrder {
    target: Vec3,
    stop_distance: f32,
}

impl MoveOrder {
    /// Create an order, clamping the stop distance to [`MIN_STOP_DISTANCE`].
    pub fn new(target: Vec3, stop_distance: f32) -> Self {
        Self {
            target,
            stop_distance: clamp_stop_distance(stop_distance),
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn stop_distance(&self) -> f32 {
        self.stop_distance
    }
}

/// Clamp a stop distance to the accepted minimum. NaN falls back to the default.
pub fn clamp_stop_distance(stop_distance: f32) -> f32 {
    if stop_distance.is_nan() {
        DEFAULT_STOP_DISTANCE
    } else {
        stop_distance.max(MIN_STOP_DISTANCE)
    }
}

/// Result of one seek evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeekStep {
    /// Still travelling; apply this signal.
    Seeking(ControlSignal),
    /// Within the stop radius; the order is complete.
    Arrived,
}

/// Signed angle in degrees from `from` to `to` about `axis`, in `(-180, 180]`.
///
/// Positive when the rotation from `from` to `to` is a positive rotation
/// about `axis`.
pub fn signed_angle_deg(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let sin = from.cross(to).dot(axis);
    let cos = from.dot(to);
    let angle = sin.atan2(cos).to_degrees();
    if angle <= -180.0 { 180.0 } else { angle }
}

/// One seek-and-stop step toward `order` from the given pose.
pub fn seek(position: Vec3, forward: Vec3, order: &MoveOrder, tuning: &SteeringTuning) -> SeekStep {
    let mut to_target = order.target - position;
    to_target.y = 0.0;

    let distance = to_target.length();
    if distance <= order.stop_distance || distance < ARRIVAL_EPSILON {
        return SeekStep::Arrived;
    }

    let desired = to_target / distance;
    let turn_angle = signed_angle_deg(flat_forward(forward), desired, Vec3::Y);
    let turn = (turn_angle / tuning.full_turn_angle_deg).clamp(-1.0, 1.0);

    // Pitch still scales throttle; only the heading is measured on the ground.
    let alignment = forward.dot(desired).clamp(0.0, 1.0);
    let error = turn_angle.abs();
    let throttle = if error > tuning.stop_turn_angle_deg {
        0.0
    } else if error > tuning.slow_turn_angle_deg {
        alignment * 0.5
    } else {
        alignment
    };

    SeekStep::Seeking(ControlSignal::new(throttle, turn))
}

/// Forward projected onto the ground plane, used for the heading error.
///
/// A forward pointing straight up or down has no heading and yields a zero
/// turn until the body tips back.
fn flat_forward(forward: Vec3) -> Vec3 {
    let flat = Vec3::new(forward.x, 0.0, forward.z);
    flat.try_normalize().unwrap_or(flat)
}

/// Seek-and-stop controller bound to one tank.
///
/// Holds at most one [`MoveOrder`]; new orders replace old ones, arrival and
/// manual input clear it.
#[derive(Clone, Debug, Default)]
pub struct SteeringController {
    order: Option<MoveOrder>,
    tuning: SteeringTuning,
}

impl SteeringController {
    pub fn new(tuning: SteeringTuning) -> Self {
        Self {
            order: None,
            tuning: tuning.sanitized(),
        }
    }

    /// Replace the current order.
    pub fn set_target(&mut self, target: Vec3, stop_distance: f32) {
        self.order = Some(MoveOrder::new(target, stop_distance));
    }

    /// Drop the current order, if any.
    pub fn cancel(&mut self) {
        self.order = None;
    }

    pub fn has_order(&self) -> bool {
        self.order.is_some()
    }

    pub fn order(&self) -> Option<&MoveOrder> {
        self.order.as_ref()
    }

    pub fn tuning(&self) -> &SteeringTuning {
        &self.tuning
    }

    /// Drive signal for this tick.
    ///
    /// Returns neutral without an order. Reaching the stop radius clears the
    /// order, so later ticks stay neutral until a new one is issued.
    pub fn evaluate(&mut self, position: Vec3, forward: Vec3) -> ControlSignal {
        let Some(order) = self.order else {
            return ControlSignal::NEUTRAL;
        };
        match seek(position, forward, &order, &self.tuning) {
            SeekStep::Seeking(signal) => signal,
            SeekStep::Arrived => {
                tracing::debug!(target = ?order.target(), "move order reached");
                self.order = None;
                ControlSignal::NEUTRAL
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::{TankBody, TankKinematics};
    use proptest::prelude::*;

    fn controller() -> SteeringController {
        SteeringController::new(SteeringTuning::default())
    }

    #[test]
    fn test_aligned_target_full_throttle() {
        let mut steering = controller();
        steering.set_target(Vec3::new(0.0, 0.0, 10.0), 1.5);
        let signal = steering.evaluate(Vec3::ZERO, Vec3::Z);
        assert_eq!(signal.turn, 0.0);
        assert_eq!(signal.movement, 1.0);
    }

    #[test]
    fn test_right_angle_turns_in_place() {
        let order = MoveOrder::new(Vec3::new(10.0, 0.0, 0.0), 1.5);
        let angle = signed_angle_deg(Vec3::Z, Vec3::X, Vec3::Y);
        assert!((angle - 90.0).abs() < 1e-4);

        let SeekStep::Seeking(signal) = seek(Vec3::ZERO, Vec3::Z, &order, &SteeringTuning::default())
        else {
            panic!("expected seeking");
        };
        assert_eq!(signal.turn, 1.0);
        assert_eq!(signal.movement, 0.0);
    }

    #[test]
    fn test_moderate_error_halves_throttle() {
        // 30 degrees to the left of +Z.
        let target = Vec3::new(-(30f32.to_radians().sin()), 0.0, 30f32.to_radians().cos()) * 10.0;
        let order = MoveOrder::new(target, 1.5);
        let SeekStep::Seeking(signal) = seek(Vec3::ZERO, Vec3::Z, &order, &SteeringTuning::default())
        else {
            panic!("expected seeking");
        };
        let expected = 30f32.to_radians().cos() * 0.5;
        assert!((signal.movement - expected).abs() < 1e-4);
        assert!((signal.turn + 30.0 / 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_vertical_offset_ignored() {
        let order = MoveOrder::new(Vec3::new(0.0, 50.0, 1.0), 1.5);
        assert_eq!(
            seek(Vec3::ZERO, Vec3::Z, &order, &SteeringTuning::default()),
            SeekStep::Arrived
        );
    }

    #[test]
    fn test_pitched_forward_scales_throttle() {
        let order = MoveOrder::new(Vec3::new(0.0, 0.0, 10.0), 1.5);
        let nose_up = Vec3::new(0.0, 0.6, 0.8);
        let SeekStep::Seeking(signal) = seek(Vec3::ZERO, nose_up, &order, &SteeringTuning::default())
        else {
            panic!("expected seeking");
        };
        assert_eq!(signal.turn, 0.0);
        assert!((signal.movement - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_signed_angle_reports_half_turn_as_positive() {
        assert!(signed_angle_deg(Vec3::Z, Vec3::NEG_Z, Vec3::Y) > 179.99);
        assert!(signed_angle_deg(Vec3::Z, Vec3::new(-0.0, 0.0, -1.0), Vec3::Y) > 179.99);
        assert!(signed_angle_deg(Vec3::X, Vec3::NEG_X, Vec3::Y) > 179.99);
        assert!((signed_angle_deg(Vec3::Z, Vec3::X, Vec3::Y) - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_stop_distance_clamped() {
        assert_eq!(MoveOrder::new(Vec3::ZERO, 0.0).stop_distance(), MIN_STOP_DISTANCE);
        assert_eq!(MoveOrder::new(Vec3::ZERO, 3.0).stop_distance(), 3.0);
    }

    #[test]
    fn test_arrival_clears_order() {
        let mut steering = controller();
        steering.set_target(Vec3::new(0.0, 0.0, 10.0), 1.5);
        let signal = steering.evaluate(Vec3::new(0.0, 0.0, 9.0), Vec3::Z);
        assert!(signal.is_neutral());
        assert!(!steering.has_order());
        assert!(steering.evaluate(Vec3::ZERO, Vec3::Z).is_neutral());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let mut steering = controller();
        steering.set_target(Vec3::new(4.0, 0.0, 7.0), 1.5);
        let a = steering.evaluate(Vec3::ZERO, Vec3::Z);
        let b = steering.evaluate(Vec3::ZERO, Vec3::Z);
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn seek_terminates(
            x in -40.0f32..40.0,
            z in -40.0f32..40.0,
            yaw_deg in -180.0f32..180.0,
            stop in 0.2f32..4.0,
        ) {
            let target = Vec3::new(x, 0.0, z);
            prop_assume!(target.length() > stop + 0.01);

            let kinematics = TankKinematics::default();
            let mut body = TankBody::new(Vec3::ZERO, yaw_deg.to_radians());
            let mut steering = controller();
            steering.set_target(target, stop);

            let dt = 1.0 / 60.0;
            let mut ticks = 0;
            while steering.has_order() {
                let signal = steering.evaluate(body.position, body.forward());
                body = kinematics.integrate(body, signal, dt);
                ticks += 1;
                prop_assert!(ticks < 20_000, "did not arrive");
            }

            let mut flat = target - body.position;
            flat.y = 0.0;
            prop_assert!(flat.length() <= stop);
            for _ in 0..5 {
                prop_assert!(steering.evaluate(body.position, body.forward()).is_neutral());
            }
        }
    }
}
