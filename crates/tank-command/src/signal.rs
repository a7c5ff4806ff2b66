//! Control values produced for each tank every tick.

use serde::{Deserialize, Serialize};

/// Normalized drive command consumed by a tank body.
///
/// Both axes are kept in `[-1, 1]`. Positive `turn` is a positive rotation
/// about +Y, which swings a +Z heading toward +X.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSignal {
    /// Throttle (-1 to 1, positive = forward).
    pub movement: f32,
    /// Turn (-1 to 1).
    pub turn: f32,
}

impl ControlSignal {
    /// No throttle, no turn.
    pub const NEUTRAL: Self = Self {
        movement: 0.0,
        turn: 0.0,
    };

    /// Create a signal, clamping both axes to `[-1, 1]`.
    pub fn new(movement: f32, turn: f32) -> Self {
        Self {
            movement: clamp_axis(movement),
            turn: clamp_axis(turn),
        }
    }

    /// Whether either axis is strictly beyond `threshold` in magnitude.
    pub fn magnitude_exceeds(self, threshold: f32) -> bool {
        self.movement.abs() > threshold || self.turn.abs() > threshold
    }

    /// The larger of the two axis magnitudes.
    pub fn strength(self) -> f32 {
        self.movement.abs().max(self.turn.abs())
    }

    /// Whether both axes are exactly zero.
    pub fn is_neutral(self) -> bool {
        self.movement == 0.0 && self.turn == 0.0
    }
}

/// Clamp an axis value to `[-1, 1]`, mapping NaN to zero.
pub fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// Fire button edges and level for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireIntent {
    /// Went down this tick.
    pub pressed: bool,
    /// Is down.
    pub held: bool,
    /// Went up this tick.
    pub released: bool,
}

impl FireIntent {
    /// Nothing pressed.
    pub const IDLE: Self = Self {
        pressed: false,
        held: false,
        released: false,
    };

    /// Whether any part of the intent is set.
    pub fn is_active(self) -> bool {
        self.pressed || self.held || self.released
    }
}

/// Engine sound selection derived from the drive signal.
///
/// The core only classifies; picking and playing clips is left to the audio
/// layer, which reacts to changes reported by the arbitration loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineTone {
    #[default]
    Idling,
    Driving,
}

impl EngineTone {
    /// Idling when both axes are below `idle_threshold`.
    pub fn classify(signal: ControlSignal, idle_threshold: f32) -> Self {
        if signal.movement.abs() < idle_threshold && signal.turn.abs() < idle_threshold {
            Self::Idling
        } else {
            Self::Driving
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_axes() {
        let signal = ControlSignal::new(2.0, -5.0);
        assert_eq!(signal, ControlSignal::new(1.0, -1.0));
        assert_eq!(ControlSignal::new(f32::NAN, 0.5).movement, 0.0);
    }

    #[test]
    fn test_magnitude_exceeds_is_strict() {
        assert!(!ControlSignal::new(0.05, -0.05).magnitude_exceeds(0.05));
        assert!(ControlSignal::new(0.0, -0.06).magnitude_exceeds(0.05));
    }

    #[test]
    fn test_engine_tone_threshold() {
        assert_eq!(
            EngineTone::classify(ControlSignal::new(0.09, -0.09), 0.1),
            EngineTone::Idling
        );
        assert_eq!(
            EngineTone::classify(ControlSignal::new(0.0, 0.1), 0.1),
            EngineTone::Driving
        );
    }
}
