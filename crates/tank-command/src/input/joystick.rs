//! On-screen virtual joystick.

use glam::Vec2;

use super::{InputFrame, InputSource};
use crate::signal::{ControlSignal, FireIntent};

/// Stick driven by pointer press/drag/release on a joystick widget.
///
/// Points are local to the widget center. The stick is the point clamped to
/// `radius` and divided by it, so it always lies in the unit circle.
#[derive(Clone, Debug)]
pub struct VirtualJoystickSource {
    radius: f32,
    stick: Vec2,
    engaged: bool,
}

impl VirtualJoystickSource {
    /// Create a joystick with the given clamp radius in widget units.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            stick: Vec2::ZERO,
            engaged: false,
        }
    }

    /// Change the clamp radius. Non-positive radii are ignored.
    pub fn set_radius(&mut self, radius: f32) {
        if radius > 0.0 {
            self.radius = radius;
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Pointer went down on the widget.
    pub fn press(&mut self, local_point: Vec2) {
        self.engaged = true;
        self.drag(local_point);
    }

    /// Pointer moved while held.
    pub fn drag(&mut self, local_point: Vec2) {
        if !self.engaged {
            return;
        }
        self.stick = if self.radius > 0.0 && local_point.is_finite() {
            local_point.clamp_length_max(self.radius) / self.radius
        } else {
            Vec2::ZERO
        };
    }

    /// Pointer released; the stick recenters.
    pub fn release(&mut self) {
        self.engaged = false;
        self.stick = Vec2::ZERO;
    }

    /// Current stick vector in the unit circle.
    pub fn direction(&self) -> Vec2 {
        self.stick
    }

    /// Handle offset in widget units, for drawing the knob.
    pub fn handle_offset(&self) -> Vec2 {
        self.stick * self.radius
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Stick as drive axes: `turn = x`, `movement = y`.
    pub fn signal(&self) -> ControlSignal {
        ControlSignal::new(self.stick.y, self.stick.x)
    }
}

impl Default for VirtualJoystickSource {
    fn default() -> Self {
        Self::new(80.0)
    }
}

impl InputSource for VirtualJoystickSource {
    fn poll_axes(&mut self, _frame: &InputFrame) -> ControlSignal {
        self.signal()
    }

    fn poll_fire(&mut self, _frame: &InputFrame) -> FireIntent {
        FireIntent::IDLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stick_clamped_to_unit_circle() {
        let mut stick = VirtualJoystickSource::new(80.0);
        stick.press(Vec2::new(160.0, 0.0));
        assert_eq!(stick.direction(), Vec2::new(1.0, 0.0));
        assert_eq!(stick.signal(), ControlSignal::new(0.0, 1.0));

        stick.drag(Vec2::new(0.0, 40.0));
        assert_eq!(stick.signal(), ControlSignal::new(0.5, 0.0));
    }

    #[test]
    fn test_drag_without_press_is_ignored() {
        let mut stick = VirtualJoystickSource::new(80.0);
        stick.drag(Vec2::new(40.0, 40.0));
        assert_eq!(stick.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_release_recenters() {
        let mut stick = VirtualJoystickSource::new(80.0);
        stick.press(Vec2::new(-30.0, 50.0));
        stick.release();
        assert!(stick.signal().is_neutral());
        assert!(!stick.is_engaged());
    }
}
