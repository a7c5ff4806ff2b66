//! Tap and click input.

use glam::Vec2;

use super::{InputFrame, InputSource};
use crate::signal::{ControlSignal, FireIntent};

/// Which pointer produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerId {
    /// The primary mouse button.
    Mouse,
    /// A touch, identified by its finger id.
    Touch(u64),
}

/// A single pointer press in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Vec2,
    pub pointer: PointerId,
}

/// Pointer presses that started during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Touches that began, in discovery order.
    pub touches_began: Vec<(u64, Vec2)>,
    /// Primary mouse button press position, if pressed this frame.
    pub mouse_down: Option<Vec2>,
}

impl PointerInput {
    /// The one press honored this frame.
    ///
    /// A newly began touch beats a mouse press; among touches the first
    /// discovered wins.
    pub fn resolve(&self) -> Option<PointerEvent> {
        if let Some(&(finger, position)) = self.touches_began.first() {
            return Some(PointerEvent {
                position,
                pointer: PointerId::Touch(finger),
            });
        }
        self.mouse_down.map(|position| PointerEvent {
            position,
            pointer: PointerId::Mouse,
        })
    }
}

/// Tap-to-move source.
///
/// Taps never drive the axes directly; the resolved tap is handed to the
/// pointer command resolver, which turns it into a move order or a target.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerTapSource;

impl PointerTapSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// This frame's tap, if any.
    #[allow(clippy::unused_self)]
    pub fn poll_tap(&self, frame: &InputFrame) -> Option<PointerEvent> {
        frame.pointer.resolve()
    }
}

impl InputSource for PointerTapSource {
    fn poll_axes(&mut self, _frame: &InputFrame) -> ControlSignal {
        ControlSignal::NEUTRAL
    }

    fn poll_fire(&mut self, _frame: &InputFrame) -> FireIntent {
        FireIntent::IDLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touch_beats_mouse() {
        let mut frame = InputFrame::new();
        frame.set_mouse_down(Vec2::new(10.0, 10.0));
        frame.push_touch_began(7, Vec2::new(50.0, 60.0));
        frame.push_touch_began(3, Vec2::new(90.0, 90.0));

        let event = PointerTapSource::new().poll_tap(&frame).unwrap();
        assert_eq!(event.pointer, PointerId::Touch(7));
        assert_eq!(event.position, Vec2::new(50.0, 60.0));
    }

    #[test]
    fn test_mouse_when_no_touch() {
        let mut frame = InputFrame::new();
        frame.set_mouse_down(Vec2::new(10.0, 20.0));
        let event = frame.pointer.resolve().unwrap();
        assert_eq!(event.pointer, PointerId::Mouse);
    }

    #[test]
    fn test_no_press_no_event() {
        let mut tap = PointerTapSource::new();
        assert!(tap.poll_tap(&InputFrame::new()).is_none());
        assert!(tap.poll_axes(&InputFrame::new()).is_neutral());
    }
}
