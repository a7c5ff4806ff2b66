//! Programmatic input pushed by scripts, replays, or on-screen controls.

use super::{InputFrame, InputSource};
use crate::signal::{ControlSignal, FireIntent, clamp_axis};

/// Holds the last externally pushed axes and fire state.
///
/// Axes and fire are enabled independently and stay in effect until the
/// matching `disable_*` call, which resets them to neutral. The `pressed`
/// and `released` edges are reported by exactly one poll; `held` persists.
#[derive(Clone, Debug, Default)]
pub struct ExternalOverrideSource {
    axes: Option<ControlSignal>,
    fire: Option<FireIntent>,
}

impl ExternalOverrideSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push drive axes, clamped to `[-1, 1]`.
    pub fn set_axes(&mut self, movement: f32, turn: f32) {
        self.axes = Some(ControlSignal::new(clamp_axis(movement), clamp_axis(turn)));
    }

    /// Push fire state.
    pub fn set_fire(&mut self, pressed: bool, held: bool, released: bool) {
        self.fire = Some(FireIntent {
            pressed,
            held,
            released,
        });
    }

    /// Hand axes back to manual input.
    pub fn disable_axes(&mut self) {
        self.axes = None;
    }

    /// Hand fire back to manual input.
    pub fn disable_fire(&mut self) {
        self.fire = None;
    }

    /// Hand both axes and fire back to manual input.
    pub fn disable(&mut self) {
        self.disable_axes();
        self.disable_fire();
    }

    pub fn axes_enabled(&self) -> bool {
        self.axes.is_some()
    }

    pub fn fire_enabled(&self) -> bool {
        self.fire.is_some()
    }

    /// Take the fire state, clearing the one-shot edges.
    fn consume_fire(&mut self) -> FireIntent {
        let Some(fire) = self.fire.as_mut() else {
            return FireIntent::IDLE;
        };
        let intent = *fire;
        fire.pressed = false;
        fire.released = false;
        intent
    }
}

impl InputSource for ExternalOverrideSource {
    fn poll_axes(&mut self, _frame: &InputFrame) -> ControlSignal {
        self.axes.unwrap_or(ControlSignal::NEUTRAL)
    }

    fn poll_fire(&mut self, _frame: &InputFrame) -> FireIntent {
        self.consume_fire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_clamped() {
        let mut source = ExternalOverrideSource::new();
        source.set_axes(2.0, -5.0);
        let frame = InputFrame::new();
        assert_eq!(source.poll_axes(&frame), ControlSignal::new(1.0, -1.0));
        assert!(source.axes_enabled());
    }

    #[test]
    fn test_disable_resets_to_neutral() {
        let mut source = ExternalOverrideSource::new();
        source.set_axes(0.5, 0.5);
        source.disable_axes();
        assert!(!source.axes_enabled());
        assert!(source.poll_axes(&InputFrame::new()).is_neutral());

        source.set_axes(0.5, 0.5);
        source.set_fire(false, true, false);
        source.disable();
        assert!(!source.axes_enabled());
        assert!(!source.fire_enabled());
        assert_eq!(source.poll_fire(&InputFrame::new()), FireIntent::IDLE);
    }

    #[test]
    fn test_fire_edges_consumed_once() {
        let mut source = ExternalOverrideSource::new();
        source.set_fire(true, true, false);
        let frame = InputFrame::new();

        let first = source.poll_fire(&frame);
        assert!(first.pressed && first.held);

        let second = source.poll_fire(&frame);
        assert!(!second.pressed);
        assert!(second.held);
    }
}
