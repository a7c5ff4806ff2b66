//! Per-player named keyboard axes.

use super::{InputFrame, InputSource};
use crate::signal::{ControlSignal, FireIntent};

/// Reads the `Vertical{n}` / `Horizontal{n}` axes and the `Fire{n}` button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyboardAxisSource {
    movement_axis: String,
    turn_axis: String,
    fire_button: String,
}

impl KeyboardAxisSource {
    /// Axis names for a player number (player 1 reads `Vertical1`, ...).
    pub fn for_player(player_index: u32) -> Self {
        Self {
            movement_axis: format!("Vertical{player_index}"),
            turn_axis: format!("Horizontal{player_index}"),
            fire_button: format!("Fire{player_index}"),
        }
    }
}

impl InputSource for KeyboardAxisSource {
    fn poll_axes(&mut self, frame: &InputFrame) -> ControlSignal {
        ControlSignal::new(frame.axis(&self.movement_axis), frame.axis(&self.turn_axis))
    }

    fn poll_fire(&mut self, frame: &InputFrame) -> FireIntent {
        frame.button(&self.fire_button).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonState;

    #[test]
    fn test_reads_player_axes() {
        let frame = InputFrame::new()
            .with_axis("Vertical2", 0.5)
            .with_axis("Horizontal2", -0.25)
            .with_axis("Vertical1", 1.0);
        let mut source = KeyboardAxisSource::for_player(2);
        assert_eq!(source.poll_axes(&frame), ControlSignal::new(0.5, -0.25));
    }

    #[test]
    fn test_reads_fire_button() {
        let held = ButtonState {
            pressed: false,
            held: true,
            released: false,
        };
        let frame = InputFrame::new().with_button("Fire1", held);
        let mut source = KeyboardAxisSource::for_player(1);
        assert!(source.poll_fire(&frame).held);
    }
}
