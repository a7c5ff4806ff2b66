//! On-screen fire button.

/// Press/release tracking for the touch fire button.
///
/// Pointer callbacks record edges; the arbitration loop consumes each edge
/// exactly once per tick.
#[derive(Clone, Debug, Default)]
pub struct FireButton {
    held: bool,
    pressed_this_frame: bool,
    released_this_frame: bool,
}

impl FireButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer went down on the button. Repeated downs while held are ignored.
    pub fn pointer_down(&mut self) {
        if self.held {
            return;
        }
        self.held = true;
        self.pressed_this_frame = true;
    }

    /// Pointer went up. Ignored when not held.
    pub fn pointer_up(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        self.released_this_frame = true;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Returns the press edge once, then false until the next press.
    pub fn consume_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed_this_frame)
    }

    /// Returns the release edge once, then false until the next release.
    pub fn consume_released(&mut self) -> bool {
        std::mem::take(&mut self.released_this_frame)
    }
}
