//! Raw input snapshots and the sources that turn them into control values.
//!
//! The host samples its devices once per frame into an [`InputFrame`]. Each
//! [`InputSource`] variant reads what it needs from that frame (or from its
//! own pushed state) and produces a [`ControlSignal`] plus a [`FireIntent`].

mod external;
mod fire_button;
mod joystick;
mod keyboard;
mod pointer;

use std::collections::HashMap;

use glam::Vec2;

use crate::signal::{ControlSignal, FireIntent};

pub use external::ExternalOverrideSource;
pub use fire_button::FireButton;
pub use joystick::VirtualJoystickSource;
pub use keyboard::KeyboardAxisSource;
pub use pointer::{PointerEvent, PointerId, PointerInput, PointerTapSource};

/// A provider of drive axes and fire state.
pub trait InputSource {
    /// Drive axes for this tick.
    fn poll_axes(&mut self, frame: &InputFrame) -> ControlSignal;

    /// Fire state for this tick.
    fn poll_fire(&mut self, frame: &InputFrame) -> FireIntent;
}

/// Edge-detected state of a named button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Went down this frame.
    pub pressed: bool,
    /// Is down.
    pub held: bool,
    /// Went up this frame.
    pub released: bool,
}

impl From<ButtonState> for FireIntent {
    fn from(state: ButtonState) -> Self {
        Self {
            pressed: state.pressed,
            held: state.held,
            released: state.released,
        }
    }
}

/// Everything the host sampled from its devices for one frame.
#[derive(Clone, Debug, Default)]
pub struct InputFrame {
    axes: HashMap<String, f32>,
    buttons: HashMap<String, ButtonState>,
    /// Touch and mouse presses that started this frame.
    pub pointer: PointerInput,
}

impl InputFrame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named axis value.
    pub fn set_axis(&mut self, name: impl Into<String>, value: f32) {
        self.axes.insert(name.into(), value);
    }

    /// Builder form of [`Self::set_axis`].
    #[must_use]
    pub fn with_axis(mut self, name: impl Into<String>, value: f32) -> Self {
        self.set_axis(name, value);
        self
    }

    /// Set a named button state.
    pub fn set_button(&mut self, name: impl Into<String>, state: ButtonState) {
        self.buttons.insert(name.into(), state);
    }

    /// Builder form of [`Self::set_button`].
    #[must_use]
    pub fn with_button(mut self, name: impl Into<String>, state: ButtonState) -> Self {
        self.set_button(name, state);
        self
    }

    /// Record a touch that began this frame. Discovery order is preserved.
    pub fn push_touch_began(&mut self, finger: u64, position: Vec2) {
        self.pointer.touches_began.push((finger, position));
    }

    /// Record a primary mouse button press this frame.
    pub fn set_mouse_down(&mut self, position: Vec2) {
        self.pointer.mouse_down = Some(position);
    }

    /// Value of a named axis; unknown axes read as zero.
    pub fn axis(&self, name: &str) -> f32 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }

    /// State of a named button; unknown buttons read as released.
    pub fn button(&self, name: &str) -> ButtonState {
        self.buttons.get(name).copied().unwrap_or_default()
    }
}
