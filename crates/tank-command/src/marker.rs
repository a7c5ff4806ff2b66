//! Screen-space target marker animation.
//!
//! The marker flies in over an acquired enemy, trails it while it moves, and
//! drifts off and fades when the target is dropped. Screen coordinates use a
//! top-left origin with y pointing down, so "above" is negative y.
//!
//! An anchor that cannot be projected while entering holds the animation
//! where it is until the anchor comes back or the target is cleared. While
//! active, losing the anchor starts the exit.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Animation phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerPhase {
    #[default]
    Hidden,
    Entering,
    Active,
    Exiting,
}

/// Timing and shape of the marker animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerTuning {
    /// Fly-in time in seconds.
    pub entry_duration: f32,
    /// Fade-out time in seconds.
    pub exit_duration: f32,
    /// Where the fly-in starts, relative to the anchor (pixels).
    pub entry_offset: Vec2,
    /// How far the marker drifts while fading out (pixels).
    pub exit_offset: Vec2,
    /// Exponential follow rate while active (1/s).
    pub follow_sharpness: f32,
    /// Height of the anchor above the target's origin (world units).
    pub hover_height: f32,
    /// Vertical bob amplitude (world units).
    pub float_amplitude: f32,
    /// Bob angular speed (rad/s).
    pub float_speed: f32,
}

impl Default for MarkerTuning {
    fn default() -> Self {
        Self {
            entry_duration: 0.18,
            exit_duration: 0.18,
            entry_offset: Vec2::new(0.0, -80.0),
            exit_offset: Vec2::new(0.0, -60.0),
            follow_sharpness: 14.0,
            hover_height: 2.5,
            float_amplitude: 0.25,
            float_speed: 3.0,
        }
    }
}

impl MarkerTuning {
    #[must_use]
    pub fn sanitized(self) -> Self {
        let non_negative = |value: f32| if value.is_finite() { value.max(0.0) } else { 0.0 };
        Self {
            entry_duration: non_negative(self.entry_duration),
            exit_duration: non_negative(self.exit_duration),
            follow_sharpness: non_negative(self.follow_sharpness),
            float_amplitude: non_negative(self.float_amplitude),
            ..self
        }
    }
}

/// Snapshot handed to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MarkerState {
    pub phase: MarkerPhase,
    /// Seconds spent in the current phase.
    pub elapsed: f32,
    /// Start point of the current interpolation.
    pub from: Vec2,
    /// Where to draw the marker.
    pub current: Vec2,
    /// Latest projected anchor.
    pub target: Vec2,
    /// Opacity in `[0, 1]`.
    pub alpha: f32,
}

impl MarkerState {
    pub fn is_visible(&self) -> bool {
        self.phase != MarkerPhase::Hidden
    }
}

/// Drives the single target marker.
#[derive(Clone, Debug, Default)]
pub struct MarkerAnimator {
    tuning: MarkerTuning,
    state: MarkerState,
    /// Whether `from`/`target` were captured from a real projection.
    anchored: bool,
    /// Opacity when the exit began.
    exit_alpha: f32,
    /// Free-running clock for the bob.
    clock: f32,
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

impl MarkerAnimator {
    pub fn new(tuning: MarkerTuning) -> Self {
        Self {
            tuning: tuning.sanitized(),
            ..Self::default()
        }
    }

    pub fn tuning(&self) -> &MarkerTuning {
        &self.tuning
    }

    pub fn state(&self) -> MarkerState {
        self.state
    }

    pub fn phase(&self) -> MarkerPhase {
        self.state.phase
    }

    /// World point the marker tracks for a target at `base`, including the
    /// hover height and the current bob.
    pub fn anchor_world(&self, base: Vec3) -> Vec3 {
        let bob = self.tuning.float_amplitude * (self.clock * self.tuning.float_speed).sin();
        base + Vec3::Y * (self.tuning.hover_height + bob)
    }

    /// Start (or restart) the fly-in toward `anchor`.
    ///
    /// Works from any phase, cancelling an exit in progress. `None` starts
    /// the fly-in without a position; it holds until an anchor arrives.
    pub fn set_target(&mut self, anchor: Option<Vec2>) {
        self.state.phase = MarkerPhase::Entering;
        self.state.elapsed = 0.0;
        self.state.alpha = 0.0;
        self.anchored = false;
        if let Some(anchor) = anchor {
            self.capture(anchor);
        }
    }

    fn capture(&mut self, anchor: Vec2) {
        self.state.target = anchor;
        self.state.from = anchor + self.tuning.entry_offset;
        self.state.current = self.state.from;
        self.anchored = true;
    }

    /// Drop the target. Visible markers start their exit; an exit in
    /// progress keeps running.
    pub fn clear_target(&mut self) {
        match self.state.phase {
            MarkerPhase::Entering | MarkerPhase::Active => self.begin_exit(),
            MarkerPhase::Hidden | MarkerPhase::Exiting => {}
        }
    }

    fn begin_exit(&mut self) {
        if !self.anchored {
            // Never shown anywhere.
            self.hide();
            return;
        }
        self.exit_alpha = self.state.alpha;
        self.state.phase = MarkerPhase::Exiting;
        self.state.elapsed = 0.0;
        self.state.from = self.state.current;
    }

    fn hide(&mut self) {
        self.state = MarkerState {
            phase: MarkerPhase::Hidden,
            ..MarkerState::default()
        };
        self.anchored = false;
        self.exit_alpha = 0.0;
    }

    /// Advance by `dt` seconds. `anchor` is this tick's projected anchor, or
    /// `None` when it cannot be projected.
    pub fn advance(&mut self, dt: f32, anchor: Option<Vec2>) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.clock += dt;

        match self.state.phase {
            MarkerPhase::Hidden => {}
            MarkerPhase::Entering => self.advance_entering(dt, anchor),
            MarkerPhase::Active => {
                let Some(anchor) = anchor else {
                    tracing::debug!("marker anchor lost");
                    self.begin_exit();
                    return;
                };
                self.state.elapsed += dt;
                self.state.target = anchor;
                let factor = 1.0 - (-self.tuning.follow_sharpness * dt).exp();
                self.state.current = approach(self.state.current, anchor, factor);
                self.state.alpha = 1.0;
            }
            MarkerPhase::Exiting => {
                self.state.elapsed += dt;
                let t = progress(self.state.elapsed, self.tuning.exit_duration);
                if t >= 1.0 {
                    self.hide();
                    return;
                }
                let eased = ease_in_cubic(t);
                let end = self.state.from + self.tuning.exit_offset;
                self.state.current = approach(self.state.from, end, eased);
                self.state.alpha = self.exit_alpha * (1.0 - eased);
            }
        }
    }

    fn advance_entering(&mut self, dt: f32, anchor: Option<Vec2>) {
        let Some(anchor) = anchor else {
            tracing::trace!("marker anchor unprojectable, holding");
            return;
        };
        if !self.anchored {
            self.capture(anchor);
        }
        self.state.target = anchor;
        self.state.elapsed += dt;

        let t = progress(self.state.elapsed, self.tuning.entry_duration);
        if t >= 1.0 {
            self.state.phase = MarkerPhase::Active;
            self.state.elapsed = 0.0;
            self.state.current = anchor;
            self.state.alpha = 1.0;
            return;
        }
        let eased = ease_out_cubic(t);
        self.state.current = approach(self.state.from, anchor, eased);
        self.state.alpha = eased;
    }
}

/// Move `t` of the way from `from` to `to`; exact when the two are equal.
fn approach(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

/// Phase progress in `[0, 1]`; a zero duration completes immediately.
fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).min(1.0)
    }
}
