//! Per-tank controllers.
//!
//! A [`TankDriver`] picks one drive signal per tick from its competing
//! sources; a [`TankGunner`] does the same for fire input and charges the
//! gun.

use glam::Vec3;

use crate::charge::{ChargeTuning, FireCharge, Shot};
use crate::input::{ExternalOverrideSource, InputFrame, InputSource, KeyboardAxisSource};
use crate::signal::{ControlSignal, EngineTone, FireIntent};
use crate::steering::{SteeringController, SteeringTuning};
use crate::world::{Vehicle, VehicleId};

/// Which source produced a drive signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveSource {
    Steering,
    External,
    Manual,
}

/// Thresholds a driver compares signals against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveThresholds {
    /// Manual input stronger than this cancels a move order.
    pub manual_override: f32,
    /// Both axes below this count as idling.
    pub engine_idle: f32,
}

impl Default for DriveThresholds {
    fn default() -> Self {
        Self {
            manual_override: 0.05,
            engine_idle: 0.1,
        }
    }
}

/// Result of one [`TankDriver::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveUpdate {
    pub signal: ControlSignal,
    pub source: DriveSource,
    /// Set when the engine tone changed this tick.
    pub tone_change: Option<EngineTone>,
}

/// Drive arbitration for one tank.
///
/// Precedence, highest first: a pending move order, an enabled external
/// override, manual axes. Manual input past the override threshold cancels
/// the move order before anything is evaluated.
#[derive(Clone, Debug)]
pub struct TankDriver {
    id: VehicleId,
    keyboard: KeyboardAxisSource,
    external: ExternalOverrideSource,
    steering: SteeringController,
    thresholds: DriveThresholds,
    signal: ControlSignal,
    tone: EngineTone,
    aim: Option<Vec3>,
}

impl TankDriver {
    pub fn new(
        id: VehicleId,
        player_index: u32,
        steering: SteeringTuning,
        thresholds: DriveThresholds,
    ) -> Self {
        Self {
            id,
            keyboard: KeyboardAxisSource::for_player(player_index),
            external: ExternalOverrideSource::new(),
            steering: SteeringController::new(steering),
            thresholds,
            signal: ControlSignal::NEUTRAL,
            tone: EngineTone::Idling,
            aim: None,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// Signal chosen by the latest update.
    pub fn signal(&self) -> ControlSignal {
        self.signal
    }

    pub fn engine_tone(&self) -> EngineTone {
        self.tone
    }

    pub fn steering(&self) -> &SteeringController {
        &self.steering
    }

    pub fn has_move_target(&self) -> bool {
        self.steering.has_order()
    }

    /// Drive to `target`. Takes over from any external axis override.
    pub fn set_move_target(&mut self, target: Vec3, stop_distance: f32) {
        self.steering.set_target(target, stop_distance);
        self.external.disable_axes();
    }

    pub fn clear_move_target(&mut self) {
        self.steering.cancel();
    }

    pub fn set_external_axes(&mut self, movement: f32, turn: f32) {
        self.external.set_axes(movement, turn);
    }

    pub fn disable_external_axes(&mut self) {
        self.external.disable_axes();
    }

    pub fn external_axes_enabled(&self) -> bool {
        self.external.axes_enabled()
    }

    /// Unit direction the turret should face, if an enemy is acquired.
    pub fn aim(&self) -> Option<Vec3> {
        self.aim
    }

    pub fn set_aim(&mut self, direction: Option<Vec3>) {
        self.aim = direction.and_then(Vec3::try_normalize);
    }

    /// Manual axes for this tick: the stronger of the keyboard and `extra`.
    pub fn manual_axes(&mut self, frame: &InputFrame, extra: Option<ControlSignal>) -> ControlSignal {
        let keyboard = self.keyboard.poll_axes(frame);
        match extra {
            Some(extra) if extra.strength() > keyboard.strength() => extra,
            _ => keyboard,
        }
    }

    /// Pick this tick's signal.
    ///
    /// `vehicle` is the tank's current pose; without it steering has nothing
    /// to work from and yields neutral.
    pub fn update(
        &mut self,
        frame: &InputFrame,
        extra: Option<ControlSignal>,
        vehicle: Option<&Vehicle>,
    ) -> DriveUpdate {
        let manual = self.manual_axes(frame, extra);
        if manual.magnitude_exceeds(self.thresholds.manual_override) && self.steering.has_order() {
            tracing::debug!(id = %self.id, "manual input cancelled move order");
            self.steering.cancel();
        }

        let (signal, source) = if self.steering.has_order() {
            let signal = vehicle.map_or(ControlSignal::NEUTRAL, |vehicle| {
                self.steering.evaluate(vehicle.position, vehicle.forward)
            });
            (signal, DriveSource::Steering)
        } else if self.external.axes_enabled() {
            (self.external.poll_axes(frame), DriveSource::External)
        } else {
            (manual, DriveSource::Manual)
        };
        self.signal = signal;

        let tone = EngineTone::classify(signal, self.thresholds.engine_idle);
        let tone_change = (tone != self.tone).then_some(tone);
        self.tone = tone;

        DriveUpdate {
            signal,
            source,
            tone_change,
        }
    }
}

/// Fire arbitration and charging for one tank.
#[derive(Clone, Debug)]
pub struct TankGunner {
    id: VehicleId,
    keyboard: KeyboardAxisSource,
    external: ExternalOverrideSource,
    charge: FireCharge,
    intent: FireIntent,
}

impl TankGunner {
    pub fn new(id: VehicleId, player_index: u32, tuning: ChargeTuning) -> Self {
        Self {
            id,
            keyboard: KeyboardAxisSource::for_player(player_index),
            external: ExternalOverrideSource::new(),
            charge: FireCharge::new(tuning),
            intent: FireIntent::IDLE,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// Intent read by the latest update.
    pub fn intent(&self) -> FireIntent {
        self.intent
    }

    pub fn charge(&self) -> &FireCharge {
        &self.charge
    }

    /// Route fire through pushed state instead of the keyboard.
    pub fn set_external_fire(&mut self, pressed: bool, held: bool, released: bool) {
        self.external.set_fire(pressed, held, released);
    }

    pub fn disable_external_fire(&mut self) {
        self.external.disable_fire();
    }

    pub fn external_fire_enabled(&self) -> bool {
        self.external.fire_enabled()
    }

    /// Read fire input and advance the charge.
    pub fn update(&mut self, frame: &InputFrame, dt: f32) -> Option<Shot> {
        self.intent = if self.external.fire_enabled() {
            self.external.poll_fire(frame)
        } else {
            self.keyboard.poll_fire(frame)
        };
        self.charge.update(self.intent, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonState;

    fn driver() -> TankDriver {
        TankDriver::new(
            VehicleId::new(0, 0),
            1,
            SteeringTuning::default(),
            DriveThresholds::default(),
        )
    }

    fn at_origin() -> Vehicle {
        Vehicle::new(Vec3::ZERO, Vec3::Z, 1)
    }

    #[test]
    fn test_manual_cancels_move_order() {
        let mut driver = driver();
        driver.set_move_target(Vec3::new(0.0, 0.0, 10.0), 1.5);

        let frame = InputFrame::new().with_axis("Horizontal1", -0.3);
        let update = driver.update(&frame, None, Some(&at_origin()));
        assert!(!driver.has_move_target());
        assert_eq!(update.source, DriveSource::Manual);
        assert_eq!(update.signal, ControlSignal::new(0.0, -0.3));
    }

    #[test]
    fn test_small_manual_noise_keeps_order() {
        let mut driver = driver();
        driver.set_move_target(Vec3::new(0.0, 0.0, 10.0), 1.5);

        let frame = InputFrame::new().with_axis("Vertical1", 0.05);
        let update = driver.update(&frame, None, Some(&at_origin()));
        assert!(driver.has_move_target());
        assert_eq!(update.source, DriveSource::Steering);
        assert_eq!(update.signal, ControlSignal::new(1.0, 0.0));
    }

    #[test]
    fn test_external_beats_manual() {
        let mut driver = driver();
        driver.set_external_axes(0.5, 0.25);
        let frame = InputFrame::new().with_axis("Vertical1", -1.0);
        let update = driver.update(&frame, None, Some(&at_origin()));
        assert_eq!(update.source, DriveSource::External);
        assert_eq!(update.signal, ControlSignal::new(0.5, 0.25));

        driver.disable_external_axes();
        let update = driver.update(&frame, None, Some(&at_origin()));
        assert_eq!(update.source, DriveSource::Manual);
    }

    #[test]
    fn test_move_target_disables_external() {
        let mut driver = driver();
        driver.set_external_axes(0.5, 0.0);
        driver.set_move_target(Vec3::new(0.0, 0.0, 10.0), 1.5);
        assert!(!driver.external_axes_enabled());
    }

    #[test]
    fn test_joystick_stronger_than_keyboard_wins() {
        let mut driver = driver();
        let frame = InputFrame::new().with_axis("Vertical1", 0.2);
        let manual = driver.manual_axes(&frame, Some(ControlSignal::new(0.0, 0.9)));
        assert_eq!(manual, ControlSignal::new(0.0, 0.9));
        let manual = driver.manual_axes(&frame, Some(ControlSignal::NEUTRAL));
        assert_eq!(manual, ControlSignal::new(0.2, 0.0));
    }

    #[test]
    fn test_engine_tone_changes_reported_once() {
        let mut driver = driver();
        let frame = InputFrame::new().with_axis("Vertical1", 1.0);
        assert_eq!(
            driver.update(&frame, None, None).tone_change,
            Some(EngineTone::Driving)
        );
        assert_eq!(driver.update(&frame, None, None).tone_change, None);
        assert_eq!(
            driver.update(&InputFrame::new(), None, None).tone_change,
            Some(EngineTone::Idling)
        );
    }

    #[test]
    fn test_gunner_external_fire_overrides_keyboard() {
        let mut gunner = TankGunner::new(VehicleId::new(0, 0), 1, ChargeTuning::default());
        let held = ButtonState {
            pressed: true,
            held: true,
            released: false,
        };
        let frame = InputFrame::new().with_button("Fire1", held);
        gunner.update(&frame, 0.1);
        assert!(gunner.intent().pressed);

        gunner.set_external_fire(false, false, false);
        gunner.update(&frame, 0.1);
        assert_eq!(gunner.intent(), FireIntent::IDLE);
    }
}
