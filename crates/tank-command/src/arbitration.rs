//! The per-frame arbitration loop.
//!
//! One [`ArbitrationLoop`] is owned by whatever runs the game session. Each
//! call to [`ArbitrationLoop::tick`] advances everything exactly once, in a
//! fixed order:
//!
//! 1. sweep registry entries whose tanks are gone
//! 2. re-resolve the primary tank
//! 3. resolve this tick's pointer press, then evaluate every driver
//! 4. route fire input and charge the guns
//! 5. advance the target marker
//!
//! Later steps see what earlier ones changed; the marker, for instance,
//! starts entering on the same tick an enemy is acquired.

use std::collections::HashMap;

use glam::Vec3;

use crate::charge::Shot;
use crate::command::{PointerCommand, PointerCommandResolver};
use crate::config::ControlConfig;
use crate::driver::{TankDriver, TankGunner};
use crate::input::{FireButton, InputFrame, PointerTapSource, VirtualJoystickSource};
use crate::marker::{MarkerAnimator, MarkerState};
use crate::registry::{MovementHandle, ShootingHandle, TankRegistry};
use crate::scene::Scene;
use crate::signal::{ControlSignal, EngineTone, FireIntent};
use crate::world::{VehicleId, VehicleLookup};

/// A tank's engine switched between idling and driving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineChange {
    pub id: VehicleId,
    pub tone: EngineTone,
}

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Outcome of this tick's pointer press, if there was one.
    pub command: Option<PointerCommand>,
    /// Shells fired this tick.
    pub shots: Vec<(VehicleId, Shot)>,
    pub engine_changes: Vec<EngineChange>,
    /// Primary movement tank after this tick.
    pub primary: Option<VehicleId>,
}

pub struct ArbitrationLoop {
    config: ControlConfig,
    registry: TankRegistry,
    drivers: HashMap<VehicleId, TankDriver>,
    gunners: HashMap<VehicleId, TankGunner>,
    resolver: PointerCommandResolver,
    pointer: PointerTapSource,
    joystick: VirtualJoystickSource,
    fire_button: FireButton,
    marker: MarkerAnimator,
    /// Acquired enemy.
    target: Option<VehicleId>,
    /// Primary seen by the previous tick.
    last_primary: Option<VehicleId>,
}

impl Default for ArbitrationLoop {
    fn default() -> Self {
        Self::new(ControlConfig::default())
    }
}

impl ArbitrationLoop {
    pub fn new(config: ControlConfig) -> Self {
        let config = config.sanitized();
        Self {
            registry: TankRegistry::new(),
            drivers: HashMap::new(),
            gunners: HashMap::new(),
            resolver: PointerCommandResolver::new(config.pointer),
            pointer: PointerTapSource::new(),
            joystick: VirtualJoystickSource::new(config.joystick_radius),
            fire_button: FireButton::new(),
            marker: MarkerAnimator::new(config.marker),
            target: None,
            last_primary: None,
            config,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn registry(&self) -> &TankRegistry {
        &self.registry
    }

    /// Spawn hook. Either half may be absent; absent or duplicate halves
    /// are ignored.
    pub fn register_tank(&mut self, movement: Option<MovementHandle>, shooting: Option<ShootingHandle>) {
        self.registry.register(movement, shooting);
        self.sync_controllers();
    }

    /// Despawn hook. Unknown halves are ignored.
    pub fn unregister_tank(
        &mut self,
        movement: Option<MovementHandle>,
        shooting: Option<ShootingHandle>,
    ) {
        self.registry.unregister(movement, shooting);
        self.sync_controllers();
    }

    /// Create controllers for new registry entries and drop orphaned ones.
    fn sync_controllers(&mut self) {
        let config = &self.config;
        for handle in self.registry.movement_handles() {
            self.drivers.entry(handle.id()).or_insert_with(|| {
                TankDriver::new(
                    handle.id(),
                    handle.player_index(),
                    config.steering,
                    config.drive_thresholds(),
                )
            });
        }
        for handle in self.registry.shooting_handles() {
            self.gunners
                .entry(handle.id())
                .or_insert_with(|| TankGunner::new(handle.id(), handle.player_index(), config.fire));
        }
        let registry = &self.registry;
        self.drivers.retain(|id, _| registry.contains_movement(*id));
        self.gunners.retain(|id, _| registry.contains_shooting(*id));
    }

    /// Advance every component by one frame.
    pub fn tick(
        &mut self,
        dt: f32,
        frame: &InputFrame,
        scene: &dyn Scene,
        vehicles: &dyn VehicleLookup,
    ) -> TickReport {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut report = TickReport::default();

        // 1. Sweep.
        if self.registry.sweep(|id| vehicles.is_alive(id)) {
            self.sync_controllers();
        }

        // 2. Primary.
        let primary = self.registry.primary_movement().map(MovementHandle::id);
        if primary != self.last_primary {
            if self.target.is_some() {
                self.drop_target();
            }
            self.last_primary = primary;
        }

        // 3. Pointer and axes.
        if let Some(event) = self.pointer.poll_tap(frame) {
            if self.registry.primary_movement().is_none() {
                self.discover(vehicles);
            }
            let command = self.resolver.resolve(event, self.registry.primary_movement(), scene, vehicles);
            tracing::trace!(?command, "pointer press");
            self.apply_command(command, scene, vehicles);
            report.command = Some(command);
        }
        self.update_drivers(frame, vehicles, &mut report);

        // 4. Fire.
        self.route_fire_button();
        for handle in self.registry.shooting_handles() {
            if let Some(gunner) = self.gunners.get_mut(&handle.id())
                && let Some(shot) = gunner.update(frame, dt)
            {
                report.shots.push((handle.id(), shot));
            }
        }

        // 5. Marker.
        self.advance_marker(dt, scene, vehicles);

        report.primary = self.registry.primary_movement().map(MovementHandle::id);
        self.last_primary = report.primary;
        report
    }

    /// Fallback registration when a press arrives with no primary.
    fn discover(&mut self, vehicles: &dyn VehicleLookup) {
        let candidates = || {
            vehicles
                .active_vehicles()
                .into_iter()
                .filter_map(|id| vehicles.vehicle(id).map(|vehicle| (id, vehicle)))
        };
        if !self.registry.has_explicit_registrations() {
            self.registry.auto_discover(candidates());
        }
        if self.registry.primary_movement().is_none() {
            // Last resort: any active tank.
            self.registry.auto_discover(candidates().take(1));
        }
        self.sync_controllers();
        self.last_primary = self.registry.primary_movement().map(MovementHandle::id);
    }

    fn apply_command(&mut self, command: PointerCommand, scene: &dyn Scene, vehicles: &dyn VehicleLookup) {
        let Some(primary) = self.registry.primary_movement() else {
            return;
        };
        match command {
            PointerCommand::AcquireTarget { target } => {
                let Some(enemy) = vehicles.vehicle(target) else {
                    return;
                };
                tracing::debug!(%target, "target acquired");
                self.target = Some(target);
                let anchor = scene.project_visible(self.marker.anchor_world(enemy.position));
                self.marker.set_target(anchor);
                let own = vehicles.vehicle(primary.id());
                if let Some(driver) = self.drivers.get_mut(&primary.id()) {
                    driver.clear_move_target();
                    driver.set_aim(own.map(|own| flat(enemy.position - own.position)));
                }
            }
            PointerCommand::Move {
                point,
                stop_distance,
            } => {
                tracing::debug!(?point, "move order issued");
                if let Some(driver) = self.drivers.get_mut(&primary.id()) {
                    driver.set_move_target(point, stop_distance);
                }
                if self.target.is_some() {
                    self.drop_target();
                }
            }
            PointerCommand::NoPrimary
            | PointerCommand::OverUi
            | PointerCommand::NoCamera
            | PointerCommand::Miss => {}
        }
    }

    fn update_drivers(&mut self, frame: &InputFrame, vehicles: &dyn VehicleLookup, report: &mut TickReport) {
        let primary = self.registry.primary_movement().map(MovementHandle::id);
        let stick = self.joystick.is_engaged().then(|| self.joystick.signal());
        for handle in self.registry.movement_handles() {
            let id = handle.id();
            let Some(driver) = self.drivers.get_mut(&id) else {
                continue;
            };
            let extra = if Some(id) == primary { stick } else { None };
            let vehicle = vehicles.vehicle(id);
            let update = driver.update(frame, extra, vehicle.as_ref());
            if let Some(tone) = update.tone_change {
                report.engine_changes.push(EngineChange { id, tone });
            }
        }
    }

    fn route_fire_button(&mut self) {
        if !self.config.touch_controls {
            return;
        }
        let Some(shooting) = self.registry.primary_shooting() else {
            return;
        };
        let pressed = self.fire_button.consume_pressed();
        let released = self.fire_button.consume_released();
        let held = self.fire_button.is_held();
        if let Some(gunner) = self.gunners.get_mut(&shooting.id()) {
            gunner.set_external_fire(pressed, held, released);
        }
    }

    fn advance_marker(&mut self, dt: f32, scene: &dyn Scene, vehicles: &dyn VehicleLookup) {
        let enemy = self
            .target
            .and_then(|id| vehicles.vehicle(id))
            .filter(|vehicle| vehicle.active);
        if self.target.is_some() && enemy.is_none() {
            tracing::debug!("target lost");
            self.drop_target();
        }

        if let Some(enemy) = enemy
            && let Some(primary) = self.registry.primary_movement()
        {
            let own = vehicles.vehicle(primary.id());
            if let (Some(own), Some(driver)) = (own, self.drivers.get_mut(&primary.id())) {
                driver.set_aim(Some(flat(enemy.position - own.position)));
            }
        }

        let anchor = enemy.and_then(|enemy| scene.project_visible(self.marker.anchor_world(enemy.position)));
        self.marker.advance(dt, anchor);
    }

    fn drop_target(&mut self) {
        self.target = None;
        self.marker.clear_target();
        for driver in self.drivers.values_mut() {
            driver.set_aim(None);
        }
    }

    /// Drive signal chosen for `id` by the latest tick.
    pub fn evaluate(&self, id: VehicleId) -> ControlSignal {
        self.drivers
            .get(&id)
            .map_or(ControlSignal::NEUTRAL, TankDriver::signal)
    }

    /// Fire intent read for `id` by the latest tick.
    pub fn evaluate_fire(&self, id: VehicleId) -> FireIntent {
        self.gunners.get(&id).map_or(FireIntent::IDLE, TankGunner::intent)
    }

    /// Launch force `id` would fire with now.
    pub fn charge_force(&self, id: VehicleId) -> Option<f32> {
        self.gunners.get(&id).map(|gunner| gunner.charge().current_force())
    }

    pub fn engine_tone(&self, id: VehicleId) -> EngineTone {
        self.drivers
            .get(&id)
            .map_or(EngineTone::Idling, TankDriver::engine_tone)
    }

    pub fn current_marker_state(&self) -> MarkerState {
        self.marker.state()
    }

    /// The acquired enemy, if any.
    pub fn target(&self) -> Option<VehicleId> {
        self.target
    }

    /// Ground-plane direction from `id` toward the acquired enemy.
    pub fn aim_direction(&self, id: VehicleId) -> Option<Vec3> {
        self.drivers.get(&id).and_then(TankDriver::aim)
    }

    pub fn has_move_target(&self, id: VehicleId) -> bool {
        self.drivers.get(&id).is_some_and(TankDriver::has_move_target)
    }

    /// Order `id` to drive to `point`, as a tap on the ground would.
    pub fn set_move_target(&mut self, id: VehicleId, point: Vec3, stop_distance: f32) {
        if let Some(driver) = self.drivers.get_mut(&id) {
            driver.set_move_target(point, stop_distance);
        }
    }

    pub fn clear_move_target(&mut self, id: VehicleId) {
        if let Some(driver) = self.drivers.get_mut(&id) {
            driver.clear_move_target();
        }
    }

    /// Push drive axes for `id`; they replace manual input until disabled.
    pub fn set_external_input(&mut self, id: VehicleId, movement: f32, turn: f32) {
        if let Some(driver) = self.drivers.get_mut(&id) {
            driver.set_external_axes(movement, turn);
        }
    }

    pub fn disable_external_input(&mut self, id: VehicleId) {
        if let Some(driver) = self.drivers.get_mut(&id) {
            driver.disable_external_axes();
        }
    }

    /// Push fire state for `id`; it replaces the keyboard until disabled.
    pub fn set_external_fire(&mut self, id: VehicleId, pressed: bool, held: bool, released: bool) {
        if let Some(gunner) = self.gunners.get_mut(&id) {
            gunner.set_external_fire(pressed, held, released);
        }
    }

    pub fn disable_external_fire(&mut self, id: VehicleId) {
        if let Some(gunner) = self.gunners.get_mut(&id) {
            gunner.disable_external_fire();
        }
    }

    pub fn joystick(&self) -> &VirtualJoystickSource {
        &self.joystick
    }

    pub fn joystick_mut(&mut self) -> &mut VirtualJoystickSource {
        &mut self.joystick
    }

    pub fn fire_button(&self) -> &FireButton {
        &self.fire_button
    }

    pub fn fire_button_mut(&mut self) -> &mut FireButton {
        &mut self.fire_button
    }
}

fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
