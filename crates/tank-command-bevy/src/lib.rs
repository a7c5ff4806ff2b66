//! Bevy integration for `tank-command`.
//!
//! Add [`TankCommandPlugin`], spawn tanks with [`TankControlled`], and read
//! the arbitrated values from [`TankDriveInput`] and [`TankFireInput`] in
//! your own movement and shooting systems. Tap-to-move and target acquisition
//! need a [`SceneProbe`]; without one every press misses.

pub mod input;

use std::collections::HashMap;

use bevy::input::touch::Touches;
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use tank_command::input::InputFrame;
use tank_command::marker::MarkerState;
use tank_command::registry::{MovementHandle, ShootingHandle};
use tank_command::scene::{EmptyScene, Scene};
use tank_command::{
    ArbitrationLoop, ControlConfig, ControlSignal, EngineTone, FireIntent, Vehicle, VehicleId,
    VehicleLookup,
};

pub use input::{TankAction, default_input_map};

/// Registers the arbitration loop and its systems.
#[derive(Default)]
pub struct TankCommandPlugin {
    pub config: ControlConfig,
}

impl Plugin for TankCommandPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<TankAction>::default())
            .insert_resource(ArbitrationState(ArbitrationLoop::new(self.config.clone())))
            .init_resource::<TargetMarker>()
            .add_systems(
                Update,
                (
                    input::attach_input_maps,
                    register_tanks,
                    unregister_tanks,
                    tick_arbitration,
                )
                    .chain(),
            );
    }
}

/// The session's arbitration loop.
///
/// On-screen joystick and fire button widgets drive it through
/// `joystick_mut()` and `fire_button_mut()`.
#[derive(Resource, Deref, DerefMut)]
pub struct ArbitrationState(pub ArbitrationLoop);

/// Host-provided ray casts, UI hit tests, and projection.
#[derive(Resource)]
pub struct SceneProbe(pub Box<dyn Scene + Send + Sync>);

/// Target marker for the presentation layer, updated every tick.
#[derive(Resource, Default, Debug, Clone)]
pub struct TargetMarker {
    pub state: MarkerState,
    pub target: Option<Entity>,
}

/// A tank taking part in arbitration.
#[derive(Component, Clone, Copy, Debug)]
#[require(TankDriveInput, TankFireInput)]
pub struct TankControlled {
    /// Player number; 1 gets the primary controls.
    pub player_index: u32,
}

/// Excludes a tank from targeting and discovery without unregistering it.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TankInactive;

/// Drive values for the tank's movement system.
///
/// Positive `turn` is a positive rotation about +Y.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TankDriveInput {
    pub signal: ControlSignal,
    pub tone: EngineTone,
    /// Ground-plane direction toward the acquired enemy.
    pub aim: Option<Vec3>,
}

/// Fire values for the tank's shooting system.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TankFireInput {
    pub intent: FireIntent,
    /// Launch force of the charge in progress.
    pub charge: f32,
    /// Launch force of a shell fired this frame.
    pub shot: Option<f32>,
}

fn vehicle_id(entity: Entity) -> VehicleId {
    VehicleId::from_bits(entity.to_bits())
}

/// Pose snapshot of every controlled tank for one tick.
#[derive(Default)]
struct TankSnapshot {
    vehicles: HashMap<VehicleId, Vehicle>,
    entities: HashMap<VehicleId, Entity>,
    order: Vec<VehicleId>,
}

impl VehicleLookup for TankSnapshot {
    fn vehicle(&self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.get(&id).copied()
    }

    fn active_vehicles(&self) -> Vec<VehicleId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.vehicles.get(id).is_some_and(|vehicle| vehicle.active))
            .collect()
    }
}

fn register_tanks(
    mut state: ResMut<ArbitrationState>,
    added: Query<(Entity, &TankControlled), Added<TankControlled>>,
) {
    for (entity, controlled) in &added {
        let id = vehicle_id(entity);
        state.register_tank(
            Some(MovementHandle::new(id, controlled.player_index)),
            Some(ShootingHandle::new(id, controlled.player_index)),
        );
        tracing::info!(?entity, player = controlled.player_index, "tank registered");
    }
}

fn unregister_tanks(
    mut state: ResMut<ArbitrationState>,
    mut removed: RemovedComponents<TankControlled>,
) {
    for entity in removed.read() {
        let id = vehicle_id(entity);
        state.unregister_tank(
            Some(MovementHandle::new(id, 0)),
            Some(ShootingHandle::new(id, 0)),
        );
        tracing::info!(?entity, "tank unregistered");
    }
}

#[allow(clippy::too_many_arguments, clippy::needless_pass_by_value)]
fn tick_arbitration(
    mut state: ResMut<ArbitrationState>,
    mut marker: ResMut<TargetMarker>,
    time: Res<Time<Real>>,
    probe: Option<Res<SceneProbe>>,
    touches: Option<Res<Touches>>,
    mouse: Option<Res<ButtonInput<MouseButton>>>,
    window: input::PrimaryWindowQuery,
    actions: Query<(&TankControlled, &ActionState<TankAction>)>,
    poses: Query<(Entity, &GlobalTransform, &TankControlled, Has<TankInactive>)>,
    mut outputs: Query<(Entity, &mut TankDriveInput, &mut TankFireInput)>,
) {
    let mut frame = InputFrame::new();
    input::gather_actions(&mut frame, &actions);
    input::gather_pointer(
        &mut frame,
        touches.as_deref(),
        mouse.as_deref(),
        window.iter().next(),
    );

    let mut snapshot = TankSnapshot::default();
    for (entity, transform, controlled, inactive) in &poses {
        let id = vehicle_id(entity);
        let mut vehicle = Vehicle::new(
            transform.translation(),
            transform.forward().as_vec3(),
            controlled.player_index,
        );
        vehicle.active = !inactive;
        snapshot.vehicles.insert(id, vehicle);
        snapshot.entities.insert(id, entity);
        snapshot.order.push(id);
    }

    let scene: &dyn Scene = match &probe {
        Some(probe) => probe.0.as_ref(),
        None => &EmptyScene,
    };
    let report = state.tick(time.delta_secs(), &frame, scene, &snapshot);

    for (entity, mut drive, mut fire) in &mut outputs {
        let id = vehicle_id(entity);
        drive.signal = state.evaluate(id);
        drive.tone = state.engine_tone(id);
        drive.aim = state.aim_direction(id);
        fire.intent = state.evaluate_fire(id);
        fire.charge = state.charge_force(id).unwrap_or_default();
        fire.shot = report
            .shots
            .iter()
            .find(|(shooter, _)| *shooter == id)
            .map(|(_, shot)| shot.launch_force);
    }

    marker.state = state.current_marker_state();
    marker.target = state
        .target()
        .and_then(|id| snapshot.entities.get(&id).copied());
}
