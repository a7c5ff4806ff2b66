//! Pointer classification.
//!
//! One resolved pointer press per tick becomes at most one command for the
//! primary tank: acquire an enemy, drive to a ground point, or nothing.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::PointerEvent;
use crate::registry::MovementHandle;
use crate::scene::{ColliderTag, LayerMask, Scene};
use crate::steering::{DEFAULT_STOP_DISTANCE, clamp_stop_distance};
use crate::world::{VehicleId, VehicleLookup};

/// Ray and order settings for tap-to-move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Longest ground ray, in world units.
    pub ground_ray_distance: f32,
    /// Layers the command ray can hit.
    pub layers: LayerMask,
    /// Stop distance given to move orders.
    pub stop_distance: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            ground_ray_distance: 500.0,
            layers: LayerMask::ALL,
            stop_distance: DEFAULT_STOP_DISTANCE,
        }
    }
}

impl PointerConfig {
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let ground_ray_distance = if self.ground_ray_distance.is_finite() && self.ground_ray_distance > 0.0 {
            self.ground_ray_distance
        } else {
            defaults.ground_ray_distance
        };
        Self {
            ground_ray_distance,
            layers: self.layers,
            stop_distance: clamp_stop_distance(self.stop_distance),
        }
    }
}

/// Outcome of classifying one pointer press.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerCommand {
    /// No tank to command.
    NoPrimary,
    /// The press landed on UI.
    OverUi,
    /// No camera to cast from.
    NoCamera,
    /// Aim the primary at an enemy tank.
    AcquireTarget { target: VehicleId },
    /// Drive the primary to a ground point.
    Move { point: Vec3, stop_distance: f32 },
    /// The ray hit nothing usable.
    Miss,
}

impl PointerCommand {
    /// Whether this outcome changes any state.
    pub fn is_command(&self) -> bool {
        matches!(self, Self::AcquireTarget { .. } | Self::Move { .. })
    }
}

/// Turns pointer presses into commands for the primary tank.
#[derive(Clone, Debug, Default)]
pub struct PointerCommandResolver {
    config: PointerConfig,
}

impl PointerCommandResolver {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &PointerConfig {
        &self.config
    }

    /// Classify `event` for `primary`.
    ///
    /// Only the nearest hit along the camera ray counts: a ray that first hits
    /// a friendly tank or a wall never falls through to the ground behind it.
    pub fn resolve(
        &self,
        event: PointerEvent,
        primary: Option<MovementHandle>,
        scene: &dyn Scene,
        vehicles: &dyn VehicleLookup,
    ) -> PointerCommand {
        let Some(primary) = primary.filter(|handle| vehicles.is_alive(handle.id())) else {
            tracing::trace!("pointer press without a primary tank");
            return PointerCommand::NoPrimary;
        };

        if scene.is_over_ui(event.position, event.pointer) {
            return PointerCommand::OverUi;
        }

        let Some(ray) = scene.screen_ray(event.position) else {
            tracing::trace!("pointer press without a camera");
            return PointerCommand::NoCamera;
        };

        let Some(hit) = scene.cast_ray(ray, self.config.ground_ray_distance, self.config.layers) else {
            return PointerCommand::Miss;
        };

        match hit.collider {
            ColliderTag::Vehicle(id) if is_enemy(id, primary, vehicles) => {
                PointerCommand::AcquireTarget { target: id }
            }
            ColliderTag::Ground => PointerCommand::Move {
                point: hit.point,
                stop_distance: self.config.stop_distance,
            },
            ColliderTag::Vehicle(_) | ColliderTag::Ui | ColliderTag::Other => PointerCommand::Miss,
        }
    }
}

fn is_enemy(id: VehicleId, primary: MovementHandle, vehicles: &dyn VehicleLookup) -> bool {
    if id == primary.id() {
        return false;
    }
    vehicles
        .vehicle(id)
        .is_some_and(|vehicle| vehicle.active && vehicle.player_index != primary.player_index())
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::input::PointerId;
    use crate::scene::{Ray, RayHit, ScreenProjection};
    use crate::world::{Vehicle, VehicleArena};

    /// Returns a fixed hit for every ray.
    struct FixedScene {
        hit: Option<RayHit>,
        over_ui: bool,
        camera: bool,
    }

    impl Scene for FixedScene {
        fn screen_ray(&self, _screen: Vec2) -> Option<Ray> {
            self.camera.then(|| Ray::new(Vec3::Y * 20.0, Vec3::NEG_Y))
        }

        fn cast_ray(&self, _ray: Ray, max_distance: f32, _layers: LayerMask) -> Option<RayHit> {
            self.hit.filter(|hit| hit.distance <= max_distance)
        }

        fn is_over_ui(&self, _screen: Vec2, _pointer: PointerId) -> bool {
            self.over_ui
        }

        fn world_to_screen(&self, _world: Vec3) -> Option<ScreenProjection> {
            None
        }
    }

    fn scene_hitting(collider: ColliderTag) -> FixedScene {
        FixedScene {
            hit: Some(RayHit {
                point: Vec3::new(3.0, 0.0, 4.0),
                distance: 20.0,
                collider,
            }),
            over_ui: false,
            camera: true,
        }
    }

    fn tap() -> PointerEvent {
        PointerEvent {
            position: Vec2::new(100.0, 100.0),
            pointer: PointerId::Mouse,
        }
    }

    struct Setup {
        arena: VehicleArena,
        primary: MovementHandle,
        enemy: VehicleId,
        ally: VehicleId,
    }

    fn setup() -> Setup {
        let mut arena = VehicleArena::new();
        let me = arena.spawn(Vehicle::new(Vec3::ZERO, Vec3::Z, 1));
        let enemy = arena.spawn(Vehicle::new(Vec3::X * 5.0, Vec3::Z, 2));
        let ally = arena.spawn(Vehicle::new(Vec3::X * -5.0, Vec3::Z, 1));
        Setup {
            arena,
            primary: MovementHandle::new(me, 1),
            enemy,
            ally,
        }
    }

    #[test]
    fn test_ground_hit_moves() {
        let s = setup();
        let resolver = PointerCommandResolver::default();
        let command = resolver.resolve(tap(), Some(s.primary), &scene_hitting(ColliderTag::Ground), &s.arena);
        assert_eq!(
            command,
            PointerCommand::Move {
                point: Vec3::new(3.0, 0.0, 4.0),
                stop_distance: DEFAULT_STOP_DISTANCE
            }
        );
    }

    #[test]
    fn test_enemy_hit_acquires() {
        let s = setup();
        let resolver = PointerCommandResolver::default();
        let scene = scene_hitting(ColliderTag::Vehicle(s.enemy));
        assert_eq!(
            resolver.resolve(tap(), Some(s.primary), &scene, &s.arena),
            PointerCommand::AcquireTarget { target: s.enemy }
        );
    }

    #[test]
    fn test_self_ally_and_inactive_are_misses() {
        let mut s = setup();
        let resolver = PointerCommandResolver::default();
        for collider in [ColliderTag::Vehicle(s.primary.id()), ColliderTag::Vehicle(s.ally)] {
            assert_eq!(
                resolver.resolve(tap(), Some(s.primary), &scene_hitting(collider), &s.arena),
                PointerCommand::Miss
            );
        }

        s.arena.get_mut(s.enemy).unwrap().active = false;
        let scene = scene_hitting(ColliderTag::Vehicle(s.enemy));
        assert_eq!(
            resolver.resolve(tap(), Some(s.primary), &scene, &s.arena),
            PointerCommand::Miss
        );
    }

    #[test]
    fn test_ui_and_camera_gate() {
        let s = setup();
        let resolver = PointerCommandResolver::default();
        let mut scene = scene_hitting(ColliderTag::Ground);
        scene.over_ui = true;
        assert_eq!(resolver.resolve(tap(), Some(s.primary), &scene, &s.arena), PointerCommand::OverUi);

        scene.over_ui = false;
        scene.camera = false;
        assert_eq!(resolver.resolve(tap(), Some(s.primary), &scene, &s.arena), PointerCommand::NoCamera);
    }

    #[test]
    fn test_no_primary_or_dead_primary() {
        let mut s = setup();
        let resolver = PointerCommandResolver::default();
        let scene = scene_hitting(ColliderTag::Ground);
        assert_eq!(resolver.resolve(tap(), None, &scene, &s.arena), PointerCommand::NoPrimary);

        s.arena.despawn(s.primary.id());
        assert_eq!(
            resolver.resolve(tap(), Some(s.primary), &scene, &s.arena),
            PointerCommand::NoPrimary
        );
    }

    #[test]
    fn test_ray_distance_limit() {
        let s = setup();
        let resolver = PointerCommandResolver::new(PointerConfig {
            ground_ray_distance: 10.0,
            ..PointerConfig::default()
        });
        assert_eq!(
            resolver.resolve(tap(), Some(s.primary), &scene_hitting(ColliderTag::Ground), &s.arena),
            PointerCommand::Miss
        );
    }

    #[test]
    fn test_stop_distance_clamped() {
        let config = PointerConfig {
            stop_distance: 0.01,
            ..PointerConfig::default()
        }
        .sanitized();
        assert_eq!(config.stop_distance, 0.2);
    }
}
