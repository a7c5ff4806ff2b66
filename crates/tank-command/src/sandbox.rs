//! Flat top-down arena.
//!
//! A ground plane at y = 0 viewed by an orthographic camera looking straight
//! down, tanks as spheres, and screen rectangles standing in for UI widgets.
//! Screen coordinates have a top-left origin with y down; screen up is world
//! +Z.

use glam::{Vec2, Vec3};

use crate::input::PointerId;
use crate::kinematics::{TankBody, TankKinematics};
use crate::scene::{ColliderTag, LayerMask, Ray, RayHit, Scene, ScreenProjection};
use crate::signal::ControlSignal;
use crate::world::{Vehicle, VehicleArena, VehicleId, VehicleLookup};

/// Axis-aligned screen rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Orthographic camera looking down -Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopDownCamera {
    /// World XZ under the screen center.
    pub center: Vec2,
    pub viewport: Vec2,
    pub pixels_per_unit: f32,
    pub height: f32,
}

impl Default for TopDownCamera {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            viewport: Vec2::new(1280.0, 720.0),
            pixels_per_unit: 10.0,
            height: 50.0,
        }
    }
}

impl TopDownCamera {
    /// World point on the ground plane under a screen point.
    pub fn screen_to_ground(&self, screen: Vec2) -> Vec3 {
        let offset = (screen - self.viewport * 0.5) / self.pixels_per_unit;
        Vec3::new(self.center.x + offset.x, 0.0, self.center.y - offset.y)
    }

    pub fn world_to_screen(&self, world: Vec3) -> Vec2 {
        let offset = Vec2::new(world.x - self.center.x, self.center.y - world.z);
        self.viewport * 0.5 + offset * self.pixels_per_unit
    }
}

pub struct Sandbox {
    pub camera: Option<TopDownCamera>,
    pub vehicles: VehicleArena,
    /// Collision radius of every tank.
    pub vehicle_radius: f32,
    pub ui: Vec<ScreenRect>,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self {
            camera: Some(TopDownCamera::default()),
            vehicles: VehicleArena::new(),
            vehicle_radius: 1.0,
            ui: Vec::new(),
        }
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tank at `position` facing `yaw` radians from +Z.
    pub fn spawn_tank(&mut self, position: Vec3, yaw: f32, player_index: u32) -> VehicleId {
        let body = TankBody::new(position, yaw);
        self.vehicles
            .spawn(Vehicle::new(body.position, body.forward(), player_index))
    }

    pub fn despawn(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.despawn(id)
    }

    pub fn add_ui(&mut self, rect: ScreenRect) {
        self.ui.push(rect);
    }

    /// Screen position of a world point, if a camera exists.
    pub fn screen_point(&self, world: Vec3) -> Option<Vec2> {
        self.camera.map(|camera| camera.world_to_screen(world))
    }

    /// Move a tank by one integrator step.
    pub fn drive(&mut self, id: VehicleId, signal: ControlSignal, kinematics: &TankKinematics, dt: f32) {
        let Some(vehicle) = self.vehicles.get_mut(id) else {
            return;
        };
        let yaw = vehicle.forward.x.atan2(vehicle.forward.z);
        let body = kinematics.integrate(TankBody::new(vehicle.position, yaw), signal, dt);
        vehicle.position = body.position;
        vehicle.forward = body.forward();
    }

    fn hit_vehicle(&self, ray: Ray) -> Option<RayHit> {
        let radius_sq = self.vehicle_radius * self.vehicle_radius;
        self.vehicles
            .iter()
            .filter_map(|(id, vehicle)| {
                let to_center = vehicle.position - ray.origin;
                let along = to_center.dot(ray.direction);
                let closest_sq = to_center.length_squared() - along * along;
                if along < 0.0 || closest_sq > radius_sq {
                    return None;
                }
                let distance = along - (radius_sq - closest_sq).sqrt();
                Some(RayHit {
                    point: ray.at(distance),
                    distance,
                    collider: ColliderTag::Vehicle(id),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn hit_ground(ray: Ray) -> Option<RayHit> {
        if ray.direction.y >= 0.0 {
            return None;
        }
        let distance = -ray.origin.y / ray.direction.y;
        (distance >= 0.0).then(|| RayHit {
            point: ray.at(distance),
            distance,
            collider: ColliderTag::Ground,
        })
    }
}

impl Scene for Sandbox {
    fn screen_ray(&self, screen: Vec2) -> Option<Ray> {
        let camera = self.camera?;
        let ground = camera.screen_to_ground(screen);
        Some(Ray::new(ground + Vec3::Y * camera.height, Vec3::NEG_Y))
    }

    fn cast_ray(&self, ray: Ray, max_distance: f32, layers: LayerMask) -> Option<RayHit> {
        [self.hit_vehicle(ray), Self::hit_ground(ray)]
            .into_iter()
            .flatten()
            .filter(|hit| layers.contains(hit.collider.layer()) && hit.distance <= max_distance)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn is_over_ui(&self, screen: Vec2, _pointer: PointerId) -> bool {
        self.ui.iter().any(|rect| rect.contains(screen))
    }

    fn world_to_screen(&self, world: Vec3) -> Option<ScreenProjection> {
        let camera = self.camera?;
        Some(ScreenProjection {
            point: camera.world_to_screen(world),
            behind_camera: world.y >= camera.height,
        })
    }
}

impl VehicleLookup for Sandbox {
    fn vehicle(&self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.vehicle(id)
    }

    fn active_vehicles(&self) -> Vec<VehicleId> {
        self.vehicles.active_vehicles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_ground_roundtrip() {
        let camera = TopDownCamera::default();
        let world = Vec3::new(12.0, 0.0, -7.5);
        let back = camera.screen_to_ground(camera.world_to_screen(world));
        assert!((back - world).length() < 1e-4);
        // Screen up is world +Z.
        assert!(camera.world_to_screen(Vec3::Z).y < camera.world_to_screen(Vec3::ZERO).y);
    }

    #[test]
    fn test_tank_occludes_ground() {
        let mut sandbox = Sandbox::new();
        let id = sandbox.spawn_tank(Vec3::new(5.0, 0.0, 5.0), 0.0, 2);
        let screen = sandbox.screen_point(Vec3::new(5.0, 0.0, 5.0)).unwrap();
        let ray = sandbox.screen_ray(screen).unwrap();

        let hit = sandbox.cast_ray(ray, 500.0, LayerMask::ALL).unwrap();
        assert_eq!(hit.collider, ColliderTag::Vehicle(id));

        let hit = sandbox.cast_ray(ray, 500.0, LayerMask::GROUND).unwrap();
        assert_eq!(hit.collider, ColliderTag::Ground);
        assert!(hit.point.y.abs() < 1e-4);

        assert!(sandbox.cast_ray(ray, 500.0, LayerMask::UI).is_none());
    }

    #[test]
    fn test_ui_rects_and_missing_camera() {
        let mut sandbox = Sandbox::new();
        sandbox.add_ui(ScreenRect::new(Vec2::ZERO, Vec2::new(100.0, 100.0)));
        assert!(sandbox.is_over_ui(Vec2::new(50.0, 50.0), PointerId::Mouse));
        assert!(!sandbox.is_over_ui(Vec2::new(150.0, 50.0), PointerId::Mouse));

        sandbox.camera = None;
        assert!(sandbox.screen_ray(Vec2::ZERO).is_none());
        assert!(sandbox.project_visible(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_drive_moves_tank() {
        let mut sandbox = Sandbox::new();
        let id = sandbox.spawn_tank(Vec3::ZERO, 0.0, 1);
        sandbox.drive(id, ControlSignal::new(1.0, 0.0), &TankKinematics::default(), 1.0);
        let vehicle = sandbox.vehicle(id).unwrap();
        assert!((vehicle.position - Vec3::new(0.0, 0.0, 12.0)).length() < 1e-4);
    }
}
