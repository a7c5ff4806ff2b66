//! Scene queries supplied by the host.
//!
//! Rays, UI hit tests, and camera projection belong to the engine. The core
//! asks for them through [`Scene`] and treats every `None` as a transient
//! "nothing this tick".

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::PointerId;
use crate::world::VehicleId;

/// A ray in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Collision layers a ray may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const GROUND: Self = Self(1 << 0);
    pub const VEHICLE: Self = Self(1 << 1);
    pub const UI: Self = Self(1 << 2);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// What a ray hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderTag {
    /// Walkable terrain.
    Ground,
    /// A tank body.
    Vehicle(VehicleId),
    /// World-space UI.
    Ui,
    /// Anything else (walls, props).
    Other,
}

impl ColliderTag {
    /// The layer this collider lives on.
    pub fn layer(self) -> LayerMask {
        match self {
            Self::Ground => LayerMask::GROUND,
            Self::Vehicle(_) => LayerMask::VEHICLE,
            Self::Ui => LayerMask::UI,
            Self::Other => LayerMask(1 << 3),
        }
    }
}

/// Nearest hit along a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub distance: f32,
    pub collider: ColliderTag,
}

/// A world point projected to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenProjection {
    pub point: Vec2,
    pub behind_camera: bool,
}

/// Engine-side scene capabilities.
pub trait Scene {
    /// Ray from the active camera through a screen point, or `None` when no
    /// camera is available.
    fn screen_ray(&self, screen: Vec2) -> Option<Ray>;

    /// Nearest collider on `layers` within `max_distance` along `ray`.
    fn cast_ray(&self, ray: Ray, max_distance: f32, layers: LayerMask) -> Option<RayHit>;

    /// Whether an interactive UI element sits under the pointer.
    fn is_over_ui(&self, screen: Vec2, pointer: PointerId) -> bool;

    /// Project a world point through the active camera.
    fn world_to_screen(&self, world: Vec3) -> Option<ScreenProjection>;

    /// Screen position of a world point, or `None` when it cannot be shown.
    fn project_visible(&self, world: Vec3) -> Option<Vec2> {
        self.world_to_screen(world)
            .filter(|projection| !projection.behind_camera)
            .map(|projection| projection.point)
    }
}

/// A scene with no camera, no colliders, and no UI.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl Scene for EmptyScene {
    fn screen_ray(&self, _screen: Vec2) -> Option<Ray> {
        None
    }

    fn cast_ray(&self, _ray: Ray, _max_distance: f32, _layers: LayerMask) -> Option<RayHit> {
        None
    }

    fn is_over_ui(&self, _screen: Vec2, _pointer: PointerId) -> bool {
        false
    }

    fn world_to_screen(&self, _world: Vec3) -> Option<ScreenProjection> {
        None
    }
}
