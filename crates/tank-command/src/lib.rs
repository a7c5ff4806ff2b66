//! Input arbitration and autonomous steering for top-down tank combat.
//!
//! Turns keyboard axes, pointer taps, an on-screen joystick, and externally
//! pushed commands into one normalized control signal per tank, steers tanks
//! toward tapped ground points, and animates the target marker shown over an
//! acquired enemy. Everything here is engine-agnostic and advances once per
//! frame through [`ArbitrationLoop::tick`].

/// Per-frame control values handed to the tank body.
pub mod signal;

/// Raw input snapshots and the input source variants.
pub mod input;

/// Seek-and-stop steering toward a commanded point.
pub mod steering;

/// Registered tanks and primary selection.
pub mod registry;

/// Vehicle handles and the lookup capability for externally owned tanks.
pub mod world;

/// Scene queries the core consumes: rays, UI hit tests, projection.
pub mod scene;

/// Pointer classification into move and acquire commands.
pub mod command;

/// Screen-space target marker animation.
pub mod marker;

/// Shell launch-force charging.
pub mod charge;

/// Per-tank movement and firing controllers.
pub mod driver;

/// The per-frame orchestration of every component above.
pub mod arbitration;

/// Tunables and config loading.
pub mod config;

mod error;

/// Reference tank integrator for simulation and tests.
pub mod kinematics;

/// Flat top-down scene used by the simulator and tests.
pub mod sandbox;

pub use arbitration::{ArbitrationLoop, EngineChange, TickReport};
pub use config::ControlConfig;
pub use error::{ConfigError, ConfigResult};
pub use signal::{ControlSignal, EngineTone, FireIntent};
pub use world::{Vehicle, VehicleId, VehicleLookup};
