//! Headless tap-to-move simulator.
//!
//! Spawns one tank in a flat sandbox, taps the ground at the target through
//! the real arbitration loop, and integrates the resulting drive signal until
//! the tank stops. Useful for tuning the steering thresholds.
//!
//! Run with: cargo run -p tank-command --bin seek-sim -- --target 10,0 --heading-deg 90 --telemetry

mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::{Vec2, Vec3};
use tank_command::command::PointerCommand;
use tank_command::input::InputFrame;
use tank_command::kinematics::{TankBody, TankKinematics};
use tank_command::registry::{MovementHandle, ShootingHandle};
use tank_command::sandbox::Sandbox;
use tank_command::{ArbitrationLoop, ControlConfig, VehicleLookup};

use telemetry::{TelemetrySnapshot, csv_header, csv_row};

/// Tap the screen once and return the pointer outcome when it did not
/// become a move order.
fn tap_ground(
    arbitration: &mut ArbitrationLoop,
    sandbox: &Sandbox,
    tap: Vec2,
    dt: f32,
) -> Result<(), Option<PointerCommand>> {
    let mut frame = InputFrame::new();
    frame.set_mouse_down(tap);
    match arbitration.tick(dt, &frame, sandbox, sandbox).command {
        Some(PointerCommand::Move { .. }) => Ok(()),
        other => Err(other),
    }
}

/// Parse an `X,Z` ground coordinate.
fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z, got '{s}'"))?;
    let x = x.trim().parse::<f32>().map_err(|e| format!("invalid x: {e}"))?;
    let z = z.trim().parse::<f32>().map_err(|e| format!("invalid z: {e}"))?;
    Ok(Vec2::new(x, z))
}

#[derive(Parser)]
#[command(about = "Simulate a tap-to-move order on a flat arena")]
struct CliArgs {
    /// Ground target as X,Z.
    #[arg(long, value_parser = parse_point, default_value = "0,20")]
    target: Vec2,

    /// Starting heading in degrees; 0 faces +Z, 90 faces +X.
    #[arg(long, default_value_t = 0.0)]
    heading_deg: f32,

    /// Stop distance override.
    #[arg(long)]
    stop_distance: Option<f32>,

    /// Simulation step in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Give up after this many ticks.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: u32,

    /// JSON control config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print per-tick CSV to stdout.
    #[arg(long)]
    telemetry: bool,
}

fn main() -> ExitCode {
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => match ControlConfig::from_json_file(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => ControlConfig::default(),
    };
    if let Some(stop_distance) = args.stop_distance {
        config.pointer.stop_distance = stop_distance;
    }
    let dt = if args.dt.is_finite() && args.dt > 0.0 {
        args.dt
    } else {
        1.0 / 60.0
    };

    let mut sandbox = Sandbox::new();
    let tank = sandbox.spawn_tank(Vec3::ZERO, args.heading_deg.to_radians(), 1);
    let mut arbitration = ArbitrationLoop::new(config);
    arbitration.register_tank(
        Some(MovementHandle::new(tank, 1)),
        Some(ShootingHandle::new(tank, 1)),
    );
    let stop_distance = arbitration.config().pointer.stop_distance;

    let target = Vec3::new(args.target.x, 0.0, args.target.y);
    let Some(tap) = sandbox.screen_point(target) else {
        tracing::error!("sandbox has no camera");
        return ExitCode::FAILURE;
    };
    tracing::info!(?target, heading_deg = args.heading_deg, stop_distance, "starting seek");

    let kinematics = TankKinematics::default();
    if args.telemetry {
        println!("{}", csv_header());
    }

    let idle = InputFrame::new();

    for tick in 0..args.max_ticks {
        if tick == 0 {
            if let Err(command) = tap_ground(&mut arbitration, &sandbox, tap, dt) {
                tracing::error!(?command, "tap did not produce a move order");
                return ExitCode::FAILURE;
            }
        } else {
            arbitration.tick(dt, &idle, &sandbox, &sandbox);
        }
        let signal = arbitration.evaluate(tank);
        sandbox.drive(tank, signal, &kinematics, dt);

        let Some(vehicle) = sandbox.vehicle(tank) else {
            tracing::error!("tank vanished");
            return ExitCode::FAILURE;
        };
        let mut offset = target - vehicle.position;
        offset.y = 0.0;
        let has_order = arbitration.has_move_target(tank);

        if args.telemetry {
            #[allow(clippy::cast_precision_loss)]
            let elapsed = (tick + 1) as f32 * dt;
            let snapshot = TelemetrySnapshot {
                tick,
                elapsed,
                body: TankBody::new(vehicle.position, vehicle.forward.x.atan2(vehicle.forward.z)),
                signal,
                distance: offset.length(),
                has_order,
            };
            println!("{}", csv_row(&snapshot));
        }

        if tick > 0 && !has_order {
            tracing::info!(tick, distance = offset.length(), "arrived");
            return ExitCode::SUCCESS;
        }
    }

    tracing::warn!(max_ticks = args.max_ticks, "timed out before arriving");
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use tank_command::command::PointerConfig;

    fn setup(config: ControlConfig) -> (ArbitrationLoop, Sandbox, Vec2) {
        let mut sandbox = Sandbox::new();
        let tank = sandbox.spawn_tank(Vec3::ZERO, 0.0, 1);
        let mut arbitration = ArbitrationLoop::new(config);
        arbitration.register_tank(
            Some(MovementHandle::new(tank, 1)),
            Some(ShootingHandle::new(tank, 1)),
        );
        let tap = sandbox.screen_point(Vec3::new(0.0, 0.0, 20.0)).unwrap();
        (arbitration, sandbox, tap)
    }

    #[test]
    fn test_ground_tap_issues_move_order() {
        let (mut arbitration, sandbox, tap) = setup(ControlConfig::default());
        assert_eq!(tap_ground(&mut arbitration, &sandbox, tap, 1.0 / 60.0), Ok(()));
    }

    #[test]
    fn test_short_ground_ray_reports_miss() {
        let config = ControlConfig {
            pointer: PointerConfig {
                ground_ray_distance: 10.0,
                ..PointerConfig::default()
            },
            ..ControlConfig::default()
        };
        let (mut arbitration, sandbox, tap) = setup(config);
        assert_eq!(
            tap_ground(&mut arbitration, &sandbox, tap, 1.0 / 60.0),
            Err(Some(PointerCommand::Miss))
        );
    }
}
