//! Per-tick CSV rows for the seek simulator.

use tank_command::ControlSignal;
use tank_command::kinematics::TankBody;

/// State of the simulated tank after one tick.
pub struct TelemetrySnapshot {
    pub tick: u32,
    pub elapsed: f32,
    pub body: TankBody,
    pub signal: ControlSignal,
    pub distance: f32,
    pub has_order: bool,
}

/// Defines the CSV header and row formatter from one column list so the two
/// never drift apart.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        row_values: |$snapshot:ident| { $( $val:expr ),* $(,)? }
    ) => {
        /// CSV header line.
        pub fn csv_header() -> &'static str {
            const HEADER: &str = concat!( $( stringify!($name), "," ),* );
            HEADER.trim_end_matches(',')
        }

        /// One CSV row.
        pub fn csv_row($snapshot: &TelemetrySnapshot) -> String {
            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            line.trim_end_matches(',').to_owned()
        }
    };
}

define_telemetry! {
    columns: {
        tick: "{}",
        t: "{:.4}",
        x: "{:.3}",
        z: "{:.3}",
        yaw_deg: "{:.2}",
        movement: "{:.3}",
        turn: "{:.3}",
        distance: "{:.3}",
        seeking: "{}",
    },
    row_values: |s| {
        s.tick,
        s.elapsed,
        s.body.position.x,
        s.body.position.z,
        s.body.yaw.to_degrees(),
        s.signal.movement,
        s.signal.turn,
        s.distance,
        u8::from(s.has_order),
    }
}
