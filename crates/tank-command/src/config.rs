//! Tunables for the whole control stack.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Out-of-range values are clamped by [`ControlConfig::sanitized`]
//! rather than rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::charge::ChargeTuning;
use crate::command::PointerConfig;
use crate::driver::DriveThresholds;
use crate::error::{ConfigError, ConfigResult};
use crate::marker::MarkerTuning;
use crate::steering::SteeringTuning;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Tap-to-move ray and stop distance.
    pub pointer: PointerConfig,
    /// Seek-and-stop heading thresholds.
    pub steering: SteeringTuning,
    /// Manual axis magnitude that cancels a move order.
    pub manual_override_threshold: f32,
    /// Target marker animation.
    pub marker: MarkerTuning,
    /// Gun charging.
    pub fire: ChargeTuning,
    /// Both axes below this count as an idling engine.
    pub engine_idle_threshold: f32,
    /// On-screen joystick clamp radius (pixels).
    pub joystick_radius: f32,
    /// Route the on-screen fire button to the primary tank.
    pub touch_controls: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            pointer: PointerConfig::default(),
            steering: SteeringTuning::default(),
            manual_override_threshold: 0.05,
            marker: MarkerTuning::default(),
            fire: ChargeTuning::default(),
            engine_idle_threshold: 0.1,
            joystick_radius: 80.0,
            touch_controls: false,
        }
    }
}

impl ControlConfig {
    /// Clamp every value into its accepted range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let unit = |value: f32, fallback: f32| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        Self {
            pointer: self.pointer.sanitized(),
            steering: self.steering.sanitized(),
            manual_override_threshold: unit(
                self.manual_override_threshold,
                defaults.manual_override_threshold,
            ),
            marker: self.marker.sanitized(),
            fire: self.fire.sanitized(),
            engine_idle_threshold: unit(self.engine_idle_threshold, defaults.engine_idle_threshold),
            joystick_radius: if self.joystick_radius.is_finite() {
                self.joystick_radius.max(0.0)
            } else {
                defaults.joystick_radius
            },
            touch_controls: self.touch_controls,
        }
    }

    /// Parse a JSON config and sanitize it.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|source| ConfigError::Parse { source })?;
        Ok(config.sanitized())
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "loaded control config");
        Ok(config)
    }

    pub fn drive_thresholds(&self) -> DriveThresholds {
        DriveThresholds {
            manual_override: self.manual_override_threshold,
            engine_idle: self.engine_idle_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ControlConfig::from_json_str(
            r#"{ "pointer": { "stop_distance": 3.0 }, "touch_controls": true }"#,
        )
        .unwrap();
        assert_eq!(config.pointer.stop_distance, 3.0);
        assert_eq!(config.pointer.ground_ray_distance, 500.0);
        assert!(config.touch_controls);
        assert_eq!(config.marker.entry_duration, 0.18);
        assert_eq!(config.steering, SteeringTuning::default());
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let config = ControlConfig::from_json_str(
            r#"{
                "pointer": { "stop_distance": 0.0 },
                "manual_override_threshold": 4.0,
                "marker": { "entry_duration": -1.0 },
                "fire": { "min_launch_force": 40.0, "max_launch_force": 10.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.pointer.stop_distance, 0.2);
        assert_eq!(config.manual_override_threshold, 1.0);
        assert_eq!(config.marker.entry_duration, 0.0);
        assert_eq!(config.fire.max_launch_force, 40.0);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = ControlConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("invalid config"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ControlConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
