//! Machine configuration - root configuration structure.

use serde::Deserialize;

use super::axis::{AxesConfig, AxisConfig};
use super::kinematics::KinematicsConfig;
use super::thermal::ThermalConfig;
use super::timer::TimerConfig;
use crate::motor::Axis;

/// Root configuration structure from TOML.
///
/// Every section is optional; missing sections take the stock rig
/// calibration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineConfig {
    /// Step timer clock and counter widths.
    #[serde(default)]
    pub timer: TimerConfig,

    /// Per-axis motor settings.
    #[serde(default)]
    pub axes: AxesConfig,

    /// Linkage geometry.
    #[serde(default)]
    pub kinematics: KinematicsConfig,

    /// Heater regulation.
    #[serde(default)]
    pub thermal: ThermalConfig,
}

impl MachineConfig {
    /// Get an axis configuration.
    pub fn axis(&self, axis: Axis) -> &AxisConfig {
        match axis {
            Axis::X => &self.axes.x,
            Axis::Y => &self.axes.y,
            Axis::Z => &self.axes.z,
        }
    }

    /// Iterate axis configurations in X, Y, Z order.
    pub fn axis_configs(&self) -> impl Iterator<Item = (Axis, &AxisConfig)> {
        Axis::ALL.into_iter().map(move |axis| (axis, self.axis(axis)))
    }
}
