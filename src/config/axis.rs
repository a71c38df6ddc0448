//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::Microsteps;

/// Per-axis motor configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    #[serde(default)]
    pub name: String<32>,

    /// Mechanical full-step angle in degrees (1.8 for 200-step motors).
    #[serde(default = "default_step_angle", rename = "step_angle_deg")]
    pub step_angle: f32,

    /// Microstep setting (1, 2, 4, 8, 16, 32, etc.).
    #[serde(default)]
    pub microsteps: Microsteps,

    /// Invert direction pin logic.
    #[serde(default)]
    pub invert_direction: bool,

    /// Driver is energised by pulling the enable line low.
    #[serde(default = "default_enable_active_low")]
    pub enable_active_low: bool,
}

fn default_step_angle() -> f32 {
    1.8
}

fn default_enable_active_low() -> bool {
    true
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            step_angle: default_step_angle(),
            microsteps: Microsteps::default(),
            invert_direction: false,
            enable_active_low: default_enable_active_low(),
        }
    }
}

impl AxisConfig {
    /// Microsteps per full mechanical revolution.
    pub fn steps_per_revolution(&self) -> f32 {
        360.0 / self.step_angle * self.microsteps.value() as f32
    }

    /// Microsteps per degree of shaft rotation.
    pub fn steps_per_degree(&self) -> f32 {
        self.microsteps.value() as f32 / self.step_angle
    }
}

/// The three axis sections of a machine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AxesConfig {
    /// X axis.
    #[serde(default)]
    pub x: AxisConfig,
    /// Y axis.
    #[serde(default)]
    pub y: AxisConfig,
    /// Z axis.
    #[serde(default)]
    pub z: AxisConfig,
}
