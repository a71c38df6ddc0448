//! PID and heater regulation configuration.

use serde::Deserialize;

use crate::thermal::TemperatureChannel;

/// Ceiling applied to the PID integral accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindupGuard {
    /// Ceiling is `factor * target`, following the target as it changes.
    TargetMultiple(f32),
    /// Fixed ceiling independent of the target.
    Absolute(f32),
}

impl WindupGuard {
    /// Integral ceiling for the given target.
    #[inline]
    pub fn ceiling(self, target: f32) -> f32 {
        match self {
            WindupGuard::TargetMultiple(factor) => factor * target,
            WindupGuard::Absolute(limit) => limit,
        }
    }
}

impl Default for WindupGuard {
    fn default() -> Self {
        WindupGuard::TargetMultiple(25.0)
    }
}

/// Generic PID coefficients and limits.
///
/// Output is `(P*e + I*sum + D*(e - e_prev)) / M`, clamped to `[0, output_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PidConfig {
    /// Value the loop drives the feedback toward.
    #[serde(default)]
    pub target: f32,
    /// Overall scale (divides the whole sum).
    pub m: f32,
    /// Proportional gain.
    pub p: f32,
    /// Integral gain.
    pub i: f32,
    /// Derivative gain.
    pub d: f32,
    /// Integral ceiling policy.
    #[serde(default)]
    pub windup: WindupGuard,
    /// Output ceiling.
    #[serde(default = "default_output_max")]
    pub output_max: f32,
}

fn default_output_max() -> f32 {
    1.0
}

impl PidConfig {
    /// Coefficients tuned for the main hot end.
    pub const fn hot_end() -> Self {
        Self {
            target: 0.0,
            m: 310.0,
            p: 40.0,
            i: 0.05,
            d: 5.0,
            windup: WindupGuard::TargetMultiple(25.0),
            output_max: 1.0,
        }
    }
}

impl Default for PidConfig {
    fn default() -> Self {
        Self::hot_end()
    }
}

/// Heater regulation loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ThermalConfig {
    /// PID coefficients.
    #[serde(default)]
    pub pid: PidConfig,

    /// How often the loop runs, Hz.
    #[serde(default = "default_call_frequency")]
    pub call_frequency_hz: u32,

    /// Sensor channel fed back into the loop.
    #[serde(default)]
    pub channel: TemperatureChannel,

    /// Heater output is active-low (duty is written as `max * (1 - value)`).
    #[serde(default = "default_heater_inverted")]
    pub heater_inverted: bool,
}

fn default_call_frequency() -> u32 {
    10
}

fn default_heater_inverted() -> bool {
    true
}

impl ThermalConfig {
    /// Suspension between loop iterations, milliseconds.
    #[inline]
    pub fn period_ms(&self) -> u32 {
        1000 / self.call_frequency_hz.max(1)
    }
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            pid: PidConfig::default(),
            call_frequency_hz: default_call_frequency(),
            channel: TemperatureChannel::default(),
            heater_inverted: default_heater_inverted(),
        }
    }
}
