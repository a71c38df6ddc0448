//! Step geometry derived from axis configuration.

use libm::roundf;

use super::axis::AxisConfig;
use super::units::{Degrees, Steps};

/// Derived conversion parameters for one axis.
///
/// Computed once at driver construction and used for every command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGeometry {
    /// Mechanical full-step angle in degrees.
    pub step_angle: f32,

    /// Microsteps per full step.
    pub microsteps: u16,

    /// Microsteps per degree of shaft rotation.
    pub steps_per_degree: f32,
}

impl AxisGeometry {
    /// Compute geometry from axis configuration.
    pub fn from_config(config: &AxisConfig) -> Self {
        Self::new(config.step_angle, config.microsteps.value())
    }

    /// Compute geometry from raw step angle and microstep divisor.
    pub fn new(step_angle: f32, microsteps: u16) -> Self {
        Self {
            step_angle,
            microsteps,
            steps_per_degree: microsteps as f32 / step_angle,
        }
    }

    /// Convert an absolute angle to the nearest microstep count.
    ///
    /// `None` when the angle is not finite or its step count does not fit
    /// an `i32`.
    #[inline]
    pub fn degrees_to_steps(&self, degrees: Degrees) -> Option<Steps> {
        let steps = roundf(degrees.0 * self.microsteps as f32 / self.step_angle);
        // 2^31 is exact in f32; i32::MAX is not
        let limit = -(i32::MIN as f32);
        if steps.is_finite() && steps >= -limit && steps < limit {
            Some(Steps(steps as i32))
        } else {
            None
        }
    }

    /// Convert a microstep count to degrees.
    #[inline]
    pub fn steps_to_degrees(&self, steps: Steps) -> Degrees {
        Degrees(steps.0 as f32 * self.step_angle / self.microsteps as f32)
    }

    /// Angular resolution of one microstep, in degrees.
    #[inline]
    pub fn resolution(&self) -> Degrees {
        Degrees(self.step_angle / self.microsteps as f32)
    }
}
