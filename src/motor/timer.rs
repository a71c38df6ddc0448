//! Step-pulse timer interface and period arithmetic.

use libm::{ceilf, roundf};

use crate::config::units::Rpm;
use crate::config::{AxisGeometry, TimerConfig};
use crate::error::{Error, RangeError, Result};

/// Hardware timer channel generating one step pulse per period.
///
/// Methods take `&self` because the compare-match interrupt and the command
/// path both reach the timer through the shared [`AxisChannel`]. Register
/// level implementations are expected to be interrupt-safe for these calls.
///
/// [`AxisChannel`]: super::AxisChannel
pub trait StepTimer {
    /// Peripheral error type.
    type Error: core::fmt::Debug;

    /// Configure the counter and its interrupt line.
    fn init(&self) -> core::result::Result<(), Self::Error>;

    /// Release the counter and its interrupt line.
    fn deinit(&self) -> core::result::Result<(), Self::Error>;

    /// Program prescaler, period and compare value.
    fn configure(&self, setting: TimerSetting) -> core::result::Result<(), Self::Error>;

    /// Start counting and enable the compare-match interrupt.
    fn arm(&self) -> core::result::Result<(), Self::Error>;

    /// Stop counting and disable the compare-match interrupt.
    fn disarm(&self) -> core::result::Result<(), Self::Error>;

    /// Acknowledge a pending compare-match event.
    fn clear_compare_flag(&self);
}

/// Register values for one step rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerSetting {
    /// Prescaler register; the input clock is divided by `prescaler + 1`.
    pub prescaler: u16,
    /// Timer ticks per step pulse.
    pub period: u16,
    /// Compare value giving a 50% duty pulse.
    pub compare: u16,
}

impl TimerSetting {
    /// Ideal number of undivided clock ticks between two microsteps.
    ///
    /// `clock * step_angle / (6 * rpm * microsteps)`: one rpm is six degrees
    /// per second.
    #[inline]
    pub fn ideal_ticks(rpm: Rpm, geometry: &AxisGeometry, timer: &TimerConfig) -> f32 {
        timer.clock_hz as f32 * geometry.step_angle
            / (6.0 * rpm.0 * geometry.microsteps as f32)
    }

    /// Pick the smallest prescaler whose rounded period fits the counter.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange(StepFrequency)` when the step rate is too high
    /// (period below two ticks even undivided) or too low (period exceeds the
    /// counter at the largest prescaler), or when `rpm` is not positive.
    pub fn for_speed(rpm: Rpm, geometry: &AxisGeometry, timer: &TimerConfig) -> Result<Self> {
        let out_of_range = || Error::OutOfRange(RangeError::StepFrequency { rpm: rpm.0 });

        let ticks = Self::ideal_ticks(rpm, geometry, timer);
        if !(ticks.is_finite() && ticks > 0.0) {
            return Err(out_of_range());
        }

        let counter_max = timer.counter_max as f32;
        let divisor_max = timer.prescaler_max as f32 + 1.0;

        let mut divisor = ceilf(ticks / counter_max).max(1.0);
        loop {
            if divisor > divisor_max {
                return Err(out_of_range());
            }

            let period = roundf(ticks / divisor);
            if period <= counter_max {
                if period < 2.0 {
                    return Err(out_of_range());
                }

                let period = period as u16;
                return Ok(Self {
                    prescaler: (divisor - 1.0) as u16,
                    period,
                    compare: period / 2,
                });
            }

            // Float rounding pushed the quotient over the ceiling
            divisor += 1.0;
        }
    }

    /// Step frequency actually produced by this setting.
    #[inline]
    pub fn step_frequency_hz(&self, clock_hz: u32) -> f32 {
        clock_hz as f32 / ((self.prescaler as f32 + 1.0) * self.period as f32)
    }

    /// Undivided clock ticks per step produced by this setting.
    #[inline]
    pub fn total_ticks(&self) -> u32 {
        (self.prescaler as u32 + 1) * self.period as u32
    }
}
