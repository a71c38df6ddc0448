//! Step timer configuration.

use serde::Deserialize;

/// Clock and counter widths of the step-pulse timers.
///
/// Defaults match a board that clocks every step timer from the
/// same 16 MHz bus.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TimerConfig {
    /// Timer input clock in Hz, before the prescaler.
    #[serde(default = "default_clock_hz")]
    pub clock_hz: u32,

    /// Largest period the counter can hold.
    #[serde(default = "default_counter_max")]
    pub counter_max: u16,

    /// Largest value the prescaler register accepts (divides by value + 1).
    #[serde(default = "default_prescaler_max")]
    pub prescaler_max: u16,
}

fn default_clock_hz() -> u32 {
    16_000_000
}

fn default_counter_max() -> u16 {
    0xFFFF
}

fn default_prescaler_max() -> u16 {
    0xFFFF
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            clock_hz: default_clock_hz(),
            counter_max: default_counter_max(),
            prescaler_max: default_prescaler_max(),
        }
    }
}
