//! Builder pattern for StepperAxisDriver.

use embedded_hal::digital::OutputPin;

use crate::config::{AxisConfig, AxisGeometry, MachineConfig, TimerConfig};
use crate::error::{ConfigError, Error, Result};

use super::axis::Axis;
use super::driver::StepperAxisDriver;
use super::state::AxisChannel;
use super::timer::StepTimer;

/// Builder for creating StepperAxisDriver instances.
pub struct StepperAxisDriverBuilder<'a, T, DIR, EN>
where
    T: StepTimer,
    DIR: OutputPin,
    EN: OutputPin,
{
    channel: Option<&'a AxisChannel<T>>,
    dir_pin: Option<DIR>,
    enable_pin: Option<EN>,
    name: Option<heapless::String<32>>,
    geometry: Option<AxisGeometry>,
    timer_config: TimerConfig,
    invert_direction: bool,
    enable_active_low: bool,
}

impl<T, DIR, EN> Default for StepperAxisDriverBuilder<'_, T, DIR, EN>
where
    T: StepTimer,
    DIR: OutputPin,
    EN: OutputPin,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T, DIR, EN> StepperAxisDriverBuilder<'a, T, DIR, EN>
where
    T: StepTimer,
    DIR: OutputPin,
    EN: OutputPin,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            channel: None,
            dir_pin: None,
            enable_pin: None,
            name: None,
            geometry: None,
            timer_config: TimerConfig::default(),
            invert_direction: false,
            enable_active_low: true,
        }
    }

    /// Set the shared timer channel.
    pub fn channel(mut self, channel: &'a AxisChannel<T>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Set the DIR pin.
    pub fn dir_pin(mut self, pin: DIR) -> Self {
        self.dir_pin = Some(pin);
        self
    }

    /// Set the ENABLE pin.
    pub fn enable_pin(mut self, pin: EN) -> Self {
        self.enable_pin = Some(pin);
        self
    }

    /// Set the axis name.
    pub fn name(mut self, name: &str) -> Self {
        self.name = heapless::String::try_from(name).ok();
        self
    }

    /// Set step angle and microstep divisor directly.
    pub fn geometry(mut self, geometry: AxisGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the timer clock and register widths.
    pub fn timer_config(mut self, config: TimerConfig) -> Self {
        self.timer_config = config;
        self
    }

    /// Set direction inversion.
    pub fn invert_direction(mut self, invert: bool) -> Self {
        self.invert_direction = invert;
        self
    }

    /// Set enable line polarity.
    pub fn enable_active_low(mut self, active_low: bool) -> Self {
        self.enable_active_low = active_low;
        self
    }

    /// Configure from an AxisConfig.
    pub fn from_axis_config(mut self, config: &AxisConfig) -> Self {
        if !config.name.is_empty() {
            self.name = Some(config.name.clone());
        }
        self.geometry = Some(AxisGeometry::from_config(config));
        self.invert_direction = config.invert_direction;
        self.enable_active_low = config.enable_active_low;
        self
    }

    /// Configure from a MachineConfig: the axis section plus the shared timer.
    pub fn from_config(self, config: &MachineConfig, axis: Axis) -> Self {
        let builder = self.from_axis_config(config.axis(axis)).timer_config(config.timer);
        if builder.name.is_some() {
            builder
        } else {
            builder.name(axis.name())
        }
    }

    /// Build the StepperAxisDriver.
    ///
    /// Geometry defaults to a 1.8 degree motor at 1/16 microstepping.
    ///
    /// # Errors
    ///
    /// Returns `Config(MissingField)` if the channel or a pin was not given.
    pub fn build(self) -> Result<StepperAxisDriver<'a, T, DIR, EN>> {
        let channel = self
            .channel
            .ok_or(Error::Config(ConfigError::MissingField("channel")))?;
        let dir_pin = self
            .dir_pin
            .ok_or(Error::Config(ConfigError::MissingField("dir_pin")))?;
        let enable_pin = self
            .enable_pin
            .ok_or(Error::Config(ConfigError::MissingField("enable_pin")))?;

        let geometry = self
            .geometry
            .unwrap_or_else(|| AxisGeometry::from_config(&AxisConfig::default()));

        Ok(StepperAxisDriver::new(
            channel,
            dir_pin,
            enable_pin,
            geometry,
            self.timer_config,
            self.name.unwrap_or_default(),
            self.invert_direction,
            self.enable_active_low,
        ))
    }
}
