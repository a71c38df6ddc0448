//! Temperature feedback.

use core::fmt::Debug;

use serde::Deserialize;

use crate::error::{Error, Peripheral, RangeError, Result};
use crate::pid::FeedbackChannel;

/// Measured temperature point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum TemperatureChannel {
    /// Main extruder hot end.
    #[default]
    HotEnd,
}

impl TryFrom<u8> for TemperatureChannel {
    type Error = Error;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(TemperatureChannel::HotEnd),
            other => Err(Error::OutOfRange(RangeError::UnknownChannel(other))),
        }
    }
}

/// Source of compensated, linearised temperatures in degrees Celsius.
///
/// Sampling and thermocouple conversion happen behind this trait. Lifecycle
/// hooks default to doing nothing.
pub trait TemperatureSensor {
    /// Sensor error type.
    type Error: Debug;

    /// Claim the sampling hardware.
    fn init(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Begin sampling.
    fn start(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Stop sampling.
    fn stop(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Release the sampling hardware.
    fn deinit(&mut self) -> core::result::Result<(), Self::Error> {
        Ok(())
    }

    /// Latest temperature of `channel`.
    fn temperature(&mut self, channel: TemperatureChannel) -> core::result::Result<f32, Self::Error>;
}

/// Adapts a [`TemperatureSensor`] to the PID feedback seam.
pub struct TemperatureFeedback<S> {
    sensor: S,
}

impl<S: TemperatureSensor> TemperatureFeedback<S> {
    /// Wrap a sensor.
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }

    /// Borrow the sensor.
    #[inline]
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Give back the sensor.
    pub fn release(self) -> S {
        self.sensor
    }
}

fn sensor_fault<E: Debug>(_: E) -> Error {
    Error::HardwareFault(Peripheral::TemperatureSensor)
}

impl<S: TemperatureSensor> FeedbackChannel for TemperatureFeedback<S> {
    type Channel = TemperatureChannel;

    fn init(&mut self) -> Result<()> {
        self.sensor.init().map_err(sensor_fault)
    }

    fn start(&mut self) -> Result<()> {
        self.sensor.start().map_err(sensor_fault)
    }

    fn stop(&mut self) -> Result<()> {
        self.sensor.stop().map_err(sensor_fault)
    }

    fn value(&mut self, channel: TemperatureChannel) -> Result<f32> {
        let reading = self.sensor.temperature(channel).map_err(sensor_fault)?;
        if !reading.is_finite() {
            error!("non-finite temperature reading");
            return Err(Error::HardwareFault(Peripheral::TemperatureSensor));
        }
        Ok(reading)
    }

    fn deinit(&mut self) -> Result<()> {
        self.sensor.deinit().map_err(sensor_fault)
    }
}
