//! Thermal module for p3d-core.
//!
//! Heater PWM output, temperature feedback and the regulator tying them to a
//! [`PidController`](crate::pid::PidController).

mod heater;
mod regulator;
mod sensor;

pub use heater::HeaterPwm;
pub use regulator::{StopSignal, ThermalRegulator};
pub use sensor::{TemperatureChannel, TemperatureFeedback, TemperatureSensor};
