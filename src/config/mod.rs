//! Configuration module for p3d-core.
//!
//! Provides types for loading and validating timer, axis, linkage and heater
//! configuration from TOML files (with `std` feature) or pre-built values.

mod axis;
mod kinematics;
#[cfg(feature = "std")]
mod loader;
mod mechanical;
mod system;
mod thermal;
mod timer;
pub mod units;
mod validation;

pub use axis::{AxesConfig, AxisConfig};
pub use kinematics::KinematicsConfig;
pub use mechanical::AxisGeometry;
pub use system::MachineConfig;
pub use thermal::{PidConfig, ThermalConfig, WindupGuard};
pub use timer::TimerConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, Microsteps, Rpm, Steps};
