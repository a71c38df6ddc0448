//! # p3d-core
//!
//! Real-time motion and thermal control core for a 3D-printer-class machine.
//!
//! ## Features
//!
//! - **Interrupt-driven axes**: each [`StepperAxisDriver`] owns a compare-match
//!   timer channel; the interrupt handler advances the microstep counter and
//!   stops the timer on its own when the commanded target is reached
//! - **Linkage kinematics**: [`MotionController`] turns Cartesian targets into
//!   per-axis angle and speed commands
//! - **Generic PID**: [`PidController`] runs over injected output and feedback
//!   channels with a guarded `NotInitialized → Stopped → Running` lifecycle
//! - **Heater regulation**: [`ThermalRegulator`] wires a PWM heater and a
//!   temperature sensor into the PID at a fixed call frequency
//! - **no_std compatible**: the core works without the standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use p3d_core::{AxisChannel, MotionController, StepperAxisDriver};
//!
//! static X: AxisChannel<Tim9> = AxisChannel::new(Tim9::new());
//!
//! // In the TIM9 compare-match interrupt:
//! // X.on_compare_match();
//!
//! let x = StepperAxisDriver::builder()
//!     .channel(&X)
//!     .dir_pin(dir_x)
//!     .enable_pin(en_x)
//!     .from_axis_config(&config.axes.x)
//!     .timer_config(config.timer)
//!     .build()?;
//!
//! let mut motion = MotionController::new(x, y, z, Kinematics::from_config(&config.kinematics));
//! motion.init_all_motors()?;
//! motion.enable_all_motors()?;
//! motion.go_to_with_speed(10.0, 10.0, 5.0, 600.0)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `defmt`: Enables defmt logging for embedded targets
//! - `log`: Routes logging through the `log` facade

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod pid;
pub mod thermal;

// Re-exports for ergonomic API
pub use config::{validate_config, AxisConfig, MachineConfig, PidConfig, ThermalConfig, TimerConfig};
pub use error::{Error, Peripheral, RangeError, Result};
pub use motion::{Kinematics, MotionController, Point};
pub use motor::{Axis, AxisChannel, AxisDriver, Direction, StepTick, StepTimer, StepperAxisDriver};
pub use pid::{FeedbackChannel, OutputChannel, PidController, PidStatus};
pub use thermal::{StopSignal, TemperatureChannel, TemperatureSensor, ThermalRegulator};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{Degrees, Microsteps, Rpm, Steps};
