//! Error types for p3d-core.
//!
//! Every fault is returned to the caller immediately; nothing in this crate
//! retries or rolls back.

use core::fmt;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all p3d-core operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A peripheral configuration, start or stop call failed
    HardwareFault(Peripheral),
    /// Value cannot be represented or identifier is unknown
    OutOfRange(RangeError),
    /// A displacement was requested with no usable speed
    IncompatibleArgs {
        /// Requested displacement in microsteps
        steps: i32,
        /// Requested speed
        rpm: f32,
    },
    /// Motion command issued before the axis driver was initialized
    NotInitialized,
    /// Configuration parsing or validation error
    Config(ConfigError),
}

/// Peripheral that reported a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    /// Step pulse timer / compare-match channel
    StepTimer,
    /// Direction output pin
    DirectionPin,
    /// Motor enable output pin
    EnablePin,
    /// Heater PWM output
    HeaterOutput,
    /// Temperature sensing collaborator
    TemperatureSensor,
}

/// Out-of-range conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeError {
    /// No prescaler makes the step period fit the timer counter
    StepFrequency {
        /// Requested speed
        rpm: f32,
    },
    /// The angle, or the distance to it, does not fit the step counter
    StepTarget {
        /// Requested angle in degrees
        degrees: f32,
    },
    /// Unknown axis identifier
    UnknownAxis(u8),
    /// Unknown temperature channel identifier
    UnknownChannel(u8),
    /// The linkage cannot reach the requested point
    Unreachable {
        /// Target X in mm
        x: f32,
        /// Target Y in mm
        y: f32,
        /// Target Z in mm
        z: f32,
    },
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Invalid microstep value (must be power of 2: 1, 2, 4, 8, 16, 32, 64, 128, 256)
    InvalidMicrosteps(u16),
    /// Invalid step angle (must be > 0)
    InvalidStepAngle(f32),
    /// Invalid timer clock (must be > 0)
    InvalidTimerClock(u32),
    /// Invalid counter ceiling (must be >= 2)
    InvalidCounterMax(u16),
    /// Invalid linkage dimension (must be > 0)
    InvalidLinkLength {
        /// Dimension name
        name: &'static str,
        /// Offending value
        value: f32,
    },
    /// Invalid per-axis step constant (must be non-zero)
    InvalidStepConstant(f32),
    /// Invalid PID overall scale (must be finite and non-zero)
    InvalidPidScale(f32),
    /// Invalid PID output ceiling (must be > 0)
    InvalidOutputMax(f32),
    /// Invalid integral ceiling (must be >= 0)
    InvalidWindupLimit(f32),
    /// Invalid controller call frequency (must be 1-1000 Hz)
    InvalidCallFrequency(u32),
    /// Builder is missing a required part
    MissingField(&'static str),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::HardwareFault(p) => write!(f, "Hardware fault: {}", p),
            Error::OutOfRange(e) => write!(f, "Out of range: {}", e),
            Error::IncompatibleArgs { steps, rpm } => {
                write!(f, "Incompatible arguments: {} steps requested at {} rpm", steps, rpm)
            }
            Error::NotInitialized => write!(f, "Axis driver not initialized"),
            Error::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Peripheral::StepTimer => "step timer",
            Peripheral::DirectionPin => "direction pin",
            Peripheral::EnablePin => "enable pin",
            Peripheral::HeaterOutput => "heater output",
            Peripheral::TemperatureSensor => "temperature sensor",
        };
        f.write_str(name)
    }
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::StepFrequency { rpm } => {
                write!(f, "step frequency for {} rpm does not fit the timer", rpm)
            }
            RangeError::StepTarget { degrees } => {
                write!(f, "{} degrees is outside the step counter range", degrees)
            }
            RangeError::UnknownAxis(id) => write!(f, "unknown axis {}", id),
            RangeError::UnknownChannel(id) => write!(f, "unknown temperature channel {}", id),
            RangeError::Unreachable { x, y, z } => {
                write!(f, "point ({}, {}, {}) is outside the linkage workspace", x, y, z)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::InvalidMicrosteps(v) => {
                write!(f, "Invalid microsteps: {}. Valid values: 1, 2, 4, 8, 16, 32, 64, 128, 256", v)
            }
            ConfigError::InvalidStepAngle(v) => write!(f, "Invalid step angle: {}. Must be > 0", v),
            ConfigError::InvalidTimerClock(v) => write!(f, "Invalid timer clock: {} Hz. Must be > 0", v),
            ConfigError::InvalidCounterMax(v) => write!(f, "Invalid counter max: {}. Must be >= 2", v),
            ConfigError::InvalidLinkLength { name, value } => {
                write!(f, "Invalid linkage dimension {}: {}. Must be > 0", name, value)
            }
            ConfigError::InvalidStepConstant(v) => write!(f, "Invalid step constant: {}. Must be non-zero", v),
            ConfigError::InvalidPidScale(v) => write!(f, "Invalid PID scale: {}. Must be non-zero", v),
            ConfigError::InvalidOutputMax(v) => write!(f, "Invalid output max: {}. Must be > 0", v),
            ConfigError::InvalidWindupLimit(v) => write!(f, "Invalid integral ceiling: {}. Must be >= 0", v),
            ConfigError::InvalidCallFrequency(v) => {
                write!(f, "Invalid call frequency: {} Hz. Must be 1-1000", v)
            }
            ConfigError::MissingField(name) => write!(f, "{} is required", name),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<RangeError> for Error {
    fn from(e: RangeError) -> Self {
        Error::OutOfRange(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for RangeError {}
