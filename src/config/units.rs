//! Newtypes for shaft angles, speeds and microstep counts.

use core::ops::Sub;

use serde::Deserialize;

use crate::error::ConfigError;

/// Shaft angle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Degrees(pub f32);

impl Sub for Degrees {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Shaft speed in revolutions per minute.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Rpm(pub f32);

impl Rpm {
    /// True when the speed can drive a move (finite and strictly positive).
    #[inline]
    pub fn is_drivable(self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

/// Absolute axis position in microsteps.
///
/// 32 bits to match the interrupt-shared counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Steps(pub i32);

impl Steps {
    /// Raw microstep count.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }
}

/// Driver microstep divisor: a power of two from 1 to 256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Microsteps(u16);

impl Microsteps {
    /// Eighth steps.
    pub const EIGHTH: Self = Self(8);
    /// Sixteenth steps, the driver default.
    pub const SIXTEENTH: Self = Self(16);

    /// Accept a divisor the driver chip can be strapped to.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidMicrosteps` for anything but 1, 2, 4 .. 256.
    pub fn new(value: u16) -> Result<Self, ConfigError> {
        if value.is_power_of_two() && value <= 256 {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidMicrosteps(value))
        }
    }

    /// Raw divisor.
    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl Default for Microsteps {
    fn default() -> Self {
        Self::SIXTEENTH
    }
}

impl<'de> Deserialize<'de> for Microsteps {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u16::deserialize(deserializer)?;
        Microsteps::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
