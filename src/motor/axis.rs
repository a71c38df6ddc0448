//! Axis identifiers.

use core::fmt;

use crate::error::{Error, RangeError};

/// One of the machine's statically known axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All axes in the fixed sequencing order used by multi-axis operations.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Number of axes.
    pub const COUNT: usize = 3;

    /// Zero-based index of the axis.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short display name.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl TryFrom<u8> for Axis {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Axis::X),
            1 => Ok(Axis::Y),
            2 => Ok(Axis::Z),
            other => Err(Error::OutOfRange(RangeError::UnknownAxis(other))),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
