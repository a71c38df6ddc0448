//! Direction of shaft rotation.

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (positive step count).
    Clockwise,
    /// Counter-clockwise (negative step count).
    CounterClockwise,
}

impl Direction {
    /// Get direction from a signed step delta.
    #[inline]
    pub fn from_steps(steps: i32) -> Self {
        if steps >= 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub const fn sign(self) -> i8 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }

    /// Decode a stored sign; anything non-negative is clockwise.
    #[inline]
    pub const fn from_sign(sign: i8) -> Self {
        if sign >= 0 {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}
