//! Cartesian to shaft-angle transform of the two-arm linkage.

use core::ops::Sub;

use libm::{acosf, atanf, sqrtf};

use crate::config::units::Degrees;
use crate::config::KinematicsConfig;
use crate::error::{Error, RangeError, Result};
use crate::motor::Axis;

/// Logical tool position in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Point {
    /// Home position, where the axis counters are zeroed.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0, z: 0.0 };

    /// Create a point.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Coordinate along one axis.
    #[inline]
    pub fn component(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Euclidean length of the vector from the origin.
    #[inline]
    pub fn norm(&self) -> f32 {
        sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// True when every coordinate is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Linkage transform built from rig calibration.
///
/// The X and Y shafts each drive an arm through a lead screw; their angles
/// depend on all three coordinates. Z is a plain lead screw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    config: KinematicsConfig,
}

impl Kinematics {
    /// Create a transform from calibration data.
    pub fn from_config(config: &KinematicsConfig) -> Self {
        Self { config: *config }
    }

    /// Calibration in use.
    #[inline]
    pub fn config(&self) -> &KinematicsConfig {
        &self.config
    }

    /// Degrees of shaft rotation per millimetre of travel.
    #[inline]
    pub fn step_constant(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.config.kx,
            Axis::Y => self.config.ky,
            Axis::Z => self.config.kz,
        }
    }

    /// Shaft angles for a point, relative to the home pose.
    ///
    /// The home pose is [`Point::ORIGIN`], so all three angles are zero there.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange(Unreachable)` when the linkage cannot reach the
    /// point (or the origin, for a bad calibration).
    pub fn axis_angles(&self, point: Point) -> Result<[Degrees; Axis::COUNT]> {
        let target = self.absolute_angles(point)?;
        let home = self.absolute_angles(Point::ORIGIN)?;

        Ok([
            target[0] - home[0],
            target[1] - home[1],
            target[2] - home[2],
        ])
    }

    /// Shaft angles for a point as given by the linkage equations.
    pub fn absolute_angles(&self, point: Point) -> Result<[Degrees; Axis::COUNT]> {
        let c = &self.config;
        let unreachable = || {
            Error::OutOfRange(RangeError::Unreachable {
                x: point.x,
                y: point.y,
                z: point.z,
            })
        };

        if !point.is_finite() {
            return Err(unreachable());
        }

        let Point { x, y, z } = point;

        let ey = y + c.ooe;
        let x_cos = law_of_cosines(c.eg, c.oe, ey, z).ok_or_else(unreachable)?;
        let x_angle = x * c.kx - c.ix + acos_deg(x_cos).ok_or_else(unreachable)? + atan_deg(z, y);

        let dx = x + c.ood;
        let y_cos = law_of_cosines(c.df, c.od, dx, z).ok_or_else(unreachable)?;
        let y_angle = y * c.ky - c.iy + acos_deg(y_cos).ok_or_else(unreachable)? + atan_deg(z, x);

        Ok([Degrees(x_angle), Degrees(y_angle), Degrees(z * c.kz)])
    }
}

/// Cosine of the angle between the upper link and the pivot-to-point line.
fn law_of_cosines(upper: f32, lower: f32, a: f32, b: f32) -> Option<f32> {
    let reach_sq = a * a + b * b;
    let reach = sqrtf(reach_sq);
    if !(reach > 0.0) {
        return None;
    }
    Some((upper * upper - lower * lower + reach_sq) / (2.0 * upper * reach))
}

fn acos_deg(cos: f32) -> Option<f32> {
    if !(-1.0..=1.0).contains(&cos) {
        return None;
    }
    Some(acosf(cos).to_degrees())
}

// atan(num / den) in degrees, 0 at 0/0 and +-90 on the vertical
fn atan_deg(num: f32, den: f32) -> f32 {
    if den == 0.0 {
        if num == 0.0 {
            0.0
        } else if num > 0.0 {
            90.0
        } else {
            -90.0
        }
    } else {
        atanf(num / den).to_degrees()
    }
}
