//! Coordinated three-axis motion.

use libm::fabsf;

use crate::config::units::{Degrees, Rpm};
use crate::error::Result;
use crate::motor::{Axis, AxisDriver};

use super::kinematics::{Kinematics, Point};

/// Three axes plus the logical tool position.
///
/// Multi-axis operations always visit X, then Y, then Z, and stop at the
/// first failing axis. Axes already changed are left as they are: after an
/// error the caller should query each axis before continuing.
pub struct MotionController<X, Y, Z> {
    x: X,
    y: Y,
    z: Z,
    kinematics: Kinematics,
    position: Point,
}

impl<X, Y, Z> MotionController<X, Y, Z>
where
    X: AxisDriver,
    Y: AxisDriver,
    Z: AxisDriver,
{
    /// Assemble a controller. The logical position starts at the origin.
    pub fn new(x: X, y: Y, z: Z, kinematics: Kinematics) -> Self {
        Self {
            x,
            y,
            z,
            kinematics,
            position: Point::ORIGIN,
        }
    }

    /// Logical position committed by the last completed move.
    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Linkage transform in use.
    #[inline]
    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Borrow one axis.
    pub fn axis(&self, axis: Axis) -> &dyn AxisDriver {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Mutably borrow one axis.
    pub fn axis_mut(&mut self, axis: Axis) -> &mut dyn AxisDriver {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    /// Take the axis drivers back.
    pub fn release(self) -> (X, Y, Z) {
        (self.x, self.y, self.z)
    }

    /// Initialise every axis.
    pub fn init_all_motors(&mut self) -> Result<()> {
        self.for_each_axis(|axis| axis.init())
    }

    /// Release every axis.
    pub fn deinit_all_motors(&mut self) -> Result<()> {
        self.for_each_axis(|axis| axis.deinit())
    }

    /// Energise every axis.
    pub fn enable_all_motors(&mut self) -> Result<()> {
        self.for_each_axis(|axis| axis.enable())
    }

    /// De-energise every axis.
    pub fn disable_all_motors(&mut self) -> Result<()> {
        self.for_each_axis(|axis| axis.disable())
    }

    /// Zero every axis counter and reset the logical position.
    ///
    /// The position is only reset when all three counters were zeroed.
    pub fn zero_out_position(&mut self) -> Result<()> {
        self.for_each_axis(|axis| axis.zero_counter())?;
        self.position = Point::ORIGIN;
        Ok(())
    }

    /// Move in a straight line to `(x, y, z)` and wait for every axis.
    ///
    /// Each axis runs at `speed * |cos| / k`, where `cos` is the direction
    /// cosine of the move along that axis and `k` its step constant. A target
    /// equal to the current position succeeds without commanding anything.
    ///
    /// # Errors
    ///
    /// Returns the first axis error, or `OutOfRange(Unreachable)` when the
    /// linkage cannot reach the target. Axes commanded before the failing one
    /// keep running and the logical position is unchanged.
    pub fn go_to_with_speed(&mut self, x: f32, y: f32, z: f32, speed: f32) -> Result<()> {
        let target = Point::new(x, y, z);
        let delta = target - self.position;
        let distance = delta.norm();

        if distance == 0.0 {
            debug!("move to current position skipped");
            return Ok(());
        }

        let angles = self.kinematics.axis_angles(target)?;

        for axis in Axis::ALL {
            let cosine = delta.component(axis) / distance;
            let rpm = Rpm(speed * fabsf(cosine) / self.kinematics.step_constant(axis));
            let angle = angles[axis.index()];

            if let Err(e) = self.axis_mut(axis).set_speed_and_target(rpm, angle) {
                warn!("axis {} rejected move to {} deg", axis.name(), angle.0);
                return Err(e);
            }
        }

        self.wait_until_idle();
        self.position = target;

        debug!("at {} {} {}", x, y, z);
        Ok(())
    }

    /// Spin until no axis reports a move in flight.
    pub fn wait_until_idle(&self) {
        while self.is_any_busy() {
            core::hint::spin_loop();
        }
    }

    /// True while any axis is moving.
    pub fn is_any_busy(&self) -> bool {
        Axis::ALL.iter().any(|&axis| self.axis(axis).is_busy())
    }

    /// Energise one axis.
    pub fn enable_motor(&mut self, axis: Axis) -> Result<()> {
        self.axis_mut(axis).enable()
    }

    /// De-energise one axis.
    pub fn disable_motor(&mut self, axis: Axis) -> Result<()> {
        self.axis_mut(axis).disable()
    }

    /// Halt one axis immediately.
    pub fn stop_motor(&mut self, axis: Axis) -> Result<()> {
        self.axis_mut(axis).stop()
    }

    /// Command one axis directly, bypassing the kinematics.
    ///
    /// The logical position is not updated.
    pub fn set_speed_and_target(&mut self, axis: Axis, rpm: Rpm, angle: Degrees) -> Result<()> {
        self.axis_mut(axis).set_speed_and_target(rpm, angle)
    }

    /// Zero one axis counter. The logical position is not updated.
    pub fn zero_out_angle_counter(&mut self, axis: Axis) -> Result<()> {
        self.axis_mut(axis).zero_counter()
    }

    /// True while the axis is moving.
    pub fn is_motor_busy(&self, axis: Axis) -> bool {
        self.axis(axis).is_busy()
    }

    /// Current shaft angle of one axis.
    pub fn angle(&self, axis: Axis) -> Degrees {
        self.axis(axis).angle()
    }

    fn for_each_axis<F>(&mut self, mut op: F) -> Result<()>
    where
        F: FnMut(&mut dyn AxisDriver) -> Result<()>,
    {
        for axis in Axis::ALL {
            if let Err(e) = op(self.axis_mut(axis)) {
                warn!("axis {} failed, sequence aborted", axis.name());
                return Err(e);
            }
        }
        Ok(())
    }
}
