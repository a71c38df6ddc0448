//! Motion module for p3d-core.
//!
//! Maps Cartesian moves onto the three axis drivers.

mod controller;
mod kinematics;

pub use controller::MotionController;
pub use kinematics::{Kinematics, Point};
