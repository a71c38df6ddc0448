//! Motor module for p3d-core.
//!
//! Interrupt-driven stepper axes: the command-side driver, the state it
//! shares with the compare-match interrupt, and step timer arithmetic.

mod axis;
mod builder;
mod direction;
mod driver;
pub mod state;
mod timer;

pub use axis::Axis;
pub use builder::StepperAxisDriverBuilder;
pub use direction::Direction;
pub use driver::{AxisDriver, StepperAxisDriver};
pub use state::{AxisChannel, DriverState, StepTick};
pub use timer::{StepTimer, TimerSetting};
