//! Output and feedback seams of the PID loop.

use crate::error::Result;

/// Actuator the loop writes its output to.
///
/// Implementations map their peripheral errors to
/// [`Error::HardwareFault`](crate::Error::HardwareFault).
pub trait OutputChannel {
    /// Claim and configure the actuator.
    fn init(&mut self) -> Result<()>;

    /// Begin driving the actuator.
    fn start(&mut self) -> Result<()>;

    /// Stop driving the actuator and leave it in its safe state.
    fn stop(&mut self) -> Result<()>;

    /// Apply a new loop output in `[0, output_max]`.
    fn set_value(&mut self, value: f32) -> Result<()>;

    /// Release the actuator.
    fn deinit(&mut self) -> Result<()>;
}

/// Measurement the loop regulates.
pub trait FeedbackChannel {
    /// Identifier of one measured quantity.
    type Channel: Copy;

    /// Claim and configure the measurement source.
    fn init(&mut self) -> Result<()>;

    /// Begin sampling.
    fn start(&mut self) -> Result<()>;

    /// Stop sampling.
    fn stop(&mut self) -> Result<()>;

    /// Latest measured value of `channel`.
    fn value(&mut self, channel: Self::Channel) -> Result<f32>;

    /// Release the measurement source.
    fn deinit(&mut self) -> Result<()>;
}
