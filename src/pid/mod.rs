//! PID module for p3d-core.
//!
//! A lifecycle-guarded PID loop generic over its output and feedback
//! channels.

mod channel;
mod controller;

pub use channel::{FeedbackChannel, OutputChannel};
pub use controller::{PidController, PidState, PidStatus};
