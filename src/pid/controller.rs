//! Generic PID loop with a guarded lifecycle.

use embedded_hal::delay::DelayNs;

use crate::config::PidConfig;
use crate::error::Result;

use super::channel::{FeedbackChannel, OutputChannel};

/// Lifecycle of a [`PidController`].
///
/// `NotInitialized -> init -> Stopped -> run -> Running -> stop -> Stopped
/// -> deinit -> NotInitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PidStatus {
    /// Channels not claimed.
    NotInitialized,
    /// Channels claimed, loop idle.
    Stopped,
    /// Loop active; `update` and `set_target` take effect.
    Running,
}

/// Accumulators that live from `init` to `deinit`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidState {
    /// Windup-limited sum of errors.
    pub integral: f32,
    /// Error seen by the previous update.
    pub previous_error: f32,
}

/// PID loop over an injected actuator and measurement.
///
/// Every public operation checks the lifecycle state first. A call made in
/// the wrong state does nothing and returns `Ok(())`.
pub struct PidController<O, F> {
    config: PidConfig,
    output: O,
    feedback: F,
    status: PidStatus,
    state: Option<PidState>,
}

impl<O, F> PidController<O, F>
where
    O: OutputChannel,
    F: FeedbackChannel,
{
    /// Create a controller in `NotInitialized`.
    pub fn new(config: PidConfig, output: O, feedback: F) -> Self {
        Self {
            config,
            output,
            feedback,
            status: PidStatus::NotInitialized,
            state: None,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn status(&self) -> PidStatus {
        self.status
    }

    /// Coefficients and current target.
    #[inline]
    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    /// Value the loop drives the feedback toward.
    #[inline]
    pub fn target(&self) -> f32 {
        self.config.target
    }

    /// Accumulators, present between `init` and `deinit`.
    #[inline]
    pub fn state(&self) -> Option<&PidState> {
        self.state.as_ref()
    }

    /// Borrow the output channel.
    #[inline]
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Borrow the feedback channel.
    #[inline]
    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Give back both channels.
    pub fn into_parts(self) -> (O, F) {
        (self.output, self.feedback)
    }

    /// Claim both channels and reset the accumulators.
    pub fn init(&mut self) -> Result<()> {
        if self.status != PidStatus::NotInitialized {
            return Ok(());
        }

        self.feedback.init()?;
        self.output.init()?;
        self.state = Some(PidState::default());
        self.status = PidStatus::Stopped;

        debug!("pid initialized");
        Ok(())
    }

    /// Start both channels.
    pub fn run(&mut self) -> Result<()> {
        if self.status != PidStatus::Stopped {
            return Ok(());
        }

        self.feedback.start()?;
        self.output.start()?;
        self.status = PidStatus::Running;

        info!("pid running, target {}", self.config.target);
        Ok(())
    }

    /// Stop both channels. Accumulators are kept.
    pub fn stop(&mut self) -> Result<()> {
        if self.status != PidStatus::Running {
            return Ok(());
        }

        self.feedback.stop()?;
        self.output.stop()?;
        self.status = PidStatus::Stopped;

        info!("pid stopped");
        Ok(())
    }

    /// Release both channels and drop the accumulators.
    pub fn deinit(&mut self) -> Result<()> {
        if self.status != PidStatus::Stopped {
            return Ok(());
        }

        self.feedback.deinit()?;
        self.output.deinit()?;
        self.state = None;
        self.status = PidStatus::NotInitialized;

        debug!("pid released");
        Ok(())
    }

    /// Change the target. Only takes effect while running.
    pub fn set_target(&mut self, target: f32) -> Result<()> {
        if self.status == PidStatus::Running {
            self.config.target = target;
        }
        Ok(())
    }

    /// Run one loop step against `channel` and write the output.
    pub fn update(&mut self, channel: F::Channel) -> Result<()> {
        if self.status != PidStatus::Running {
            return Ok(());
        }
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };

        let measured = self.feedback.value(channel)?;
        let output = step(&self.config, state, self.config.target - measured);

        trace!("pid measured {} output {}", measured, output);
        self.output.set_value(output)
    }

    /// Wait one period, then run one update.
    pub fn iterate<D: DelayNs>(
        &mut self,
        delay: &mut D,
        period_ms: u32,
        channel: F::Channel,
    ) -> Result<()> {
        delay.delay_ms(period_ms);
        self.update(channel)
    }
}

/// Advance the accumulators by one error sample and return the clamped output.
fn step(config: &PidConfig, state: &mut PidState, error: f32) -> f32 {
    let ceiling = config.windup.ceiling(config.target);

    if error >= 0.0 && state.integral < ceiling {
        state.integral = (state.integral + error).min(ceiling);
    } else if error <= 0.0 && state.integral > 0.0 {
        state.integral = (state.integral + error).max(0.0);
    }

    let raw = (config.p * error
        + config.i * state.integral
        + config.d * (error - state.previous_error))
        / config.m;
    state.previous_error = error;

    if !(raw > 0.0) {
        0.0
    } else if raw > config.output_max {
        config.output_max
    } else {
        raw
    }
}
