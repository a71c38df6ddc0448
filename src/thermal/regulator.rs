//! Hot-end temperature regulation.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use portable_atomic::{AtomicBool, Ordering};

use crate::config::ThermalConfig;
use crate::error::Result;
use crate::pid::{PidController, PidStatus};

use super::heater::HeaterPwm;
use super::sensor::{TemperatureChannel, TemperatureFeedback, TemperatureSensor};

/// Request flag polled by [`ThermalRegulator::run_task`] between iterations.
///
/// Can live in a `static` and be raised from any context.
#[derive(Debug, Default)]
pub struct StopSignal(AtomicBool);

impl StopSignal {
    /// Create a lowered signal.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Ask the task to finish after the current iteration.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Lower the signal so the task can be started again.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// True once raised.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// PID loop between a PWM heater and a temperature sensor.
pub struct ThermalRegulator<P, S> {
    pid: PidController<HeaterPwm<P>, TemperatureFeedback<S>>,
    channel: TemperatureChannel,
    period_ms: u32,
}

impl<P, S> ThermalRegulator<P, S>
where
    P: SetDutyCycle,
    S: TemperatureSensor,
{
    /// Wire a heater and a sensor using the given loop configuration.
    pub fn new(config: &ThermalConfig, heater: P, sensor: S) -> Self {
        Self {
            pid: PidController::new(
                config.pid,
                HeaterPwm::new(heater, config.heater_inverted),
                TemperatureFeedback::new(sensor),
            ),
            channel: config.channel,
            period_ms: config.period_ms(),
        }
    }

    /// Underlying PID loop.
    #[inline]
    pub fn pid(&self) -> &PidController<HeaterPwm<P>, TemperatureFeedback<S>> {
        &self.pid
    }

    /// Lifecycle state of the loop.
    #[inline]
    pub fn status(&self) -> PidStatus {
        self.pid.status()
    }

    /// Sensor channel being regulated.
    #[inline]
    pub fn channel(&self) -> TemperatureChannel {
        self.channel
    }

    /// Delay between iterations, milliseconds.
    #[inline]
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Current target temperature.
    #[inline]
    pub fn target(&self) -> f32 {
        self.pid.target()
    }

    /// Claim the heater and sensor; the heater is left off.
    pub fn init(&mut self) -> Result<()> {
        self.pid.init()
    }

    /// Start regulating.
    pub fn run(&mut self) -> Result<()> {
        self.pid.run()
    }

    /// Stop regulating; the heater is turned off.
    pub fn stop(&mut self) -> Result<()> {
        self.pid.stop()
    }

    /// Release the heater and sensor.
    pub fn deinit(&mut self) -> Result<()> {
        self.pid.deinit()
    }

    /// Change the target temperature while running.
    pub fn set_target(&mut self, celsius: f32) -> Result<()> {
        self.pid.set_target(celsius)
    }

    /// One loop step without waiting.
    pub fn update(&mut self) -> Result<()> {
        self.pid.update(self.channel)
    }

    /// Wait one period, then run one loop step.
    pub fn iterate<D: DelayNs>(&mut self, delay: &mut D) -> Result<()> {
        self.pid.iterate(delay, self.period_ms, self.channel)
    }

    /// Regulate until `stop` is raised or the loop leaves `Running`.
    ///
    /// The signal is checked before every iteration. On a clean exit the loop
    /// is stopped and the heater turned off. An iteration error ends the task
    /// immediately and leaves the loop running.
    pub fn run_task<D: DelayNs>(&mut self, delay: &mut D, stop: &StopSignal) -> Result<()> {
        info!("thermal task started, period {} ms", self.period_ms);

        while !stop.is_raised() && self.pid.status() == PidStatus::Running {
            if let Err(e) = self.iterate(delay) {
                error!("thermal iteration failed");
                return Err(e);
            }
        }

        self.pid.stop()
    }

    /// Give back the heater PWM and the sensor.
    pub fn release(self) -> (P, S) {
        let (heater, feedback) = self.pid.into_parts();
        (heater.release(), feedback.release())
    }
}
