//! PWM heater output.

use embedded_hal::pwm::SetDutyCycle;
use libm::roundf;

use crate::error::{Error, Peripheral, Result};
use crate::pid::OutputChannel;

/// Heater driven by one PWM channel.
///
/// Loop output in `[0, 1]` is the heating fraction. With `inverted` set the
/// power stage conducts while the pin is low, so the duty written is
/// `max * (1 - fraction)`.
pub struct HeaterPwm<P> {
    pwm: P,
    inverted: bool,
}

impl<P: SetDutyCycle> HeaterPwm<P> {
    /// Wrap a PWM channel.
    pub fn new(pwm: P, inverted: bool) -> Self {
        Self { pwm, inverted }
    }

    /// Borrow the PWM channel.
    #[inline]
    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Give back the PWM channel.
    pub fn release(self) -> P {
        self.pwm
    }

    /// Duty register value for a heating fraction.
    pub fn duty_for(&self, fraction: f32) -> u16 {
        let fraction = if fraction > 1.0 {
            1.0
        } else if fraction > 0.0 {
            fraction
        } else {
            0.0
        };

        let max = self.pwm.max_duty_cycle();
        let on = roundf(max as f32 * fraction) as u16;
        if self.inverted {
            max - on
        } else {
            on
        }
    }

    fn write(&mut self, fraction: f32) -> Result<()> {
        let duty = self.duty_for(fraction);
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| Error::HardwareFault(Peripheral::HeaterOutput))
    }
}

impl<P: SetDutyCycle> OutputChannel for HeaterPwm<P> {
    fn init(&mut self) -> Result<()> {
        self.write(0.0)
    }

    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.write(0.0)
    }

    fn set_value(&mut self, value: f32) -> Result<()> {
        self.write(value)
    }

    fn deinit(&mut self) -> Result<()> {
        self.write(0.0)
    }
}
