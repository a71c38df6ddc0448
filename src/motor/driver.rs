//! Interrupt-driven stepper axis driver.
//!
//! Generic over embedded-hal 1.0 pin types and a [`StepTimer`] channel. The
//! driver owns the direction and enable pins; step pulses come from the timer
//! hardware and are counted by [`AxisChannel::on_compare_match`].

use embedded_hal::digital::OutputPin;

use crate::config::units::{Degrees, Rpm, Steps};
use crate::config::{AxisGeometry, TimerConfig};
use crate::error::{Error, Peripheral, RangeError, Result};

use super::builder::StepperAxisDriverBuilder;
use super::direction::Direction;
use super::state::{AxisChannel, DriverState};
use super::timer::{StepTimer, TimerSetting};

/// Operations the motion layer needs from one axis.
///
/// Implemented by [`StepperAxisDriver`]; object safe so a controller can also
/// be driven by simulated axes.
pub trait AxisDriver {
    /// Configure the step timer. Idempotent.
    fn init(&mut self) -> Result<()>;

    /// Halt any move and release the step timer.
    fn deinit(&mut self) -> Result<()>;

    /// Energise the motor coils.
    fn enable(&mut self) -> Result<()>;

    /// De-energise the motor coils.
    fn disable(&mut self) -> Result<()>;

    /// Start a move to an absolute shaft angle at the given speed.
    fn set_speed_and_target(&mut self, rpm: Rpm, angle: Degrees) -> Result<()>;

    /// Halt the step timer immediately.
    fn stop(&mut self) -> Result<()>;

    /// Declare the current shaft position to be zero.
    fn zero_counter(&mut self) -> Result<()>;

    /// True while a commanded move is in flight.
    fn is_busy(&self) -> bool;

    /// Current shaft angle derived from the step counter.
    fn angle(&self) -> Degrees;
}

/// One stepper axis.
///
/// Generic over:
/// - `T`: step timer channel (must implement [`StepTimer`])
/// - `DIR`: DIR pin type (must implement `OutputPin`)
/// - `EN`: ENABLE pin type (must implement `OutputPin`)
pub struct StepperAxisDriver<'a, T, DIR, EN>
where
    T: StepTimer,
    DIR: OutputPin,
    EN: OutputPin,
{
    /// Timer plus the counters shared with the compare-match interrupt.
    channel: &'a AxisChannel<T>,

    /// DIR pin (high = CW, low = CCW, or inverted).
    dir_pin: DIR,

    /// ENABLE pin.
    enable_pin: EN,

    /// Step conversion parameters.
    geometry: AxisGeometry,

    /// Timer clock and register widths.
    timer_config: TimerConfig,

    /// Axis name for logging.
    name: heapless::String<32>,

    /// Whether direction pin logic is inverted.
    invert_direction: bool,

    /// Coils are energised with the enable line low.
    enable_active_low: bool,

    /// Current direction (cached to avoid unnecessary pin writes).
    current_direction: Option<Direction>,

    state: DriverState,
}

impl<'a, T, DIR, EN> StepperAxisDriver<'a, T, DIR, EN>
where
    T: StepTimer,
    DIR: OutputPin,
    EN: OutputPin,
{
    /// Start building a driver.
    pub fn builder() -> StepperAxisDriverBuilder<'a, T, DIR, EN> {
        StepperAxisDriverBuilder::new()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        channel: &'a AxisChannel<T>,
        dir_pin: DIR,
        enable_pin: EN,
        geometry: AxisGeometry,
        timer_config: TimerConfig,
        name: heapless::String<32>,
        invert_direction: bool,
        enable_active_low: bool,
    ) -> Self {
        Self {
            channel,
            dir_pin,
            enable_pin,
            geometry,
            timer_config,
            name,
            invert_direction,
            enable_active_low,
            current_direction: None,
            state: DriverState::Uninitialized,
        }
    }

    /// Get the axis name.
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get the lifecycle state.
    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Get the step geometry.
    #[inline]
    pub fn geometry(&self) -> &AxisGeometry {
        &self.geometry
    }

    /// Get the shared channel.
    #[inline]
    pub fn channel(&self) -> &'a AxisChannel<T> {
        self.channel
    }

    /// Get current position in steps.
    #[inline]
    pub fn position_steps(&self) -> Steps {
        self.channel.current_steps()
    }

    /// Last commanded destination as a shaft angle.
    #[inline]
    pub fn target_angle(&self) -> Degrees {
        self.geometry.steps_to_degrees(self.channel.target_steps())
    }

    /// Configure the step timer.
    ///
    /// Calling this on a ready driver does nothing.
    pub fn init(&mut self) -> Result<()> {
        if self.state == DriverState::Ready {
            return Ok(());
        }

        self.channel
            .timer()
            .init()
            .map_err(|_| Error::HardwareFault(Peripheral::StepTimer))?;
        self.state = DriverState::Ready;

        info!("axis {} ready", self.name.as_str());
        Ok(())
    }

    /// Halt any move and release the step timer.
    pub fn deinit(&mut self) -> Result<()> {
        if self.state == DriverState::Uninitialized {
            return Ok(());
        }

        self.halt()?;
        self.channel
            .timer()
            .deinit()
            .map_err(|_| Error::HardwareFault(Peripheral::StepTimer))?;
        self.state = DriverState::Uninitialized;

        debug!("axis {} released", self.name.as_str());
        Ok(())
    }

    /// Energise the motor coils.
    pub fn enable(&mut self) -> Result<()> {
        self.write_enable(true)
    }

    /// De-energise the motor coils.
    pub fn disable(&mut self) -> Result<()> {
        self.write_enable(false)
    }

    /// Start a move to an absolute shaft angle.
    ///
    /// The angle is rounded to the nearest microstep. The command is checked
    /// before anything is touched: a rejected command leaves a move already
    /// in flight running. An accepted command halts that move and starts the
    /// new one from wherever the axis stopped. A target equal to the current
    /// position of an idle axis succeeds without touching the hardware.
    ///
    /// # Errors
    ///
    /// - `NotInitialized` before [`init`](Self::init)
    /// - `OutOfRange(StepTarget)` when the angle or the distance to it does
    ///   not fit the step counter
    /// - `IncompatibleArgs` for a non-zero move at a zero, negative or
    ///   non-finite speed
    /// - `OutOfRange(StepFrequency)` when no prescaler fits the step rate
    /// - `HardwareFault` when the timer or the DIR pin fails
    pub fn set_speed_and_target(&mut self, rpm: Rpm, angle: Degrees) -> Result<()> {
        if self.state != DriverState::Ready {
            return Err(Error::NotInitialized);
        }

        let target = self
            .geometry
            .degrees_to_steps(angle)
            .ok_or(Error::OutOfRange(RangeError::StepTarget { degrees: angle.0 }))?;

        let delta = self.distance_to(target, angle)?;
        if !rpm.is_drivable() {
            if delta == 0 {
                return Ok(());
            }
            return Err(Error::IncompatibleArgs { steps: delta, rpm: rpm.0 });
        }
        if delta == 0 && !self.channel.is_busy() {
            return Ok(());
        }

        let setting = TimerSetting::for_speed(rpm, &self.geometry, &self.timer_config)?;

        if self.channel.is_busy() {
            self.halt()?;
        }

        // Counter is frozen from here on
        let delta = self.distance_to(target, angle)?;
        if delta == 0 {
            return Ok(());
        }
        let direction = Direction::from_steps(delta);

        self.channel.load_move(target, direction);
        self.channel
            .timer()
            .configure(setting)
            .map_err(|_| Error::HardwareFault(Peripheral::StepTimer))?;
        self.set_direction(direction)?;

        self.channel.set_busy(true);
        if self.channel.timer().arm().is_err() {
            self.channel.set_busy(false);
            return Err(Error::HardwareFault(Peripheral::StepTimer));
        }

        trace!(
            "axis {} -> {} steps, psc {} period {}",
            self.name.as_str(),
            target.0,
            setting.prescaler,
            setting.period
        );
        Ok(())
    }

    /// Halt the step timer immediately.
    ///
    /// The step counter keeps the position reached. Does nothing before
    /// [`init`](Self::init).
    pub fn stop(&mut self) -> Result<()> {
        if self.state == DriverState::Uninitialized {
            return Ok(());
        }
        self.halt()
    }

    /// Declare the current shaft position to be zero.
    pub fn zero_counter(&mut self) -> Result<()> {
        self.channel.reset_counter();
        Ok(())
    }

    /// True while a commanded move is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.channel.is_busy()
    }

    /// Current shaft angle derived from the step counter.
    #[inline]
    pub fn angle(&self) -> Degrees {
        self.geometry.steps_to_degrees(self.channel.current_steps())
    }

    fn distance_to(&self, target: Steps, angle: Degrees) -> Result<i32> {
        target
            .0
            .checked_sub(self.channel.current_steps().0)
            .ok_or(Error::OutOfRange(RangeError::StepTarget { degrees: angle.0 }))
    }

    fn halt(&mut self) -> Result<()> {
        let timer = self.channel.timer();
        timer
            .disarm()
            .map_err(|_| Error::HardwareFault(Peripheral::StepTimer))?;
        self.channel.set_busy(false);
        timer.clear_compare_flag();
        Ok(())
    }

    fn write_enable(&mut self, energised: bool) -> Result<()> {
        let pin_high = energised != self.enable_active_low;
        let written = if pin_high {
            self.enable_pin.set_high()
        } else {
            self.enable_pin.set_low()
        };
        written.map_err(|_| Error::HardwareFault(Peripheral::EnablePin))
    }

    fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if self.current_direction == Some(direction) {
            return Ok(());
        }

        let pin_high = match direction {
            Direction::Clockwise => !self.invert_direction,
            Direction::CounterClockwise => self.invert_direction,
        };

        let written = if pin_high {
            self.dir_pin.set_high()
        } else {
            self.dir_pin.set_low()
        };
        written.map_err(|_| Error::HardwareFault(Peripheral::DirectionPin))?;

        self.current_direction = Some(direction);
        Ok(())
    }
}

impl<T, DIR, EN> AxisDriver for StepperAxisDriver<'_, T, DIR, EN>
where
    T: StepTimer,
    DIR: OutputPin,
    EN: OutputPin,
{
    fn init(&mut self) -> Result<()> {
        StepperAxisDriver::init(self)
    }

    fn deinit(&mut self) -> Result<()> {
        StepperAxisDriver::deinit(self)
    }

    fn enable(&mut self) -> Result<()> {
        StepperAxisDriver::enable(self)
    }

    fn disable(&mut self) -> Result<()> {
        StepperAxisDriver::disable(self)
    }

    fn set_speed_and_target(&mut self, rpm: Rpm, angle: Degrees) -> Result<()> {
        StepperAxisDriver::set_speed_and_target(self, rpm, angle)
    }

    fn stop(&mut self) -> Result<()> {
        StepperAxisDriver::stop(self)
    }

    fn zero_counter(&mut self) -> Result<()> {
        StepperAxisDriver::zero_counter(self)
    }

    fn is_busy(&self) -> bool {
        StepperAxisDriver::is_busy(self)
    }

    fn angle(&self) -> Degrees {
        StepperAxisDriver::angle(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction};

    #[derive(Default)]
    struct FlagTimer {
        armed: Cell<bool>,
        configured: Cell<Option<TimerSetting>>,
    }

    impl StepTimer for FlagTimer {
        type Error = ();

        fn init(&self) -> core::result::Result<(), ()> {
            Ok(())
        }
        fn deinit(&self) -> core::result::Result<(), ()> {
            Ok(())
        }
        fn configure(&self, setting: TimerSetting) -> core::result::Result<(), ()> {
            self.configured.set(Some(setting));
            Ok(())
        }
        fn arm(&self) -> core::result::Result<(), ()> {
            self.armed.set(true);
            Ok(())
        }
        fn disarm(&self) -> core::result::Result<(), ()> {
            self.armed.set(false);
            Ok(())
        }
        fn clear_compare_flag(&self) {}
    }

    fn driver<'a>(
        channel: &'a AxisChannel<FlagTimer>,
        dir: &[Transaction],
        en: &[Transaction],
    ) -> StepperAxisDriver<'a, FlagTimer, PinMock, PinMock> {
        StepperAxisDriver::new(
            channel,
            PinMock::new(dir),
            PinMock::new(en),
            AxisGeometry::new(1.8, 16),
            TimerConfig::default(),
            heapless::String::new(),
            false,
            true,
        )
    }

    fn finish(mut driver: StepperAxisDriver<'_, FlagTimer, PinMock, PinMock>) {
        driver.dir_pin.done();
        driver.enable_pin.done();
    }

    #[test]
    fn test_command_before_init_is_rejected() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(&channel, &[], &[]);

        assert_eq!(
            axis.set_speed_and_target(Rpm(100.0), Degrees(90.0)),
            Err(Error::NotInitialized)
        );
        assert!(!channel.timer().armed.get());
        finish(axis);
    }

    #[test]
    fn test_forward_move_sets_direction_and_arms() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(&channel, &[Transaction::set(State::High)], &[]);
        axis.init().unwrap();

        axis.set_speed_and_target(Rpm(100.0), Degrees(90.0)).unwrap();

        assert!(axis.is_busy());
        assert!(channel.timer().armed.get());
        assert_eq!(channel.target_steps(), Steps(800));
        assert_eq!(channel.direction(), Direction::Clockwise);
        assert_eq!(channel.timer().configured.get().map(|s| s.period), Some(3000));
        finish(axis);
    }

    #[test]
    fn test_direction_pin_written_once_per_change() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(
            &channel,
            &[Transaction::set(State::Low), Transaction::set(State::High)],
            &[],
        );
        axis.init().unwrap();

        axis.set_speed_and_target(Rpm(50.0), Degrees(-10.0)).unwrap();
        axis.set_speed_and_target(Rpm(50.0), Degrees(-20.0)).unwrap();
        axis.set_speed_and_target(Rpm(50.0), Degrees(10.0)).unwrap();
        finish(axis);
    }

    #[test]
    fn test_zero_speed_with_displacement_is_incompatible() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(&channel, &[], &[]);
        axis.init().unwrap();

        let result = axis.set_speed_and_target(Rpm(0.0), Degrees(1.8));

        assert_eq!(result, Err(Error::IncompatibleArgs { steps: 16, rpm: 0.0 }));
        assert!(!axis.is_busy());
        finish(axis);
    }

    #[test]
    fn test_zero_displacement_is_a_no_op() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(&channel, &[], &[]);
        axis.init().unwrap();

        // Below half a microstep rounds to the current position
        axis.set_speed_and_target(Rpm(0.0), Degrees(0.05)).unwrap();

        assert!(!axis.is_busy());
        assert!(channel.timer().configured.get().is_none());
        finish(axis);
    }

    #[test]
    fn test_rejected_command_leaves_move_running() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(&channel, &[Transaction::set(State::High)], &[]);
        axis.init().unwrap();
        axis.set_speed_and_target(Rpm(100.0), Degrees(90.0)).unwrap();
        for _ in 0..5 {
            channel.on_compare_match();
        }

        assert_eq!(
            axis.set_speed_and_target(Rpm(1.0e7), Degrees(45.0)),
            Err(Error::OutOfRange(RangeError::StepFrequency { rpm: 1.0e7 }))
        );
        assert_eq!(
            axis.set_speed_and_target(Rpm(0.0), Degrees(45.0)),
            Err(Error::IncompatibleArgs { steps: 395, rpm: 0.0 })
        );

        assert!(axis.is_busy());
        assert!(channel.timer().armed.get());
        assert_eq!(channel.target_steps(), Steps(800));
        assert_eq!(channel.timer().configured.get().map(|s| s.period), Some(3000));
        finish(axis);
    }

    #[test]
    fn test_distance_beyond_counter_range_is_rejected() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = StepperAxisDriver::new(
            &channel,
            PinMock::new(&[Transaction::set(State::Low)]),
            PinMock::new(&[]),
            AxisGeometry::new(1.0, 1),
            TimerConfig::default(),
            heapless::String::new(),
            false,
            true,
        );
        axis.init().unwrap();
        axis.set_speed_and_target(Rpm(100.0), Degrees(-200.0)).unwrap();
        while axis.is_busy() {
            channel.on_compare_match();
        }
        assert_eq!(axis.position_steps(), Steps(-200));

        // The target fits an i32, the distance from -200 does not
        let far = Degrees(2_147_483_520.0);
        assert_eq!(
            axis.set_speed_and_target(Rpm(100.0), far),
            Err(Error::OutOfRange(RangeError::StepTarget { degrees: far.0 }))
        );
        assert_eq!(
            axis.set_speed_and_target(Rpm(100.0), Degrees(1.0e12)),
            Err(Error::OutOfRange(RangeError::StepTarget { degrees: 1.0e12 }))
        );

        assert!(!axis.is_busy());
        assert!(!channel.timer().armed.get());
        assert_eq!(channel.target_steps(), Steps(-200));
        finish(axis);
    }

    #[test]
    fn test_enable_polarity() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(
            &channel,
            &[],
            &[Transaction::set(State::Low), Transaction::set(State::High)],
        );

        // Enable pin works without init
        axis.enable().unwrap();
        axis.disable().unwrap();
        finish(axis);
    }

    #[test]
    fn test_stop_keeps_reached_position() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(&channel, &[Transaction::set(State::High)], &[]);
        axis.init().unwrap();
        axis.set_speed_and_target(Rpm(100.0), Degrees(90.0)).unwrap();

        for _ in 0..16 {
            channel.on_compare_match();
        }
        axis.stop().unwrap();

        assert!(!axis.is_busy());
        assert!(!channel.timer().armed.get());
        assert!((axis.angle().0 - 1.8).abs() < 1e-4);
        finish(axis);
    }

    #[test]
    fn test_deinit_returns_to_uninitialized() {
        let channel = AxisChannel::new(FlagTimer::default());
        let mut axis = driver(&channel, &[], &[]);
        axis.init().unwrap();
        axis.init().unwrap();
        assert_eq!(axis.state(), DriverState::Ready);

        axis.deinit().unwrap();

        assert_eq!(axis.state(), DriverState::Uninitialized);
        assert_eq!(
            axis.set_speed_and_target(Rpm(10.0), Degrees(5.0)),
            Err(Error::NotInitialized)
        );
        finish(axis);
    }
}
