//! Interrupt-shared axis state.
//!
//! Field ownership between the two execution contexts:
//!
//! | field           | interrupt handler        | command path                   |
//! |-----------------|--------------------------|--------------------------------|
//! | `current_steps` | `+= direction` each tick | reset by `zero_counter` only   |
//! | `target_steps`  | read                     | written while the timer is off |
//! | `direction`     | read                     | written while the timer is off |
//! | `busy`          | cleared once disarmed    | set before arming, cleared on stop |
//!
//! The command path publishes `target_steps` and `direction` before the
//! release store of `busy = true`; the handler reads them after an acquire
//! load of `busy`. Only loads and stores are used so the same code runs on
//! cores without compare-and-swap.

use portable_atomic::{AtomicBool, AtomicI32, AtomicI8, Ordering};

use crate::config::units::Steps;

use super::direction::Direction;
use super::timer::StepTimer;

/// Lifecycle of an axis driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverState {
    /// Timer not configured; motion commands are rejected.
    Uninitialized,
    /// Timer configured; the axis accepts commands.
    Ready,
}

impl DriverState {
    /// Get the state name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            DriverState::Uninitialized => "Uninitialized",
            DriverState::Ready => "Ready",
        }
    }
}

/// Outcome of one compare-match event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepTick {
    /// No move in flight; the event only cleared the flag.
    Ignored,
    /// Counter advanced, target not yet reached.
    Stepped,
    /// Counter reached the target; timer disarmed and busy cleared.
    Completed,
    /// Counter reached the target but the timer refused to disarm. `busy`
    /// stays set and counting continues until an explicit stop succeeds.
    DisarmFailed,
}

/// One axis's timer channel together with its interrupt-shared counters.
///
/// Lives for the whole process, typically in a `static`, so that the
/// compare-match interrupt can call [`on_compare_match`](Self::on_compare_match)
/// while the application owns the [`StepperAxisDriver`](super::StepperAxisDriver).
pub struct AxisChannel<T> {
    timer: T,
    current_steps: AtomicI32,
    target_steps: AtomicI32,
    direction: AtomicI8,
    busy: AtomicBool,
}

impl<T> AxisChannel<T> {
    /// Wrap a timer channel; the counter starts at zero and the axis idle.
    pub const fn new(timer: T) -> Self {
        Self {
            timer,
            current_steps: AtomicI32::new(0),
            target_steps: AtomicI32::new(0),
            direction: AtomicI8::new(1),
            busy: AtomicBool::new(false),
        }
    }

    /// Access the underlying timer.
    #[inline]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Current absolute position in microsteps.
    #[inline]
    pub fn current_steps(&self) -> Steps {
        Steps(self.current_steps.load(Ordering::Acquire))
    }

    /// Last commanded destination in microsteps.
    #[inline]
    pub fn target_steps(&self) -> Steps {
        Steps(self.target_steps.load(Ordering::Acquire))
    }

    /// Direction of the last commanded move.
    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_sign(self.direction.load(Ordering::Acquire))
    }

    /// True while a commanded move is in flight.
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Publish a new destination. Call only while the timer is disarmed.
    pub(crate) fn load_move(&self, target: Steps, direction: Direction) {
        self.target_steps.store(target.0, Ordering::Relaxed);
        self.direction.store(direction.sign(), Ordering::Relaxed);
    }

    pub(crate) fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::Release);
    }

    pub(crate) fn reset_counter(&self) {
        self.current_steps.store(0, Ordering::Release);
    }
}

impl<T: StepTimer> AxisChannel<T> {
    /// Compare-match interrupt body.
    ///
    /// Clears the hardware flag, advances the counter by one microstep in the
    /// commanded direction and, on reaching the target, disarms the timer and
    /// clears `busy`. If the disarm fails the timer may still be pulsing, so
    /// `busy` is left set. Never blocks.
    pub fn on_compare_match(&self) -> StepTick {
        self.timer.clear_compare_flag();

        if !self.busy.load(Ordering::Acquire) {
            return StepTick::Ignored;
        }

        let step = self.direction.load(Ordering::Relaxed) as i32;
        let current = self.current_steps.load(Ordering::Relaxed).wrapping_add(step);
        self.current_steps.store(current, Ordering::Release);

        if current != self.target_steps.load(Ordering::Relaxed) {
            return StepTick::Stepped;
        }

        if self.timer.disarm().is_err() {
            error!("step timer disarm failed at {}", current);
            return StepTick::DisarmFailed;
        }
        self.busy.store(false, Ordering::Release);
        StepTick::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::timer::TimerSetting;
    use core::cell::Cell;

    #[derive(Default)]
    struct CountingTimer {
        disarms: Cell<u32>,
        flag_clears: Cell<u32>,
        refuse_disarm: Cell<bool>,
    }

    impl StepTimer for CountingTimer {
        type Error = ();

        fn init(&self) -> Result<(), ()> {
            Ok(())
        }
        fn deinit(&self) -> Result<(), ()> {
            Ok(())
        }
        fn configure(&self, _setting: TimerSetting) -> Result<(), ()> {
            Ok(())
        }
        fn arm(&self) -> Result<(), ()> {
            Ok(())
        }
        fn disarm(&self) -> Result<(), ()> {
            self.disarms.set(self.disarms.get() + 1);
            if self.refuse_disarm.get() {
                return Err(());
            }
            Ok(())
        }
        fn clear_compare_flag(&self) {
            self.flag_clears.set(self.flag_clears.get() + 1);
        }
    }

    #[test]
    fn test_idle_tick_is_ignored() {
        let channel = AxisChannel::new(CountingTimer::default());

        assert_eq!(channel.on_compare_match(), StepTick::Ignored);
        assert_eq!(channel.current_steps(), Steps(0));
        assert_eq!(channel.timer().flag_clears.get(), 1);
    }

    #[test]
    fn test_reverse_move_completes_on_target() {
        let channel = AxisChannel::new(CountingTimer::default());
        channel.load_move(Steps(-3), Direction::CounterClockwise);
        channel.set_busy(true);

        assert_eq!(channel.on_compare_match(), StepTick::Stepped);
        assert_eq!(channel.on_compare_match(), StepTick::Stepped);
        assert_eq!(channel.on_compare_match(), StepTick::Completed);

        assert_eq!(channel.current_steps(), Steps(-3));
        assert!(!channel.is_busy());
        assert_eq!(channel.timer().disarms.get(), 1);

        // A late event after completion does not move the counter
        assert_eq!(channel.on_compare_match(), StepTick::Ignored);
        assert_eq!(channel.current_steps(), Steps(-3));
    }

    #[test]
    fn test_failed_disarm_keeps_axis_busy() {
        let channel = AxisChannel::new(CountingTimer::default());
        channel.timer().refuse_disarm.set(true);
        channel.load_move(Steps(1), Direction::Clockwise);
        channel.set_busy(true);

        assert_eq!(channel.on_compare_match(), StepTick::DisarmFailed);
        assert!(channel.is_busy());

        // The timer is still pulsing, so the counter keeps following it
        assert_eq!(channel.on_compare_match(), StepTick::Stepped);
        assert_eq!(channel.current_steps(), Steps(2));
        assert!(channel.is_busy());
    }

    #[test]
    fn test_reset_counter_keeps_target_and_busy() {
        let channel = AxisChannel::new(CountingTimer::default());
        channel.load_move(Steps(10), Direction::Clockwise);
        channel.set_busy(true);
        channel.on_compare_match();

        channel.reset_counter();

        assert_eq!(channel.current_steps(), Steps(0));
        assert_eq!(channel.target_steps(), Steps(10));
        assert!(channel.is_busy());
    }
}
