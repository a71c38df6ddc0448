//! Shared fakes for integration tests.
//!
//! Each test binary uses a different subset.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use embedded_hal::delay::DelayNs;
use embedded_hal::{digital, pwm};

use p3d_core::motor::TimerSetting;
use p3d_core::pid::{FeedbackChannel, OutputChannel};
use p3d_core::thermal::StopSignal;
use p3d_core::{AxisChannel, Error, Peripheral, StepTimer, TemperatureChannel, TemperatureSensor};

// =============================================================================
// Step timer
// =============================================================================

/// Call made on a [`MockTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Init,
    Deinit,
    Configure(TimerSetting),
    Arm,
    Disarm,
}

/// Fault injected into a [`MockTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFault;

/// Step timer that records calls and can be told to fail.
#[derive(Default)]
pub struct MockTimer {
    events: Mutex<Vec<TimerEvent>>,
    armed: AtomicBool,
    flag_clears: AtomicU32,
    pub fail_init: AtomicBool,
    pub fail_configure: AtomicBool,
    pub fail_arm: AtomicBool,
    pub fail_disarm: AtomicBool,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TimerEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: TimerEvent) -> usize {
        self.events().iter().filter(|e| **e == event).count()
    }

    pub fn last_setting(&self) -> Option<TimerSetting> {
        self.events().iter().rev().find_map(|e| match e {
            TimerEvent::Configure(setting) => Some(*setting),
            _ => None,
        })
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn flag_clears(&self) -> u32 {
        self.flag_clears.load(Ordering::SeqCst)
    }

    fn record(&self, event: TimerEvent, fail: &AtomicBool) -> Result<(), TimerFault> {
        if fail.load(Ordering::SeqCst) {
            return Err(TimerFault);
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl StepTimer for MockTimer {
    type Error = TimerFault;

    fn init(&self) -> Result<(), TimerFault> {
        self.record(TimerEvent::Init, &self.fail_init)
    }

    fn deinit(&self) -> Result<(), TimerFault> {
        self.record(TimerEvent::Deinit, &AtomicBool::new(false))
    }

    fn configure(&self, setting: TimerSetting) -> Result<(), TimerFault> {
        self.record(TimerEvent::Configure(setting), &self.fail_configure)
    }

    fn arm(&self) -> Result<(), TimerFault> {
        self.record(TimerEvent::Arm, &self.fail_arm)?;
        self.armed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disarm(&self) -> Result<(), TimerFault> {
        self.record(TimerEvent::Disarm, &self.fail_disarm)?;
        self.armed.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn clear_compare_flag(&self) {
        self.flag_clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Play the compare-match interrupt on the calling thread until the axis stops.
pub fn run_to_completion(channel: &AxisChannel<MockTimer>) -> u32 {
    let mut ticks = 0;
    while channel.timer().is_armed() {
        channel.on_compare_match();
        ticks += 1;
    }
    ticks
}

struct RaiseOnDrop<'a>(&'a AtomicBool);

impl Drop for RaiseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Run `body` while a second thread plays the compare-match interrupt of
/// every armed channel.
pub fn with_ticker<R>(channels: &[&AxisChannel<MockTimer>], body: impl FnOnce() -> R) -> R {
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            while !done.load(Ordering::SeqCst) {
                for channel in channels {
                    if channel.timer().is_armed() {
                        channel.on_compare_match();
                    }
                }
                std::hint::spin_loop();
            }
        });

        let _guard = RaiseOnDrop(&done);
        body()
    })
}

// =============================================================================
// Pins
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

/// Output pin that logs every level written.
#[derive(Clone, Default)]
pub struct RecordingPin {
    levels: Arc<Mutex<Vec<bool>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> Vec<bool> {
        self.levels.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<bool> {
        self.levels().last().copied()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn write(&mut self, level: bool) -> Result<(), PinFault> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PinFault);
        }
        self.levels.lock().unwrap().push(level);
        Ok(())
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = PinFault;
}

impl digital::OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.write(true)
    }
}

// =============================================================================
// Heater PWM
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmFault;

impl pwm::Error for PwmFault {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

/// PWM channel with a 0..=1000 duty range that logs every duty written.
#[derive(Clone, Default)]
pub struct FakePwm {
    duties: Arc<Mutex<Vec<u16>>>,
    fail: Arc<AtomicBool>,
}

impl FakePwm {
    pub const MAX: u16 = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn duties(&self) -> Vec<u16> {
        self.duties.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<u16> {
        self.duties().last().copied()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl pwm::ErrorType for FakePwm {
    type Error = PwmFault;
}

impl pwm::SetDutyCycle for FakePwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), PwmFault> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PwmFault);
        }
        self.duties.lock().unwrap().push(duty);
        Ok(())
    }
}

// =============================================================================
// Temperature sensor
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault;

/// Sensor that replays a script of readings, repeating the last one.
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    readings: Arc<Mutex<VecDeque<f32>>>,
    last: Arc<Mutex<f32>>,
    reads: Arc<AtomicU32>,
    pub fail: Arc<AtomicBool>,
}

impl ScriptedSensor {
    pub fn new(readings: &[f32]) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings.iter().copied().collect())),
            ..Self::default()
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl TemperatureSensor for ScriptedSensor {
    type Error = SensorFault;

    fn temperature(&mut self, _channel: TemperatureChannel) -> Result<f32, SensorFault> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SensorFault);
        }
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.readings.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(*last)
    }
}

// =============================================================================
// Generic PID channels
// =============================================================================

/// Output channel that keeps every value written.
#[derive(Default)]
pub struct RecordingOutput {
    pub calls: Vec<&'static str>,
    pub values: Vec<f32>,
    pub fail_start: bool,
}

impl OutputChannel for RecordingOutput {
    fn init(&mut self) -> p3d_core::Result<()> {
        self.calls.push("init");
        Ok(())
    }

    fn start(&mut self) -> p3d_core::Result<()> {
        if self.fail_start {
            return Err(Error::HardwareFault(Peripheral::HeaterOutput));
        }
        self.calls.push("start");
        Ok(())
    }

    fn stop(&mut self) -> p3d_core::Result<()> {
        self.calls.push("stop");
        Ok(())
    }

    fn set_value(&mut self, value: f32) -> p3d_core::Result<()> {
        self.values.push(value);
        Ok(())
    }

    fn deinit(&mut self) -> p3d_core::Result<()> {
        self.calls.push("deinit");
        Ok(())
    }
}

/// Feedback channel returning scripted values per call.
#[derive(Default)]
pub struct ScriptedFeedback {
    pub calls: Vec<&'static str>,
    pub values: VecDeque<f32>,
    pub channels_read: Vec<u8>,
}

impl ScriptedFeedback {
    pub fn new(values: &[f32]) -> Self {
        Self {
            values: values.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl FeedbackChannel for ScriptedFeedback {
    type Channel = u8;

    fn init(&mut self) -> p3d_core::Result<()> {
        self.calls.push("init");
        Ok(())
    }

    fn start(&mut self) -> p3d_core::Result<()> {
        self.calls.push("start");
        Ok(())
    }

    fn stop(&mut self) -> p3d_core::Result<()> {
        self.calls.push("stop");
        Ok(())
    }

    fn value(&mut self, channel: u8) -> p3d_core::Result<f32> {
        self.channels_read.push(channel);
        Ok(self.values.pop_front().unwrap_or(0.0))
    }

    fn deinit(&mut self) -> p3d_core::Result<()> {
        self.calls.push("deinit");
        Ok(())
    }
}

// =============================================================================
// Delay
// =============================================================================

/// Delay that returns at once, logs the requested milliseconds and raises a
/// stop signal after a fixed number of calls.
pub struct CountdownDelay<'a> {
    pub delays_ms: Vec<u32>,
    remaining: usize,
    signal: Option<&'a StopSignal>,
}

impl<'a> CountdownDelay<'a> {
    pub fn new() -> Self {
        Self {
            delays_ms: Vec::new(),
            remaining: usize::MAX,
            signal: None,
        }
    }

    pub fn raising_after(calls: usize, signal: &'a StopSignal) -> Self {
        Self {
            delays_ms: Vec::new(),
            remaining: calls,
            signal: Some(signal),
        }
    }

    fn tick(&mut self, ms: u32) {
        self.delays_ms.push(ms);
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            if let Some(signal) = self.signal {
                signal.raise();
            }
        }
    }
}

impl DelayNs for CountdownDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.tick(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.tick(ms);
    }
}
