//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{AxisConfig, KinematicsConfig, MachineConfig, ThermalConfig, TimerConfig, WindupGuard};

/// Validate a machine configuration.
///
/// Checks:
/// - Timer clock is non-zero and the counter can hold a 50% duty period
/// - Step angles are positive
/// - Linkage dimensions are positive and step constants non-zero
/// - PID scale is usable, output ceiling positive, integral ceiling non-negative
/// - Loop call frequency is 1-1000 Hz
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    validate_timer(&config.timer)?;

    for (_axis, axis_config) in config.axis_configs() {
        validate_axis(axis_config)?;
    }

    validate_kinematics(&config.kinematics)?;
    validate_thermal(&config.thermal)?;

    Ok(())
}

fn validate_timer(timer: &TimerConfig) -> Result<()> {
    if timer.clock_hz == 0 {
        return Err(Error::Config(ConfigError::InvalidTimerClock(timer.clock_hz)));
    }

    // Period and half-period compare must both be at least one tick
    if timer.counter_max < 2 {
        return Err(Error::Config(ConfigError::InvalidCounterMax(timer.counter_max)));
    }

    Ok(())
}

fn validate_axis(config: &AxisConfig) -> Result<()> {
    if !(config.step_angle.is_finite() && config.step_angle > 0.0) {
        return Err(Error::Config(ConfigError::InvalidStepAngle(config.step_angle)));
    }

    Ok(())
}

fn validate_kinematics(config: &KinematicsConfig) -> Result<()> {
    let lengths = [
        ("od", config.od),
        ("oe", config.oe),
        ("df", config.df),
        ("eg", config.eg),
    ];
    for (name, value) in lengths {
        if !(value.is_finite() && value > 0.0) {
            return Err(Error::Config(ConfigError::InvalidLinkLength { name, value }));
        }
    }

    for k in [config.kx, config.ky, config.kz] {
        if !k.is_finite() || k == 0.0 {
            return Err(Error::Config(ConfigError::InvalidStepConstant(k)));
        }
    }

    Ok(())
}

fn validate_thermal(config: &ThermalConfig) -> Result<()> {
    let pid = &config.pid;

    if !pid.m.is_finite() || pid.m == 0.0 {
        return Err(Error::Config(ConfigError::InvalidPidScale(pid.m)));
    }

    if !(pid.output_max.is_finite() && pid.output_max > 0.0) {
        return Err(Error::Config(ConfigError::InvalidOutputMax(pid.output_max)));
    }

    let limit = match pid.windup {
        WindupGuard::TargetMultiple(factor) => factor,
        WindupGuard::Absolute(limit) => limit,
    };
    if !(limit.is_finite() && limit >= 0.0) {
        return Err(Error::Config(ConfigError::InvalidWindupLimit(limit)));
    }

    if config.call_frequency_hz == 0 || config.call_frequency_hz > 1000 {
        return Err(Error::Config(ConfigError::InvalidCallFrequency(
            config.call_frequency_hz,
        )));
    }

    Ok(())
}
