//! Generic `Actuator` trait for encoder-equipped DC motors.
//!
//! Drivers implement this trait and are handed out by the
//! [`HardwareRegistry`][crate::registry::HardwareRegistry].  The control
//! algorithms only ever talk to the trait, so a missing motor can be replaced
//! by a [`NullActuator`] without any special-casing in the loops.

use tilerunner_types::{MotorDirection, RobotError, RunMode};

/// A motor-like device commanded by power, mode and target tick position.
///
/// Hardware reads (`current_position`, `is_busy`) take `&mut self` because
/// they talk to the device.  Commanded state (`power`, `mode`,
/// `target_position`) is the value last written and never touches hardware.
pub trait Actuator: Send + Sync {
    /// Stable identifier for this motor, e.g. `"left_drive"`.
    fn name(&self) -> &str;

    /// Command a power level.  Implementations clamp `power` to `[-1, 1]`
    /// with [`clamp_power`] before it reaches the device.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::HardwareFault`] if the command cannot be applied.
    fn set_power(&mut self, power: f64) -> Result<(), RobotError>;

    /// The most recently commanded (clamped) power.
    fn power(&self) -> f64;

    /// Switch the operating mode.  [`RunMode::Reset`] stops the motor and
    /// zeroes its encoder.
    fn set_mode(&mut self, mode: RunMode) -> Result<(), RobotError>;

    fn mode(&self) -> RunMode;

    /// Set the shaft polarity.
    fn set_direction(&mut self, direction: MotorDirection) -> Result<(), RobotError>;

    fn direction(&self) -> MotorDirection;

    /// Set the tick position used by [`RunMode::RunToPosition`].
    fn set_target_position(&mut self, ticks: i32) -> Result<(), RobotError>;

    fn target_position(&self) -> i32;

    /// Read the encoder, in ticks since the last reset.
    fn current_position(&mut self) -> i32;

    /// `true` while a [`RunMode::RunToPosition`] move has not reached its
    /// target.
    fn is_busy(&mut self) -> bool;
}

/// Clamp a power command to `[-1, 1]`.  `NaN` becomes `0.0`.
pub fn clamp_power(power: f64) -> f64 {
    if power.is_nan() {
        0.0
    } else {
        power.clamp(-1.0, 1.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Null actuator
// ────────────────────────────────────────────────────────────────────────────

/// Stand-in for a motor that could not be resolved.
///
/// Every command is accepted and ignored.  The encoder always reads zero and
/// the motor is never busy, so any loop waiting on [`Actuator::is_busy`]
/// finishes immediately instead of hanging.
#[derive(Debug, Clone)]
pub struct NullActuator {
    name: String,
}

impl NullActuator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Actuator for NullActuator {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_power(&mut self, _power: f64) -> Result<(), RobotError> {
        Ok(())
    }

    fn power(&self) -> f64 {
        0.0
    }

    fn set_mode(&mut self, _mode: RunMode) -> Result<(), RobotError> {
        Ok(())
    }

    fn mode(&self) -> RunMode {
        RunMode::FreeRun
    }

    fn set_direction(&mut self, _direction: MotorDirection) -> Result<(), RobotError> {
        Ok(())
    }

    fn direction(&self) -> MotorDirection {
        MotorDirection::Forward
    }

    fn set_target_position(&mut self, _ticks: i32) -> Result<(), RobotError> {
        Ok(())
    }

    fn target_position(&self) -> i32 {
        0
    }

    fn current_position(&mut self) -> i32 {
        0
    }

    fn is_busy(&mut self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_power_limits_range() {
        assert_eq!(clamp_power(1.7), 1.0);
        assert_eq!(clamp_power(-3.0), -1.0);
        assert_eq!(clamp_power(0.35), 0.35);
        assert_eq!(clamp_power(f64::NAN), 0.0);
    }

    #[test]
    fn null_actuator_ignores_commands() {
        let mut act = NullActuator::new("claw");
        assert_eq!(act.name(), "claw");

        act.set_mode(RunMode::RunToPosition).unwrap();
        act.set_target_position(500).unwrap();
        act.set_power(0.8).unwrap();

        assert_eq!(act.mode(), RunMode::FreeRun);
        assert_eq!(act.target_position(), 0);
        assert_eq!(act.power(), 0.0);
        assert_eq!(act.current_position(), 0);
    }

    #[test]
    fn null_actuator_is_never_busy() {
        let mut act = NullActuator::new("lift_drive");
        act.set_target_position(10_000).unwrap();
        act.set_mode(RunMode::RunToPosition).unwrap();
        assert!(!act.is_busy());
    }
}
