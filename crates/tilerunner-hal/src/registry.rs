//! [`HardwareRegistry`] – named-device resolution with null fallback.
//!
//! Drivers are registered under their configured channel names (e.g.
//! `"left_drive"`, `"imu"`).  When the robot is assembled it takes each
//! device out of the registry by name.  A name that was never registered is
//! not an error: the registry logs a single warning for it and hands back the
//! matching null component, so initialisation always succeeds and the
//! control loops never have to special-case missing hardware.

use std::collections::{HashMap, HashSet};

use tilerunner_types::{MotorDirection, RobotError, RunMode};
use tracing::warn;

use crate::actuator::{Actuator, NullActuator};
use crate::heading::{HeadingSensor, Imu, ImuHeading, NullHeadingSensor};

/// Central hardware driver registry.
///
/// Construct with [`HardwareRegistry::new`], register drivers, then resolve
/// them with [`take_motor`][Self::take_motor] and
/// [`take_heading_sensor`][Self::take_heading_sensor].
#[derive(Default)]
pub struct HardwareRegistry {
    motors: HashMap<String, Box<dyn Actuator>>,
    imus: HashMap<String, Box<dyn Imu>>,
    warned: HashSet<String>,
}

impl HardwareRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a motor driver.  Any previously registered driver with the
    /// same name is replaced.
    pub fn register_motor(&mut self, motor: Box<dyn Actuator>) {
        self.motors.insert(motor.name().to_string(), motor);
    }

    /// Register an IMU driver.  Any previously registered driver with the
    /// same name is replaced.
    pub fn register_imu(&mut self, imu: Box<dyn Imu>) {
        self.imus.insert(imu.name().to_string(), imu);
    }

    pub fn contains_motor(&self, name: &str) -> bool {
        self.motors.contains_key(name)
    }

    pub fn contains_imu(&self, name: &str) -> bool {
        self.imus.contains_key(name)
    }

    /// Move the motor registered as `name` out of the registry.
    ///
    /// The motor is initialised to forward polarity, zero power and
    /// [`RunMode::FreeRun`].  When `name` is unknown, or the motor rejects
    /// its initialisation, a [`NullActuator`] is returned instead.
    pub fn take_motor(&mut self, name: &str) -> Box<dyn Actuator> {
        let Some(mut motor) = self.motors.remove(name) else {
            self.warn_missing(name, "motor", "not registered");
            return Box::new(NullActuator::new(name));
        };

        match init_motor(motor.as_mut()) {
            Ok(()) => motor,
            Err(e) => {
                self.warn_missing(name, "motor", &e.to_string());
                Box::new(NullActuator::new(name))
            }
        }
    }

    /// Move the IMU registered as `name` out of the registry, wrapped in an
    /// [`ImuHeading`].  Falls back to [`NullHeadingSensor`].
    pub fn take_heading_sensor(&mut self, name: &str) -> Box<dyn HeadingSensor> {
        match self.imus.remove(name) {
            Some(imu) => Box::new(ImuHeading::new(imu)),
            None => {
                self.warn_missing(name, "imu", "not registered");
                Box::new(NullHeadingSensor)
            }
        }
    }

    // Warn at most once per device name for the lifetime of the registry.
    fn warn_missing(&mut self, name: &str, kind: &str, reason: &str) {
        if self.warned.insert(name.to_string()) {
            warn!(device = name, kind, reason, "{kind} '{name}' missing; using null stand-in");
        }
    }
}

fn init_motor(motor: &mut dyn Actuator) -> Result<(), RobotError> {
    motor.set_direction(MotorDirection::Forward)?;
    motor.set_power(0.0)?;
    motor.set_mode(RunMode::FreeRun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::clamp_power;

    // ------------------------------------------------------------------
    // Test doubles
    // ------------------------------------------------------------------

    struct MockMotor {
        name: String,
        power: f64,
        mode: RunMode,
        direction: MotorDirection,
        broken: bool,
    }

    impl MockMotor {
        fn new(name: &str) -> Box<Self> {
            Box::new(Self {
                name: name.to_string(),
                power: 0.7,
                mode: RunMode::RunToPosition,
                direction: MotorDirection::Reverse,
                broken: false,
            })
        }
    }

    impl Actuator for MockMotor {
        fn name(&self) -> &str {
            &self.name
        }
        fn set_power(&mut self, power: f64) -> Result<(), RobotError> {
            self.power = clamp_power(power);
            Ok(())
        }
        fn power(&self) -> f64 {
            self.power
        }
        fn set_mode(&mut self, mode: RunMode) -> Result<(), RobotError> {
            if self.broken {
                return Err(RobotError::HardwareFault {
                    component: self.name.clone(),
                    details: "controller offline".to_string(),
                });
            }
            self.mode = mode;
            Ok(())
        }
        fn mode(&self) -> RunMode {
            self.mode
        }
        fn set_direction(&mut self, direction: MotorDirection) -> Result<(), RobotError> {
            self.direction = direction;
            Ok(())
        }
        fn direction(&self) -> MotorDirection {
            self.direction
        }
        fn set_target_position(&mut self, _ticks: i32) -> Result<(), RobotError> {
            Ok(())
        }
        fn target_position(&self) -> i32 {
            0
        }
        fn current_position(&mut self) -> i32 {
            123
        }
        fn is_busy(&mut self) -> bool {
            true
        }
    }

    struct MockImu;

    impl Imu for MockImu {
        fn name(&self) -> &str {
            "imu"
        }
        fn raw_heading(&mut self) -> f64 {
            -45.0
        }
    }

    // ------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------

    #[test]
    fn take_motor_returns_registered_driver_initialised() {
        let mut registry = HardwareRegistry::new();
        registry.register_motor(MockMotor::new("left_drive"));
        assert!(registry.contains_motor("left_drive"));

        let mut motor = registry.take_motor("left_drive");
        assert_eq!(motor.name(), "left_drive");
        assert_eq!(motor.power(), 0.0);
        assert_eq!(motor.mode(), RunMode::FreeRun);
        assert_eq!(motor.direction(), MotorDirection::Forward);
        assert_eq!(motor.current_position(), 123);
        assert!(!registry.contains_motor("left_drive"));
    }

    #[test]
    fn missing_motor_becomes_null_actuator() {
        let mut registry = HardwareRegistry::new();
        let mut motor = registry.take_motor("claw");
        assert_eq!(motor.name(), "claw");
        assert!(!motor.is_busy());
        assert_eq!(motor.current_position(), 0);
    }

    #[test]
    fn missing_motor_warns_once() {
        let mut registry = HardwareRegistry::new();
        registry.take_motor("claw");
        registry.take_motor("claw");
        assert_eq!(registry.warned.len(), 1);
        assert!(registry.warned.contains("claw"));
    }

    #[test]
    fn motor_failing_initialisation_is_replaced() {
        let mut registry = HardwareRegistry::new();
        let mut broken = MockMotor::new("lift_drive");
        broken.broken = true;
        registry.register_motor(broken);

        let mut motor = registry.take_motor("lift_drive");
        assert!(!motor.is_busy(), "null stand-in is never busy");
        assert!(registry.warned.contains("lift_drive"));
    }

    #[test]
    fn take_heading_sensor_normalises_registered_imu() {
        let mut registry = HardwareRegistry::new();
        registry.register_imu(Box::new(MockImu));
        assert!(registry.contains_imu("imu"));

        let mut sensor = registry.take_heading_sensor("imu");
        assert_eq!(sensor.heading(), 135.0);
    }

    #[test]
    fn missing_imu_becomes_null_heading_sensor() {
        let mut registry = HardwareRegistry::new();
        let mut sensor = registry.take_heading_sensor("imu");
        assert_eq!(sensor.heading(), 0.0);
        assert!(registry.warned.contains("imu"));
    }

    #[test]
    fn re_registering_motor_replaces_old_driver() {
        let mut registry = HardwareRegistry::new();
        registry.register_motor(MockMotor::new("claw"));
        let mut replacement = MockMotor::new("claw");
        replacement.power = 0.1;
        registry.register_motor(replacement);
        assert_eq!(registry.motors.len(), 1);
        assert_eq!(registry.motors["claw"].power(), 0.1);
    }
}
