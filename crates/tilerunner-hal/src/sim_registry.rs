//! [`SimRegistry`] – builds a [`HardwareRegistry`] backed by the simulator.
//!
//! # Example
//!
//! ```rust
//! use tilerunner_hal::HeadingSensor;
//! use tilerunner_hal::sim_registry::SimRegistry;
//!
//! let sim = SimRegistry::builder().with_full_robot();
//! let body = sim.body();
//! let mut registry = sim.build();
//!
//! let mut heading = registry.take_heading_sensor("imu");
//! assert_eq!(heading.heading(), 180.0);
//! assert_eq!(body.raw_heading(), 0.0);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use crate::registry::HardwareRegistry;
use crate::sim::{DriveSide, SimBody, SimImu, SimMotor};

/// Encoder ticks moved per busy poll at full power.
pub const DEFAULT_TICKS_PER_POLL: f64 = 40.0;
/// Degrees rotated per IMU read at full opposite drive power.
pub const DEFAULT_DEGREES_PER_POLL: f64 = 2.0;

enum SimDevice {
    Motor(String),
    Drive(String, DriveSide),
    Imu(String),
}

/// Builder that constructs a [`HardwareRegistry`] populated with simulated
/// drivers sharing one [`SimBody`].
pub struct SimRegistry {
    body: Arc<SimBody>,
    ticks_per_poll: f64,
    devices: Vec<SimDevice>,
    missing: HashSet<String>,
}

impl Default for SimRegistry {
    fn default() -> Self {
        Self::with_rates(DEFAULT_TICKS_PER_POLL, DEFAULT_DEGREES_PER_POLL)
    }
}

impl SimRegistry {
    /// Create a new builder with no registered devices and default rates.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Create a builder with explicit simulation rates.
    pub fn with_rates(ticks_per_poll: f64, degrees_per_poll: f64) -> Self {
        Self {
            body: SimBody::new(degrees_per_poll),
            ticks_per_poll,
            devices: Vec::new(),
            missing: HashSet::new(),
        }
    }

    /// Register the two drive motors.
    pub fn with_drive_base(self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.with_device(SimDevice::Drive(left.into(), DriveSide::Left))
            .with_device(SimDevice::Drive(right.into(), DriveSide::Right))
    }

    /// Register a free-standing motor (lift, claw, ...).
    pub fn with_motor(self, name: impl Into<String>) -> Self {
        self.with_device(SimDevice::Motor(name.into()))
    }

    /// Register a simulated IMU.
    pub fn with_imu(self, name: impl Into<String>) -> Self {
        self.with_device(SimDevice::Imu(name.into()))
    }

    /// Register the complete Tilerunner under its default channel names.
    pub fn with_full_robot(self) -> Self {
        self.with_drive_base("left_drive", "right_drive")
            .with_motor("lift_drive")
            .with_motor("claw")
            .with_motor("jewel_whacker")
            .with_imu("imu")
    }

    /// Leave `name` out of the built registry, as if it were unplugged.
    pub fn without(mut self, name: impl Into<String>) -> Self {
        self.missing.insert(name.into());
        self
    }

    /// Shared body, for inspecting or seeding the simulated heading.
    pub fn body(&self) -> Arc<SimBody> {
        self.body.clone()
    }

    fn with_device(mut self, device: SimDevice) -> Self {
        self.devices.push(device);
        self
    }

    /// Consume the builder and return a fully populated [`HardwareRegistry`].
    pub fn build(self) -> HardwareRegistry {
        let mut registry = HardwareRegistry::new();

        for device in self.devices {
            match device {
                SimDevice::Motor(name) if !self.missing.contains(&name) => {
                    registry.register_motor(Box::new(SimMotor::new(name, self.ticks_per_poll)));
                }
                SimDevice::Drive(name, side) if !self.missing.contains(&name) => {
                    registry.register_motor(Box::new(SimMotor::drive(
                        name,
                        self.ticks_per_poll,
                        self.body.clone(),
                        side,
                    )));
                }
                SimDevice::Imu(name) if !self.missing.contains(&name) => {
                    registry.register_imu(Box::new(SimImu::new(name, self.body.clone())));
                }
                _ => {}
            }
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::Actuator;
    use crate::heading::HeadingSensor;

    #[test]
    fn full_robot_registers_every_device() {
        let registry = SimRegistry::builder().with_full_robot().build();
        for name in ["left_drive", "right_drive", "lift_drive", "claw", "jewel_whacker"] {
            assert!(registry.contains_motor(name), "{name} must be registered");
        }
        assert!(registry.contains_imu("imu"));
    }

    #[test]
    fn without_leaves_device_unregistered() {
        let mut registry = SimRegistry::builder()
            .with_full_robot()
            .without("claw")
            .without("imu")
            .build();
        assert!(!registry.contains_motor("claw"));
        assert!(!registry.contains_imu("imu"));

        let mut claw = registry.take_motor("claw");
        assert!(!claw.is_busy());
        assert_eq!(registry.take_heading_sensor("imu").heading(), 0.0);
    }

    #[test]
    fn drive_motors_share_the_body() {
        let sim = SimRegistry::with_rates(10.0, 4.0).with_drive_base("l", "r").with_imu("gyro");
        let body = sim.body();
        let mut registry = sim.build();

        let mut left = registry.take_motor("l");
        let mut right = registry.take_motor("r");
        let mut heading = registry.take_heading_sensor("gyro");

        left.set_power(1.0).unwrap();
        right.set_power(1.0).unwrap();
        // Both shafts forward with forward polarity: the mirrored right wheel
        // runs backwards, so the robot spins clockwise.
        assert_eq!(body.wheels(), (1.0, -1.0));
        assert_eq!(heading.heading(), 176.0);
    }
}
