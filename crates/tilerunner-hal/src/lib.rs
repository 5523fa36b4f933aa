//! `tilerunner-hal` – Hardware abstraction for the Tilerunner drivetrain.
//!
//! # Modules
//!
//! - [`actuator`] – [`Actuator`][actuator::Actuator]: the motor contract
//!   (power, mode, target, encoder position, busy flag) and its
//!   [`NullActuator`][actuator::NullActuator] stand-in.
//! - [`group`] – [`ActuatorGroup`][group::ActuatorGroup]: several motors
//!   driven as one logical actuator.
//! - [`heading`] – [`HeadingSensor`][heading::HeadingSensor], the raw
//!   [`Imu`][heading::Imu] device trait, the [`ImuHeading`][heading::ImuHeading]
//!   normaliser and [`NullHeadingSensor`][heading::NullHeadingSensor].
//! - [`registry`] – [`HardwareRegistry`][registry::HardwareRegistry]:
//!   resolves devices by name and substitutes null components for anything
//!   that was never registered.
//! - [`sim`] / [`sim_registry`] – an in-process simulated robot so the
//!   control loops can run without hardware.

pub mod actuator;
pub mod group;
pub mod heading;
pub mod registry;
pub mod sim;
pub mod sim_registry;

pub use actuator::{Actuator, NullActuator, clamp_power};
pub use group::ActuatorGroup;
pub use heading::{HeadingSensor, Imu, ImuHeading, NullHeadingSensor};
pub use registry::HardwareRegistry;
pub use sim::{DriveSide, SimBody, SimImu, SimMotor};
pub use sim_registry::SimRegistry;
