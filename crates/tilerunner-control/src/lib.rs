//! # tilerunner-control
//!
//! Closed-loop motion control for the Tilerunner: encoder-driven straight
//! moves, gyro-driven in-place turns with overshoot correction, calibration
//! and the position servo used by the lift and claw.
//!
//! Every blocking command takes a [`CancellationToken`] and polls it once
//! per loop iteration.  Status lines from the loops go to a [`Diagnostics`]
//! sink owned by the robot.
//!
//! ```rust
//! use tilerunner_control::{MotionConfig, RecordingDiagnostics, Tilerunner};
//! use tilerunner_control::config::DeviceNames;
//! use tilerunner_hal::SimRegistry;
//!
//! let mut registry = SimRegistry::builder().with_full_robot().build();
//! let mut robot = Tilerunner::from_registry(
//!     &mut registry,
//!     &DeviceNames::default(),
//!     MotionConfig::default().without_pauses(),
//!     RecordingDiagnostics::new(),
//! )
//! .unwrap();
//!
//! let outcome = robot.move_inches(&|| true, 1.0, 12.0).unwrap();
//! assert_eq!(outcome.final_position, 1069);
//! ```

pub mod cancel;
pub mod config;
pub mod diagnostics;
pub mod direction;
pub mod ramp;
pub mod robot;
pub mod servo;
pub mod telemetry;

pub use cancel::{CancellationToken, RunFlag};
pub use config::{DeviceNames, MotionConfig};
pub use diagnostics::{
    Diagnostics, FieldValue, NoDiagnostics, Phase, RecordingDiagnostics, StatusLine,
    TracingDiagnostics,
};
pub use direction::TurnDirection;
pub use ramp::{MOTOR_DEADZONE, calculate_speed};
pub use robot::{Tilerunner, TurnOutcome, TurnPass};
pub use servo::{PositionOutcome, servo_to_position};
