use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operating mode of an encoder-equipped motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Power is applied directly; the encoder is only observed.
    #[default]
    FreeRun,
    /// The motor controller drives the shaft to the target tick position.
    RunToPosition,
    /// Stop the motor and zero its encoder.
    Reset,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::FreeRun => write!(f, "free_run"),
            RunMode::RunToPosition => write!(f, "run_to_position"),
            RunMode::Reset => write!(f, "reset"),
        }
    }
}

/// Shaft polarity of a motor relative to the robot's forward direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorDirection {
    #[default]
    Forward,
    Reverse,
}

impl MotorDirection {
    /// `1.0` for [`MotorDirection::Forward`], `-1.0` for
    /// [`MotorDirection::Reverse`].
    pub fn sign(self) -> f64 {
        match self {
            MotorDirection::Forward => 1.0,
            MotorDirection::Reverse => -1.0,
        }
    }
}

/// Error type shared by the hardware layer and the control algorithms.
///
/// Missing hardware is not an error: resolution substitutes a null
/// component instead.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RobotError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    #[error("Actuator group needs at least one member")]
    EmptyGroup,

    #[error("Configuration Error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_mode_serializes_snake_case() {
        let json = serde_json::to_string(&RunMode::RunToPosition).unwrap();
        assert_eq!(json, "\"run_to_position\"");
        let back: RunMode = serde_json::from_str("\"reset\"").unwrap();
        assert_eq!(back, RunMode::Reset);
    }

    #[test]
    fn run_mode_display_matches_serde_name() {
        assert_eq!(RunMode::FreeRun.to_string(), "free_run");
        assert_eq!(RunMode::RunToPosition.to_string(), "run_to_position");
    }

    #[test]
    fn motor_direction_sign() {
        assert_eq!(MotorDirection::Forward.sign(), 1.0);
        assert_eq!(MotorDirection::Reverse.sign(), -1.0);
        assert_eq!(MotorDirection::default(), MotorDirection::Forward);
    }

    #[test]
    fn robot_error_display() {
        let err = RobotError::Unsupported {
            operation: "activate_jewel_whacker".to_string(),
        };
        assert!(err.to_string().contains("activate_jewel_whacker"));

        let err2 = RobotError::HardwareFault {
            component: "left_drive".to_string(),
            details: "encoder disconnected".to_string(),
        };
        assert!(err2.to_string().contains("left_drive"));
    }
}
