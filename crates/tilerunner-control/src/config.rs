//! Robot geometry and control-loop tuning.
//!
//! Every field has a serde default, so a partial `[motion]` table (or none
//! at all) yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tilerunner_types::RobotError;

/// Geometry and loop parameters used by the control algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Encoder ticks per wheel revolution.
    #[serde(default = "default_ticks_per_revolution")]
    pub ticks_per_revolution: u32,

    /// Wheel circumference in inches (4" wheel: 4π).
    #[serde(default = "default_wheel_circumference")]
    pub wheel_circumference: f64,

    /// Ramp window of the straight-line loop, in ticks.
    #[serde(default = "default_threshold_ticks")]
    pub threshold_ticks: f64,

    /// Ramp window of the turn loop, in degrees.
    #[serde(default = "default_threshold_heading")]
    pub threshold_heading: f64,

    /// Overshoot (degrees) above which a turn runs a correction pass.
    #[serde(default = "default_turn_correction_threshold")]
    pub turn_correction_threshold: f64,

    /// Maximum number of correction passes per turn.
    #[serde(default = "default_max_turn_corrections")]
    pub max_turn_corrections: u32,

    /// Yield inside each turn-loop iteration.
    #[serde(default = "default_turn_poll_interval_ms")]
    pub turn_poll_interval_ms: u64,

    /// Pause after a turn so the heading sensor settles.
    #[serde(default = "default_turn_settle_ms")]
    pub turn_settle_ms: u64,

    /// Pause at the end of calibration.
    #[serde(default = "default_calibrate_pause_ms")]
    pub calibrate_pause_ms: u64,
}

fn default_ticks_per_revolution() -> u32 {
    1120
}
fn default_wheel_circumference() -> f64 {
    12.5663
}
fn default_threshold_ticks() -> f64 {
    f64::from(default_ticks_per_revolution())
}
fn default_threshold_heading() -> f64 {
    180.0
}
fn default_turn_correction_threshold() -> f64 {
    2.5
}
fn default_max_turn_corrections() -> u32 {
    1
}
fn default_turn_poll_interval_ms() -> u64 {
    1
}
fn default_turn_settle_ms() -> u64 {
    100
}
fn default_calibrate_pause_ms() -> u64 {
    250
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            ticks_per_revolution: default_ticks_per_revolution(),
            wheel_circumference: default_wheel_circumference(),
            threshold_ticks: default_threshold_ticks(),
            threshold_heading: default_threshold_heading(),
            turn_correction_threshold: default_turn_correction_threshold(),
            max_turn_corrections: default_max_turn_corrections(),
            turn_poll_interval_ms: default_turn_poll_interval_ms(),
            turn_settle_ms: default_turn_settle_ms(),
            calibrate_pause_ms: default_calibrate_pause_ms(),
        }
    }
}

impl MotionConfig {
    /// Same geometry with every pause set to zero.  Used by tests and the
    /// simulator, where the heading source never needs time to settle.
    pub fn without_pauses(mut self) -> Self {
        self.turn_poll_interval_ms = 0;
        self.turn_settle_ms = 0;
        self.calibrate_pause_ms = 0;
        self
    }

    /// Reject geometry that would make the tick conversion meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::Config`] for a zero tick count, a
    /// non-positive wheel circumference or a non-positive ramp threshold.
    pub fn validate(&self) -> Result<(), RobotError> {
        if self.ticks_per_revolution == 0 {
            return Err(RobotError::Config(
                "ticks_per_revolution must be greater than zero".to_string(),
            ));
        }
        if !(self.wheel_circumference.is_finite() && self.wheel_circumference > 0.0) {
            return Err(RobotError::Config(format!(
                "wheel_circumference must be a positive number, got {}",
                self.wheel_circumference
            )));
        }
        for (name, value) in [
            ("threshold_ticks", self.threshold_ticks),
            ("threshold_heading", self.threshold_heading),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RobotError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Encoder ticks for `inches` of travel, truncated toward zero.
    pub fn inches_to_ticks(&self, inches: f64) -> i32 {
        (f64::from(self.ticks_per_revolution) * inches / self.wheel_circumference) as i32
    }

    pub fn turn_poll_interval(&self) -> Duration {
        Duration::from_millis(self.turn_poll_interval_ms)
    }

    pub fn turn_settle(&self) -> Duration {
        Duration::from_millis(self.turn_settle_ms)
    }

    pub fn calibrate_pause(&self) -> Duration {
        Duration::from_millis(self.calibrate_pause_ms)
    }
}

/// Hardware channel names the robot resolves at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceNames {
    #[serde(default = "default_left_drive")]
    pub left_drive: String,
    #[serde(default = "default_right_drive")]
    pub right_drive: String,
    #[serde(default = "default_lift_drive")]
    pub lift_drive: String,
    #[serde(default = "default_claw")]
    pub claw: String,
    #[serde(default = "default_jewel_whacker")]
    pub jewel_whacker: String,
    #[serde(default = "default_imu")]
    pub imu: String,
}

fn default_left_drive() -> String {
    "left_drive".to_string()
}
fn default_right_drive() -> String {
    "right_drive".to_string()
}
fn default_lift_drive() -> String {
    "lift_drive".to_string()
}
fn default_claw() -> String {
    "claw".to_string()
}
fn default_jewel_whacker() -> String {
    "jewel_whacker".to_string()
}
fn default_imu() -> String {
    "imu".to_string()
}

impl Default for DeviceNames {
    fn default() -> Self {
        Self {
            left_drive: default_left_drive(),
            right_drive: default_right_drive(),
            lift_drive: default_lift_drive(),
            claw: default_claw(),
            jewel_whacker: default_jewel_whacker(),
            imu: default_imu(),
        }
    }
}
