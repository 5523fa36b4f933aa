//! In-process simulation of the Tilerunner for tests and the CLI, without
//! physical hardware.
//!
//! [`SimBody`] is the shared rigid-body state of the robot.  Drive motors
//! report their wheel output to it and [`SimImu`] integrates the heading from
//! those outputs on every read, so a turn loop sees the robot rotate in the
//! direction its motors command.
//!
//! # Conventions
//!
//! - The right drive motor is mounted mirrored: a positive shaft output moves
//!   the right wheel backwards.  With the right motor set to
//!   [`MotorDirection::Reverse`] a single group power drives both wheels
//!   forwards, as on the real robot.
//! - Left wheel forward and right wheel backward is a clockwise rotation,
//!   which decreases the heading.
//! - Every busy poll of a [`SimMotor`] in [`RunMode::RunToPosition`] is one
//!   control period: the encoder moves `|power| * ticks_per_poll` ticks
//!   toward the target.

use std::sync::{Arc, Mutex, PoisonError};

use tilerunner_types::{MotorDirection, RobotError, RunMode};

use crate::actuator::{Actuator, clamp_power};
use crate::heading::Imu;

/// Which side of the drivetrain a simulated motor turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveSide {
    Left,
    Right,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared body
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct BodyState {
    left_wheel: f64,
    right_wheel: f64,
    raw_heading: f64,
}

/// Shared kinematic state of the simulated robot.
#[derive(Debug)]
pub struct SimBody {
    state: Mutex<BodyState>,
    degrees_per_poll: f64,
}

impl SimBody {
    /// Create a body that rotates `degrees_per_poll` degrees per IMU read
    /// when the wheels are driven at full opposite power.
    pub fn new(degrees_per_poll: f64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BodyState::default()),
            degrees_per_poll,
        })
    }

    /// Current raw (signed) heading, without advancing the simulation.
    pub fn raw_heading(&self) -> f64 {
        self.lock().raw_heading
    }

    pub fn set_raw_heading(&self, degrees: f64) {
        self.lock().raw_heading = wrap_signed(degrees);
    }

    /// Forward speed of each wheel as last reported, `(left, right)`.
    pub fn wheels(&self) -> (f64, f64) {
        let state = self.lock();
        (state.left_wheel, state.right_wheel)
    }

    fn set_wheel(&self, side: DriveSide, forward: f64) {
        let mut state = self.lock();
        match side {
            DriveSide::Left => state.left_wheel = forward,
            DriveSide::Right => state.right_wheel = forward,
        }
    }

    // Advance one control period and return the new raw heading.
    fn step(&self) -> f64 {
        let mut state = self.lock();
        let clockwise_rate = (state.left_wheel - state.right_wheel) / 2.0;
        state.raw_heading = wrap_signed(state.raw_heading - clockwise_rate * self.degrees_per_poll);
        state.raw_heading
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BodyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Wrap an angle into `[-180, 180)`.
fn wrap_signed(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated motor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated encoder motor honouring the full [`Actuator`] contract.
#[derive(Debug)]
pub struct SimMotor {
    name: String,
    power: f64,
    mode: RunMode,
    direction: MotorDirection,
    target: i32,
    travel: f64,
    ticks_per_poll: f64,
    wheel: Option<(Arc<SimBody>, DriveSide)>,
}

impl SimMotor {
    /// A free-standing motor (lift, claw, ...).
    pub fn new(name: impl Into<String>, ticks_per_poll: f64) -> Self {
        Self {
            name: name.into(),
            power: 0.0,
            mode: RunMode::FreeRun,
            direction: MotorDirection::Forward,
            target: 0,
            travel: 0.0,
            ticks_per_poll,
            wheel: None,
        }
    }

    /// A drive motor whose wheel output moves `body`.
    pub fn drive(
        name: impl Into<String>,
        ticks_per_poll: f64,
        body: Arc<SimBody>,
        side: DriveSide,
    ) -> Self {
        Self {
            wheel: Some((body, side)),
            ..Self::new(name, ticks_per_poll)
        }
    }

    fn report_wheel(&self) {
        if let Some((body, side)) = &self.wheel {
            let shaft = self.power * self.direction.sign();
            let forward = match side {
                DriveSide::Left => shaft,
                DriveSide::Right => -shaft,
            };
            body.set_wheel(*side, forward);
        }
    }

    fn at_target(&self) -> bool {
        self.travel == f64::from(self.target)
    }
}

impl Actuator for SimMotor {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_power(&mut self, power: f64) -> Result<(), RobotError> {
        self.power = clamp_power(power);
        self.report_wheel();
        Ok(())
    }

    fn power(&self) -> f64 {
        self.power
    }

    fn set_mode(&mut self, mode: RunMode) -> Result<(), RobotError> {
        if mode == RunMode::Reset {
            self.travel = 0.0;
            self.power = 0.0;
            self.report_wheel();
        }
        self.mode = mode;
        Ok(())
    }

    fn mode(&self) -> RunMode {
        self.mode
    }

    fn set_direction(&mut self, direction: MotorDirection) -> Result<(), RobotError> {
        self.direction = direction;
        self.report_wheel();
        Ok(())
    }

    fn direction(&self) -> MotorDirection {
        self.direction
    }

    fn set_target_position(&mut self, ticks: i32) -> Result<(), RobotError> {
        self.target = ticks;
        Ok(())
    }

    fn target_position(&self) -> i32 {
        self.target
    }

    fn current_position(&mut self) -> i32 {
        self.travel as i32
    }

    fn is_busy(&mut self) -> bool {
        if self.mode != RunMode::RunToPosition || self.at_target() {
            return false;
        }
        let remaining = f64::from(self.target) - self.travel;
        let step = self.power.abs() * self.ticks_per_poll;
        if remaining.abs() <= step {
            self.travel = f64::from(self.target);
        } else {
            self.travel += step.copysign(remaining);
        }
        !self.at_target()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated IMU
// ────────────────────────────────────────────────────────────────────────────

/// A simulated gyroscope; each read advances the [`SimBody`] one period.
#[derive(Debug)]
pub struct SimImu {
    name: String,
    body: Arc<SimBody>,
}

impl SimImu {
    pub fn new(name: impl Into<String>, body: Arc<SimBody>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl Imu for SimImu {
    fn name(&self) -> &str {
        &self.name
    }

    fn raw_heading(&mut self) -> f64 {
        self.body.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_signed_stays_in_range() {
        assert_eq!(wrap_signed(0.0), 0.0);
        assert_eq!(wrap_signed(180.0), -180.0);
        assert_eq!(wrap_signed(-190.0), 170.0);
        assert_eq!(wrap_signed(540.0), -180.0);
    }

    #[test]
    fn run_to_position_reaches_target_and_stops_being_busy() {
        let mut motor = SimMotor::new("lift_drive", 100.0);
        motor.set_mode(RunMode::Reset).unwrap();
        motor.set_target_position(250).unwrap();
        motor.set_mode(RunMode::RunToPosition).unwrap();
        motor.set_power(1.0).unwrap();

        assert!(motor.is_busy()); // 100
        assert!(motor.is_busy()); // 200
        assert!(!motor.is_busy()); // 250
        assert_eq!(motor.current_position(), 250);
        assert!(!motor.is_busy());
    }

    #[test]
    fn run_to_position_moves_backwards_for_negative_target() {
        let mut motor = SimMotor::new("claw", 10.0);
        motor.set_target_position(-15).unwrap();
        motor.set_mode(RunMode::RunToPosition).unwrap();
        motor.set_power(0.5).unwrap();

        assert!(motor.is_busy());
        assert_eq!(motor.current_position(), -5);
    }

    #[test]
    fn free_run_is_never_busy() {
        let mut motor = SimMotor::new("claw", 10.0);
        motor.set_target_position(100).unwrap();
        motor.set_power(1.0).unwrap();
        assert!(!motor.is_busy());
        assert_eq!(motor.current_position(), 0);
    }

    #[test]
    fn reset_zeroes_encoder_and_power() {
        let mut motor = SimMotor::new("lift_drive", 50.0);
        motor.set_target_position(100).unwrap();
        motor.set_mode(RunMode::RunToPosition).unwrap();
        motor.set_power(1.0).unwrap();
        motor.is_busy();
        assert_eq!(motor.current_position(), 50);

        motor.set_mode(RunMode::Reset).unwrap();
        assert_eq!(motor.current_position(), 0);
        assert_eq!(motor.power(), 0.0);
    }

    #[test]
    fn power_is_clamped() {
        let mut motor = SimMotor::new("claw", 10.0);
        motor.set_power(2.5).unwrap();
        assert_eq!(motor.power(), 1.0);
    }

    #[test]
    fn opposite_drive_power_turns_clockwise() {
        let body = SimBody::new(10.0);
        let mut left = SimMotor::drive("left_drive", 10.0, body.clone(), DriveSide::Left);
        let mut right = SimMotor::drive("right_drive", 10.0, body.clone(), DriveSide::Right);
        right.set_direction(MotorDirection::Reverse).unwrap();
        let mut imu = SimImu::new("imu", body.clone());

        left.set_power(1.0).unwrap();
        right.set_power(-1.0).unwrap();
        assert_eq!(body.wheels(), (1.0, -1.0));

        assert_eq!(imu.raw_heading(), -10.0);
        assert_eq!(imu.raw_heading(), -20.0);
    }

    #[test]
    fn equal_group_power_drives_straight() {
        let body = SimBody::new(10.0);
        let mut left = SimMotor::drive("left_drive", 10.0, body.clone(), DriveSide::Left);
        let mut right = SimMotor::drive("right_drive", 10.0, body.clone(), DriveSide::Right);
        right.set_direction(MotorDirection::Reverse).unwrap();
        let mut imu = SimImu::new("imu", body.clone());

        left.set_power(0.6).unwrap();
        right.set_power(0.6).unwrap();
        assert_eq!(body.wheels(), (0.6, 0.6));
        assert_eq!(imu.raw_heading(), 0.0);
    }

    #[test]
    fn heading_wraps_through_boundary() {
        let body = SimBody::new(10.0);
        body.set_raw_heading(-175.0);
        let mut left = SimMotor::drive("left_drive", 10.0, body.clone(), DriveSide::Left);
        let mut imu = SimImu::new("imu", body.clone());

        // Left wheel only: half-rate clockwise rotation.
        left.set_power(1.0).unwrap();
        assert_eq!(imu.raw_heading(), -180.0);
        assert_eq!(imu.raw_heading(), 175.0);
        assert_eq!(body.raw_heading(), 175.0);
    }
}
