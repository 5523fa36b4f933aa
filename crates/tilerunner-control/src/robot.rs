//! [`Tilerunner`] – the robot's closed-loop motion commands.
//!
//! # Straight moves
//!
//! [`Tilerunner::move_inches`] programs the drive group in
//! [`RunMode::RunToPosition`] and re-ramps its power every poll from the
//! ticks still to go.  The loop is a tight poll with no sleep; the motor
//! controller's own update rate bounds it.
//!
//! # Turns
//!
//! [`Tilerunner::turn`] rotates in place on gyro feedback.  The angular
//! distance travelled is measured in the resolved [`TurnDirection`] so it
//! stays monotonic across the 0/360 seam.  A delta above
//! [`WRAP_GUARD_DEGREES`] is treated as "not yet far enough": a heading that
//! jitters backwards past the start point would otherwise read as almost a
//! full revolution and end the loop early.
//!
//! After the loop the robot stops, waits for the gyro to settle and, if it
//! overshot by more than the correction threshold, turns back the overshoot
//! at a fifth of the power.  Correction passes are capped by
//! [`MotionConfig::max_turn_corrections`].

use std::thread;

use tilerunner_hal::{Actuator, ActuatorGroup, HardwareRegistry, HeadingSensor};
use tilerunner_types::{MotorDirection, RobotError, RunMode};
use tracing::{info, instrument};

use crate::cancel::CancellationToken;
use crate::config::{DeviceNames, MotionConfig};
use crate::diagnostics::{Diagnostics, FieldValue, Phase, StatusLine, TracingDiagnostics};
use crate::direction::TurnDirection;
use crate::ramp::{MOTOR_DEADZONE, calculate_speed};
use crate::servo::{PositionOutcome, servo_to_position};

/// Deltas above this are read as a wrap past the start, not as progress.
pub const WRAP_GUARD_DEGREES: f64 = 300.0;

/// Claw travel, in ticks, that releases a glyph.
pub const DISTANCE_REMOVE_GLYPH: i32 = 10;

/// Power used by [`Tilerunner::calibrate`] for its settling turns.
pub const CALIBRATION_POWER: f64 = 0.25;

/// Angle of each [`Tilerunner::calibrate`] settling turn.
pub const CALIBRATION_DEGREES: f64 = 15.0;

const MOVE_LABEL: &str = "move";
const TURN_LABEL: &str = "turn";

const LEFT: usize = 0;
const RIGHT: usize = 1;

/// One loop of a turn: the requested turn or a correction of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnPass {
    pub direction: TurnDirection,
    /// Signed power as passed in.
    pub power: f64,
    /// Unsigned goal in degrees.
    pub destination_degrees: f64,
    pub start_heading: f64,
    /// Distance travelled in `direction` when the loop ended.
    pub delta: f64,
    /// `delta - destination_degrees`.
    pub overshoot: f64,
    pub iterations: usize,
    pub cancelled: bool,
}

/// Every pass a [`Tilerunner::turn`] call ran, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnOutcome {
    pub passes: Vec<TurnPass>,
}

impl TurnOutcome {
    /// The requested pass.
    pub fn primary(&self) -> Option<&TurnPass> {
        self.passes.first()
    }

    /// Correction passes that followed the requested one.
    pub fn corrections(&self) -> &[TurnPass] {
        self.passes.get(1..).unwrap_or(&[])
    }

    /// `true` when any pass was ended by the cancellation token.
    pub fn cancelled(&self) -> bool {
        self.passes.iter().any(|p| p.cancelled)
    }
}

/// A two-wheel drivetrain with gyro, lift, claw and jewel whacker.
pub struct Tilerunner<D = TracingDiagnostics> {
    config: MotionConfig,
    drive: ActuatorGroup,
    lift: Box<dyn Actuator>,
    claw: Box<dyn Actuator>,
    jewel_whacker: Box<dyn Actuator>,
    heading: Box<dyn HeadingSensor>,
    diagnostics: D,
}

impl<D: Diagnostics> Tilerunner<D> {
    /// Assemble a robot from already-resolved parts.
    ///
    /// `drive` must hold the left motor at index 0 and the right motor at
    /// index 1, with polarities already set.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::Config`] for invalid geometry and
    /// [`RobotError::HardwareFault`] if the drive group has fewer than two
    /// members.
    pub fn new(
        config: MotionConfig,
        drive: ActuatorGroup,
        lift: Box<dyn Actuator>,
        claw: Box<dyn Actuator>,
        jewel_whacker: Box<dyn Actuator>,
        heading: Box<dyn HeadingSensor>,
        diagnostics: D,
    ) -> Result<Self, RobotError> {
        config.validate()?;
        if drive.len() < 2 {
            return Err(RobotError::HardwareFault {
                component: drive.name().to_string(),
                details: format!("drive group needs a left and a right motor, has {}", drive.len()),
            });
        }
        Ok(Self {
            config,
            drive,
            lift,
            claw,
            jewel_whacker,
            heading,
            diagnostics,
        })
    }

    /// Resolve every device by name.  Missing devices become null stand-ins
    /// (see [`HardwareRegistry`]); the right drive motor is reversed so that
    /// one group power drives both wheels forwards.
    pub fn from_registry(
        registry: &mut HardwareRegistry,
        devices: &DeviceNames,
        config: MotionConfig,
        diagnostics: D,
    ) -> Result<Self, RobotError> {
        let left = registry.take_motor(&devices.left_drive);
        let mut right = registry.take_motor(&devices.right_drive);
        right.set_direction(MotorDirection::Reverse)?;
        let drive = ActuatorGroup::new("drive", vec![left, right])?;

        let lift = registry.take_motor(&devices.lift_drive);
        let claw = registry.take_motor(&devices.claw);
        let jewel_whacker = registry.take_motor(&devices.jewel_whacker);
        let heading = registry.take_heading_sensor(&devices.imu);

        Self::new(config, drive, lift, claw, jewel_whacker, heading, diagnostics)
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn drive(&self) -> &ActuatorGroup {
        &self.drive
    }

    pub fn lift_motor(&self) -> &dyn Actuator {
        self.lift.as_ref()
    }

    pub fn claw_motor(&self) -> &dyn Actuator {
        self.claw.as_ref()
    }

    pub fn jewel_whacker_motor(&self) -> &dyn Actuator {
        self.jewel_whacker.as_ref()
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.diagnostics
    }

    /// Current absolute heading in `[0, 360)`.
    pub fn heading(&mut self) -> f64 {
        self.heading.heading()
    }

    /// Encoder reading of the drive group (left motor).
    pub fn drive_position(&mut self) -> i32 {
        self.drive.current_position()
    }

    // ────────────────────────────────────────────────────────────────────
    // Straight moves
    // ────────────────────────────────────────────────────────────────────

    /// Drive `inches` (negative reverses) with encoder feedback.
    ///
    /// `power` is applied as the initial command; each iteration then
    /// re-ramps it with [`calculate_speed`] over one wheel revolution of
    /// signed remaining ticks (`target - position`).  A reverse move, or a
    /// forward move past its target, therefore runs at [`MOTOR_DEADZONE`].
    /// Mode and power are left as the last iteration set them.
    #[instrument(skip(self, token), fields(target_ticks = tracing::field::Empty))]
    pub fn move_inches<T>(
        &mut self,
        token: &T,
        power: f64,
        inches: f64,
    ) -> Result<PositionOutcome, RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        let target = self.config.inches_to_ticks(inches);
        tracing::Span::current().record("target_ticks", target);

        self.drive.set_mode(RunMode::Reset)?;
        self.drive.set_target_position(target)?;
        self.drive.set_mode(RunMode::RunToPosition)?;
        self.drive.set_power(power)?;
        self.diagnostics.emit(
            StatusLine::new(MOVE_LABEL, Phase::Enter)
                .field("target", target)
                .field("power", power),
        );

        let mut iterations = 0;
        let cancelled = loop {
            if !self.drive.is_busy() {
                break false;
            }
            if !token.is_active() {
                break true;
            }
            let position = self.drive.current_position();
            let remaining = (i64::from(target) - i64::from(position)) as f64;
            let speed = calculate_speed(remaining, self.config.threshold_ticks);
            self.diagnostics.emit(
                StatusLine::new(MOVE_LABEL, Phase::Step)
                    .field("mode", self.drive.mode())
                    .field("target", self.drive.target_position())
                    .field("pos", position)
                    .field("power", speed),
            );
            self.drive.set_power(speed)?;
            iterations += 1;
        };

        let final_position = self.drive.current_position();
        self.diagnostics.emit(
            StatusLine::new(MOVE_LABEL, Phase::Exit)
                .field("pos", final_position)
                .field("iterations", FieldValue::Int(iterations as i64))
                .field("cancelled", if cancelled { "yes" } else { "no" }),
        );
        info!(target, final_position, iterations, cancelled, "move finished");

        Ok(PositionOutcome {
            target_ticks: target,
            final_position,
            iterations,
            cancelled,
        })
    }

    // ────────────────────────────────────────────────────────────────────
    // Turns
    // ────────────────────────────────────────────────────────────────────

    /// Rotate in place by `destination_degrees`.
    ///
    /// The rotation sense is `signum(direction_power) *
    /// signum(destination_degrees)`: positive turns clockwise, anything
    /// else counter-clockwise.  Only the magnitudes are used afterwards.
    #[instrument(skip(self, token))]
    pub fn turn<T>(
        &mut self,
        token: &T,
        direction_power: f64,
        destination_degrees: f64,
    ) -> Result<TurnOutcome, RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        let mut outcome = TurnOutcome::default();
        let mut power = direction_power;
        let mut destination = destination_degrees;

        loop {
            let pass = self.turn_pass(token, power, destination)?;
            outcome.passes.push(pass);

            let corrections = outcome.passes.len() - 1;
            if pass.cancelled
                || pass.overshoot <= self.config.turn_correction_threshold
                || corrections >= self.config.max_turn_corrections as usize
            {
                break;
            }

            // Turn back the overshoot, opposite sense, at a fifth of the power.
            let (_, sign) = TurnDirection::resolve(pass.power, pass.destination_degrees);
            power = -sign * pass.power.abs() / 5.0;
            destination = pass.overshoot;
            info!(
                overshoot = pass.overshoot,
                correction_power = power,
                "turn overshot, correcting"
            );
        }

        if let Some(first) = outcome.primary() {
            info!(
                direction = %first.direction,
                delta = first.delta,
                passes = outcome.passes.len(),
                "turn finished"
            );
        }
        Ok(outcome)
    }

    fn turn_pass<T>(
        &mut self,
        token: &T,
        direction_power: f64,
        destination_degrees: f64,
    ) -> Result<TurnPass, RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        let (direction, sign) = TurnDirection::resolve(direction_power, destination_degrees);
        let magnitude = direction_power.abs();
        let destination = destination_degrees.abs();
        let start_heading = self.heading.heading();

        self.drive.set_mode(RunMode::FreeRun)?;
        self.spin(magnitude * sign)?;

        let mut heading = self.heading.heading();
        let mut delta = direction.distance_degrees(start_heading, heading);
        self.diagnostics.emit(
            StatusLine::new(TURN_LABEL, Phase::Enter)
                .field("direction", direction.to_string().as_str())
                .field("power", direction_power)
                .field("start", start_heading)
                .field("goal", destination),
        );

        let mut iterations = 0;
        let mut cancelled = false;
        while delta < destination || delta > WRAP_GUARD_DEGREES {
            if !token.is_active() {
                cancelled = true;
                break;
            }
            let ramped = magnitude * calculate_speed(destination - delta, self.config.threshold_heading);
            let power = ramped.max(MOTOR_DEADZONE) * sign;
            self.diagnostics.emit(
                StatusLine::new(TURN_LABEL, Phase::Step)
                    .field("power", power)
                    .field("heading", heading)
                    .field("goal", destination)
                    .field("delta", delta),
            );
            self.spin(power)?;

            heading = self.heading.heading();
            delta = direction.distance_degrees(start_heading, heading);
            iterations += 1;
            thread::sleep(self.config.turn_poll_interval());
        }

        self.drive.set_power(0.0)?;
        self.drive.set_mode(RunMode::Reset)?;
        self.diagnostics.emit(
            StatusLine::new(TURN_LABEL, Phase::Exit)
                .field("start", start_heading)
                .field("heading", heading)
                .field("goal", destination)
                .field("delta", delta),
        );

        thread::sleep(self.config.turn_settle());

        Ok(TurnPass {
            direction,
            power: direction_power,
            destination_degrees: destination,
            start_heading,
            delta,
            overshoot: delta - destination,
            iterations,
            cancelled,
        })
    }

    // Left wheel +power, right wheel -power: rotate in place.
    fn spin(&mut self, power: f64) -> Result<(), RobotError> {
        if let Some(left) = self.drive.member_mut(LEFT) {
            left.set_power(power)?;
        }
        if let Some(right) = self.drive.member_mut(RIGHT) {
            right.set_power(-power)?;
        }
        Ok(())
    }

    // ────────────────────────────────────────────────────────────────────
    // Calibration and auxiliary actuators
    // ────────────────────────────────────────────────────────────────────

    /// Small turn and return to settle the heading reference, then zero the
    /// drive encoders.
    #[instrument(skip(self, token))]
    pub fn calibrate<T>(&mut self, token: &T) -> Result<(), RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        self.turn(token, CALIBRATION_POWER, CALIBRATION_DEGREES)?;
        self.turn(token, CALIBRATION_POWER, -CALIBRATION_DEGREES)?;

        self.drive.set_mode(RunMode::Reset)?;
        thread::sleep(self.config.calibrate_pause());
        Ok(())
    }

    /// Run the lift `ticks` at constant `power`.
    #[instrument(skip(self, token))]
    pub fn lift<T>(&mut self, token: &T, ticks: i32, power: f64) -> Result<PositionOutcome, RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        servo_to_position(token, self.lift.as_mut(), ticks, power)
    }

    /// Run the claw `ticks` at constant `power`.
    #[instrument(skip(self, token))]
    pub fn move_claw<T>(
        &mut self,
        token: &T,
        ticks: i32,
        power: f64,
    ) -> Result<PositionOutcome, RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        servo_to_position(token, self.claw.as_mut(), ticks, power)
    }

    /// Open the claw far enough to drop a glyph.
    pub fn remove_glyph<T>(&mut self, token: &T, power: f64) -> Result<PositionOutcome, RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        self.move_claw(token, DISTANCE_REMOVE_GLYPH, power)
    }

    /// Not wired to hardware yet.
    pub fn activate_jewel_whacker<T>(&mut self, _token: &T) -> Result<(), RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        Err(RobotError::Unsupported {
            operation: "activate_jewel_whacker".to_string(),
        })
    }

    /// Not wired to hardware yet.
    pub fn retract_jewel_whacker<T>(&mut self, _token: &T) -> Result<(), RobotError>
    where
        T: CancellationToken + ?Sized,
    {
        Err(RobotError::Unsupported {
            operation: "retract_jewel_whacker".to_string(),
        })
    }
}
