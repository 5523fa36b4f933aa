//! Generic position servo for single auxiliary actuators (lift, claw).
//!
//! The motor controller does the closed-loop work in
//! [`RunMode::RunToPosition`]; this helper only programs it and waits.
//! Power stays constant for the whole move.

use tilerunner_hal::Actuator;
use tilerunner_types::{RobotError, RunMode};
use tracing::debug;

use crate::cancel::CancellationToken;

/// Result of a position-controlled move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOutcome {
    /// Target programmed into the motor(s).
    pub target_ticks: i32,
    /// Encoder reading when the loop ended.
    pub final_position: i32,
    /// Completed loop iterations.
    pub iterations: usize,
    /// `true` when the token ended the loop before the target was reached.
    pub cancelled: bool,
}

/// Reset `actuator`'s encoder, program `ticks` at `power`, and block until it
/// is no longer busy or `token` is cleared.
///
/// No sleep between polls.  A [`NullActuator`][tilerunner_hal::NullActuator]
/// returns immediately.
pub fn servo_to_position<T>(
    token: &T,
    actuator: &mut dyn Actuator,
    ticks: i32,
    power: f64,
) -> Result<PositionOutcome, RobotError>
where
    T: CancellationToken + ?Sized,
{
    actuator.set_mode(RunMode::Reset)?;
    actuator.set_target_position(ticks)?;
    actuator.set_mode(RunMode::RunToPosition)?;
    actuator.set_power(power)?;

    let mut iterations = 0;
    let cancelled = loop {
        if !actuator.is_busy() {
            break false;
        }
        if !token.is_active() {
            break true;
        }
        iterations += 1;
    };

    let final_position = actuator.current_position();
    debug!(
        actuator = actuator.name(),
        target = ticks,
        position = final_position,
        iterations,
        cancelled,
        "servo finished"
    );

    Ok(PositionOutcome {
        target_ticks: ticks,
        final_position,
        iterations,
        cancelled,
    })
}
