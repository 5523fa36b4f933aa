//! Proportional speed ramp shared by the straight-line and turning loops.
//!
//! Far from the goal the commanded power saturates at `1`.  Inside the
//! threshold window it falls linearly with the remaining distance, but never
//! below [`MOTOR_DEADZONE`], the static-friction floor under which the
//! motors stall.

/// Minimum power that still moves the robot.
pub const MOTOR_DEADZONE: f64 = 0.2;

/// `min(1, max(MOTOR_DEADZONE, remaining / threshold))`.
///
/// Degenerate thresholds follow the formula literally: a zero threshold
/// divides to `±inf`, a negative one flips the ratio's sign.  A `NaN` ratio
/// (`0 / 0`, or a `NaN` input) lands on [`MOTOR_DEADZONE`], so the result is
/// never `NaN`.
pub fn calculate_speed(remaining: f64, threshold: f64) -> f64 {
    let ratio = remaining / threshold;
    if ratio.is_nan() {
        return MOTOR_DEADZONE;
    }
    ratio.max(MOTOR_DEADZONE).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates_outside_threshold() {
        assert_eq!(calculate_speed(1120.0, 1120.0), 1.0);
        assert_eq!(calculate_speed(5000.0, 1120.0), 1.0);
        assert_eq!(calculate_speed(181.0, 180.0), 1.0);
    }

    #[test]
    fn ramps_linearly_inside_threshold() {
        assert_eq!(calculate_speed(90.0, 180.0), 0.5);
        assert_eq!(calculate_speed(840.0, 1120.0), 0.75);
    }

    #[test]
    fn never_drops_below_deadzone() {
        assert_eq!(calculate_speed(10.0, 180.0), MOTOR_DEADZONE);
        assert_eq!(calculate_speed(0.0, 180.0), MOTOR_DEADZONE);
        assert_eq!(calculate_speed(-50.0, 180.0), MOTOR_DEADZONE);
    }

    #[test]
    fn monotonic_in_remaining() {
        let threshold = 1120.0;
        let mut previous = 0.0;
        for step in 0..=150 {
            let speed = calculate_speed(f64::from(step) * 10.0, threshold);
            assert!(speed >= previous, "speed dropped at remaining={}", step * 10);
            assert!((MOTOR_DEADZONE..=1.0).contains(&speed));
            previous = speed;
        }
    }

    #[test]
    fn degenerate_threshold_is_defined() {
        assert_eq!(calculate_speed(10.0, 0.0), 1.0);
        assert_eq!(calculate_speed(-10.0, 0.0), MOTOR_DEADZONE);
        assert_eq!(calculate_speed(0.0, 0.0), MOTOR_DEADZONE);
        assert_eq!(calculate_speed(10.0, f64::NAN), MOTOR_DEADZONE);
    }

    #[test]
    fn negative_threshold_follows_the_formula() {
        for (remaining, threshold) in [(10.0, -180.0), (-10.0, -180.0), (-500.0, -180.0)] {
            let expected = 1f64.min(MOTOR_DEADZONE.max(remaining / threshold));
            assert_eq!(calculate_speed(remaining, threshold), expected);
        }
        assert_eq!(calculate_speed(10.0, -180.0), MOTOR_DEADZONE);
        assert_eq!(calculate_speed(-500.0, -180.0), 1.0);
    }

    #[test]
    fn nan_remaining_lands_on_deadzone() {
        assert_eq!(calculate_speed(f64::NAN, 180.0), MOTOR_DEADZONE);
    }
}
