//! Rotational direction of an in-place turn and its wraparound-aware
//! angular distance.

use serde::{Deserialize, Serialize};

/// Rotation sense of a turn.  Clockwise rotation decreases the heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Clockwise,
    Counterclockwise,
}

impl TurnDirection {
    /// `Clockwise` for a strictly positive sign, `Counterclockwise` otherwise.
    pub fn from_sign(sign: f64) -> Self {
        if sign > 0.0 {
            TurnDirection::Clockwise
        } else {
            TurnDirection::Counterclockwise
        }
    }

    /// Resolve a turn request into its direction and the sign
    /// `signum(power) * signum(degrees)` (`-1`, `0` or `1`).
    pub fn resolve(power: f64, degrees: f64) -> (Self, f64) {
        let sign = signum(power) * signum(degrees);
        (Self::from_sign(sign), sign)
    }

    /// Degrees travelled from `start` to `end` when rotating in this
    /// direction, in `[0, 360)`.
    pub fn distance_degrees(self, start: f64, end: f64) -> f64 {
        let dist = match self {
            TurnDirection::Clockwise => start - end,
            TurnDirection::Counterclockwise => end - start,
        };
        if dist >= 0.0 { dist } else { dist + 360.0 }
    }
}

impl std::fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnDirection::Clockwise => write!(f, "clockwise"),
            TurnDirection::Counterclockwise => write!(f, "counterclockwise"),
        }
    }
}

// Unlike f64::signum, zero (and NaN) map to 0.
fn signum(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_distance_wraps() {
        assert_eq!(TurnDirection::Clockwise.distance_degrees(350.0, 10.0), 340.0);
        assert_eq!(TurnDirection::Clockwise.distance_degrees(10.0, 350.0), 20.0);
        assert_eq!(TurnDirection::Clockwise.distance_degrees(90.0, 0.0), 90.0);
    }

    #[test]
    fn counterclockwise_distance_wraps() {
        assert_eq!(TurnDirection::Counterclockwise.distance_degrees(10.0, 350.0), 340.0);
        assert_eq!(TurnDirection::Counterclockwise.distance_degrees(350.0, 10.0), 20.0);
        assert_eq!(TurnDirection::Counterclockwise.distance_degrees(0.0, 90.0), 90.0);
    }

    #[test]
    fn zero_distance_at_start() {
        assert_eq!(TurnDirection::Clockwise.distance_degrees(123.0, 123.0), 0.0);
        assert_eq!(TurnDirection::Counterclockwise.distance_degrees(0.0, 0.0), 0.0);
    }

    #[test]
    fn resolve_uses_sign_of_product() {
        assert_eq!(TurnDirection::resolve(1.0, 90.0), (TurnDirection::Clockwise, 1.0));
        assert_eq!(TurnDirection::resolve(-1.0, -90.0), (TurnDirection::Clockwise, 1.0));
        assert_eq!(
            TurnDirection::resolve(-0.5, 90.0),
            (TurnDirection::Counterclockwise, -1.0)
        );
        assert_eq!(
            TurnDirection::resolve(0.25, -15.0),
            (TurnDirection::Counterclockwise, -1.0)
        );
    }

    #[test]
    fn zero_input_resolves_counterclockwise_with_zero_sign() {
        assert_eq!(TurnDirection::resolve(0.0, 90.0), (TurnDirection::Counterclockwise, 0.0));
        assert_eq!(TurnDirection::resolve(1.0, 0.0), (TurnDirection::Counterclockwise, 0.0));
    }
}
