//! [`ActuatorGroup`] – several motors acting as one logical actuator.
//!
//! The drivetrain's left and right motors are wired into a group so that a
//! straight move issues one command stream.  Every setter is forwarded to
//! every member, in order.  Every observer answers from the first member
//! only; the members are expected to track together.
//!
//! The group issues one command, not per-member commands, so polarity must
//! be set on the members by the caller (e.g. the right drive motor reversed)
//! before they are grouped.

use tilerunner_types::{MotorDirection, RobotError, RunMode};

use crate::actuator::Actuator;

/// A non-empty, ordered set of [`Actuator`]s sharing one command stream.
pub struct ActuatorGroup {
    name: String,
    members: Vec<Box<dyn Actuator>>,
}

impl ActuatorGroup {
    /// Build a group from `members`.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::EmptyGroup`] when `members` is empty.
    pub fn new(
        name: impl Into<String>,
        members: Vec<Box<dyn Actuator>>,
    ) -> Result<Self, RobotError> {
        if members.is_empty() {
            return Err(RobotError::EmptyGroup);
        }
        Ok(Self {
            name: name.into(),
            members,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member(&self, index: usize) -> Option<&dyn Actuator> {
        self.members.get(index).map(|m| m.as_ref())
    }

    /// Mutable access to one member, for commands that must differ per side
    /// (turning in place).
    pub fn member_mut(&mut self, index: usize) -> Option<&mut (dyn Actuator + 'static)> {
        self.members.get_mut(index).map(|m| m.as_mut())
    }

    pub fn members(&self) -> impl Iterator<Item = &dyn Actuator> {
        self.members.iter().map(|m| m.as_ref())
    }

    fn first(&self) -> &dyn Actuator {
        self.members[0].as_ref()
    }

    fn first_mut(&mut self) -> &mut dyn Actuator {
        self.members[0].as_mut()
    }

    fn for_each(
        &mut self,
        mut f: impl FnMut(&mut dyn Actuator) -> Result<(), RobotError>,
    ) -> Result<(), RobotError> {
        for member in &mut self.members {
            f(member.as_mut())?;
        }
        Ok(())
    }
}

impl Actuator for ActuatorGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_power(&mut self, power: f64) -> Result<(), RobotError> {
        self.for_each(|m| m.set_power(power))
    }

    fn power(&self) -> f64 {
        self.first().power()
    }

    fn set_mode(&mut self, mode: RunMode) -> Result<(), RobotError> {
        self.for_each(|m| m.set_mode(mode))
    }

    fn mode(&self) -> RunMode {
        self.first().mode()
    }

    fn set_direction(&mut self, direction: MotorDirection) -> Result<(), RobotError> {
        self.for_each(|m| m.set_direction(direction))
    }

    fn direction(&self) -> MotorDirection {
        self.first().direction()
    }

    fn set_target_position(&mut self, ticks: i32) -> Result<(), RobotError> {
        self.for_each(|m| m.set_target_position(ticks))
    }

    fn target_position(&self) -> i32 {
        self.first().target_position()
    }

    fn current_position(&mut self) -> i32 {
        self.first_mut().current_position()
    }

    fn is_busy(&mut self) -> bool {
        self.first_mut().is_busy()
    }
}
