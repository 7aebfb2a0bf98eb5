use std::fmt;

use serde::Serialize;

use crate::detect::Region;

/// Forward velocity and turn rate for one decision cycle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MotionCommand {
    /// Forward speed (negative drives backwards).
    pub forward: f32,
    /// Rotational rate, positive turns left.
    pub turn: f32,
}

impl MotionCommand {
    pub const STOP: Self = Self::new(0.0, 0.0);
    pub const TURN_LEFT: Self = Self::new(0.5, 1.0);
    pub const AHEAD: Self = Self::new(0.5, 0.0);
    pub const TURN_RIGHT: Self = Self::new(0.5, -1.0);

    pub const fn new(forward: f32, turn: f32) -> Self {
        Self { forward, turn }
    }

    pub fn is_stop(&self) -> bool {
        *self == Self::STOP
    }
}

impl fmt::Display for MotionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "forward={:.2} turn={:+.2}", self.forward, self.turn)
    }
}

/// Velocity table lookup. One region selects exactly one command.
pub const fn command_for(region: Region) -> MotionCommand {
    match region {
        Region::Left => MotionCommand::TURN_LEFT,
        Region::Middle => MotionCommand::AHEAD,
        Region::Right => MotionCommand::TURN_RIGHT,
        Region::NoTarget => MotionCommand::STOP,
    }
}
