//! Companion command codes.
//!
//! The numeric codes are a stable external contract shared with the mobile
//! app. Unknown codes are preserved so subscribers can record them; new
//! codes appear with client updates faster than this table is extended.

use std::fmt;

/// A command the companion app can send or be offered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompanionCommand {
    ElbowFlick,
    Wave,
    RideOn,
    /// Code 23 is sent with an empty label; kept distinct from unknown
    /// codes because the desktop emits it routinely.
    Blank,
    TurnLeft,
    GoStraight,
    TurnRight,
    DiscardAero,
    DiscardLightweight,
    PowerGraph,
    HeadsUpDisplay,
    /// Any code outside the table, with the raw value preserved.
    Unknown(u32),
}

impl CompanionCommand {
    /// Map a wire code to its command.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            4 => CompanionCommand::ElbowFlick,
            5 => CompanionCommand::Wave,
            6 => CompanionCommand::RideOn,
            23 => CompanionCommand::Blank,
            1010 => CompanionCommand::TurnLeft,
            1011 => CompanionCommand::GoStraight,
            1012 => CompanionCommand::TurnRight,
            1030 => CompanionCommand::DiscardAero,
            1034 => CompanionCommand::DiscardLightweight,
            1060 => CompanionCommand::PowerGraph,
            1081 => CompanionCommand::HeadsUpDisplay,
            other => CompanionCommand::Unknown(other),
        }
    }

    /// The wire code this command maps back to.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            CompanionCommand::ElbowFlick => 4,
            CompanionCommand::Wave => 5,
            CompanionCommand::RideOn => 6,
            CompanionCommand::Blank => 23,
            CompanionCommand::TurnLeft => 1010,
            CompanionCommand::GoStraight => 1011,
            CompanionCommand::TurnRight => 1012,
            CompanionCommand::DiscardAero => 1030,
            CompanionCommand::DiscardLightweight => 1034,
            CompanionCommand::PowerGraph => 1060,
            CompanionCommand::HeadsUpDisplay => 1081,
            CompanionCommand::Unknown(code) => code,
        }
    }

    /// Display label; empty for [`Blank`](Self::Blank).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CompanionCommand::ElbowFlick => "ElbowFlick",
            CompanionCommand::Wave => "Wave",
            CompanionCommand::RideOn => "RideOn",
            CompanionCommand::Blank => "",
            CompanionCommand::TurnLeft => "TurnLeft",
            CompanionCommand::GoStraight => "GoStraight",
            CompanionCommand::TurnRight => "TurnRight",
            CompanionCommand::DiscardAero => "DiscardAero",
            CompanionCommand::DiscardLightweight => "DiscardLightweight",
            CompanionCommand::PowerGraph => "PowerGraph",
            CompanionCommand::HeadsUpDisplay => "HeadsUpDisplay",
            CompanionCommand::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for CompanionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompanionCommand::Unknown(code) => write!(f, "Unknown({code})"),
            other => f.write_str(other.name()),
        }
    }
}
