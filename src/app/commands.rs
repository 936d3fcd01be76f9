//! Inbound commands to the station service.
//!
//! A command byte arriving on a channel is resolved by the
//! [`router`](super::router) into one of these actions; the
//! [`StationService`](super::service::StationService) executes it.

use crate::fsm::Procedure;

/// Identity of a command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// Machine-oriented channel (ROS bridge): lower-case in, acked.
    Machine,
    /// Human / browser channel: upper-case in, silent.
    Human,
}

impl ChannelId {
    /// Console prefix for log lines from this channel.
    pub fn label(self) -> &'static str {
        match self {
            Self::Machine => "ROS",
            Self::Human => "Web",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Machine => 0,
            Self::Human => 1,
        }
    }
}

/// Actions a command byte can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationCommand {
    ExtendPlate,
    RetractPlate,
    OpenDoor,
    CloseDoor,
    RelayOn,
    RelayOff,
    /// Full timed procedure (blocking or stepped).
    Sequence(Procedure),
    /// Open the door and, in the same tick, extend the plate if the door
    /// sensor still reads closed.
    QuickTakeOff,
    /// Retract the plate; in the same tick close the door if the plate
    /// reads retracted, then stop everything if the door reads closed.
    QuickLanding,
    StopAll,
}

impl StationCommand {
    /// Human-readable name, as printed on the console.
    pub fn name(self) -> &'static str {
        match self {
            Self::ExtendPlate => "Extend Plate",
            Self::RetractPlate => "Retract Plate",
            Self::OpenDoor => "Open Door",
            Self::CloseDoor => "Close Door",
            Self::RelayOn => "Wireless Power On",
            Self::RelayOff => "Wireless Power Off",
            Self::Sequence(Procedure::TakeOff) | Self::QuickTakeOff => "Take Off Sequence",
            Self::Sequence(Procedure::Landing) | Self::QuickLanding => "Landing Sequence",
            Self::StopAll => "Stop All",
        }
    }

    /// Whether the command directly drives or stops a motor.
    pub fn is_manual_motion(self) -> bool {
        matches!(
            self,
            Self::ExtendPlate
                | Self::RetractPlate
                | Self::OpenDoor
                | Self::CloseDoor
                | Self::QuickTakeOff
                | Self::QuickLanding
                | Self::StopAll
        )
    }
}

/// Sensor precondition that must hold before a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    DoorClosed,
    PlateRetracted,
}
