//! Outbound station events.
//!
//! The [`StationService`](super::service::StationService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them — log to serial, stream to
//! an operator console, or record them in a test.

use crate::config::{RouterVariant, SequenceMode};
use crate::drivers::motor::MotorState;
use crate::drivers::relay::RelayState;
use crate::fsm::{Procedure, SequenceState};
use crate::sensors::PositionSnapshot;

use super::commands::{ChannelId, Gate, StationCommand};

/// Structured events emitted by the station core.
#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    /// The service has started; motors stopped, relay de-energised.
    Started {
        variant: RouterVariant,
        mode: SequenceMode,
    },

    /// A client was seen on a channel for the first time.
    ClientConnected(ChannelId),

    /// A command byte was recognised and executed.
    CommandExecuted {
        channel: ChannelId,
        byte: u8,
        command: StationCommand,
    },

    /// A command byte was recognised but its precondition failed.
    CommandIgnored {
        channel: ChannelId,
        byte: u8,
        command: StationCommand,
        gate: Gate,
    },

    /// A byte matched nothing in the channel's vocabulary.
    UnknownCommand { channel: ChannelId, byte: u8 },

    /// A reply byte was queued on a channel.
    Acknowledged { channel: ChannelId, ack: u8 },

    /// A procedure began its first leg.
    SequenceStarted(Procedure),

    /// A stepped procedure moved to its second leg.
    SequenceAdvanced(Procedure, SequenceState),

    /// A procedure's final dwell elapsed.
    SequenceFinished(Procedure),

    /// A stepped procedure was cut short by a manual command.
    SequenceAborted(Procedure),

    /// The relay latch changed state.
    RelayLatched(RelayState),

    /// Periodic status snapshot.
    Telemetry(StationStatus),
}

/// A point-in-time status snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationStatus {
    pub door: MotorState,
    pub plate: MotorState,
    pub positions: PositionSnapshot,
    pub relay: RelayState,
    pub sequence: SequenceState,
    pub tick_count: u64,
}
