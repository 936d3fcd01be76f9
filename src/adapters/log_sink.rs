//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured station events to the
//! logger (UART / USB-CDC in production).  Command lines keep the console
//! wording operators already know: `ROS: Extend Plate`,
//! `Unknown Web command`, `New client connected`.

use log::{debug, info, warn};

use crate::app::events::StationEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`StationEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &StationEvent) {
        match event {
            StationEvent::Started { variant, mode } => {
                info!("START | variant={:?} sequences={:?}", variant, mode);
            }
            StationEvent::ClientConnected(channel) => {
                info!("CONN | {}: New client connected", channel.label());
            }
            StationEvent::CommandExecuted { channel, command, .. } => {
                info!("CMD | {}: {}", channel.label(), command.name());
            }
            StationEvent::CommandIgnored { channel, command, gate, .. } => {
                debug!(
                    "CMD | {}: {} skipped ({:?} not met)",
                    channel.label(),
                    command.name(),
                    gate
                );
            }
            StationEvent::UnknownCommand { channel, byte } => {
                warn!("CMD | Unknown {} command (0x{:02x})", channel.label(), byte);
            }
            StationEvent::Acknowledged { channel, ack } => {
                debug!("CMD | {}: ack '{}'", channel.label(), char::from(*ack));
            }
            StationEvent::SequenceStarted(p) => {
                info!("SEQ | {:?} started", p);
            }
            StationEvent::SequenceAdvanced(p, state) => {
                info!("SEQ | {:?} -> {:?}", p, state);
            }
            StationEvent::SequenceFinished(p) => {
                info!("SEQ | {:?} finished", p);
            }
            StationEvent::SequenceAborted(p) => {
                warn!("SEQ | {:?} aborted", p);
            }
            StationEvent::RelayLatched(state) => {
                info!("RELAY | {:?}", state);
            }
            StationEvent::Telemetry(s) => {
                info!(
                    "TELEM | door={:?} plate={:?} | door_closed={} plate_in={} | \
                     relay={:?} | seq={:?} | ticks={}",
                    s.door,
                    s.plate,
                    s.positions.door_closed,
                    s.positions.plate_retracted,
                    s.relay,
                    s.sequence,
                    s.tick_count,
                );
            }
        }
    }
}
