//! Station service — the hexagonal core.
//!
//! [`StationService`] owns every control component and runs one
//! control-loop iteration per [`tick`](StationService::tick).  All I/O
//! flows through port traits injected at call sites, making the whole
//! service testable with mock adapters.
//!
//! ```text
//!  CommandLink ──▶ ┌───────────────────────────────┐ ──▶ EventSink
//!                  │        StationService         │
//!   DigitalIo ◀──▶ │ Router · Motors · Sensors     │
//!       Clock ──▶  │ Relay · Sequence · Connection │
//!                  └───────────────────────────────┘
//! ```
//!
//! The loop is single-threaded and cooperative.  One tick reads at most
//! one byte per channel.  In [`SequenceMode::Blocking`] a takeoff or
//! landing stalls the tick for its full 70 s; in
//! [`SequenceMode::Stepped`] it advances once per tick instead.

use crate::config::{RouterVariant, SequenceMode, StationConfig};
use crate::drivers::motor::{MotorActuator, MotorChannel};
use crate::drivers::relay::{PowerRelayLatch, RelayState};
use crate::fsm::{Procedure, SequenceOrchestrator, SequenceProgress, SequenceState};
use crate::sensors::SensorMonitor;

use super::commands::{ChannelId, Gate, StationCommand};
use super::connection::ConnectionTracker;
use super::events::{StationEvent, StationStatus};
use super::ports::{Clock, CommandLink, DigitalIo, EventSink};
use super::router::{self, Vocabulary};

/// Outcome of one command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Recognised and executed (and acknowledged, if the route acks).
    Executed(StationCommand),
    /// Recognised, but the sensor precondition failed; nothing moved.
    Ignored(StationCommand, Gate),
    /// Not in the channel's vocabulary.
    Unrecognized,
    /// The channel is not served by the active router variant.
    NotServed,
}

// ───────────────────────────────────────────────────────────────
// StationService
// ───────────────────────────────────────────────────────────────

/// The station service orchestrates all domain logic.
pub struct StationService {
    config: StationConfig,
    motors: MotorActuator,
    sensors: SensorMonitor,
    relay: PowerRelayLatch,
    sequence: SequenceOrchestrator,
    connections: ConnectionTracker,
    tick_count: u64,
    last_telemetry_ms: u64,
}

impl StationService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch any output — call [`start`](Self::start) next.
    pub fn new(config: StationConfig) -> Self {
        Self {
            config,
            motors: MotorActuator::new(),
            sensors: SensorMonitor::new(),
            relay: PowerRelayLatch::new(),
            sequence: SequenceOrchestrator::new(),
            connections: ConnectionTracker::new(),
            tick_count: 0,
            last_telemetry_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output to its safe level: both motors stopped and the
    /// relay de-energised.
    pub fn start(&mut self, hw: &mut (impl DigitalIo + Clock), sink: &mut impl EventSink) {
        self.motors.stop_all(hw);
        self.relay.set_state(RelayState::DeEnergized);
        self.relay.apply(hw);
        self.last_telemetry_ms = hw.now_ms();
        sink.emit(&StationEvent::Started {
            variant: self.config.variant,
            mode: self.config.sequence_mode,
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control-loop iteration.
    ///
    /// 1. For each served channel: connection tracking, then at most one
    ///    command byte.
    /// 2. Advance a stepped sequence.
    /// 3. Re-assert the relay (dual-channel variant).
    /// 4. Emit telemetry when the interval has elapsed.
    ///
    /// `links` are polled in the order given; channels the active
    /// variant does not serve are skipped.
    pub fn tick(
        &mut self,
        hw: &mut (impl DigitalIo + Clock),
        links: &mut [(ChannelId, &mut dyn CommandLink)],
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        for (channel, link) in links.iter_mut() {
            let channel = *channel;
            if Vocabulary::for_channel(self.config.variant, channel).is_none() {
                continue;
            }

            if self.connections.observe(channel, link.is_connected()) {
                link.discard_pending_output();
                sink.emit(&StationEvent::ClientConnected(channel));
            }

            if let Some(byte) = link.read_byte() {
                self.handle_byte(channel, byte, hw, &mut **link, sink);
            }
        }

        if self.config.sequence_mode == SequenceMode::Stepped {
            match self.sequence.poll(hw.now_ms(), &mut self.motors, hw) {
                Some(SequenceProgress::LegStarted(p, state)) => {
                    sink.emit(&StationEvent::SequenceAdvanced(p, state));
                }
                Some(SequenceProgress::Finished(p)) => {
                    sink.emit(&StationEvent::SequenceFinished(p));
                }
                None => {}
            }
        }

        if self.config.variant == RouterVariant::DualChannel {
            self.relay.apply(hw);
        }

        let now = hw.now_ms();
        if now.saturating_sub(self.last_telemetry_ms) >= u64::from(self.config.telemetry_interval_ms) {
            self.last_telemetry_ms = now;
            let status = self.status(hw);
            sink.emit(&StationEvent::Telemetry(status));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Resolve and execute one command byte received on `channel`.
    ///
    /// Acknowledgment bytes (machine channel) are written to `link`
    /// after the command has run; for a blocking sequence that is after
    /// the whole procedure.
    pub fn handle_byte<L: CommandLink + ?Sized>(
        &mut self,
        channel: ChannelId,
        byte: u8,
        hw: &mut (impl DigitalIo + Clock),
        link: &mut L,
        sink: &mut impl EventSink,
    ) -> Dispatch {
        let Some(vocabulary) = Vocabulary::for_channel(self.config.variant, channel) else {
            return Dispatch::NotServed;
        };

        let Some(route) = router::resolve(vocabulary, byte) else {
            sink.emit(&StationEvent::UnknownCommand { channel, byte });
            return Dispatch::Unrecognized;
        };

        if let Some(gate) = route.gate {
            if !self.gate_holds(gate, hw) {
                sink.emit(&StationEvent::CommandIgnored {
                    channel,
                    byte,
                    command: route.command,
                    gate,
                });
                return Dispatch::Ignored(route.command, gate);
            }
        }

        sink.emit(&StationEvent::CommandExecuted {
            channel,
            byte,
            command: route.command,
        });
        self.execute(route.command, hw, sink);

        if let Some(ack) = route.ack {
            link.write_byte(ack);
            sink.emit(&StationEvent::Acknowledged { channel, ack });
        }

        Dispatch::Executed(route.command)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot.  Samples both position sensors.
    pub fn status(&self, io: &mut impl DigitalIo) -> StationStatus {
        StationStatus {
            door: self.motors.state(MotorChannel::Door),
            plate: self.motors.state(MotorChannel::Plate),
            positions: self.sensors.snapshot(io),
            relay: self.relay.state(),
            sequence: self.sequence.state(),
            tick_count: self.tick_count,
        }
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn motors(&self) -> &MotorActuator {
        &self.motors
    }

    pub fn relay_state(&self) -> RelayState {
        self.relay.state()
    }

    pub fn sequence_state(&self) -> SequenceState {
        self.sequence.state()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn gate_holds(&self, gate: Gate, io: &mut impl DigitalIo) -> bool {
        match gate {
            Gate::DoorClosed => self.sensors.is_door_closed(io),
            Gate::PlateRetracted => self.sensors.is_plate_retracted(io),
        }
    }

    fn execute(
        &mut self,
        command: StationCommand,
        hw: &mut (impl DigitalIo + Clock),
        sink: &mut impl EventSink,
    ) {
        if command.is_manual_motion() {
            if let Some(cut) = self.sequence.abort() {
                sink.emit(&StationEvent::SequenceAborted(cut));
            }
        }

        match command {
            StationCommand::ExtendPlate => self.motors.extend_plate(hw),
            StationCommand::RetractPlate => self.motors.retract_plate(hw),
            StationCommand::OpenDoor => self.motors.open_door(hw),
            StationCommand::CloseDoor => self.motors.close_door(hw),
            StationCommand::StopAll => self.motors.stop_all(hw),
            StationCommand::RelayOn => self.latch_relay(RelayState::Energized, sink),
            StationCommand::RelayOff => self.latch_relay(RelayState::DeEnergized, sink),
            StationCommand::Sequence(procedure) => self.run_sequence(procedure, hw, sink),
            StationCommand::QuickTakeOff => {
                // The door has only just been told to open, so the closed
                // sensor is sampled before any movement can register.
                self.motors.open_door(hw);
                if self.sensors.is_door_closed(hw) {
                    self.motors.extend_plate(hw);
                }
            }
            StationCommand::QuickLanding => {
                self.motors.retract_plate(hw);
                if self.sensors.is_plate_retracted(hw) {
                    self.motors.close_door(hw);
                    if self.sensors.is_door_closed(hw) {
                        self.motors.stop_all(hw);
                    }
                }
            }
        }
    }

    fn latch_relay(&mut self, state: RelayState, sink: &mut impl EventSink) {
        if self.relay.set_state(state) {
            sink.emit(&StationEvent::RelayLatched(state));
        }
    }

    fn run_sequence(
        &mut self,
        procedure: Procedure,
        hw: &mut (impl DigitalIo + Clock),
        sink: &mut impl EventSink,
    ) {
        match self.config.sequence_mode {
            SequenceMode::Blocking => {
                sink.emit(&StationEvent::SequenceStarted(procedure));
                self.sequence.run_blocking(procedure, &mut self.motors, hw);
                sink.emit(&StationEvent::SequenceFinished(procedure));
            }
            SequenceMode::Stepped => {
                if let Some(prev) = self.sequence.active_procedure() {
                    sink.emit(&StationEvent::SequenceAborted(prev));
                }
                sink.emit(&StationEvent::SequenceStarted(procedure));
                let now = hw.now_ms();
                self.sequence.start(procedure, now, &mut self.motors, hw);
            }
        }
    }
}
