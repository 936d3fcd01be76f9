//! Integration tests for the link → StationService → pins pipeline.
//!
//! These run on the host (x86_64) and drive whole control-loop ticks
//! through scripted links, checking the resulting pin levels, reply
//! bytes and events.

use dockstation::app::commands::{ChannelId, StationCommand};
use dockstation::app::events::StationEvent;
use dockstation::app::ports::{CommandLink, Level, OutputLine};
use dockstation::app::router::{self, Vocabulary};
use dockstation::app::service::{Dispatch, StationService};
use dockstation::config::{DOOR_TRANSIT_MS, PLATE_TRANSIT_MS, RouterVariant, SequenceMode, StationConfig};
use dockstation::drivers::relay::RelayState;
use dockstation::fsm::{Procedure, SequenceState};

use super::mock_hw::{HwCall, MockLink, MockStation, RecordingSink};

struct Rig {
    app: StationService,
    hw: MockStation,
    machine: MockLink,
    human: MockLink,
    sink: RecordingSink,
}

impl Rig {
    fn new(variant: RouterVariant, sequence_mode: SequenceMode) -> Self {
        let config = StationConfig {
            variant,
            sequence_mode,
            ..StationConfig::default()
        };
        let mut rig = Self {
            app: StationService::new(config),
            hw: MockStation::new(),
            machine: MockLink::connected(),
            human: MockLink::connected(),
            sink: RecordingSink::new(),
        };
        rig.app.start(&mut rig.hw, &mut rig.sink);
        rig
    }

    fn dual() -> Self {
        Self::new(RouterVariant::DualChannel, SequenceMode::Blocking)
    }

    fn single() -> Self {
        Self::new(RouterVariant::SingleChannel, SequenceMode::Blocking)
    }

    fn tick(&mut self) {
        let mut links = [
            (ChannelId::Machine, &mut self.machine as &mut dyn CommandLink),
            (ChannelId::Human, &mut self.human as &mut dyn CommandLink),
        ];
        self.app.tick(&mut self.hw, &mut links, &mut self.sink);
    }

    fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_motors_off_and_relay_de_energised() {
    let rig = Rig::dual();
    assert_eq!(rig.hw.level(OutputLine::DoorEnable), Some(Level::High));
    assert_eq!(rig.hw.level(OutputLine::PlateEnable), Some(Level::High));
    assert_eq!(rig.hw.level(OutputLine::PowerRelay), Some(Level::Low));
    assert!(matches!(rig.sink.events[0], StationEvent::Started { .. }));
}

#[test]
fn single_channel_start_also_de_energises_relay() {
    let rig = Rig::single();
    assert!(!rig.hw.relay_energized());
}

// ── Single-channel (gated human vocabulary) ───────────────────

#[test]
fn extend_waits_for_closed_door() {
    let mut rig = Rig::single();

    rig.human.send(b"B");
    rig.tick();
    assert!(rig.hw.door_running());
    assert_eq!(rig.hw.level(OutputLine::DoorDirection), Some(Level::Low));

    // Door reads open: extend is dropped.
    rig.human.send(b"A");
    rig.tick();
    assert!(!rig.hw.plate_running());
    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::CommandIgnored { .. })),
        1
    );

    rig.hw.door_sensor = Level::Low;
    rig.human.send(b"A");
    rig.tick();
    assert!(rig.hw.plate_running());
    assert_eq!(rig.hw.level(OutputLine::PlateDirection), Some(Level::Low));
}

#[test]
fn open_then_extend_waits_until_door_is_closed_again() {
    let mut rig = Rig::single();

    rig.human.send(b"B");
    rig.tick();
    assert!(rig.hw.door_running());

    rig.hw.clear_calls();
    rig.human.send(b"A");
    rig.tick();
    assert!(
        rig.hw
            .writes()
            .all(|(line, _)| line != OutputLine::PlateDirection && line != OutputLine::PlateEnable),
        "plate outputs must be untouched while the door reads open"
    );

    rig.hw.plate_sensor = Level::Low;
    rig.human.send(b"E");
    rig.tick();
    assert_eq!(rig.hw.level(OutputLine::DoorDirection), Some(Level::High));
    assert!(rig.hw.door_running());

    rig.hw.door_sensor = Level::Low;
    rig.human.send(b"A");
    rig.tick();
    assert_eq!(rig.hw.level(OutputLine::PlateDirection), Some(Level::Low));
    assert!(rig.hw.plate_running());
}

#[test]
fn close_waits_for_retracted_plate() {
    let mut rig = Rig::single();

    rig.human.send(b"E");
    rig.tick();
    assert!(!rig.hw.door_running());

    rig.hw.plate_sensor = Level::Low;
    rig.human.send(b"E");
    rig.tick();
    assert!(rig.hw.door_running());
    assert_eq!(rig.hw.level(OutputLine::DoorDirection), Some(Level::High));
}

#[test]
fn machine_channel_is_not_read_in_single_variant() {
    let mut rig = Rig::single();
    rig.machine.send(b"a");
    rig.tick_n(3);
    assert_eq!(rig.machine.inbound.len(), 1);
    assert!(!rig.hw.plate_running());
    assert_eq!(rig.machine.discards, 0);
}

#[test]
fn quick_take_off_extends_only_if_door_still_reads_closed() {
    let mut rig = Rig::single();
    rig.hw.plate_sensor = Level::Low;

    rig.human.send(b"G");
    rig.tick();
    assert!(rig.hw.door_running());
    assert!(!rig.hw.plate_running());

    rig.hw.door_sensor = Level::Low;
    rig.human.send(b"G");
    rig.tick();
    assert!(rig.hw.door_running());
    assert!(rig.hw.plate_running());
    assert_eq!(rig.hw.level(OutputLine::PlateDirection), Some(Level::Low));
}

#[test]
fn quick_take_off_needs_retracted_plate() {
    let mut rig = Rig::single();
    rig.human.send(b"G");
    rig.tick();
    assert!(!rig.hw.door_running());
    assert!(!rig.hw.plate_running());
}

#[test]
fn quick_landing_stops_everything_when_both_endpoints_read_reached() {
    let mut rig = Rig::single();
    rig.hw.plate_sensor = Level::Low;
    rig.hw.door_sensor = Level::Low;
    rig.hw.clear_calls();

    rig.human.send(b"H");
    rig.tick();

    let writes: Vec<_> = rig.hw.writes().collect();
    assert!(writes.contains(&(OutputLine::PlateDirection, Level::High)));
    assert!(writes.contains(&(OutputLine::DoorDirection, Level::High)));
    assert!(!rig.hw.door_running());
    assert!(!rig.hw.plate_running());
}

#[test]
fn quick_landing_only_retracts_while_plate_is_out() {
    let mut rig = Rig::single();
    rig.human.send(b"H");
    rig.tick();
    assert!(rig.hw.plate_running());
    assert_eq!(rig.hw.level(OutputLine::PlateDirection), Some(Level::High));
    assert!(!rig.hw.door_running());
}

#[test]
fn one_byte_per_tick() {
    let mut rig = Rig::single();
    rig.human.send(b"BD");
    rig.tick();
    assert!(rig.hw.door_running());
    assert!(!rig.hw.plate_running());
    rig.tick();
    assert!(rig.hw.plate_running());
}

// ── Dual-channel ──────────────────────────────────────────────

#[test]
fn machine_commands_are_acknowledged_in_order() {
    let mut rig = Rig::dual();
    rig.machine.send(b"acbd");
    rig.tick_n(4);
    assert_eq!(rig.machine.outbound, b"ACBD");
    assert!(rig.human.outbound.is_empty());
}

#[test]
fn ack_is_written_after_the_motor_moves() {
    let mut rig = Rig::dual();
    rig.machine.send(b"c");
    rig.tick();
    assert!(rig.hw.door_running());
    let executed = rig
        .sink
        .events
        .iter()
        .position(|e| matches!(e, StationEvent::CommandExecuted { command: StationCommand::OpenDoor, .. }));
    let acked = rig
        .sink
        .events
        .iter()
        .position(|e| matches!(e, StationEvent::Acknowledged { ack: b'C', .. }));
    assert!(executed < acked, "execute must precede ack");
}

#[test]
fn human_commands_are_ungated_and_silent() {
    let mut rig = Rig::dual();
    rig.human.send(b"A");
    rig.tick();
    assert!(rig.hw.plate_running());
    assert!(rig.human.outbound.is_empty());
}

#[test]
fn stop_all_from_machine_disables_both_motors() {
    let mut rig = Rig::dual();
    rig.machine.send(b"acg");
    rig.tick_n(3);
    assert!(!rig.hw.door_running());
    assert!(!rig.hw.plate_running());
    assert_eq!(rig.machine.outbound, b"ACG");
}

#[test]
fn unknown_machine_byte_changes_nothing_and_is_not_acked() {
    let mut rig = Rig::dual();
    rig.hw.clear_calls();
    let mut link = MockLink::connected();

    let d = rig.app.handle_byte(ChannelId::Machine, b'q', &mut rig.hw, &mut link, &mut rig.sink);

    assert_eq!(d, Dispatch::Unrecognized);
    assert!(rig.hw.calls.is_empty());
    assert!(link.outbound.is_empty());
    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::UnknownCommand { byte: b'q', .. })),
        1
    );
}

#[test]
fn vocabularies_are_case_sensitive() {
    let mut rig = Rig::dual();
    let mut link = MockLink::connected();
    assert_eq!(
        rig.app.handle_byte(ChannelId::Machine, b'A', &mut rig.hw, &mut link, &mut rig.sink),
        Dispatch::Unrecognized
    );
    assert_eq!(
        rig.app.handle_byte(ChannelId::Human, b'a', &mut rig.hw, &mut link, &mut rig.sink),
        Dispatch::Unrecognized
    );
}

// ── Relay ─────────────────────────────────────────────────────

#[test]
fn relay_state_is_reasserted_every_tick() {
    let mut rig = Rig::dual();
    rig.machine.send(b"e");
    rig.tick();
    assert!(rig.hw.relay_energized());
    assert_eq!(rig.machine.outbound, b"E");

    rig.hw.clear_calls();
    rig.tick_n(3);
    let relay_writes: Vec<_> = rig
        .hw
        .writes()
        .filter(|(line, _)| *line == OutputLine::PowerRelay)
        .collect();
    assert_eq!(relay_writes, vec![(OutputLine::PowerRelay, Level::High); 3]);

    rig.human.send(b"F");
    rig.tick();
    assert!(!rig.hw.relay_energized());
}

#[test]
fn repeated_relay_command_latches_once() {
    let mut rig = Rig::dual();
    rig.human.send(b"CC");
    rig.tick_n(2);
    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::RelayLatched(_))),
        1
    );
}

// ── Blocking sequences ────────────────────────────────────────

#[test]
fn blocking_take_off_opens_door_then_extends_plate() {
    let mut rig = Rig::dual();
    rig.hw.clear_calls();
    rig.machine.send(b"z");
    rig.tick();

    assert_eq!(rig.hw.delays(), vec![DOOR_TRANSIT_MS, PLATE_TRANSIT_MS]);
    assert_eq!(rig.hw.now, u64::from(DOOR_TRANSIT_MS + PLATE_TRANSIT_MS));

    let first_delay = rig.hw.calls.iter().position(|c| matches!(c, HwCall::Delay(_)));
    let plate_enable = rig
        .hw
        .calls
        .iter()
        .position(|c| *c == HwCall::Write(OutputLine::PlateEnable, Level::Low));
    assert!(plate_enable > first_delay, "plate must start after the door dwell");

    // Motors are left running at the end of the procedure.
    assert!(rig.hw.door_running());
    assert!(rig.hw.plate_running());
    assert_eq!(rig.machine.outbound, b"Z");
    assert_eq!(rig.app.sequence_state(), SequenceState::Done);
}

#[test]
fn blocking_landing_retracts_plate_then_closes_door() {
    let mut rig = Rig::dual();
    rig.hw.clear_calls();
    rig.machine.send(b"x");
    rig.tick();

    assert_eq!(rig.hw.delays(), vec![PLATE_TRANSIT_MS, DOOR_TRANSIT_MS]);
    assert_eq!(rig.hw.level(OutputLine::PlateDirection), Some(Level::High));
    assert_eq!(rig.hw.level(OutputLine::DoorDirection), Some(Level::High));
    assert_eq!(rig.machine.outbound, b"X");
}

#[test]
fn human_stop_is_only_seen_after_a_blocking_sequence() {
    let mut rig = Rig::dual();
    rig.machine.send(b"z");
    rig.human.send(b"I");
    rig.hw.clear_calls();
    rig.tick();

    let last_delay = rig
        .hw
        .calls
        .iter()
        .rposition(|c| matches!(c, HwCall::Delay(_)))
        .unwrap();
    let stop = rig
        .hw
        .calls
        .iter()
        .rposition(|c| *c == HwCall::Write(OutputLine::DoorEnable, Level::High))
        .unwrap();
    assert!(stop > last_delay);
    assert!(!rig.hw.door_running());
    assert!(!rig.hw.plate_running());
}

// ── Stepped sequences ─────────────────────────────────────────

#[test]
fn stepped_take_off_advances_across_ticks() {
    let mut rig = Rig::new(RouterVariant::DualChannel, SequenceMode::Stepped);
    rig.human.send(b"G");
    rig.tick();
    assert_eq!(rig.app.sequence_state(), SequenceState::DoorMoving { since_ms: 0 });
    assert!(rig.hw.door_running());
    assert!(!rig.hw.plate_running());
    assert!(rig.hw.delays().is_empty());

    rig.hw.now = u64::from(DOOR_TRANSIT_MS) - 1;
    rig.tick();
    assert!(!rig.hw.plate_running());

    rig.hw.now = u64::from(DOOR_TRANSIT_MS);
    rig.tick();
    assert_eq!(
        rig.app.sequence_state(),
        SequenceState::PlateMoving { since_ms: u64::from(DOOR_TRANSIT_MS) }
    );
    assert!(rig.hw.plate_running());

    rig.hw.now = u64::from(DOOR_TRANSIT_MS + PLATE_TRANSIT_MS);
    rig.tick();
    assert_eq!(rig.app.sequence_state(), SequenceState::Done);
    assert_eq!(
        rig.sink.count(|e| *e == StationEvent::SequenceFinished(Procedure::TakeOff)),
        1
    );
}

#[test]
fn stepped_sequence_keeps_reading_commands() {
    let mut rig = Rig::new(RouterVariant::DualChannel, SequenceMode::Stepped);
    rig.machine.send(b"z");
    rig.tick();
    assert_eq!(rig.machine.outbound, b"Z");

    rig.machine.send(b"e");
    rig.tick();
    assert!(rig.hw.relay_energized());
    assert!(matches!(rig.app.sequence_state(), SequenceState::DoorMoving { .. }));
}

#[test]
fn stop_all_aborts_stepped_sequence() {
    let mut rig = Rig::new(RouterVariant::DualChannel, SequenceMode::Stepped);
    rig.machine.send(b"z");
    rig.tick();
    rig.machine.send(b"g");
    rig.tick();

    assert_eq!(rig.app.sequence_state(), SequenceState::Idle);
    assert!(!rig.hw.door_running());
    assert_eq!(
        rig.sink.count(|e| *e == StationEvent::SequenceAborted(Procedure::TakeOff)),
        1
    );

    // Nothing resumes once the dwell would have elapsed.
    rig.hw.now = u64::from(DOOR_TRANSIT_MS);
    rig.tick();
    assert!(!rig.hw.plate_running());
}

#[test]
fn new_stepped_sequence_replaces_active_one() {
    let mut rig = Rig::new(RouterVariant::DualChannel, SequenceMode::Stepped);
    rig.machine.send(b"zx");
    rig.tick_n(2);
    assert!(matches!(rig.app.sequence_state(), SequenceState::PlateMoving { .. }));
    assert_eq!(rig.hw.level(OutputLine::PlateDirection), Some(Level::High));
    assert_eq!(
        rig.sink.count(|e| *e == StationEvent::SequenceAborted(Procedure::TakeOff)),
        1
    );
}

// ── Connection tracking ───────────────────────────────────────

#[test]
fn first_connection_discards_stale_output_once_per_channel() {
    let mut rig = Rig::dual();
    rig.machine.connected = false;
    rig.tick();
    assert_eq!(rig.machine.discards, 0);
    assert_eq!(rig.human.discards, 1);

    rig.machine.connected = true;
    rig.tick();
    assert_eq!(rig.machine.discards, 1);

    rig.machine.connected = false;
    rig.tick();
    rig.machine.connected = true;
    rig.tick_n(2);
    assert_eq!(rig.machine.discards, 1);
    assert_eq!(rig.human.discards, 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, StationEvent::ClientConnected(_))),
        2
    );
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_follows_configured_interval() {
    let config = StationConfig {
        telemetry_interval_ms: 1_000,
        ..StationConfig::default()
    };
    let mut hw = MockStation::new();
    let mut sink = RecordingSink::new();
    let mut app = StationService::new(config);
    app.start(&mut hw, &mut sink);

    let mut link = MockLink::default();
    let is_telemetry = |e: &StationEvent| matches!(e, StationEvent::Telemetry(_));

    hw.now = 999;
    app.tick(&mut hw, &mut [(ChannelId::Machine, &mut link as &mut dyn CommandLink)], &mut sink);
    assert_eq!(sink.count(is_telemetry), 0);

    hw.now = 1_000;
    app.tick(&mut hw, &mut [(ChannelId::Machine, &mut link as &mut dyn CommandLink)], &mut sink);
    assert_eq!(sink.count(is_telemetry), 1);
}

// ── Per-byte output table ─────────────────────────────────────

use StationCommand as C;

const TAKE_OFF: StationCommand = C::Sequence(Procedure::TakeOff);
const LANDING: StationCommand = C::Sequence(Procedure::Landing);

/// Every recognised byte of every vocabulary and the command it names.
const BYTE_TABLE: &[(Vocabulary, u8, StationCommand)] = &[
    (Vocabulary::GatedHuman, b'A', C::ExtendPlate),
    (Vocabulary::GatedHuman, b'D', C::RetractPlate),
    (Vocabulary::GatedHuman, b'B', C::OpenDoor),
    (Vocabulary::GatedHuman, b'E', C::CloseDoor),
    (Vocabulary::GatedHuman, b'G', C::QuickTakeOff),
    (Vocabulary::GatedHuman, b'H', C::QuickLanding),
    (Vocabulary::GatedHuman, b'I', C::StopAll),
    (Vocabulary::Machine, b'a', C::ExtendPlate),
    (Vocabulary::Machine, b'b', C::RetractPlate),
    (Vocabulary::Machine, b'c', C::OpenDoor),
    (Vocabulary::Machine, b'd', C::CloseDoor),
    (Vocabulary::Machine, b'e', C::RelayOn),
    (Vocabulary::Machine, b'f', C::RelayOff),
    (Vocabulary::Machine, b'z', TAKE_OFF),
    (Vocabulary::Machine, b'x', LANDING),
    (Vocabulary::Machine, b'g', C::StopAll),
    (Vocabulary::Human, b'A', C::ExtendPlate),
    (Vocabulary::Human, b'D', C::RetractPlate),
    (Vocabulary::Human, b'B', C::OpenDoor),
    (Vocabulary::Human, b'E', C::CloseDoor),
    (Vocabulary::Human, b'C', C::RelayOn),
    (Vocabulary::Human, b'F', C::RelayOff),
    (Vocabulary::Human, b'G', TAKE_OFF),
    (Vocabulary::Human, b'H', LANDING),
    (Vocabulary::Human, b'I', C::StopAll),
];

const OPEN: [(OutputLine, Level); 2] = [
    (OutputLine::DoorDirection, Level::Low),
    (OutputLine::DoorEnable, Level::Low),
];
const CLOSE: [(OutputLine, Level); 2] = [
    (OutputLine::DoorDirection, Level::High),
    (OutputLine::DoorEnable, Level::Low),
];
const EXTEND: [(OutputLine, Level); 2] = [
    (OutputLine::PlateDirection, Level::Low),
    (OutputLine::PlateEnable, Level::Low),
];
const RETRACT: [(OutputLine, Level); 2] = [
    (OutputLine::PlateDirection, Level::High),
    (OutputLine::PlateEnable, Level::Low),
];
const STOP: [(OutputLine, Level); 2] = [
    (OutputLine::DoorEnable, Level::High),
    (OutputLine::PlateEnable, Level::High),
];

/// Pin writes one command makes with both endpoint sensors reached.
fn expected_writes(command: StationCommand) -> Vec<(OutputLine, Level)> {
    match command {
        C::ExtendPlate => EXTEND.to_vec(),
        C::RetractPlate => RETRACT.to_vec(),
        C::OpenDoor => OPEN.to_vec(),
        C::CloseDoor => CLOSE.to_vec(),
        C::StopAll => STOP.to_vec(),
        C::RelayOn | C::RelayOff => Vec::new(),
        C::Sequence(Procedure::TakeOff) | C::QuickTakeOff => [OPEN, EXTEND].concat(),
        C::Sequence(Procedure::Landing) => [RETRACT, CLOSE].concat(),
        C::QuickLanding => [RETRACT, CLOSE, STOP].concat(),
    }
}

fn rig_for(vocabulary: Vocabulary) -> (Rig, ChannelId) {
    match vocabulary {
        Vocabulary::GatedHuman => (Rig::single(), ChannelId::Human),
        Vocabulary::Machine => (Rig::dual(), ChannelId::Machine),
        Vocabulary::Human => (Rig::dual(), ChannelId::Human),
    }
}

#[test]
fn byte_table_matches_router() {
    for vocabulary in [Vocabulary::GatedHuman, Vocabulary::Machine, Vocabulary::Human] {
        let listed = BYTE_TABLE.iter().filter(|(v, ..)| *v == vocabulary).count();
        assert_eq!(router::routes(vocabulary).count(), listed, "{vocabulary:?}");
    }
    for &(vocabulary, byte, command) in BYTE_TABLE {
        let route = router::resolve(vocabulary, byte).expect("byte is routed");
        assert_eq!(route.command, command, "{vocabulary:?} {:?}", char::from(byte));
    }
}

#[test]
fn every_recognised_byte_drives_its_exact_outputs() {
    for &(vocabulary, byte, command) in BYTE_TABLE {
        let (mut rig, channel) = rig_for(vocabulary);
        rig.hw.door_sensor = Level::Low;
        rig.hw.plate_sensor = Level::Low;
        rig.hw.clear_calls();
        let mut link = MockLink::connected();

        let d = rig.app.handle_byte(channel, byte, &mut rig.hw, &mut link, &mut rig.sink);

        let label = format!("{vocabulary:?} {:?}", char::from(byte));
        assert_eq!(d, Dispatch::Executed(command), "{label}");
        let writes: Vec<_> = rig.hw.writes().collect();
        assert_eq!(writes, expected_writes(command), "{label}");

        let ack: Vec<u8> = match vocabulary {
            Vocabulary::Machine => vec![byte.to_ascii_uppercase()],
            Vocabulary::GatedHuman | Vocabulary::Human => Vec::new(),
        };
        assert_eq!(link.outbound, ack, "{label}");

        match command {
            C::RelayOn => assert_eq!(rig.app.relay_state(), RelayState::Energized, "{label}"),
            C::RelayOff => assert_eq!(rig.app.relay_state(), RelayState::DeEnergized, "{label}"),
            _ => {}
        }
    }
}
