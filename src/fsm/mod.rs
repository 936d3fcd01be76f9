//! Takeoff / landing sequence state machine.
//!
//! Each procedure is two motor legs with a fixed dwell after each:
//!
//! ```text
//! ┌──────────┬─────────────────────────┬─────────────────────────┐
//! │ Procedure│ Leg 0                   │ Leg 1                   │
//! ├──────────┼─────────────────────────┼─────────────────────────┤
//! │ TakeOff  │ Door  Forward  25 000ms │ Plate Forward  45 000ms │
//! │ Landing  │ Plate Reverse  45 000ms │ Door  Reverse  25 000ms │
//! └──────────┴─────────────────────────┴─────────────────────────┘
//!
//!   Idle ──start──▶ DoorMoving / PlateMoving ──dwell──▶ (next leg) ──dwell──▶ Done
//! ```
//!
//! Completion is inferred from elapsed time only; no sensor is consulted.
//! Motors are left running at the end of a procedure.
//!
//! Two drivers share the same state: [`SequenceOrchestrator::run_blocking`]
//! sleeps through both dwells in one call, while
//! [`SequenceOrchestrator::start`] + [`SequenceOrchestrator::poll`] advance
//! one check per control-loop tick.

use log::debug;

use crate::app::ports::{Clock, DigitalIo};
use crate::config::{DOOR_TRANSIT_MS, PLATE_TRANSIT_MS};
use crate::drivers::motor::{Direction, MotorActuator, MotorChannel};

// ---------------------------------------------------------------------------
// Procedures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    /// Open the door, then extend the plate.
    TakeOff,
    /// Retract the plate, then close the door.
    Landing,
}

/// One motor movement followed by a fixed dwell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub channel: MotorChannel,
    pub direction: Direction,
    pub dwell_ms: u32,
}

const DOOR_OPEN: Leg = Leg {
    channel: MotorChannel::Door,
    direction: Direction::Forward,
    dwell_ms: DOOR_TRANSIT_MS,
};
const PLATE_EXTEND: Leg = Leg {
    channel: MotorChannel::Plate,
    direction: Direction::Forward,
    dwell_ms: PLATE_TRANSIT_MS,
};
const PLATE_RETRACT: Leg = Leg {
    channel: MotorChannel::Plate,
    direction: Direction::Reverse,
    dwell_ms: PLATE_TRANSIT_MS,
};
const DOOR_CLOSE: Leg = Leg {
    channel: MotorChannel::Door,
    direction: Direction::Reverse,
    dwell_ms: DOOR_TRANSIT_MS,
};

impl Procedure {
    pub const fn legs(self) -> [Leg; 2] {
        match self {
            Self::TakeOff => [DOOR_OPEN, PLATE_EXTEND],
            Self::Landing => [PLATE_RETRACT, DOOR_CLOSE],
        }
    }

    /// Sum of both dwells.
    pub const fn total_ms(self) -> u32 {
        let [a, b] = self.legs();
        a.dwell_ms + b.dwell_ms
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    Idle,
    DoorMoving { since_ms: u64 },
    PlateMoving { since_ms: u64 },
    Done,
}

impl SequenceState {
    fn moving(channel: MotorChannel, since_ms: u64) -> Self {
        match channel {
            MotorChannel::Door => Self::DoorMoving { since_ms },
            MotorChannel::Plate => Self::PlateMoving { since_ms },
        }
    }

    fn since_ms(self) -> Option<u64> {
        match self {
            Self::DoorMoving { since_ms } | Self::PlateMoving { since_ms } => Some(since_ms),
            Self::Idle | Self::Done => None,
        }
    }
}

/// What a [`SequenceOrchestrator::poll`] call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceProgress {
    /// The first leg's dwell elapsed and the second leg started.
    LegStarted(Procedure, SequenceState),
    /// The second leg's dwell elapsed.
    Finished(Procedure),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct SequenceOrchestrator {
    procedure: Option<Procedure>,
    leg: usize,
    state: SequenceState,
}

impl Default for SequenceOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequenceOrchestrator {
    pub fn new() -> Self {
        Self {
            procedure: None,
            leg: 0,
            state: SequenceState::Idle,
        }
    }

    /// Run a whole procedure, blocking through both dwells.
    ///
    /// Nothing else runs while this executes: no command is read, no
    /// relay re-assertion happens, and there is no way to cancel.
    pub fn run_blocking(
        &mut self,
        procedure: Procedure,
        motors: &mut MotorActuator,
        hw: &mut (impl DigitalIo + Clock),
    ) {
        self.procedure = Some(procedure);
        for (idx, leg) in procedure.legs().into_iter().enumerate() {
            self.begin_leg(idx, leg, hw.now_ms(), motors, hw);
            hw.delay_ms(leg.dwell_ms);
        }
        self.finish();
    }

    /// Begin a procedure without blocking.  Any active procedure is
    /// replaced; its motors keep whatever the new first leg leaves them.
    pub fn start(
        &mut self,
        procedure: Procedure,
        now_ms: u64,
        motors: &mut MotorActuator,
        io: &mut impl DigitalIo,
    ) {
        self.procedure = Some(procedure);
        let [first, _] = procedure.legs();
        self.begin_leg(0, first, now_ms, motors, io);
    }

    /// Advance a stepped procedure if the current leg's dwell has elapsed.
    pub fn poll(
        &mut self,
        now_ms: u64,
        motors: &mut MotorActuator,
        io: &mut impl DigitalIo,
    ) -> Option<SequenceProgress> {
        let procedure = self.procedure?;
        let since = self.state.since_ms()?;
        let legs = procedure.legs();
        if now_ms.saturating_sub(since) < u64::from(legs[self.leg].dwell_ms) {
            return None;
        }

        if self.leg + 1 < legs.len() {
            let next = self.leg + 1;
            self.begin_leg(next, legs[next], now_ms, motors, io);
            Some(SequenceProgress::LegStarted(procedure, self.state))
        } else {
            self.finish();
            Some(SequenceProgress::Finished(procedure))
        }
    }

    /// Drop the active procedure.  Motors are not touched; the caller
    /// decides what to drive next.  Returns the procedure that was cut.
    pub fn abort(&mut self) -> Option<Procedure> {
        let cut = self.active_procedure()?;
        self.state = SequenceState::Idle;
        self.procedure = None;
        self.leg = 0;
        Some(cut)
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.since_ms().is_some()
    }

    /// The procedure currently moving, if any.
    pub fn active_procedure(&self) -> Option<Procedure> {
        if self.is_active() { self.procedure } else { None }
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn begin_leg(
        &mut self,
        idx: usize,
        leg: Leg,
        now_ms: u64,
        motors: &mut MotorActuator,
        io: &mut impl DigitalIo,
    ) {
        motors.drive(io, leg.channel, leg.direction);
        self.leg = idx;
        self.state = SequenceState::moving(leg.channel, now_ms);
        debug!(
            "SEQ: {:?} leg {} -> {:?} {:?} for {}ms",
            self.procedure, idx, leg.channel, leg.direction, leg.dwell_ms
        );
    }

    fn finish(&mut self) {
        self.state = SequenceState::Done;
    }
}
