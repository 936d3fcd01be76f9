//! Door and landing-plate motor driver (two H-bridge channels).
//!
//! Each channel is a direction line plus an active-low enable line.
//! `drive` writes direction first, then asserts enable; `stop` releases
//! enable and leaves direction as it was.
//!
//! ## Safety contract
//!
//! Disabled is the safe default for both channels.  There is no
//! interlock between the two channels here: the door and the plate may
//! both run at once.  Sensor-gated preconditions live in the command
//! router; this driver is a dumb actuator.

use log::debug;

use crate::app::ports::{DigitalIo, Level, OutputLine};

/// The two independently driven motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorChannel {
    Door,
    Plate,
}

impl MotorChannel {
    pub const ALL: [MotorChannel; 2] = [Self::Door, Self::Plate];

    fn direction_line(self) -> OutputLine {
        match self {
            Self::Door => OutputLine::DoorDirection,
            Self::Plate => OutputLine::PlateDirection,
        }
    }

    fn enable_line(self) -> OutputLine {
        match self {
            Self::Door => OutputLine::DoorEnable,
            Self::Plate => OutputLine::PlateEnable,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Door => 0,
            Self::Plate => 1,
        }
    }
}

/// Motor direction.  Forward opens the door / extends the plate;
/// Reverse closes the door / retracts the plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Direction line level: LOW = forward, HIGH = reverse.
    pub fn level(self) -> Level {
        match self {
            Self::Forward => Level::Low,
            Self::Reverse => Level::High,
        }
    }
}

/// Enable line level that runs the motor.
pub const ENABLE_ACTIVE: Level = Level::Low;
/// Enable line level that stops the motor.
pub const ENABLE_INACTIVE: Level = Level::High;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running(Direction),
}

/// Last-commanded state of both motor channels.
///
/// Holds no pins; every operation writes through the [`DigitalIo`]
/// port it is handed.
pub struct MotorActuator {
    states: [MotorState; 2],
}

impl Default for MotorActuator {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorActuator {
    pub fn new() -> Self {
        Self {
            states: [MotorState::Stopped; 2],
        }
    }

    /// Set direction, then enable.  Re-driving a running channel simply
    /// re-asserts the direction.
    pub fn drive(&mut self, io: &mut impl DigitalIo, channel: MotorChannel, dir: Direction) {
        io.write_line(channel.direction_line(), dir.level());
        io.write_line(channel.enable_line(), ENABLE_ACTIVE);
        self.states[channel.index()] = MotorState::Running(dir);
        debug!("motor {:?}: running {:?}", channel, dir);
    }

    /// Release the enable line.  Direction is left untouched.
    pub fn stop(&mut self, io: &mut impl DigitalIo, channel: MotorChannel) {
        io.write_line(channel.enable_line(), ENABLE_INACTIVE);
        self.states[channel.index()] = MotorState::Stopped;
        debug!("motor {:?}: stopped", channel);
    }

    pub fn stop_all(&mut self, io: &mut impl DigitalIo) {
        for channel in MotorChannel::ALL {
            self.stop(io, channel);
        }
    }

    pub fn open_door(&mut self, io: &mut impl DigitalIo) {
        self.drive(io, MotorChannel::Door, Direction::Forward);
    }

    pub fn close_door(&mut self, io: &mut impl DigitalIo) {
        self.drive(io, MotorChannel::Door, Direction::Reverse);
    }

    pub fn extend_plate(&mut self, io: &mut impl DigitalIo) {
        self.drive(io, MotorChannel::Plate, Direction::Forward);
    }

    pub fn retract_plate(&mut self, io: &mut impl DigitalIo) {
        self.drive(io, MotorChannel::Plate, Direction::Reverse);
    }

    pub fn state(&self, channel: MotorChannel) -> MotorState {
        self.states[channel.index()]
    }

    pub fn is_running(&self, channel: MotorChannel) -> bool {
        !matches!(self.state(channel), MotorState::Stopped)
    }
}
