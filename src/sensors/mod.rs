//! Position sensors — door-closed and plate-retracted photo interrupters.
//!
//! Both sensors are active-low and sit at one end of travel only: there
//! is no "fully open" or "fully extended" sensor, so those positions are
//! never observable.  Every query is one immediate sample with no
//! debouncing, filtering or hysteresis.

use crate::app::ports::{DigitalIo, InputLine};

/// Both sensors sampled back to back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub door_closed: bool,
    pub plate_retracted: bool,
}

/// Stateless reader over the two sensor lines.
#[derive(Debug, Default)]
pub struct SensorMonitor;

impl SensorMonitor {
    pub fn new() -> Self {
        Self
    }

    pub fn is_door_closed(&self, io: &mut impl DigitalIo) -> bool {
        io.read_line(InputLine::DoorClosedSensor).is_low()
    }

    pub fn is_plate_retracted(&self, io: &mut impl DigitalIo) -> bool {
        io.read_line(InputLine::PlateRetractedSensor).is_low()
    }

    pub fn snapshot(&self, io: &mut impl DigitalIo) -> PositionSnapshot {
        PositionSnapshot {
            door_closed: self.is_door_closed(io),
            plate_retracted: self.is_plate_retracted(io),
        }
    }
}
