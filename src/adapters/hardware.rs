//! Hardware adapter — bridges real pins to the domain port traits.
//!
//! Generic over `embedded-hal` 1.0 [`OutputPin`], [`InputPin`] and
//! [`DelayNs`], so the same adapter runs on ESP-IDF `PinDriver`s and on
//! host-side fakes.  This is the only module that touches actual GPIO.
//!
//! Pin failures never reach the domain: a failed write is logged and
//! skipped, and a failed sensor read reports HIGH ("not at endpoint"),
//! so sensor-gated commands fall back to "no motion".

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{Clock, DigitalIo, InputLine, Level, OutputLine};
use crate::error::{ActuatorError, Error, SensorError};

use super::time::MonotonicClock;

/// Every pin the station drives or samples.
pub struct StationPins<O, I> {
    pub door_direction: O,
    pub door_enable: O,
    pub plate_direction: O,
    pub plate_enable: O,
    pub power_relay: O,
    pub door_sensor: I,
    pub plate_sensor: I,
}

/// Concrete adapter that puts the station pins and a delay source
/// behind [`DigitalIo`] and [`Clock`].
pub struct GpioAdapter<O, I, D> {
    pins: StationPins<O, I>,
    delay: D,
    clock: MonotonicClock,
}

impl<O, I, D> GpioAdapter<O, I, D>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    pub fn new(pins: StationPins<O, I>, delay: D) -> Self {
        Self {
            pins,
            delay,
            clock: MonotonicClock::new(),
        }
    }

    pub fn pins(&self) -> &StationPins<O, I> {
        &self.pins
    }

    fn output(&mut self, line: OutputLine) -> &mut O {
        match line {
            OutputLine::DoorDirection => &mut self.pins.door_direction,
            OutputLine::DoorEnable => &mut self.pins.door_enable,
            OutputLine::PlateDirection => &mut self.pins.plate_direction,
            OutputLine::PlateEnable => &mut self.pins.plate_enable,
            OutputLine::PowerRelay => &mut self.pins.power_relay,
        }
    }

    fn input(&mut self, line: InputLine) -> &mut I {
        match line {
            InputLine::DoorClosedSensor => &mut self.pins.door_sensor,
            InputLine::PlateRetractedSensor => &mut self.pins.plate_sensor,
        }
    }
}

// ── DigitalIo implementation ──────────────────────────────────

impl<O, I, D> DigitalIo for GpioAdapter<O, I, D>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    fn write_line(&mut self, line: OutputLine, level: Level) {
        let pin = self.output(line);
        let result = match level {
            Level::Low => pin.set_low(),
            Level::High => pin.set_high(),
        };
        if let Err(e) = result {
            warn!(
                "{:?} -> {:?}: {} ({:?})",
                line,
                level,
                Error::from(ActuatorError::GpioWriteFailed),
                e
            );
        }
    }

    fn read_line(&mut self, line: InputLine) -> Level {
        match self.input(line).is_low() {
            Ok(true) => Level::Low,
            Ok(false) => Level::High,
            Err(e) => {
                warn!(
                    "{:?}: {} ({:?}), assuming not at endpoint",
                    line,
                    Error::from(SensorError::GpioReadFailed),
                    e
                );
                Level::High
            }
        }
    }
}

// ── Clock implementation ──────────────────────────────────────

impl<O, I, D> Clock for GpioAdapter<O, I, D>
where
    O: OutputPin,
    I: InputPin,
    D: DelayNs,
{
    fn now_ms(&self) -> u64 {
        self.clock.uptime_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
