//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ StationService (domain)
//! ```
//!
//! The control core sees the station through four primitives only:
//! digital pins ([`DigitalIo`]), time ([`Clock`]), byte-oriented command
//! links ([`CommandLink`]) and an event sink ([`EventSink`]).  Every port
//! is infallible from the domain's point of view; adapters log and absorb
//! their own failures so that a broken pin or socket degrades to
//! "no motion" instead of stalling the loop.

// ───────────────────────────────────────────────────────────────
// Pin vocabulary
// ───────────────────────────────────────────────────────────────

/// Electrical level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_low(self) -> bool {
        self == Self::Low
    }
}

/// Every output line the core drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputLine {
    DoorDirection,
    DoorEnable,
    PlateDirection,
    PlateEnable,
    PowerRelay,
}

/// Every input line the core samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputLine {
    /// Active-low: LOW = door fully closed.
    DoorClosedSensor,
    /// Active-low: LOW = plate fully retracted.
    PlateRetractedSensor,
}

// ───────────────────────────────────────────────────────────────
// Digital I/O port (driven adapter: domain ↔ GPIO)
// ───────────────────────────────────────────────────────────────

/// Raw pin access.  The actuator, relay and sensor components are the
/// only callers; nothing else in the core touches lines directly.
pub trait DigitalIo {
    /// Drive an output line to `level`.
    fn write_line(&mut self, line: OutputLine, level: Level);

    /// Take one immediate sample of an input line.
    fn read_line(&mut self, line: InputLine) -> Level;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain → timer)
// ───────────────────────────────────────────────────────────────

/// Monotonic time and synchronous delay.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the caller for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Command link port (driven adapter: network ↔ domain)
// ───────────────────────────────────────────────────────────────

/// One byte-oriented command channel (TCP socket, WebSocket, serial...).
pub trait CommandLink {
    /// Whether a client is currently attached.
    fn is_connected(&mut self) -> bool;

    /// Take one waiting command byte, if any.  Never blocks.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue one reply byte for the attached client.
    fn write_byte(&mut self, byte: u8);

    /// Drop any reply bytes that were queued but not yet sent.
    fn discard_pending_output(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`StationEvent`](super::events::StationEvent)s
/// through this port.  Adapters decide where they go (serial log, a
/// telemetry socket, a test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::StationEvent);
}
