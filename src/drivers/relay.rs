//! Wireless-power relay latch.
//!
//! The relay is level-driven: [`PowerRelayLatch::set_state`] only
//! changes the in-memory flag, and [`PowerRelayLatch::apply`] writes the
//! coil from that flag.  The control loop calls `apply` on every tick,
//! so an output forced by a glitch is corrected within one iteration.

use crate::app::ports::{DigitalIo, Level, OutputLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Energized,
    DeEnergized,
}

impl RelayState {
    /// Coil level: HIGH energises the relay.
    pub fn level(self) -> Level {
        match self {
            Self::Energized => Level::High,
            Self::DeEnergized => Level::Low,
        }
    }
}

pub struct PowerRelayLatch {
    state: RelayState,
}

impl Default for PowerRelayLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerRelayLatch {
    /// New latch, de-energised.
    pub fn new() -> Self {
        Self {
            state: RelayState::DeEnergized,
        }
    }

    /// Latch a new state.  Returns `true` if the flag changed.
    pub fn set_state(&mut self, state: RelayState) -> bool {
        let changed = self.state != state;
        self.state = state;
        changed
    }

    /// Write the coil output from the latched flag.
    pub fn apply(&self, io: &mut impl DigitalIo) {
        io.write_line(OutputLine::PowerRelay, self.state.level());
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    pub fn is_energized(&self) -> bool {
        self.state == RelayState::Energized
    }
}
