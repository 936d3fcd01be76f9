//! Station configuration parameters
//!
//! Deployment choices for the dock station: which command-router variant
//! runs, how the takeoff/landing sequences execute, and the network ports
//! of each command channel.
//!
//! Mechanism transit times are **not** configuration.  They are fixed by
//! the mechanics and exported as constants below.

use serde::{Deserialize, Serialize};

use crate::app::commands::ChannelId;

/// Time for the door to travel fully open or fully closed (ms).
pub const DOOR_TRANSIT_MS: u32 = 25_000;

/// Time for the landing plate to travel fully out or fully in (ms).
pub const PLATE_TRANSIT_MS: u32 = 45_000;

/// Which command-router design is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterVariant {
    /// One browser channel with sensor-gated commands.
    SingleChannel,
    /// Machine (acknowledged) and browser channels, no preconditions.
    DualChannel,
}

/// How takeoff/landing sequences are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceMode {
    /// Each leg blocks the control loop for its full dwell.
    Blocking,
    /// Legs advance on elapsed time, one check per loop tick.
    Stepped,
}

/// Core station configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- Command routing ---
    /// Router design in effect.
    pub variant: RouterVariant,
    /// Sequence execution mode.
    pub sequence_mode: SequenceMode,

    // --- Network ---
    /// TCP port of the machine (ROS) channel.
    pub machine_port: u16,
    /// TCP port of the human (browser) channel.
    pub human_port: u16,

    // --- Timing ---
    /// Idle sleep between control-loop iterations (milliseconds)
    pub loop_interval_ms: u32,
    /// Telemetry report interval (milliseconds)
    pub telemetry_interval_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            variant: RouterVariant::DualChannel,
            sequence_mode: SequenceMode::Blocking,

            machine_port: 23,
            human_port: 80,

            loop_interval_ms: 10,        // 100 Hz polling
            telemetry_interval_ms: 60_000, // 1/min
        }
    }
}

/// Reasons a [`StationConfig`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// JSON could not be parsed into a config.
    Malformed,
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl StationConfig {
    /// TCP port a channel listens on.
    pub fn port(&self, channel: ChannelId) -> u16 {
        match channel {
            ChannelId::Machine => self.machine_port,
            ChannelId::Human => self.human_port,
        }
    }

    /// Parse a JSON override.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.machine_port == 0 || self.human_port == 0 {
            return Err(ConfigError::ValidationFailed("port must be non-zero"));
        }
        if self.variant == RouterVariant::DualChannel && self.machine_port == self.human_port {
            return Err(ConfigError::ValidationFailed(
                "machine and human ports must differ",
            ));
        }
        if self.loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop interval must be > 0"));
        }
        if self.telemetry_interval_ms < self.loop_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "telemetry interval shorter than loop interval",
            ));
        }
        Ok(())
    }
}
