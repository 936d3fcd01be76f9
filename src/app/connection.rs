//! First-connection detection per command channel.
//!
//! The flag for a channel latches the first time a client is seen and is
//! never cleared: there is no disconnect detection and no reset on
//! reconnection.

use super::commands::ChannelId;

#[derive(Debug, Default)]
pub struct ConnectionTracker {
    seen: [bool; 2],
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the link status for `channel`.  Returns `true` exactly once
    /// per channel: on the first call where `connected` is true.
    pub fn observe(&mut self, channel: ChannelId, connected: bool) -> bool {
        let seen = &mut self.seen[channel.index()];
        if connected && !*seen {
            *seen = true;
            true
        } else {
            false
        }
    }

    pub fn has_connected(&self, channel: ChannelId) -> bool {
        self.seen[channel.index()]
    }
}
