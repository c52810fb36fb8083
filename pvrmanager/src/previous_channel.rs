//! Two-slot "previous channel" history.
//!
//! Two independent updates act on the same pair of slots:
//!
//! - [`PreviousChannelTracker::record`] is fed with the channel currently on
//!   screen. A channel is only committed to the history once it has stayed
//!   on screen for the channel entry timeout, so zapping through channels
//!   does not pollute the history.
//! - [`PreviousChannelTracker::previous`] flips the "most recent" slot and
//!   returns the channel to jump back to.

use std::time::{Duration, Instant};

/// Value of an empty slot.
pub const NO_CHANNEL: i32 = -1;

#[derive(Clone, Debug)]
pub struct PreviousChannelTracker {
    slots: [i32; 2],
    index: usize,
    last_channel: i32,
    last_changed: Option<Instant>,
    entry_timeout: Duration,
}

impl Default for PreviousChannelTracker {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl PreviousChannelTracker {
    pub fn new(entry_timeout: Duration) -> Self {
        Self {
            slots: [NO_CHANNEL, NO_CHANNEL],
            index: 0,
            last_channel: 0,
            last_changed: None,
            entry_timeout,
        }
    }

    /// Forgets the history, keeping the entry timeout.
    pub fn reset(&mut self) {
        *self = Self::new(self.entry_timeout);
    }

    pub fn set_entry_timeout(&mut self, entry_timeout: Duration) {
        self.entry_timeout = entry_timeout;
    }

    pub fn slots(&self) -> [i32; 2] {
        self.slots
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Toggles the history for the channel `current` and returns the channel
    /// to go back to ([`NO_CHANNEL`] if none).
    pub fn previous(&mut self, current: i32) -> i32 {
        if (self.slots[self.index ^ 1] == current || current != self.slots[0])
            && current != self.slots[1]
        {
            self.index ^= 1;
        }
        self.slots[self.index ^ 1]
    }

    /// Feeds the channel currently displayed at `now`. Returns true when the
    /// channel was committed to the history.
    pub fn record(&mut self, channel: i32, now: Instant) -> bool {
        if channel != self.last_channel {
            self.last_channel = channel;
            self.last_changed = Some(now);
        }

        let Some(changed) = self.last_changed else {
            return false;
        };

        if now.saturating_duration_since(changed) >= self.entry_timeout
            && self.last_channel != self.slots[self.index]
        {
            self.index ^= 1;
            self.slots[self.index] = self.last_channel;
            return true;
        }

        false
    }
}
