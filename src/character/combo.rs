//! Decaying hit-streak counter.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::constants::COMBO_WINDOW_MS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboTracker {
    count: u32,
    expires_at: Millis,
    best: u32,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn expires_at(&self) -> Millis {
        self.expires_at
    }

    /// Longest streak so far
    pub fn best(&self) -> u32 {
        self.best
    }

    /// Count an accepted hit and extend the window
    pub fn add(&mut self, now: Millis) -> u32 {
        self.count += 1;
        self.best = self.best.max(self.count);
        self.expires_at = now + COMBO_WINDOW_MS;
        self.count
    }

    /// Start-of-frame expiry check; returns whether the streak was dropped
    pub fn frame_start(&mut self, now: Millis) -> bool {
        if now > self.expires_at && self.count > 0 {
            self.count = 0;
            return true;
        }
        false
    }

    pub fn reset(&mut self) -> bool {
        std::mem::take(&mut self.count) > 0
    }
}
