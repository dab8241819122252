//! Input snapshot handed to the simulation each frame.
//!
//! Keys are packed into bitfields: one for keys currently held (level
//! sensed) and one for keys that went down this frame (edge sensed).
//! Device polling lives outside the core; `InputTracker` derives the edge
//! bits from consecutive held sets for drivers that only know "held".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Jump,
    CastSkill,
    DiscardSkill,
    Pause,
    Resume,
}

impl Key {
    pub const ALL: [Key; 7] = [
        Key::Left,
        Key::Right,
        Key::Jump,
        Key::CastSkill,
        Key::DiscardSkill,
        Key::Pause,
        Key::Resume,
    ];

    #[inline]
    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    held: u8,
    just_pressed: u8,
}

impl InputSnapshot {
    pub const fn new() -> Self {
        Self {
            held: 0,
            just_pressed: 0,
        }
    }

    /// Mark a key as held; `edge` also marks it as pressed this frame
    pub fn with(mut self, key: Key, edge: bool) -> Self {
        self.held |= key.bit();
        if edge {
            self.just_pressed |= key.bit();
        }
        self
    }

    #[inline]
    pub const fn is_held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    #[inline]
    pub const fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed & key.bit() != 0
    }

    /// Horizontal intent from held keys: -1, 0 or 1
    pub fn horizontal(&self) -> i32 {
        match (self.is_held(Key::Left), self.is_held(Key::Right)) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// Builds snapshots from a stream of "currently held" key sets
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    previous: u8,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&mut self, held: &[Key]) -> InputSnapshot {
        let bits = held.iter().fold(0u8, |acc, key| acc | key.bit());
        let snapshot = InputSnapshot {
            held: bits,
            just_pressed: bits & !self.previous,
        };
        self.previous = bits;
        snapshot
    }
}
