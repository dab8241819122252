//! Output events for audio, UI and effects.
//!
//! The simulation appends these to a per-frame buffer; the bevy plugin
//! forwards them as [`SimEvent`] bevy events.

use bevy::math::IVec2;
use bevy::prelude::Event;
use serde::Serialize;

use crate::monster::{MonsterId, Species};
use crate::rigidbody::Facing;
use crate::skill::{SkillBonus, SkillType};

#[derive(Event, Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    ComboChanged {
        combo: u32,
    },
    SkillLearned {
        slot: usize,
        skill: SkillType,
        power: i32,
        /// Classification after learning; `None` until the hand is full
        bonus: SkillBonus,
    },
    SkillDiscarded {
        skill: SkillType,
        power: i32,
    },
    SkillCast {
        skill: SkillType,
        power: i32,
        bonus: SkillBonus,
    },
    MonsterSpawned {
        id: MonsterId,
        species: Species,
        side: Facing,
    },
    MonsterDamaged {
        id: MonsterId,
        species: Species,
        position: IVec2,
        amount: i32,
        hp: i32,
    },
    MonsterDied {
        id: MonsterId,
        species: Species,
        position: IVec2,
    },
    /// Emitted once per monster by the container removal pass
    MonsterRemoved {
        id: MonsterId,
        species: Species,
        position: IVec2,
    },
    CharacterDamaged {
        position: IVec2,
        lost: SkillType,
    },
    CharacterDied {
        position: IVec2,
    },
    EpochStarted {
        epoch: i64,
        entries: usize,
    },
    ItemDropped {
        position: IVec2,
        skill: SkillType,
    },
}
