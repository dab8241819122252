//! Skill slots: the character's four-card hand.
//!
//! Slots fill left to right and are kept contiguous, so the lowest slot is
//! empty exactly when the hand is empty. Filling the fourth slot classifies
//! the hand (see [`bonus`]); any change that leaves it incomplete clears
//! the classification.

use serde::{Deserialize, Serialize};

use crate::clock::Millis;
use crate::constants::{MAX_SKILL_POWER, MIN_SKILL_POWER, SKILL_SLOT_COUNT};

pub mod bonus;

pub use bonus::{calculate_skill_bonus, SkillBonus};

/// Skill types, one per projectile kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillType {
    Ember,
    Arrow,
    Slash,
    Shockwave,
    Meteor,
    Tornado,
}

impl SkillType {
    pub const ALL: [SkillType; 6] = [
        SkillType::Ember,
        SkillType::Arrow,
        SkillType::Slash,
        SkillType::Shockwave,
        SkillType::Meteor,
        SkillType::Tornado,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            SkillType::Ember => "ember",
            SkillType::Arrow => "arrow",
            SkillType::Slash => "slash",
            SkillType::Shockwave => "shockwave",
            SkillType::Meteor => "meteor",
            SkillType::Tornado => "tornado",
        }
    }

    /// Cooldown before the same type can be cast again
    pub fn cooldown_ms(self) -> Millis {
        match self {
            SkillType::Ember => 800,
            SkillType::Arrow => 500,
            SkillType::Slash => 600,
            SkillType::Shockwave => 1200,
            SkillType::Meteor => 2000,
            SkillType::Tornado => 1500,
        }
    }
}

/// One filled skill slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCard {
    pub skill: SkillType,
    pub power: i32,
    pub learned_at: Millis,
    /// Part of the current bonus (presentation only)
    pub in_bonus: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillHand {
    slots: [Option<SkillCard>; SKILL_SLOT_COUNT],
    bonus: SkillBonus,
}

impl SkillHand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bonus(&self) -> SkillBonus {
        self.bonus
    }

    pub fn slot(&self, index: usize) -> Option<&SkillCard> {
        assert!(index < SKILL_SLOT_COUNT, "skill slot {index} out of range");
        self.slots[index].as_ref()
    }

    pub fn cards(&self) -> impl Iterator<Item = &SkillCard> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().take_while(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    pub fn is_full(&self) -> bool {
        self.slots[SKILL_SLOT_COUNT - 1].is_some()
    }

    /// Put a card in the first empty slot; returns the slot, or `None` when
    /// the hand is already full
    pub fn learn(&mut self, skill: SkillType, power: i32, now: Millis) -> Option<usize> {
        assert!(
            (MIN_SKILL_POWER..=MAX_SKILL_POWER).contains(&power),
            "skill power {power} out of range"
        );
        let index = self.len();
        if index == SKILL_SLOT_COUNT {
            return None;
        }
        self.slots[index] = Some(SkillCard {
            skill,
            power,
            learned_at: now,
            in_bonus: false,
        });
        if self.is_full() {
            self.calculate_bonus();
        }
        Some(index)
    }

    /// Highest non-empty slot: the active skill
    pub fn highest(&self) -> Option<(usize, &SkillCard)> {
        self.slots
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, s)| s.as_ref().map(|card| (i, card)))
    }

    /// Distinct held types, starting from the highest slot
    pub fn distinct_types(&self) -> Vec<SkillType> {
        let mut types = Vec::with_capacity(SKILL_SLOT_COUNT);
        for card in self.slots.iter().rev().flatten() {
            if !types.contains(&card.skill) {
                types.push(card.skill);
            }
        }
        types
    }

    /// Highest power held for `skill`
    pub fn power_of(&self, skill: SkillType) -> Option<i32> {
        self.cards()
            .filter(|card| card.skill == skill)
            .map(|card| card.power)
            .max()
    }

    /// Lose the lowest slot (taking a hit)
    pub fn sacrifice_lowest(&mut self) -> Option<SkillCard> {
        self.remove(0)
    }

    /// Throw away the highest slot
    pub fn discard_highest(&mut self) -> Option<SkillCard> {
        let index = self.highest()?.0;
        self.remove(index)
    }

    fn remove(&mut self, index: usize) -> Option<SkillCard> {
        let card = self.slots[index].take()?;
        self.slots[index..].rotate_left(1);
        self.bonus = SkillBonus::None;
        for card in self.slots.iter_mut().flatten() {
            card.in_bonus = false;
        }
        Some(card)
    }

    fn calculate_bonus(&mut self) {
        let cards: [(SkillType, i32); SKILL_SLOT_COUNT] = std::array::from_fn(|i| {
            let card = self.slots[i].expect("full hand has every slot filled");
            (card.skill, card.power)
        });
        let (bonus, members) = calculate_skill_bonus(&cards);
        self.bonus = bonus;
        for (slot, member) in self.slots.iter_mut().zip(members) {
            if let Some(card) = slot {
                card.in_bonus = member;
            }
        }
    }
}
