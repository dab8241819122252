//! Poker-style classification of a full skill hand.
//!
//! Skill types play the role of suits and powers the role of ranks.
//! Classification only looks at the multiset of (type, power) pairs, so it
//! does not depend on which slot holds which card.

use serde::{Deserialize, Serialize};

use super::SkillType;
use crate::constants::{SKILL_SLOT_COUNT, TRIPLE_POWER_BONUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SkillBonus {
    /// Hand not full
    #[default]
    None,
    NoPair,
    OnePair,
    TwoPair,
    Triple,
    Straight,
    Flush,
    FourOfAKind,
    StraightFlush,
}

impl SkillBonus {
    pub fn name(&self) -> &'static str {
        match self {
            SkillBonus::None => "none",
            SkillBonus::NoPair => "no-pair",
            SkillBonus::OnePair => "one-pair",
            SkillBonus::TwoPair => "two-pair",
            SkillBonus::Triple => "triple",
            SkillBonus::Straight => "straight",
            SkillBonus::Flush => "flush",
            SkillBonus::FourOfAKind => "four-of-a-kind",
            SkillBonus::StraightFlush => "straight-flush",
        }
    }

    /// Casting fires every distinct held skill type in turn
    pub fn fires_all_types(&self) -> bool {
        matches!(self, SkillBonus::FourOfAKind)
    }

    /// Per-type attack patterns emit their widened variant
    pub fn intensifies(&self) -> bool {
        matches!(self, SkillBonus::Flush | SkillBonus::StraightFlush)
    }

    pub fn halves_cooldown(&self) -> bool {
        matches!(self, SkillBonus::Straight | SkillBonus::StraightFlush)
    }

    /// Added to the slot power when casting
    pub fn power_bonus(&self) -> i32 {
        match self {
            SkillBonus::Triple => TRIPLE_POWER_BONUS,
            _ => 0,
        }
    }

    /// Orbiting guardian hit zones granted by pairs
    pub fn guardian_count(&self) -> usize {
        match self {
            SkillBonus::OnePair => 1,
            SkillBonus::TwoPair => 2,
            _ => 0,
        }
    }
}

/// Classify a full hand, returning the bonus and which slots took part
pub fn calculate_skill_bonus(
    cards: &[(SkillType, i32); SKILL_SLOT_COUNT],
) -> (SkillBonus, [bool; SKILL_SLOT_COUNT]) {
    let all = [true; SKILL_SLOT_COUNT];

    let flush = cards.iter().all(|(skill, _)| *skill == cards[0].0);

    let mut powers: Vec<i32> = cards.iter().map(|(_, power)| *power).collect();
    powers.sort_unstable();
    let straight = powers.windows(2).all(|w| w[1] == w[0] + 1);

    // (power, how many slots hold it)
    let mut groups: Vec<(i32, usize)> = Vec::with_capacity(SKILL_SLOT_COUNT);
    for &power in &powers {
        match groups.last_mut() {
            Some((p, count)) if *p == power => *count += 1,
            _ => groups.push((power, 1)),
        }
    }
    let largest = groups.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let pairs: Vec<i32> = groups
        .iter()
        .filter(|(_, count)| *count == 2)
        .map(|(power, _)| *power)
        .collect();

    let members_with = |wanted: &[i32]| {
        let mut members = [false; SKILL_SLOT_COUNT];
        for (slot, (_, power)) in cards.iter().enumerate() {
            members[slot] = wanted.contains(power);
        }
        members
    };

    if straight && flush {
        (SkillBonus::StraightFlush, all)
    } else if largest == 4 {
        (SkillBonus::FourOfAKind, all)
    } else if flush {
        (SkillBonus::Flush, all)
    } else if straight {
        (SkillBonus::Straight, all)
    } else if largest == 3 {
        let triple: Vec<i32> = groups
            .iter()
            .filter(|(_, count)| *count == 3)
            .map(|(power, _)| *power)
            .collect();
        (SkillBonus::Triple, members_with(&triple))
    } else if pairs.len() == 2 {
        (SkillBonus::TwoPair, all)
    } else if pairs.len() == 1 {
        (SkillBonus::OnePair, members_with(&pairs))
    } else {
        (SkillBonus::NoPair, [false; SKILL_SLOT_COUNT])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SkillType::*;

    fn hand(types: [SkillType; 4], powers: [i32; 4]) -> [(SkillType, i32); 4] {
        [
            (types[0], powers[0]),
            (types[1], powers[1]),
            (types[2], powers[2]),
            (types[3], powers[3]),
        ]
    }

    #[test]
    fn test_straight_flush() {
        let (bonus, members) = calculate_skill_bonus(&hand([Ember; 4], [3, 4, 5, 6]));
        assert_eq!(bonus, SkillBonus::StraightFlush);
        assert_eq!(members, [true; 4]);
    }

    #[test]
    fn test_unsorted_straight() {
        let (bonus, _) = calculate_skill_bonus(&hand([Ember, Arrow, Slash, Meteor], [6, 3, 5, 4]));
        assert_eq!(bonus, SkillBonus::Straight);
    }

    #[test]
    fn test_four_of_a_kind_beats_flush() {
        let (bonus, _) = calculate_skill_bonus(&hand([Arrow; 4], [7, 7, 7, 7]));
        assert_eq!(bonus, SkillBonus::FourOfAKind);
    }

    #[test]
    fn test_flush() {
        let (bonus, members) = calculate_skill_bonus(&hand([Tornado; 4], [1, 4, 4, 9]));
        assert_eq!(bonus, SkillBonus::Flush);
        assert_eq!(members, [true; 4]);
    }

    #[test]
    fn test_triple_marks_three() {
        let (bonus, members) = calculate_skill_bonus(&hand([Ember, Arrow, Slash, Meteor], [2, 9, 2, 2]));
        assert_eq!(bonus, SkillBonus::Triple);
        assert_eq!(members, [true, false, true, true]);
    }

    #[test]
    fn test_two_pair() {
        let (bonus, members) = calculate_skill_bonus(&hand([Ember, Arrow, Slash, Meteor], [5, 8, 8, 5]));
        assert_eq!(bonus, SkillBonus::TwoPair);
        assert_eq!(members, [true; 4]);
    }

    #[test]
    fn test_one_pair_marks_two() {
        let (bonus, members) = calculate_skill_bonus(&hand([Ember, Arrow, Slash, Meteor], [1, 8, 3, 8]));
        assert_eq!(bonus, SkillBonus::OnePair);
        assert_eq!(members, [false, true, false, true]);
    }

    #[test]
    fn test_no_pair() {
        let (bonus, members) = calculate_skill_bonus(&hand([Ember, Arrow, Slash, Meteor], [1, 3, 5, 10]));
        assert_eq!(bonus, SkillBonus::NoPair);
        assert_eq!(members, [false; 4]);
    }

    #[test]
    fn test_bonus_effects() {
        assert!(SkillBonus::FourOfAKind.fires_all_types());
        assert!(SkillBonus::StraightFlush.intensifies());
        assert!(SkillBonus::StraightFlush.halves_cooldown());
        assert!(!SkillBonus::Flush.halves_cooldown());
        assert_eq!(SkillBonus::Triple.power_bonus(), 3);
        assert_eq!(SkillBonus::TwoPair.guardian_count(), 2);
        assert_eq!(SkillBonus::None.guardian_count(), 0);
    }
}
