//! Skill casting: cooldowns, the spell timeline and the four-of-a-kind
//! cast queue.

use std::collections::VecDeque;

use tracing::debug;

use super::{Character, CharacterState};
use crate::clock::Millis;
use crate::constants::SPELL_DURATION_MS;
use crate::events::SimEvent;
use crate::projectile::{cast_pattern, Projectile, Shot};
use crate::skill::SkillType;

/// The spell being performed
#[derive(Debug, Clone)]
pub(super) struct Cast {
    skill: SkillType,
    power: i32,
    shots: Vec<Shot>,
    next_shot: usize,
}

/// Per-type cooldown deadlines plus queued follow-up casts
#[derive(Debug, Clone, Default)]
pub(super) struct Casting {
    cooldown_until: [Millis; SkillType::ALL.len()],
    current: Option<Cast>,
    queue: VecDeque<(SkillType, i32)>,
}

impl Casting {
    pub(super) fn cancel(&mut self) {
        self.current = None;
        self.queue.clear();
    }
}

impl Character {
    /// Time at which `skill` may be cast again
    pub fn cooldown_until(&self, skill: SkillType) -> Millis {
        self.casting.cooldown_until[skill.index()]
    }

    /// Skill of the spell in progress
    pub fn current_cast(&self) -> Option<SkillType> {
        self.casting.current.as_ref().map(|cast| cast.skill)
    }

    pub fn queued_casts(&self) -> usize {
        self.casting.queue.len()
    }

    /// Cast the active skill. Returns `false` when there is nothing to
    /// cast, the character cannot act, or the skill is cooling down.
    pub fn use_skill(&mut self, now: Millis, events: &mut Vec<SimEvent>) -> bool {
        if !self.state().can_act() {
            return false;
        }
        let Some((_, active)) = self.hand.highest() else {
            return false;
        };
        let active = (active.skill, active.power);
        if now < self.cooldown_until(active.0) {
            return false;
        }

        let queue: VecDeque<(SkillType, i32)> = if self.hand.bonus().fires_all_types() {
            self.hand
                .distinct_types()
                .into_iter()
                .filter(|&skill| skill != active.0)
                .filter_map(|skill| self.hand.power_of(skill).map(|power| (skill, power)))
                .collect()
        } else {
            VecDeque::new()
        };
        self.casting.queue = queue;
        self.begin_spell(active.0, active.1, now, now, events);
        true
    }

    fn begin_spell(
        &mut self,
        skill: SkillType,
        power: i32,
        start: Millis,
        now: Millis,
        events: &mut Vec<SimEvent>,
    ) {
        let bonus = self.hand.bonus();
        let power = power + bonus.power_bonus();
        let mut cooldown = skill.cooldown_ms();
        if bonus.halves_cooldown() {
            cooldown /= 2;
        }
        self.casting.cooldown_until[skill.index()] = start + cooldown;
        self.shield_until = start + SPELL_DURATION_MS;
        self.casting.current = Some(Cast {
            skill,
            power,
            shots: cast_pattern(skill, bonus.intensifies()),
            next_shot: 0,
        });
        self.body.velocity.x = 0;
        self.body.acceleration.x = 0;
        self.body.set_state_at(CharacterState::Spell, start, now);
        debug!(skill = skill.name(), power, bonus = bonus.name(), "spell started");
        events.push(SimEvent::SkillCast {
            skill,
            power,
            bonus,
        });
    }

    /// Run the spell timeline up to `now`: emit every shot whose offset has
    /// been reached, and end the spell exactly `SPELL_DURATION_MS` after it
    /// started, chaining into the next queued cast.
    pub fn on_skill(&mut self, now: Millis, events: &mut Vec<SimEvent>) -> Vec<Projectile> {
        let mut launched = Vec::new();
        while self.state() == CharacterState::Spell {
            let start = self.body.state_started_at();
            let elapsed = now - start;
            if let Some(cast) = self.casting.current.as_mut() {
                while let Some(shot) = cast.shots.get(cast.next_shot) {
                    if shot.offset > elapsed {
                        break;
                    }
                    launched.push(shot.launch(
                        cast.skill,
                        cast.power,
                        self.body.position,
                        self.body.facing,
                        start + shot.offset,
                    ));
                    cast.next_shot += 1;
                }
            }

            if !self
                .body
                .set_state_if_time_over(CharacterState::Normal, now, SPELL_DURATION_MS)
            {
                break;
            }
            self.casting.current = None;
            if let Some((skill, power)) = self.casting.queue.pop_front() {
                let start = self.body.state_started_at();
                self.begin_spell(skill, power, start, now, events);
            }
        }
        launched
    }
}
