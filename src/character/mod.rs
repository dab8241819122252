//! The player character: movement state machine, skill hand, combo and
//! damage handling.
//!
//! Per frame the simulation calls, in order: [`Character::begin_frame`]
//! (combo expiry), [`Character::control`] (input), [`Character::frame_move`]
//! (timers and integration) and [`Character::on_skill`] (spell timeline).

use bevy::math::{IRect, IVec2};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Millis;
use crate::collision::Collidable;
use crate::constants::{
    CHARACTER_HIT_MS, CHARACTER_SLIP_MS, DEATH_KNOCKBACK_X, DEATH_KNOCKBACK_Y, DOUBLE_TAP_MS,
    GRAVITY, HIT_KNOCKBACK_X, HIT_KNOCKBACK_Y, INVINCIBLE_AFTER_DEATH_MS, INVINCIBLE_AFTER_HIT_MS,
    JUMP_VELOCITY, KNOCKBACK_DRAG_DIVISOR, MAX_AIR_JUMPS, MAX_SKILL_POWER, MIN_SKILL_POWER,
    RUN_SPEED, STOP_DURATION_MS, WALK_SPEED,
};
use crate::container::FrameContext;
use crate::events::SimEvent;
use crate::input::{InputSnapshot, Key};
use crate::monster::Monster;
use crate::physics::PlayField;
use crate::rigidbody::{rect, Facing, Rigidbody};
use crate::skill::{SkillHand, SkillType};

mod casting;
pub mod combo;
pub mod guardian;

pub use combo::ComboTracker;
pub use guardian::Guardian;

const HALF_WIDTH: i32 = 35_000;
const HEIGHT: i32 = 160_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterState {
    Normal,
    Walk,
    Run,
    /// Skid after releasing a run
    Stop,
    Jump,
    RunJump,
    Spell,
    Hit,
    Slip,
    Die,
}

impl CharacterState {
    /// States that accept movement and skill input
    pub fn can_act(self) -> bool {
        matches!(
            self,
            CharacterState::Normal
                | CharacterState::Walk
                | CharacterState::Run
                | CharacterState::Stop
                | CharacterState::Jump
                | CharacterState::RunJump
        )
    }

    pub fn is_airborne_jump(self) -> bool {
        matches!(self, CharacterState::Jump | CharacterState::RunJump)
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    pub body: Rigidbody<CharacterState>,
    pub hand: SkillHand,
    pub combo: ComboTracker,
    pub guardians: Vec<Guardian>,
    jump_count: u32,
    /// Set on the frame a jump starts; vertical integration is skipped once
    jump_started: bool,
    invincible_until: Millis,
    /// End of the current cast's damage shield
    shield_until: Millis,
    last_tap: Option<(Facing, Millis)>,
    casting: casting::Casting,
}

impl Character {
    /// Stand the character in the middle of the field, on the highest
    /// ground at or below the floor line
    pub fn new(field: &PlayField, now: Millis) -> Self {
        let x = field.left + field.width() / 2;
        let y = field
            .ground_below(x - HALF_WIDTH, x + HALF_WIDTH, field.floor)
            .unwrap_or(field.floor);
        let mut body = Rigidbody::new(
            IVec2::new(x, y),
            rect(-HALF_WIDTH, 0, HALF_WIDTH, HEIGHT),
            CharacterState::Normal,
            now,
        );
        body.acceleration.y = GRAVITY;
        Self {
            body,
            hand: SkillHand::new(),
            combo: ComboTracker::new(),
            guardians: Vec::new(),
            jump_count: 0,
            jump_started: false,
            invincible_until: now,
            shield_until: now,
            last_tap: None,
            casting: casting::Casting::default(),
        }
    }

    pub fn state(&self) -> CharacterState {
        self.body.state()
    }

    pub fn is_dead(&self) -> bool {
        self.state() == CharacterState::Die
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn invincible_until(&self) -> Millis {
        self.invincible_until
    }

    pub fn shield_until(&self) -> Millis {
        self.shield_until
    }

    /// Center of the body in world space
    pub fn center(&self) -> IVec2 {
        self.body.global_range().center()
    }

    /// Start-of-frame bookkeeping: drop an expired combo
    pub fn begin_frame(&mut self, now: Millis) {
        if self.combo.frame_start(now) {
            debug!(now, "combo expired");
        }
    }

    /// Count an accepted hit towards the combo
    pub fn add_combo(&mut self, now: Millis, events: &mut Vec<SimEvent>) -> u32 {
        let combo = self.combo.add(now);
        events.push(SimEvent::ComboChanged { combo });
        combo
    }

    /// Learn `skill` with a random power
    pub fn learn_skill<R: Rng>(
        &mut self,
        skill: SkillType,
        now: Millis,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) -> Option<usize> {
        let power = rng.gen_range(MIN_SKILL_POWER..=MAX_SKILL_POWER);
        self.learn_skill_with_power(skill, power, now, events)
    }

    pub fn learn_skill_with_power(
        &mut self,
        skill: SkillType,
        power: i32,
        now: Millis,
        events: &mut Vec<SimEvent>,
    ) -> Option<usize> {
        let slot = self.hand.learn(skill, power, now)?;
        let bonus = self.hand.bonus();
        if self.hand.is_full() {
            info!(bonus = bonus.name(), "skill hand complete");
        }
        self.sync_guardians();
        events.push(SimEvent::SkillLearned {
            slot,
            skill,
            power,
            bonus,
        });
        Some(slot)
    }

    /// Apply this frame's input
    pub fn control(&mut self, input: &InputSnapshot, now: Millis, events: &mut Vec<SimEvent>) {
        if !self.state().can_act() {
            return;
        }

        if input.is_just_pressed(Key::DiscardSkill) {
            if let Some(card) = self.hand.discard_highest() {
                self.sync_guardians();
                events.push(SimEvent::SkillDiscarded {
                    skill: card.skill,
                    power: card.power,
                });
            }
        }

        if input.is_just_pressed(Key::CastSkill) && self.use_skill(now, events) {
            return;
        }

        if input.is_just_pressed(Key::Jump) && self.jump_count < MAX_AIR_JUMPS {
            self.jump_count += 1;
            self.jump_started = true;
            self.body.velocity.y = JUMP_VELOCITY;
            let next = match self.state() {
                CharacterState::Run | CharacterState::RunJump => CharacterState::RunJump,
                _ => CharacterState::Jump,
            };
            self.body.set_state(next, now);
        }

        self.steer(input, now);
    }

    fn steer(&mut self, input: &InputSnapshot, now: Millis) {
        let dir = input.horizontal();
        let state = self.state();

        if state.is_airborne_jump() {
            let speed = if state == CharacterState::RunJump {
                RUN_SPEED
            } else {
                WALK_SPEED
            };
            self.body.facing = Facing::from_sign(dir, self.body.facing);
            self.body.velocity.x = dir * speed;
            return;
        }

        if dir == 0 {
            match state {
                CharacterState::Run => {
                    self.body.set_state(CharacterState::Stop, now);
                    self.body.acceleration.x = -self.body.velocity.x / STOP_DURATION_MS as i32;
                }
                CharacterState::Walk => {
                    self.body.set_state(CharacterState::Normal, now);
                    self.body.velocity.x = 0;
                }
                _ => {}
            }
            return;
        }

        let facing = Facing::from_sign(dir, self.body.facing);
        let key = match facing {
            Facing::Left => Key::Left,
            Facing::Right => Key::Right,
        };
        let tapped = input.is_just_pressed(key);
        let double_tap = tapped
            && matches!(self.last_tap, Some((f, at)) if f == facing && now - at <= DOUBLE_TAP_MS);
        if tapped {
            self.last_tap = Some((facing, now));
        }

        let keep_running = state == CharacterState::Run && facing == self.body.facing;
        let next = if double_tap || keep_running {
            CharacterState::Run
        } else {
            CharacterState::Walk
        };
        if next != state {
            self.body.set_state(next, now);
        }
        self.body.facing = facing;
        self.body.acceleration.x = 0;
        let speed = if next == CharacterState::Run {
            RUN_SPEED
        } else {
            WALK_SPEED
        };
        self.body.velocity.x = dir * speed;
    }

    /// Advance state timers and integrate movement
    pub fn frame_move(&mut self, ctx: &mut FrameContext<'_>) {
        let now = ctx.now;
        loop {
            let advanced = match self.state() {
                CharacterState::Stop => {
                    self.body
                        .set_state_if_time_over(CharacterState::Normal, now, STOP_DURATION_MS)
                }
                CharacterState::Hit => {
                    self.body
                        .set_state_if_time_over(CharacterState::Slip, now, CHARACTER_HIT_MS)
                }
                CharacterState::Slip => {
                    self.body
                        .set_state_if_time_over(CharacterState::Normal, now, CHARACTER_SLIP_MS)
                }
                _ => false,
            };
            if !advanced {
                break;
            }
            if self.state() == CharacterState::Normal {
                self.body.velocity.x = 0;
                self.body.acceleration.x = 0;
            }
        }

        if std::mem::take(&mut self.jump_started) {
            self.body.velocity.x = self.body.velocity_after_move(ctx.dt).x;
            self.body.position.x = self.body.position_after_move(ctx.dt).x;
            ctx.field.clamp_x(&mut self.body);
            return;
        }

        let outcome = ctx.field.integrate_bounded(&mut self.body, ctx.dt);
        if outcome.landed {
            self.jump_count = 0;
            match self.state() {
                CharacterState::Jump => {
                    self.body.set_state(CharacterState::Normal, now);
                    self.body.velocity.x = 0;
                }
                CharacterState::RunJump => self.body.set_state(CharacterState::Run, now),
                _ => {}
            }
        }
    }

    /// Keep guardian zones in step with the current bonus and move them
    /// to their orbit positions at `now`
    pub fn update_guardians(&mut self, now: Millis) {
        self.sync_guardians();
        let center = self.center();
        for guardian in &mut self.guardians {
            guardian.update(center, now);
        }
    }

    fn sync_guardians(&mut self) {
        let count = self.hand.bonus().guardian_count();
        if self.guardians.len() != count {
            self.guardians = (0..count).map(|i| Guardian::new(i, count)).collect();
        }
    }

    /// Take a hit from `monster`. Returns `false` when the hit was ignored
    /// (invincible, shielded by a cast, or already dead).
    pub fn on_collided(
        &mut self,
        monster: &Monster,
        now: Millis,
        events: &mut Vec<SimEvent>,
    ) -> bool {
        if self.is_dead() || now < self.invincible_until || now < self.shield_until {
            return false;
        }

        if self.combo.reset() {
            events.push(SimEvent::ComboChanged { combo: 0 });
        }
        self.casting.cancel();
        self.jump_started = false;

        let dx = self.center().x - monster.global_range().center().x;
        let away = Facing::from_sign(dx, self.body.facing.flipped());
        self.body.facing = away.flipped();
        let percent = monster.species.stats().knockback_percent;

        match self.hand.sacrifice_lowest() {
            Some(card) => {
                self.knock(away, HIT_KNOCKBACK_X, HIT_KNOCKBACK_Y, percent);
                self.body.set_state(CharacterState::Hit, now);
                self.invincible_until = now + INVINCIBLE_AFTER_HIT_MS;
                self.sync_guardians();
                debug!(lost = card.skill.name(), remaining = self.hand.len(), "character hit");
                events.push(SimEvent::CharacterDamaged {
                    position: self.body.position,
                    lost: card.skill,
                });
            }
            None => {
                self.knock(away, DEATH_KNOCKBACK_X, DEATH_KNOCKBACK_Y, percent);
                self.body.set_state(CharacterState::Die, now);
                self.invincible_until = now + INVINCIBLE_AFTER_DEATH_MS;
                info!(now, "character died");
                events.push(SimEvent::CharacterDied {
                    position: self.body.position,
                });
            }
        }
        true
    }

    fn knock(&mut self, away: Facing, x: i32, y: i32, percent: i32) {
        let vx = away.sign() * x * percent / 100;
        self.body.velocity = IVec2::new(vx, y * percent / 100);
        self.body.acceleration.x = -vx / KNOCKBACK_DRAG_DIVISOR;
    }
}

impl Collidable for Character {
    fn global_range(&self) -> IRect {
        self.body.global_range()
    }

    fn is_collidable(&self) -> bool {
        !self.is_dead()
    }
}
